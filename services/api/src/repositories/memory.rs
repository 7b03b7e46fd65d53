//! In-memory store used by the service and router tests.
//!
//! A single mutex guards all three relations, so every operation is atomic
//! the same way a PostgreSQL transaction is. Votes are keyed by
//! (user, movie), which makes duplicate rows unrepresentable.

use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{MovieRepository, Store, UserRepository, VoteRepository};
use crate::models::{
    Movie, MovieFilter, MovieSort, NewMovie, NewUser, User, Vote, VoteChange, VoteType,
};

#[derive(Debug, Clone)]
struct StoredMovie {
    id: Uuid,
    title: String,
    description: String,
    owner_id: Uuid,
    created_at: DateTime<Utc>,
    /// Insertion order, breaks ties between equal timestamps
    seq: usize,
}

#[derive(Debug, Default)]
struct MemoryState {
    users: Vec<User>,
    movies: Vec<StoredMovie>,
    votes: HashMap<(Uuid, Uuid), Vote>,
}

impl MemoryState {
    fn counts(&self, movie_id: Uuid) -> (i64, i64) {
        self.votes
            .values()
            .filter(|vote| vote.movie_id == movie_id)
            .fold((0, 0), |(likes, hates), vote| match vote.vote_type {
                VoteType::Like => (likes + 1, hates),
                VoteType::Hate => (likes, hates + 1),
            })
    }

    fn view(&self, movie: &StoredMovie) -> DatabaseResult<Movie> {
        let owner = self
            .users
            .iter()
            .find(|user| user.id == movie.owner_id)
            .ok_or_else(|| DatabaseError::Query(sqlx::Error::RowNotFound))?;
        let (likes, hates) = self.counts(movie.id);

        Ok(Movie {
            id: movie.id,
            title: movie.title.clone(),
            description: movie.description.clone(),
            owner_id: movie.owner_id,
            owner_username: owner.username.clone(),
            created_at: movie.created_at,
            likes,
            hates,
        })
    }
}

/// Store keeping every relation in process memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every vote row recorded for a movie
    pub async fn votes_for_movie(&self, movie_id: Uuid) -> Vec<Vote> {
        let state = self.state.lock().await;
        state
            .votes
            .values()
            .filter(|vote| vote.movie_id == movie_id)
            .cloned()
            .collect()
    }

    /// Number of vote rows across all movies
    pub async fn vote_count(&self) -> usize {
        self.state.lock().await.votes.len()
    }

    pub async fn user_count(&self) -> usize {
        self.state.lock().await.users.len()
    }
}

impl UserRepository for MemoryStore {
    async fn create_user(&self, new_user: &NewUser) -> DatabaseResult<User> {
        let mut state = self.state.lock().await;

        if state
            .users
            .iter()
            .any(|user| user.username == new_user.username)
        {
            return Err(DatabaseError::UniqueViolation(
                "users_username_key".to_string(),
            ));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            created_at: Utc::now(),
        };
        state.users.push(user.clone());

        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .iter()
            .find(|user| user.username == username)
            .cloned())
    }
}

impl MovieRepository for MemoryStore {
    async fn create_movie(&self, new_movie: &NewMovie) -> DatabaseResult<Movie> {
        let mut state = self.state.lock().await;

        let movie = StoredMovie {
            id: Uuid::new_v4(),
            title: new_movie.title.clone(),
            description: new_movie.description.clone(),
            owner_id: new_movie.owner_id,
            created_at: new_movie.created_at,
            seq: state.movies.len(),
        };
        let view = state.view(&movie)?;
        state.movies.push(movie);

        Ok(view)
    }

    async fn find_movie_by_id(&self, id: Uuid) -> DatabaseResult<Option<Movie>> {
        let state = self.state.lock().await;
        state
            .movies
            .iter()
            .find(|movie| movie.id == id)
            .map(|movie| state.view(movie))
            .transpose()
    }

    async fn list_movies(&self, filter: &MovieFilter) -> DatabaseResult<(Vec<Movie>, i64)> {
        let state = self.state.lock().await;

        let mut matching = Vec::new();
        for movie in &state.movies {
            let view = state.view(movie)?;
            if filter
                .owner_username
                .as_ref()
                .is_none_or(|owner| &view.owner_username == owner)
            {
                matching.push((movie.seq, view));
            }
        }

        matching.sort_by(|(seq_a, a), (seq_b, b)| {
            let primary = match filter.sort {
                MovieSort::Date => std::cmp::Ordering::Equal,
                MovieSort::Likes => b.likes.cmp(&a.likes),
                MovieSort::Hates => b.hates.cmp(&a.hates),
            };
            primary
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| seq_b.cmp(seq_a))
        });

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .map(|(_, movie)| movie)
            .skip(filter.page.offset() as usize)
            .take(filter.page.limit as usize)
            .collect();

        Ok((items, total))
    }
}

impl VoteRepository for MemoryStore {
    async fn apply_vote(
        &self,
        user_id: Uuid,
        movie_id: Uuid,
        requested: VoteType,
    ) -> DatabaseResult<VoteChange> {
        let mut state = self.state.lock().await;

        let key = (user_id, movie_id);
        let existing = state.votes.get(&key).map(|vote| vote.vote_type);
        let change = VoteChange::plan(existing, requested);

        match change {
            VoteChange::Cast(vote_type) => {
                state.votes.insert(
                    key,
                    Vote {
                        id: Uuid::new_v4(),
                        movie_id,
                        user_id,
                        vote_type,
                    },
                );
            }
            VoteChange::Flip { to, .. } => {
                if let Some(vote) = state.votes.get_mut(&key) {
                    vote.vote_type = to;
                }
            }
            VoteChange::Retract(_) => {
                state.votes.remove(&key);
            }
        }

        Ok(change)
    }

    async fn find_votes_by_user(
        &self,
        user_id: Uuid,
        movie_ids: &[Uuid],
    ) -> DatabaseResult<Vec<Vote>> {
        let state = self.state.lock().await;
        Ok(movie_ids
            .iter()
            .filter_map(|movie_id| state.votes.get(&(user_id, *movie_id)).cloned())
            .collect())
    }
}

impl Store for MemoryStore {
    async fn health_check(&self) -> bool {
        true
    }
}
