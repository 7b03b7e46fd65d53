//! Vote ledger operations

use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{Movie, VoteChange, VoteType},
    repositories::Store,
    services::{MovieService, UserService},
};

#[derive(Clone)]
pub struct VoteService<S> {
    store: S,
    users: UserService<S>,
    movies: MovieService<S>,
}

impl<S: Store> VoteService<S> {
    pub fn new(store: S, users: UserService<S>, movies: MovieService<S>) -> Self {
        Self {
            store,
            users,
            movies,
        }
    }

    /// Cast, flip or retract `username`'s vote on a movie and return the
    /// movie with its updated counts.
    ///
    /// Checks run in order (user exists, movie exists, user is not the
    /// owner) and nothing is written unless all of them pass.
    pub async fn apply_vote(
        &self,
        username: &str,
        movie_id: Uuid,
        requested: VoteType,
    ) -> ApiResult<Movie> {
        let user = self.users.require(username).await?;
        let movie = self.movies.get(movie_id).await?;

        if movie.owner_id == user.id {
            return Err(ApiError::InvalidOperation(
                "You cannot vote on your own movie".to_string(),
            ));
        }

        let change = self.store.apply_vote(user.id, movie.id, requested).await?;

        match change {
            VoteChange::Cast(vote_type) => {
                info!("User {} cast {:?} on movie {}", user.username, vote_type, movie.id)
            }
            VoteChange::Flip { from, to } => info!(
                "User {} flipped {:?} to {:?} on movie {}",
                user.username, from, to, movie.id
            ),
            VoteChange::Retract(vote_type) => info!(
                "User {} retracted {:?} on movie {}",
                user.username, vote_type, movie.id
            ),
        }

        self.movies.get(movie.id).await
    }

    /// The caller's votes on the given movies, keyed by movie id.
    /// Movies without a vote are left out.
    pub async fn user_votes(
        &self,
        username: &str,
        movie_ids: &[Uuid],
    ) -> ApiResult<HashMap<Uuid, VoteType>> {
        let user = self.users.require(username).await?;

        let votes = self.store.find_votes_by_user(user.id, movie_ids).await?;

        Ok(votes
            .into_iter()
            .map(|vote| (vote.movie_id, vote.vote_type))
            .collect())
    }
}
