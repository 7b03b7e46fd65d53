//! Repositories for database operations
//!
//! The services only talk to storage through the traits below. `PgStore` is
//! the PostgreSQL implementation used by the binary; tests run against an
//! in-memory store with the same guarantees.

use common::error::DatabaseResult;
use std::future::Future;
use uuid::Uuid;

use crate::models::{Movie, MovieFilter, NewMovie, NewUser, User, Vote, VoteChange, VoteType};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

/// Users relation
pub trait UserRepository: Send + Sync {
    /// Insert a user; a taken username fails with `DatabaseError::UniqueViolation`
    fn create_user(&self, new_user: &NewUser) -> impl Future<Output = DatabaseResult<User>> + Send;

    /// Find a user by its exact (case-sensitive) username
    fn find_user_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = DatabaseResult<Option<User>>> + Send;
}

/// Movies relation, reads carry like/hate counts aggregated from the votes
pub trait MovieRepository: Send + Sync {
    fn create_movie(&self, new_movie: &NewMovie)
    -> impl Future<Output = DatabaseResult<Movie>> + Send;

    fn find_movie_by_id(&self, id: Uuid) -> impl Future<Output = DatabaseResult<Option<Movie>>> + Send;

    /// One page of movies and the total number of movies matching the filter
    fn list_movies(
        &self,
        filter: &MovieFilter,
    ) -> impl Future<Output = DatabaseResult<(Vec<Movie>, i64)>> + Send;
}

/// Votes relation
pub trait VoteRepository: Send + Sync {
    /// Atomically read the user's current vote on the movie, plan the change
    /// with [`VoteChange::plan`] and apply exactly one insert, update or delete.
    fn apply_vote(
        &self,
        user_id: Uuid,
        movie_id: Uuid,
        requested: VoteType,
    ) -> impl Future<Output = DatabaseResult<VoteChange>> + Send;

    /// The user's votes restricted to `movie_ids`
    fn find_votes_by_user(
        &self,
        user_id: Uuid,
        movie_ids: &[Uuid],
    ) -> impl Future<Output = DatabaseResult<Vec<Vote>>> + Send;
}

/// Complete persistence backend of the service
pub trait Store: UserRepository + MovieRepository + VoteRepository + Clone + 'static {
    /// Check that the backend is reachable
    fn health_check(&self) -> impl Future<Output = bool> + Send;
}
