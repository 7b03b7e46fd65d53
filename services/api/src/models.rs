//! Domain models and API request/response payloads

pub mod movie;
pub mod user;
pub mod vote;

// Re-export for convenience
pub use movie::{
    CreateMovieRequest, Movie, MovieFilter, MovieListResponse, MovieQuery, MovieSort, NewMovie,
};
pub use user::{AuthResponse, LoginRequest, NewUser, RegisterRequest, User, UserResponse};
pub use vote::{Vote, VoteChange, VoteQuery, VoteType};
