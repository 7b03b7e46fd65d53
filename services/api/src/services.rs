//! Business operations on top of the repositories

pub mod auth;
pub mod movies;
pub mod users;
pub mod votes;

pub use auth::AuthService;
pub use movies::MovieService;
pub use users::UserService;
pub use votes::VoteService;
