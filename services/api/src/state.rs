//! Application state shared across handlers

use crate::{
    jwt::JwtService,
    password::PasswordService,
    repositories::Store,
    services::{AuthService, MovieService, UserService, VoteService},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState<S> {
    pub store: S,
    pub auth: AuthService<S>,
    pub movies: MovieService<S>,
    pub votes: VoteService<S>,
}

impl<S: Store> AppState<S> {
    /// Wire the services over one store
    pub fn new(store: S, jwt: JwtService, passwords: PasswordService) -> Self {
        let users = UserService::new(store.clone());
        let movies = MovieService::new(store.clone(), users.clone());
        let votes = VoteService::new(store.clone(), users.clone(), movies.clone());
        let auth = AuthService::new(users, jwt, passwords);

        Self {
            store,
            auth,
            movies,
            votes,
        }
    }
}
