//! User directory

use common::error::DatabaseError;
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    models::{NewUser, User},
    repositories::Store,
};

#[derive(Clone)]
pub struct UserService<S> {
    store: S,
}

impl<S: Store> UserService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn find_by_username(&self, username: &str) -> ApiResult<Option<User>> {
        Ok(self.store.find_user_by_username(username).await?)
    }

    /// Resolve a username to its user, `NotFound` when absent
    pub async fn require(&self, username: &str) -> ApiResult<User> {
        self.find_by_username(username)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    /// Create a user, `Conflict` when the username is taken.
    ///
    /// The lookup gives the common case a clean error; the store's unique
    /// constraint settles concurrent registrations of the same name.
    pub async fn create(&self, new_user: &NewUser) -> ApiResult<User> {
        if self.find_by_username(&new_user.username).await?.is_some() {
            return Err(username_taken());
        }

        let user = self
            .store
            .create_user(new_user)
            .await
            .map_err(|e| match e {
                DatabaseError::UniqueViolation(_) => username_taken(),
                other => ApiError::Database(other),
            })?;

        info!("Created user {} ({})", user.username, user.id);
        Ok(user)
    }
}

fn username_taken() -> ApiError {
    ApiError::Conflict("Username already exists".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::MemoryStore;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn create_then_find() {
        let users = UserService::new(MemoryStore::new());
        let created = users.create(&new_user("alice")).await.unwrap();

        let found = users.require("alice").await.unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.email, "alice@example.com");
    }

    #[tokio::test]
    async fn usernames_are_case_sensitive() {
        let users = UserService::new(MemoryStore::new());
        users.create(&new_user("alice")).await.unwrap();

        assert!(users.find_by_username("Alice").await.unwrap().is_none());
        assert!(users.create(&new_user("Alice")).await.is_ok());
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let users = UserService::new(MemoryStore::new());
        users.create(&new_user("alice")).await.unwrap();

        let err = users.create(&new_user("alice")).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let users = UserService::new(MemoryStore::new());
        let err = users.require("carol").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
