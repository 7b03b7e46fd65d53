//! Movie catalog

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{CreateMovieRequest, Movie, MovieFilter, MovieListResponse, MovieQuery, NewMovie},
    repositories::Store,
    services::UserService,
    validation::{validate_description, validate_title},
};

#[derive(Clone)]
pub struct MovieService<S> {
    store: S,
    users: UserService<S>,
}

impl<S: Store> MovieService<S> {
    pub fn new(store: S, users: UserService<S>) -> Self {
        Self { store, users }
    }

    /// Submit a movie owned by `username`, stamped with the server clock
    pub async fn create(&self, username: &str, request: CreateMovieRequest) -> ApiResult<Movie> {
        let owner = self.users.require(username).await?;

        let title = validate_title(&request.title).map_err(ApiError::BadRequest)?;
        let description =
            validate_description(request.description.as_deref()).map_err(ApiError::BadRequest)?;

        let movie = self
            .store
            .create_movie(&NewMovie {
                owner_id: owner.id,
                title,
                description,
                created_at: Utc::now(),
            })
            .await?;

        info!("User {} submitted movie {}", owner.username, movie.id);
        Ok(movie)
    }

    pub async fn get(&self, id: Uuid) -> ApiResult<Movie> {
        self.store
            .find_movie_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Movie not found".to_string()))
    }

    /// List all movies in the order requested by `query`
    pub async fn list(&self, query: &MovieQuery) -> ApiResult<MovieListResponse> {
        self.list_filtered(query, None).await
    }

    /// List the movies submitted by `username`; unknown users have none
    pub async fn list_by_owner(
        &self,
        username: &str,
        query: &MovieQuery,
    ) -> ApiResult<MovieListResponse> {
        self.list_filtered(query, Some(username.to_string())).await
    }

    async fn list_filtered(
        &self,
        query: &MovieQuery,
        owner_username: Option<String>,
    ) -> ApiResult<MovieListResponse> {
        let sort = query
            .sort()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        let page = query.page();

        let filter = MovieFilter {
            sort,
            owner_username,
            page,
        };
        let (items, total) = self.store.list_movies(&filter).await?;

        Ok(MovieListResponse {
            items,
            page: page.page,
            limit: page.limit,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{MovieSort, NewUser, VoteType},
        repositories::{UserRepository, VoteRepository, memory::MemoryStore},
    };

    async fn setup() -> (MemoryStore, MovieService<MemoryStore>) {
        let store = MemoryStore::new();
        for username in ["alice", "bob", "carol"] {
            store
                .create_user(&NewUser {
                    username: username.to_string(),
                    email: format!("{username}@example.com"),
                    password_hash: "hash".to_string(),
                })
                .await
                .unwrap();
        }
        let service = MovieService::new(store.clone(), UserService::new(store.clone()));
        (store, service)
    }

    fn request(title: &str) -> CreateMovieRequest {
        CreateMovieRequest {
            title: title.to_string(),
            description: Some("A movie".to_string()),
        }
    }

    fn query(sort_by: Option<&str>) -> MovieQuery {
        MovieQuery {
            sort_by: sort_by.map(str::to_string),
            ..Default::default()
        }
    }

    fn titles(response: &MovieListResponse) -> Vec<&str> {
        response.items.iter().map(|m| m.title.as_str()).collect()
    }

    async fn user_id(store: &MemoryStore, username: &str) -> Uuid {
        store
            .find_user_by_username(username)
            .await
            .unwrap()
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn create_sets_owner_and_starts_without_votes() {
        let (_, movies) = setup().await;
        let movie = movies.create("bob", request("  Dune ")).await.unwrap();

        assert_eq!(movie.title, "Dune");
        assert_eq!(movie.owner_username, "bob");
        assert_eq!((movie.likes, movie.hates), (0, 0));
        assert_eq!(movies.get(movie.id).await.unwrap(), movie);
    }

    #[tokio::test]
    async fn create_for_unknown_user_is_not_found() {
        let (_, movies) = setup().await;
        assert!(matches!(
            movies.create("dave", request("Dune")).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn create_rejects_blank_titles() {
        let (_, movies) = setup().await;
        assert!(matches!(
            movies.create("bob", request("   ")).await,
            Err(ApiError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn titles_need_not_be_unique() {
        let (_, movies) = setup().await;
        movies.create("bob", request("Dune")).await.unwrap();
        movies.create("alice", request("Dune")).await.unwrap();

        assert_eq!(movies.list(&query(None)).await.unwrap().total, 2);
    }

    #[tokio::test]
    async fn missing_movie_is_not_found() {
        let (_, movies) = setup().await;
        assert!(matches!(
            movies.get(Uuid::new_v4()).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_orders_by_requested_dimension() {
        let (store, movies) = setup().await;
        let dune = movies.create("bob", request("Dune")).await.unwrap();
        let alien = movies.create("bob", request("Alien")).await.unwrap();
        let heat = movies.create("bob", request("Heat")).await.unwrap();

        let alice = user_id(&store, "alice").await;
        let carol = user_id(&store, "carol").await;
        store.apply_vote(alice, dune.id, VoteType::Like).await.unwrap();
        store.apply_vote(carol, dune.id, VoteType::Like).await.unwrap();
        store.apply_vote(alice, alien.id, VoteType::Like).await.unwrap();
        store.apply_vote(carol, heat.id, VoteType::Hate).await.unwrap();

        let by_date = movies.list(&query(None)).await.unwrap();
        assert_eq!(titles(&by_date), ["Heat", "Alien", "Dune"]);

        let by_likes = movies.list(&query(Some("likes"))).await.unwrap();
        assert_eq!(titles(&by_likes), ["Dune", "Alien", "Heat"]);

        let by_hates = movies.list(&query(Some("hates"))).await.unwrap();
        assert_eq!(titles(&by_hates), ["Heat", "Alien", "Dune"]);
        assert_eq!(by_hates.items[0].hates, 1);
    }

    #[tokio::test]
    async fn unknown_sort_key_is_rejected() {
        let (_, movies) = setup().await;
        assert!(matches!(
            movies.list(&query(Some("title"))).await,
            Err(ApiError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn list_pages_through_the_catalog() {
        let (_, movies) = setup().await;
        for title in ["One", "Two", "Three", "Four", "Five"] {
            movies.create("bob", request(title)).await.unwrap();
        }

        let page = movies
            .list(&MovieQuery {
                sort_by: Some(MovieSort::Date.to_string()),
                page: Some(2),
                limit: Some(2),
            })
            .await
            .unwrap();

        assert_eq!(titles(&page), ["Three", "Two"]);
        assert_eq!((page.page, page.limit, page.total), (2, 2, 5));
    }

    #[tokio::test]
    async fn list_by_owner_only_returns_that_users_movies() {
        let (_, movies) = setup().await;
        movies.create("bob", request("Dune")).await.unwrap();
        movies.create("alice", request("Alien")).await.unwrap();

        let bobs = movies.list_by_owner("bob", &query(None)).await.unwrap();
        assert_eq!(titles(&bobs), ["Dune"]);
        assert_eq!(bobs.total, 1);

        let nobodys = movies.list_by_owner("dave", &query(None)).await.unwrap();
        assert!(nobodys.items.is_empty());
        assert_eq!(nobodys.total, 0);
    }
}
