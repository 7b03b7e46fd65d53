//! API service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::{AuthUser, auth_middleware},
    models::{CreateMovieRequest, LoginRequest, MovieQuery, RegisterRequest, VoteQuery},
    repositories::Store,
    state::AppState,
};

/// CORS policy for the browser frontend; any origin when none is configured
pub fn cors_layer(allowed_origin: Option<&str>) -> Result<CorsLayer, header::InvalidHeaderValue> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    match allowed_origin {
        Some(origin) => Ok(cors.allow_origin(origin.parse::<HeaderValue>()?)),
        None => Ok(cors.allow_origin(Any)),
    }
}

/// Create the router for the API service
pub fn create_router<S: Store>(state: AppState<S>, cors: CorsLayer) -> Router {
    let protected_routes = Router::new()
        .route("/api/v1/movies", post(create_movie::<S>))
        .route("/api/v1/movies/:id/vote", post(vote::<S>))
        .route("/api/v1/votes/user-votes", post(user_votes::<S>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<S>,
        ));

    Router::new()
        .route("/health", get(health_check::<S>))
        .route("/api/v1/auth/register", post(register::<S>))
        .route("/api/v1/auth/login", post(login::<S>))
        .route("/api/v1/movies", get(list_movies::<S>))
        .route("/api/v1/movies/:id", get(get_movie::<S>))
        .route("/api/v1/movies/user/:username", get(movies_by_user::<S>))
        .merge(protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check<S: Store>(State(state): State<AppState<S>>) -> impl IntoResponse {
    let database = state.store.health_check().await;
    let (status, label) = if database {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(json!({
            "status": label,
            "service": "movierama-api",
            "database": database,
        })),
    )
}

/// Register a new user
pub async fn register<S: Store>(
    State(state): State<AppState<S>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state.auth.register(payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// User login endpoint
pub async fn login<S: Store>(
    State(state): State<AppState<S>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.auth.login(payload).await?))
}

/// Get movies with sorting and pagination
pub async fn list_movies<S: Store>(
    State(state): State<AppState<S>>,
    Query(query): Query<MovieQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.movies.list(&query).await?))
}

/// Get a movie by ID
pub async fn get_movie<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.movies.get(id).await?))
}

/// Get the movies submitted by one user
pub async fn movies_by_user<S: Store>(
    State(state): State<AppState<S>>,
    Path(username): Path<String>,
    Query(query): Query<MovieQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.movies.list_by_owner(&username, &query).await?))
}

/// Submit a movie as the authenticated user
pub async fn create_movie<S: Store>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateMovieRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let movie = state.movies.create(&user.username, payload).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

/// Cast, flip or retract the authenticated user's vote
pub async fn vote<S: Store>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Query(query): Query<VoteQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let movie = state
        .votes
        .apply_vote(&user.username, id, query.vote_type)
        .await?;
    Ok(Json(movie))
}

/// The authenticated user's votes on a set of movies
pub async fn user_votes<S: Store>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<AuthUser>,
    Json(movie_ids): Json<Vec<Uuid>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.votes.user_votes(&user.username, &movie_ids).await?))
}
