//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::DatabaseError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// A referenced user or movie does not exist
    #[error("{0}")]
    NotFound(String),

    /// The request collides with existing state, e.g. a taken username
    #[error("{0}")]
    Conflict(String),

    /// The request is well formed but not allowed, e.g. voting on one's own movie
    #[error("{0}")]
    InvalidOperation(String),

    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing, malformed, expired or forged credentials
    #[error("Unauthorized")]
    Unauthorized,

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::InvalidOperation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            ApiError::Database(DatabaseError::UniqueViolation(_)) => {
                (StatusCode::CONFLICT, "Resource already exists".to_string())
            }
            ApiError::Database(e) => {
                error!("Database failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
