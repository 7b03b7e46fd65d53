//! Authentication middleware for bearer token validation

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{error::ApiError, repositories::Store, state::AppState};

/// Authenticated caller, resolved from the bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub username: String,
}

/// Authentication middleware
pub async fn auth_middleware<S: Store>(
    State(state): State<AppState<S>>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(ApiError::Unauthorized)?;

    let username = state.auth.authenticate(bearer.token())?;

    // Insert the user into the request extensions
    req.extensions_mut().insert(AuthUser { username });

    Ok(next.run(req).await)
}
