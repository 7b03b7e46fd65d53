//! Registration, login and bearer token resolution

use tracing::{error, info, warn};

use crate::{
    error::{ApiError, ApiResult},
    jwt::JwtService,
    models::{AuthResponse, LoginRequest, NewUser, RegisterRequest, User, UserResponse},
    password::PasswordService,
    repositories::Store,
    services::UserService,
    validation::{validate_email, validate_password, validate_username},
};

#[derive(Clone)]
pub struct AuthService<S> {
    users: UserService<S>,
    jwt: JwtService,
    passwords: PasswordService,
}

impl<S: Store> AuthService<S> {
    pub fn new(users: UserService<S>, jwt: JwtService, passwords: PasswordService) -> Self {
        Self {
            users,
            jwt,
            passwords,
        }
    }

    /// Register a new user and sign them in
    pub async fn register(&self, request: RegisterRequest) -> ApiResult<AuthResponse> {
        validate_username(&request.username).map_err(ApiError::BadRequest)?;
        validate_email(&request.email).map_err(ApiError::BadRequest)?;
        validate_password(&request.password).map_err(ApiError::BadRequest)?;

        let password_hash = self.hash(request.password).await?;

        let user = self
            .users
            .create(&NewUser {
                username: request.username,
                email: request.email,
                password_hash,
            })
            .await?;

        info!("User {} registered", user.username);
        self.auth_response(&user)
    }

    /// Check credentials and issue a token.
    ///
    /// Unknown usernames and wrong passwords fail the same way, and both run
    /// one full password verification.
    pub async fn login(&self, request: LoginRequest) -> ApiResult<AuthResponse> {
        let user = self.users.find_by_username(&request.username).await?;

        let stored_hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.passwords.dummy_hash().to_string(),
        };
        let verified = self.verify(request.password, stored_hash).await?;

        match user {
            Some(user) if verified => {
                info!("User {} logged in", user.username);
                self.auth_response(&user)
            }
            Some(user) => {
                warn!("Login failed for user {}: wrong password", user.username);
                Err(ApiError::Unauthorized)
            }
            None => {
                warn!("Login failed for unknown user {}", request.username);
                Err(ApiError::Unauthorized)
            }
        }
    }

    /// Resolve a bearer token to the username it was issued for
    pub fn authenticate(&self, token: &str) -> ApiResult<String> {
        self.jwt
            .validate_token(token)
            .map(|claims| claims.sub)
            .map_err(|e| {
                warn!("Rejected bearer token: {}", e);
                ApiError::Unauthorized
            })
    }

    fn auth_response(&self, user: &User) -> ApiResult<AuthResponse> {
        let access_token = self.jwt.issue_token(&user.username).map_err(|e| {
            error!("Failed to issue token: {}", e);
            ApiError::InternalServerError
        })?;

        Ok(AuthResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.access_token_expiry(),
            user: UserResponse::from(user),
        })
    }

    async fn hash(&self, password: String) -> ApiResult<String> {
        let passwords = self.passwords.clone();

        tokio::task::spawn_blocking(move || passwords.hash_password(&password))
            .await
            .map_err(|e| {
                error!("Password hashing task failed: {}", e);
                ApiError::InternalServerError
            })?
            .map_err(|e| {
                error!("Failed to hash password: {}", e);
                ApiError::InternalServerError
            })
    }

    async fn verify(&self, password: String, password_hash: String) -> ApiResult<bool> {
        let passwords = self.passwords.clone();

        tokio::task::spawn_blocking(move || passwords.verify_password(&password, &password_hash))
            .await
            .map_err(|e| {
                error!("Password verification task failed: {}", e);
                ApiError::InternalServerError
            })?
            .map_err(|e| {
                error!("Stored password hash is unreadable: {}", e);
                ApiError::InternalServerError
            })
    }
}
