//! JWT service for bearer token issuance and validation
//!
//! Tokens are HS256 signed with a server-held secret and carry the username
//! as subject. They are verified without touching the database and cannot be
//! revoked before they expire.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Shortest accepted signing secret, in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Longest accepted token lifetime, one year
pub const MAX_EXPIRY_SECONDS: u64 = 365 * 24 * 60 * 60;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Symmetric signing secret
    pub secret: String,
    /// Access token lifetime in seconds (default: 24 hours)
    pub access_token_expiry: u64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, access_token_expiry: u64) -> Result<Self, TokenError> {
        let secret = secret.into();

        if secret.len() < MIN_SECRET_LEN {
            return Err(TokenError::Configuration(format!(
                "JWT secret must be at least {} bytes long",
                MIN_SECRET_LEN
            )));
        }

        if access_token_expiry == 0 || access_token_expiry > MAX_EXPIRY_SECONDS {
            return Err(TokenError::Configuration(format!(
                "JWT expiry must be between 1 and {} seconds",
                MAX_EXPIRY_SECONDS
            )));
        }

        Ok(Self {
            secret,
            access_token_expiry,
        })
    }
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub sub: String,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// Token failures
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("failed to sign token: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),

    #[error("system clock is before the unix epoch")]
    Clock,

    #[error("invalid JWT configuration: {0}")]
    Configuration(String),
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared against the caller's clock in `validate_token_at`
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key,
            decoding_key,
            validation,
            config,
        }
    }

    /// Issue an access token for `username`
    pub fn issue_token(&self, username: &str) -> Result<String, TokenError> {
        self.issue_token_at(username, now()?)
    }

    /// Issue an access token as if the current time were `now` (unix seconds)
    pub fn issue_token_at(&self, username: &str, now: u64) -> Result<String, TokenError> {
        let exp = now
            .checked_add(self.config.access_token_expiry)
            .ok_or_else(|| TokenError::Configuration("token expiry overflows".to_string()))?;

        let claims = Claims {
            sub: username.to_string(),
            iat: now,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Encoding)
    }

    /// Validate a token and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_token_at(token, now()?)
    }

    /// Validate a token against the clock value `now` (unix seconds).
    /// A token is expired from the second `exp` onwards.
    pub fn validate_token_at(&self, token: &str, now: u64) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(TokenError::Invalid)?
            .claims;

        if now >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// Get the access token expiry time
    pub fn access_token_expiry(&self) -> u64 {
        self.config.access_token_expiry
    }
}

fn now() -> Result<u64, TokenError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| TokenError::Clock)
}
