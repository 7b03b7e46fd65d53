//! Service settings loaded from the environment

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

use crate::{jwt::JwtConfig, password::PasswordConfig};

/// Runtime settings of the API service.
///
/// Every field maps to the upper-cased environment variable of the same
/// name, e.g. `jwt_secret` is read from `JWT_SECRET`.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// HS256 signing secret, no default
    pub jwt_secret: String,
    pub jwt_expiry_seconds: u64,
    pub password_memory_kib: u32,
    pub password_iterations: u32,
    pub password_parallelism: u32,
    /// Browser origin allowed by CORS; any origin when unset
    pub cors_allowed_origin: Option<String>,
}

impl Settings {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(Environment::default())
    }

    fn load(environment: Environment) -> Result<Self, ConfigError> {
        let defaults = PasswordConfig::default();

        Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 9000)?
            .set_default("jwt_expiry_seconds", 86_400)?
            .set_default("password_memory_kib", i64::from(defaults.memory_kib))?
            .set_default("password_iterations", i64::from(defaults.iterations))?
            .set_default("password_parallelism", i64::from(defaults.parallelism))?
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    /// Load settings from an explicit variable map instead of the environment
    #[cfg(test)]
    pub fn from_map(vars: config::Map<String, String>) -> Result<Self, ConfigError> {
        Self::load(Environment::default().source(Some(vars)))
    }

    pub fn jwt_config(&self) -> Result<JwtConfig, crate::jwt::TokenError> {
        JwtConfig::new(self.jwt_secret.clone(), self.jwt_expiry_seconds)
    }

    pub fn password_config(&self) -> PasswordConfig {
        PasswordConfig {
            memory_kib: self.password_memory_kib,
            iterations: self.password_iterations,
            parallelism: self.password_parallelism,
        }
    }

    /// Socket address to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
