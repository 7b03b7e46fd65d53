use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
mod jwt;
mod middleware;
mod models;
mod password;
mod repositories;
mod routes;
mod services;
mod settings;
mod state;
mod validation;

use common::database::{DatabaseConfig, init_pool, run_migrations};
use tokio::net::TcpListener;

use crate::{
    jwt::JwtService, password::PasswordService, repositories::PgStore, settings::Settings,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting API service");

    let settings = Settings::from_env().context("Failed to load settings")?;
    let jwt_service = JwtService::new(settings.jwt_config()?);
    let password_service = PasswordService::new(settings.password_config())
        .map_err(|e| anyhow::anyhow!("Invalid password hashing parameters: {}", e))?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool, &sqlx::migrate!("./migrations")).await?;

    let app_state = AppState::new(PgStore::new(pool), jwt_service, password_service);

    let cors = routes::cors_layer(settings.cors_allowed_origin.as_deref())
        .context("Invalid CORS_ALLOWED_ORIGIN")?;

    // Start the web server
    let app = routes::create_router(app_state, cors);

    let address = settings.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("API service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
