//! Loan Management API - Main Application Entry Point
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Hash the configured API keys
//! 3. Create database connection pool
//! 4. Run database migrations
//! 5. Build HTTP router with routes and middleware
//! 6. Start server on configured port

use std::sync::Arc;

use loan_api::{config, db, models::api_key::ApiKeyRegistry};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads RUST_LOG (defaults to "info")
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;
    tracing::info!(?config, "Configuration loaded");

    let api_keys = ApiKeyRegistry::from_entries(&config.api_keys);
    if api_keys.is_empty() {
        anyhow::bail!("API_KEYS must contain at least one key");
    }
    tracing::info!(count = api_keys.len(), "API keys registered");

    let pool = db::create_pool(&config.database_url, config.database_max_connections).await?;
    tracing::info!("Database pool created");

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let app = loan_api::build_router(pool, Arc::new(api_keys));

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
