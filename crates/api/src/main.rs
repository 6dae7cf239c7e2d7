//! Metrics analyst API server.

use std::sync::Arc;

use api::{AppState, Config, RateLimiter};
use database::Database;
use gateway_client::GatewayClient;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting analyst API server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    if config.seed_demo_data {
        database::demo::seed_demo_data(db.pool()).await?;
    }

    // Upstream gateway
    let gateway = GatewayClient::from_env()?;

    // Build application state
    let limiter = RateLimiter::new(db.pool().clone(), config.rate_limit_policy);
    let state = AppState::new(db, Arc::new(gateway), limiter, config.demo_password.clone());

    let app = api::app(state);

    // Start server
    info!(addr = %config.addr, "Analyst API server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
