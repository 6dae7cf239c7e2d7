//! HTTP API for the metrics analyst.
//!
//! Serves the streaming analyst chat (`/ai-analyst`), the dashboard insight
//! (`/generate-insight`), conversation titles (`/generate-title`) and the
//! shared-password check (`/verify-password`), plus read/delete routes for
//! saved conversations. Every paid endpoint is rate limited per caller before
//! any snapshot or upstream work happens.

pub mod client_ip;
pub mod config;
pub mod error;
pub mod rate_limit;
pub mod routes;
pub mod snapshot;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::CorsLayer;

pub use config::{Config, ConfigError};
pub use error::ApiError;
pub use rate_limit::{FailurePolicy, RateLimiter};
pub use state::AppState;

/// Largest accepted request body. A full history of multibyte text can
/// exceed axum's 2 MiB default.
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Build the complete application.
pub fn app(state: AppState) -> Router {
    routes::router()
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
