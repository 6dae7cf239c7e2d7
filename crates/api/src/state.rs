//! Application state shared across handlers.

use std::sync::Arc;

use analyst_core::ChatCompletions;
use database::Database;

use crate::rate_limit::RateLimiter;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Upstream chat-completion provider.
    pub completions: Arc<dyn ChatCompletions>,
    /// Per-caller request budgets.
    pub limiter: RateLimiter,
    /// Shared secret for `/verify-password`.
    pub demo_password: Option<Arc<str>>,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        db: Database,
        completions: Arc<dyn ChatCompletions>,
        limiter: RateLimiter,
        demo_password: Option<String>,
    ) -> Self {
        Self {
            db,
            completions,
            limiter,
            demo_password: demo_password.map(Arc::from),
        }
    }
}
