//! Route handlers for the analyst API.

pub mod analyst;
pub mod conversations;
pub mod health;
pub mod insight;
pub mod password;
pub mod title;

use axum::body::Bytes;
use axum::routing::{delete, get, post};
use axum::Router;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Analyst endpoints
        .route("/ai-analyst", post(analyst::ai_analyst))
        .route("/generate-insight", post(insight::generate_insight))
        .route("/generate-title", post(title::generate_title))
        .route("/verify-password", post(password::verify_password))
        // Saved conversations
        .route("/conversations", get(conversations::list))
        .route("/conversations/:id", delete(conversations::delete))
        .route("/conversations/:id/messages", get(conversations::messages))
        // Health check
        .route("/health", get(health::health))
}

/// Decode a JSON body in two steps so syntax errors and schema errors are
/// reported differently.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|_| ApiError::InvalidJson)?;

    serde_json::from_value(value).map_err(|e| {
        ApiError::Validation(vec![analyst_core::FieldIssue {
            field: "body".to_string(),
            message: e.to_string(),
        }])
    })
}
