//! Error types for the API server.

use analyst_core::{FieldIssue, UpstreamError, ValidationError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::DatabaseError;
use thiserror::Error;

/// Machine-readable code attached to every 429 body.
pub const RATE_LIMIT_CODE: &str = "RATE_LIMIT_EXCEEDED";

/// Errors that can occur while handling a request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Body was not JSON at all.
    #[error("invalid JSON body")]
    InvalidJson,

    /// Body was JSON but broke the request schema.
    #[error("validation failed")]
    Validation(Vec<FieldIssue>),

    /// Our own limiter refused the caller.
    #[error("rate limited")]
    RateLimited,

    /// The upstream completion API failed.
    #[error("upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// `/verify-password` was called without a configured secret.
    #[error("password not configured")]
    PasswordNotConfigured,
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(vec![err.issue()])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::InvalidJson => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": "Invalid JSON body" }),
            ),
            ApiError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": "Validation failed", "details": details }),
            ),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                serde_json::json!({
                    "error": "Too many requests. Please try again later.",
                    "code": RATE_LIMIT_CODE,
                }),
            ),
            ApiError::Upstream(err) => upstream_response(err),
            ApiError::Database(DatabaseError::NotFound { entity, .. }) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({ "error": format!("{} not found", entity) }),
            ),
            ApiError::Database(err) => {
                tracing::error!("Database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": "Internal server error" }),
                )
            }
            ApiError::PasswordNotConfigured => {
                tracing::error!("DEMO_PASSWORD not configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "success": false, "error": "Server configuration error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

fn upstream_response(err: &UpstreamError) -> (StatusCode, serde_json::Value) {
    match err {
        UpstreamError::RateLimited => (
            StatusCode::TOO_MANY_REQUESTS,
            serde_json::json!({ "error": err.user_message(), "code": RATE_LIMIT_CODE }),
        ),
        UpstreamError::CreditsExhausted => (
            StatusCode::PAYMENT_REQUIRED,
            serde_json::json!({ "error": err.user_message() }),
        ),
        other => {
            tracing::error!("AI gateway error: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": other.user_message() }),
            )
        }
    }
}

/// Result type for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
