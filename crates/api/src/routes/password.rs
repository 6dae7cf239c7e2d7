//! Shared-password access check.

use analyst_core::validation::validate_password;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::client_ip::client_ip;
use crate::error::{ApiError, Result};
use crate::rate_limit::VERIFY_PASSWORD;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct PasswordResponse {
    pub success: bool,
}

/// Compare a password attempt with the configured secret.
pub async fn verify_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PasswordResponse>> {
    let caller = client_ip(&headers);
    if !state.limiter.check(&caller, VERIFY_PASSWORD).await {
        return Err(ApiError::RateLimited);
    }

    let request: PasswordRequest = super::parse_json(&body)?;
    validate_password(&request.password)?;

    let Some(expected) = state.demo_password.as_deref() else {
        return Err(ApiError::PasswordNotConfigured);
    };

    let success = digests_match(&request.password, expected);
    info!(caller = %caller, success, "Password attempt");

    Ok(Json(PasswordResponse { success }))
}

/// Compare two secrets by their SHA-256 digests.
fn digests_match(attempt: &str, expected: &str) -> bool {
    let attempt = Sha256::digest(attempt.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    attempt
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
