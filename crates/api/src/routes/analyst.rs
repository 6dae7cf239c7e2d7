//! Streaming analyst chat.

use analyst_core::validation::parse_history;
use analyst_core::{prompt, RawMessage};
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::info;

use crate::client_ip::client_ip;
use crate::error::{ApiError, Result};
use crate::rate_limit::AI_ANALYST;
use crate::snapshot::build_snapshot;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalystRequest {
    #[serde(default)]
    pub messages: Vec<RawMessage>,
}

/// Relay an upstream completion stream for the given history.
///
/// The upstream event stream is passed through byte for byte; only the
/// status line and headers are ours.
pub async fn ai_analyst(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let caller = client_ip(&headers);
    if !state.limiter.check(&caller, AI_ANALYST).await {
        return Err(ApiError::RateLimited);
    }

    let request: AnalystRequest = super::parse_json(&body)?;
    let history = parse_history(request.messages)?;

    let snapshot = build_snapshot(state.db.pool()).await;
    let messages = prompt::assemble_messages(&history, &snapshot)?;
    let fingerprint = messages
        .first()
        .map(|system| prompt::hash_prompt(&system.content))
        .unwrap_or_default();

    info!(
        history = history.len(),
        prompt = %fingerprint,
        provider = state.completions.name(),
        "Streaming analyst reply"
    );
    let upstream = state.completions.stream(messages).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(upstream),
    )
        .into_response())
}
