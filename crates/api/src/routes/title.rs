//! Short conversation titles.

use analyst_core::prompt::TITLE_SYSTEM_PROMPT;
use analyst_core::validation::validate_title_source;
use analyst_core::ChatMessage;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::client_ip::client_ip;
use crate::error::{ApiError, Result};
use crate::rate_limit::GENERATE_TITLE;
use crate::state::AppState;

/// Longest title returned.
pub const MAX_TITLE_CHARS: usize = 30;

/// Characters of the message used when no model title is available.
pub const FALLBACK_CHARS: usize = 25;

/// Token budget for the title completion.
pub const TITLE_MAX_TOKENS: u32 = 20;

#[derive(Debug, Deserialize)]
pub struct TitleRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct TitleResponse {
    pub title: String,
}

/// Name a conversation from its first message.
///
/// Upstream failures never surface; the message itself is truncated instead.
pub async fn generate_title(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TitleResponse>> {
    let caller = client_ip(&headers);
    if !state.limiter.check(&caller, GENERATE_TITLE).await {
        return Err(ApiError::RateLimited);
    }

    let request: TitleRequest = super::parse_json(&body)?;
    validate_title_source(&request.message)?;

    let messages = vec![
        ChatMessage::system(TITLE_SYSTEM_PROMPT),
        ChatMessage::user(request.message.clone()),
    ];

    let title = match state
        .completions
        .complete(messages, Some(TITLE_MAX_TOKENS))
        .await
    {
        Ok(reply) => tidy_title(&reply, &request.message),
        Err(e) => {
            warn!("Title generation failed, using truncated message: {}", e);
            fallback_title(&request.message)
        }
    };

    Ok(Json(TitleResponse { title }))
}

/// Clean a model reply into a title.
pub fn tidy_title(reply: &str, message: &str) -> String {
    let trimmed = reply.trim();
    let raw = if trimmed.is_empty() {
        message.chars().take(FALLBACK_CHARS).collect::<String>()
    } else {
        trimmed.to_string()
    };

    let unquoted = raw.strip_prefix(['"', '\'']).unwrap_or(&raw);
    let unquoted = unquoted.strip_suffix(['"', '\'']).unwrap_or(unquoted).trim();

    if unquoted.chars().count() > MAX_TITLE_CHARS {
        let head: String = unquoted.chars().take(MAX_TITLE_CHARS - 3).collect();
        format!("{}...", head)
    } else {
        unquoted.to_string()
    }
}

/// Title built from the message alone.
pub fn fallback_title(message: &str) -> String {
    let head: String = message.chars().take(FALLBACK_CHARS).collect();
    if message.chars().count() > FALLBACK_CHARS {
        format!("{}...", head.trim())
    } else {
        head.trim().to_string()
    }
}
