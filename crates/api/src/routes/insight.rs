//! One-line dashboard insight.

use std::sync::LazyLock;

use analyst_core::prompt::INSIGHT_SYSTEM_PROMPT;
use analyst_core::ChatMessage;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use regex::Regex;
use serde::Serialize;

use crate::client_ip::client_ip;
use crate::error::{ApiError, Result};
use crate::rate_limit::GENERATE_INSIGHT;
use crate::snapshot::MetricsSnapshot;
use crate::state::AppState;

static PERCENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?%").expect("percent pattern is valid"));

static DOLLARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$[\d,]+(?:\.\d{2})?").expect("dollar pattern is valid"));

#[derive(Debug, Serialize)]
pub struct InsightResponse {
    pub insight: String,
    #[serde(rename = "highlightValue")]
    pub highlight_value: Option<String>,
}

/// Ask the upstream for a single short insight over current metrics.
pub async fn generate_insight(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<InsightResponse>> {
    let caller = client_ip(&headers);
    if !state.limiter.check(&caller, GENERATE_INSIGHT).await {
        return Err(ApiError::RateLimited);
    }

    let context = MetricsSnapshot::fetch(state.db.pool())
        .await
        .insight_context();

    let messages = vec![
        ChatMessage::system(INSIGHT_SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "Based on these metrics, provide a key business insight:\n\n{}",
            context
        )),
    ];

    let insight = state.completions.complete(messages, None).await?;
    let highlight_value = highlight_value(&insight);

    Ok(Json(InsightResponse {
        insight,
        highlight_value,
    }))
}

/// First percentage in the text, else the first dollar amount.
pub fn highlight_value(insight: &str) -> Option<String> {
    PERCENT
        .find(insight)
        .or_else(|| DOLLARS.find(insight))
        .map(|m| m.as_str().to_string())
}
