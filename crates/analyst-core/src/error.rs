//! Error types for upstream completion calls.

use thiserror::Error;

/// Errors that can occur while talking to a chat-completion provider.
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    /// Provider answered 429.
    #[error("upstream rate limit exceeded")]
    RateLimited,

    /// Provider answered 402.
    #[error("upstream credits exhausted")]
    CreditsExhausted,

    /// Any other non-success status.
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection failed or the body stream broke.
    #[error("network error: {0}")]
    Network(String),

    /// Response body could not be understood.
    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),

    /// Client could not be configured.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl UpstreamError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        match status {
            429 => UpstreamError::RateLimited,
            402 => UpstreamError::CreditsExhausted,
            _ => UpstreamError::Status {
                status,
                body: body.into(),
            },
        }
    }

    /// Short text suitable for showing to an end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            UpstreamError::RateLimited => "Rate limit exceeded. Please try again in a moment.",
            UpstreamError::CreditsExhausted => "Usage limit reached. Please check your AI credits.",
            _ => "AI service temporarily unavailable",
        }
    }
}
