//! Error types for analyst-session.

use analyst_core::{UpstreamError, ValidationError};
use database::DatabaseError;
use thiserror::Error;

/// Errors surfaced by [`ChatSession`](crate::ChatSession) and its client.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A reply is still streaming for this session.
    #[error("a reply is already in progress")]
    Busy,

    /// The session was closed; call `open()` first.
    #[error("session is closed")]
    Closed,

    /// The operation needs a database but the session has none.
    #[error("persistence is not enabled for this session")]
    PersistenceDisabled,

    /// Message rejected before anything was sent.
    #[error("invalid message: {0}")]
    Validation(#[from] ValidationError),

    /// Analyst API failure.
    #[error("analyst service error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Local store failure.
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
