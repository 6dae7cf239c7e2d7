//! The seam between a chat session and the analyst backend.

use analyst_core::{async_trait, ByteStream, ChatMessage, UpstreamError};

/// Backend a [`ChatSession`](crate::ChatSession) talks to.
///
/// [`AnalystClient`](crate::AnalystClient) implements this over HTTP; tests
/// plug in an in-process implementation.
#[async_trait]
pub trait AnalystService: Send + Sync {
    /// Start a streamed reply for the given history.
    ///
    /// Resolves once the backend has accepted the request; the returned body
    /// is the raw event stream.
    async fn stream_reply(&self, history: &[ChatMessage]) -> Result<ByteStream, UpstreamError>;

    /// Ask for a short conversation title based on its first message.
    async fn generate_title(&self, message: &str) -> Result<String, UpstreamError>;
}
