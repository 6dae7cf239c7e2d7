//! The seam to an upstream chat-completion provider.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::error::UpstreamError;
use crate::message::ChatMessage;

/// Raw body of a streaming completion, chunked as it was read off the wire.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, UpstreamError>> + Send>>;

/// A chat-completion provider.
///
/// Implementations resolve [`ChatCompletions::stream`] only once the provider
/// has answered with a success status; status failures (429, 402, ...) come
/// back as errors before any body is read.
///
/// # Example
///
/// ```ignore
/// use analyst_core::{async_trait, ByteStream, ChatCompletions, ChatMessage, UpstreamError};
///
/// struct Canned;
///
/// #[async_trait]
/// impl ChatCompletions for Canned {
///     async fn stream(&self, _messages: Vec<ChatMessage>) -> Result<ByteStream, UpstreamError> {
///         Err(UpstreamError::RateLimited)
///     }
///
///     async fn complete(
///         &self,
///         _messages: Vec<ChatMessage>,
///         _max_tokens: Option<u32>,
///     ) -> Result<String, UpstreamError> {
///         Ok("Revenue Overview".to_string())
///     }
///
///     fn name(&self) -> &str {
///         "Canned"
///     }
/// }
/// ```
#[async_trait]
pub trait ChatCompletions: Send + Sync {
    /// Open a streaming completion and hand back the raw event-stream body.
    async fn stream(&self, messages: Vec<ChatMessage>) -> Result<ByteStream, UpstreamError>;

    /// Run a non-streaming completion and return the first choice's text.
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        max_tokens: Option<u32>,
    ) -> Result<String, UpstreamError>;

    /// Provider name for logs.
    fn name(&self) -> &str;
}
