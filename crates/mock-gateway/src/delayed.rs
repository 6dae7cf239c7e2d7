//! Delayed provider - wraps another provider with artificial delay.

use std::time::Duration;

use analyst_core::{async_trait, ByteStream, ChatCompletions, ChatMessage, UpstreamError};
use tokio::time::sleep;

/// A provider that wraps another provider and delays every call.
///
/// Useful for testing cancellation and simulating slow upstream responses.
pub struct DelayedGateway<G: ChatCompletions> {
    inner: G,
    delay: Duration,
}

impl<G: ChatCompletions> DelayedGateway<G> {
    /// Wrap `inner`, delaying each call by `delay`.
    pub fn new(inner: G, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// Create a provider with a delay in milliseconds.
    pub fn with_millis(inner: G, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }

    /// The wrapped provider.
    pub fn inner(&self) -> &G {
        &self.inner
    }
}

#[async_trait]
impl<G: ChatCompletions> ChatCompletions for DelayedGateway<G> {
    async fn stream(&self, messages: Vec<ChatMessage>) -> Result<ByteStream, UpstreamError> {
        sleep(self.delay).await;
        self.inner.stream(messages).await
    }

    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        max_tokens: Option<u32>,
    ) -> Result<String, UpstreamError> {
        sleep(self.delay).await;
        self.inner.complete(messages, max_tokens).await
    }

    fn name(&self) -> &str {
        "DelayedGateway"
    }
}
