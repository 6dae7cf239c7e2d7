//! Echo provider - streams the last user message back.

use analyst_core::{async_trait, ByteStream, ChatCompletions, ChatMessage, Role, UpstreamError};
use bytes::Bytes;

use crate::scripted::{byte_stream, sse_body};

/// A provider that answers with the caller's own last user message.
///
/// The reply is streamed as one delta per word. Useful for exercising the
/// whole relay path without any AI processing.
#[derive(Debug, Clone, Default)]
pub struct EchoGateway {
    /// Optional prefix to add before the echo.
    prefix: Option<String>,
}

impl EchoGateway {
    /// Create a new EchoGateway with no prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new EchoGateway with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    fn reply_for(&self, messages: &[ChatMessage]) -> String {
        let last = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, last),
            None => last.to_string(),
        }
    }
}

#[async_trait]
impl ChatCompletions for EchoGateway {
    async fn stream(&self, messages: Vec<ChatMessage>) -> Result<ByteStream, UpstreamError> {
        let reply = self.reply_for(&messages);
        let words: Vec<&str> = reply.split_inclusive(' ').collect();
        Ok(byte_stream(vec![Bytes::from(sse_body(&words))], None))
    }

    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        _max_tokens: Option<u32>,
    ) -> Result<String, UpstreamError> {
        Ok(self.reply_for(&messages))
    }

    fn name(&self) -> &str {
        "EchoGateway"
    }
}
