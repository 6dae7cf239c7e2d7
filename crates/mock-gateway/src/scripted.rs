//! Scripted provider - replays a fixed stream or failure.

use std::sync::Mutex;

use analyst_core::sse::{delta_event, done_event};
use analyst_core::{async_trait, ByteStream, ChatCompletions, ChatMessage, UpstreamError};
use bytes::Bytes;

/// What a streaming call does.
#[derive(Debug, Clone)]
pub enum StreamScript {
    /// Yield these chunks, then end.
    Chunks(Vec<Bytes>),
    /// Fail before any body is produced.
    Fail(UpstreamError),
    /// Yield these chunks, then fail mid-stream.
    ChunksThenError(Vec<Bytes>, UpstreamError),
}

/// A provider with a fixed streaming script and a fixed one-shot reply.
///
/// Every call is recorded so tests can inspect what was sent upstream.
#[derive(Debug)]
pub struct ScriptedGateway {
    stream_script: StreamScript,
    completion: Result<String, UpstreamError>,
    stream_calls: Mutex<Vec<Vec<ChatMessage>>>,
    complete_calls: Mutex<Vec<(Vec<ChatMessage>, Option<u32>)>>,
}

impl ScriptedGateway {
    /// Create a provider from explicit scripts.
    pub fn new(stream_script: StreamScript, completion: Result<String, UpstreamError>) -> Self {
        Self {
            stream_script,
            completion,
            stream_calls: Mutex::new(Vec::new()),
            complete_calls: Mutex::new(Vec::new()),
        }
    }

    /// Stream the given deltas as one well-formed event body.
    pub fn with_deltas(deltas: &[&str]) -> Self {
        Self::new(
            StreamScript::Chunks(vec![Bytes::from(sse_body(deltas))]),
            Ok(deltas.concat()),
        )
    }

    /// Stream pre-cut chunks verbatim.
    pub fn with_chunks(chunks: Vec<Bytes>) -> Self {
        Self::new(StreamScript::Chunks(chunks), Ok(String::new()))
    }

    /// Fail every call with the same error.
    pub fn failing(error: UpstreamError) -> Self {
        Self::new(StreamScript::Fail(error.clone()), Err(error))
    }

    /// Replace the one-shot reply.
    pub fn with_completion(mut self, completion: Result<String, UpstreamError>) -> Self {
        self.completion = completion;
        self
    }

    /// Messages received by each streaming call.
    pub fn stream_calls(&self) -> Vec<Vec<ChatMessage>> {
        self.stream_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Messages and `max_tokens` received by each one-shot call.
    pub fn complete_calls(&self) -> Vec<(Vec<ChatMessage>, Option<u32>)> {
        self.complete_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatCompletions for ScriptedGateway {
    async fn stream(&self, messages: Vec<ChatMessage>) -> Result<ByteStream, UpstreamError> {
        if let Ok(mut calls) = self.stream_calls.lock() {
            calls.push(messages);
        }

        match &self.stream_script {
            StreamScript::Chunks(chunks) => Ok(byte_stream(chunks.clone(), None)),
            StreamScript::Fail(error) => Err(error.clone()),
            StreamScript::ChunksThenError(chunks, error) => {
                Ok(byte_stream(chunks.clone(), Some(error.clone())))
            }
        }
    }

    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        max_tokens: Option<u32>,
    ) -> Result<String, UpstreamError> {
        if let Ok(mut calls) = self.complete_calls.lock() {
            calls.push((messages, max_tokens));
        }
        self.completion.clone()
    }

    fn name(&self) -> &str {
        "ScriptedGateway"
    }
}

/// Turn chunks (and an optional trailing error) into a [`ByteStream`].
pub fn byte_stream(chunks: Vec<Bytes>, trailing_error: Option<UpstreamError>) -> ByteStream {
    let items = chunks
        .into_iter()
        .map(Ok)
        .chain(trailing_error.into_iter().map(Err));
    Box::pin(futures::stream::iter(items))
}

/// A complete event body: one event per delta followed by `[DONE]`.
pub fn sse_body(deltas: &[&str]) -> String {
    let mut body: String = deltas.iter().map(|delta| delta_event(delta)).collect();
    body.push_str(&done_event());
    body
}

/// Cut a body into chunks of at most `size` bytes, ignoring char boundaries.
pub fn split_every(body: &str, size: usize) -> Vec<Bytes> {
    body.as_bytes()
        .chunks(size.max(1))
        .map(Bytes::copy_from_slice)
        .collect()
}
