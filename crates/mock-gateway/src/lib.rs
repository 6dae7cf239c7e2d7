//! Mock chat-completion providers for the metrics analyst.
//!
//! This crate provides [`ChatCompletions`] implementations for testing:
//! - `ScriptedGateway` - Replays a fixed event stream or failure
//! - `EchoGateway` - Streams the last user message back in small chunks
//! - `DelayedGateway` - Wraps another provider with artificial delay
//!
//! For production traffic, use the `gateway-client` crate instead.
//!
//! # Example
//!
//! ```rust
//! use mock_gateway::{ChatCompletions, ChatMessage, ScriptedGateway};
//!
//! #[tokio::main]
//! async fn main() {
//!     let gateway = ScriptedGateway::with_deltas(&["MRR ", "is up"]);
//!     let stream = gateway.stream(vec![ChatMessage::user("What is MRR?")]).await;
//!     assert!(stream.is_ok());
//!     assert_eq!(gateway.stream_calls().len(), 1);
//! }
//! ```

mod delayed;
mod echo;
mod scripted;

pub use analyst_core::{async_trait, ByteStream, ChatCompletions, ChatMessage, UpstreamError};

pub use delayed::DelayedGateway;
pub use echo::EchoGateway;
pub use scripted::{byte_stream, sse_body, split_every, ScriptedGateway, StreamScript};
