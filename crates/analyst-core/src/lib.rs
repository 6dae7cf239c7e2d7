//! Core types and protocol pieces for the metrics analyst.
//!
//! This crate holds everything shared between the HTTP server and the chat
//! client:
//!
//! - [`ChatMessage`] / [`Role`] - The conversation entries sent upstream
//! - [`validation`] - Request limits (history length, content size, roles)
//! - [`prompt`] - The analyst system prompt and message assembly
//! - [`SseDecoder`] - Incremental decoder for streamed completion deltas
//! - [`ChatCompletions`] - The seam to an upstream chat-completion provider
//!
//! # Example
//!
//! ```rust
//! use analyst_core::{prompt, ChatMessage, SseDecoder};
//!
//! let history = vec![ChatMessage::user("What is MRR?")];
//! let messages = prompt::assemble_messages(&history, "## Current Business Metrics").unwrap();
//! assert_eq!(messages.len(), 2);
//!
//! let mut decoder = SseDecoder::new();
//! let deltas = decoder.feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"MRR\"}}]}\n");
//! assert_eq!(deltas, vec!["MRR".to_string()]);
//! ```

mod completions;
mod error;
mod message;
pub mod prompt;
pub mod sse;
pub mod validation;

pub use completions::{ByteStream, ChatCompletions};
pub use error::UpstreamError;
pub use message::{ChatMessage, Role};
pub use sse::{DecoderState, SseDecoder};
pub use validation::{FieldIssue, RawMessage, ValidationError};

// Re-export async_trait for implementors
pub use async_trait::async_trait;

/// Text substituted for an assistant reply when the upstream failed before
/// producing any content.
pub const APOLOGY_MESSAGE: &str =
    "I apologize, but I encountered an error processing your request. Please try again.";
