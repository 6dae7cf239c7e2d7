//! Client for the OpenAI-compatible AI gateway.
//!
//! [`GatewayClient`] implements [`analyst_core::ChatCompletions`]: streaming
//! calls hand back the raw `text/event-stream` body as a byte stream, and
//! one-shot calls return the first choice's text. Gateway status failures are
//! mapped onto [`analyst_core::UpstreamError`], with 429 and 402 kept distinct.
//!
//! # Usage
//!
//! ```rust,no_run
//! use analyst_core::{ChatCompletions, ChatMessage};
//! use gateway_client::GatewayClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GatewayClient::from_env()?;
//!     let title = client
//!         .complete(vec![ChatMessage::user("Name this chat: What is MRR?")], Some(20))
//!         .await?;
//!     println!("{}", title);
//!     Ok(())
//! }
//! ```

mod api_types;
mod client;
mod config;

pub use client::GatewayClient;
pub use config::{GatewayConfig, GatewayConfigBuilder, DEFAULT_API_URL, DEFAULT_MODEL};
