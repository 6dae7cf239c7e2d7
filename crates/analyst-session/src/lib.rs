//! Client side of the metrics analyst.
//!
//! - [`AnalystClient`] - HTTP client for the analyst API
//! - [`relay_stream`] - Decodes a streamed reply and republishes its deltas
//! - [`ChatSession`] - One chat at a time with best-effort persistence
//! - [`group_by_date`] - Buckets stored conversations by recency
//!
//! # Example
//!
//! ```no_run
//! use analyst_session::{AnalystClient, ChatSession, SessionConfig};
//! use database::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite:analyst.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let client = AnalystClient::new(SessionConfig::new("http://127.0.0.1:8790"))?;
//!     let mut session = ChatSession::with_database(client, db);
//!     session.open();
//!
//!     let outcome = session
//!         .send_message("What is MRR?", |delta| print!("{}", delta))
//!         .await?;
//!     println!("\nstored under {:?}", outcome.conversation_id);
//!     Ok(())
//! }
//! ```

mod client;
pub mod config;
mod error;
pub mod grouping;
pub mod relay;
mod service;
mod session;

pub use client::AnalystClient;
pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use grouping::{group_by_date, group_by_date_at, DateGroups};
pub use relay::{relay_stream, Relayed};
pub use service::AnalystService;
pub use session::{ChatSession, TurnOutcome};
