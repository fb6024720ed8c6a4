//! Vaidya - Ayurvedic wellness chat assistant library
//!
//! This library provides chat-session persistence for a wellness assistant:
//! sessions with derived titles and message counts, an append-only log of
//! question/answer pairs, transcripts and a recency-ordered history, plus
//! the language model plumbing that produces the answers.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Session store, message log, metadata, transcripts and history
//! - `storage`: Document store trait with SQLite and in-memory backends
//! - `assistant`: Chat turn service tying a provider to the session layer
//! - `providers`: Language model providers (Gemini, Ollama)
//! - `prompts`: System prompt, prompt composition and suggestions
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli` and `commands`: Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use vaidya::{ChatHistory, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let store = vaidya::storage::open_store(&config.storage)?;
//!     let history = ChatHistory::new(store);
//!     for session in history.list_sessions(&config.identity.owner_id).await? {
//!         println!("{} {}", session.id, session.title);
//!     }
//!     Ok(())
//! }
//! ```

pub mod assistant;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod prompts;
pub mod providers;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use assistant::{Assistant, ChatTurn};
pub use config::Config;
pub use error::{Result, UpstreamKind, VaidyaError};
pub use session::ChatHistory;
pub use storage::{DocumentStore, MessagePair, Session};

#[cfg(test)]
pub mod test_utils;
