//! Chatshelf - local chat session manager library
//!
//! This library keeps a collection of conversation threads, persists them
//! across restarts, and derives the views a chat sidebar needs from them.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Threads, messages, and the `SessionStore` that owns them
//! - `storage`: The thread codec and its backends (SQLite, sled, file, memory)
//! - `presentation`: Recency grouping, relative time labels, title inference
//! - `responder`: The reply source seam and the user/assistant exchange
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli` / `commands`: Command-line interface and handlers
//!
//! # Example
//!
//! ```no_run
//! use chatshelf::{Config, SessionStore};
//! use chatshelf::session::Message;
//! use chatshelf::storage::open_codec;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let mut store = SessionStore::new(open_codec(&config.storage)?, config.session.clone());
//!     store.init();
//!
//!     let id = store.create_thread()?;
//!     store.append_message(&id, Message::user("What is a prime number?"))?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod presentation;
pub mod responder;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use error::{ChatshelfError, Result};
pub use presentation::{group_by_recency, infer_title, relative_label, RecencyBucket};
pub use responder::{EchoSource, MessageSource};
pub use session::{Message, Role, SessionStore, Thread, ThreadPatch, Timestamp};
pub use storage::{StateBackend, StorageError, ThreadCodec};

#[cfg(test)]
pub mod test_utils;
