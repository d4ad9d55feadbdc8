//! Error types for Chatshelf
//!
//! This module defines the error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Chatshelf operations
///
/// Covers configuration loading, storage backends, session lifecycle
/// violations, and the interactive shell.
#[derive(Error, Debug)]
pub enum ChatshelfError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Thread storage errors (backend open, read, write)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Session lookup errors (unknown or ambiguous thread ids)
    #[error("Session error: {0}")]
    Session(String),

    /// A mutating operation was issued before the session finished loading
    #[error("Session is not initialized; call init() before mutating it")]
    NotInitialized,

    /// Message source failures
    #[error("Responder error: {0}")]
    Responder(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// SQLite backend errors
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// sled backend errors
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Line editor errors in interactive mode
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

/// Result type alias for Chatshelf operations
///
/// Uses `anyhow::Error` so callers can attach context while propagating.
pub type Result<T> = anyhow::Result<T>;
