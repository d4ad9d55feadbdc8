//! Durable storage for the thread collection
//!
//! The whole collection lives in a single named record. A [`StateBackend`]
//! knows how to read and overwrite that record as raw bytes; the
//! [`ThreadCodec`] turns the bytes into typed threads and back. Backends
//! never interpret the bytes, so a record that is not even valid UTF-8
//! still reaches the codec and can be archived intact.

use crate::config::{BackendKind, StorageConfig};
use crate::error::Result;
use thiserror::Error;

pub mod codec;
pub mod file;
pub mod memory;
pub mod sled_backend;
pub mod sqlite;

pub use codec::{decode, encode, ThreadCodec};
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use sled_backend::SledBackend;
pub use sqlite::SqliteBackend;

/// Failures raised below the session layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// The record exists but does not decode into a thread collection
    #[error("Stored record '{key}' is corrupt: {reason}")]
    Corrupt { key: String, reason: String },

    /// The in-memory collection could not be serialized
    #[error("Failed to encode threads for record '{key}': {reason}")]
    Encode { key: String, reason: String },

    /// The backend itself failed to read or write
    #[error("Storage backend '{backend}' failed: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },
}

impl StorageError {
    pub(crate) fn backend(backend: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Backend {
            backend,
            message: err.to_string(),
        }
    }
}

/// A place that holds named byte records
///
/// Writes are full overwrites of a single record. Reading a record that was
/// never written yields `Ok(None)`.
pub trait StateBackend: Send {
    /// Short backend name used in logs and errors
    fn name(&self) -> &'static str;

    /// Read the record stored under `key`
    fn read(&self, key: &str) -> std::result::Result<Option<Vec<u8>>, StorageError>;

    /// Replace the record stored under `key`
    fn write(&self, key: &str, blob: &[u8]) -> std::result::Result<(), StorageError>;
}

/// Open the backend selected by configuration
///
/// # Errors
///
/// Returns an error if the backend location cannot be created or opened.
pub fn open_backend(config: &StorageConfig) -> Result<Box<dyn StateBackend>> {
    let backend: Box<dyn StateBackend> = match config.backend {
        BackendKind::Sqlite => Box::new(SqliteBackend::new_with_path(
            config.resolved_path()?.join("threads.db"),
        )?),
        BackendKind::Sled => Box::new(SledBackend::new(config.resolved_path()?.join("threads.sled"))?),
        BackendKind::File => Box::new(FileBackend::new(config.resolved_path()?)?),
        BackendKind::Memory => Box::new(MemoryBackend::new()),
    };
    tracing::debug!(backend = backend.name(), "Opened storage backend");
    Ok(backend)
}

/// Open the configured backend and wrap it in a codec for the configured record
pub fn open_codec(config: &StorageConfig) -> Result<ThreadCodec> {
    let backend = open_backend(config)?;
    Ok(ThreadCodec::new(backend, config.record_key.clone()).with_backup_corrupt(config.backup_corrupt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn storage_config(backend: BackendKind, dir: &std::path::Path) -> StorageConfig {
        StorageConfig {
            backend,
            path: Some(dir.to_path_buf()),
            ..StorageConfig::default()
        }
    }

    #[test]
    fn test_open_backend_for_each_kind() {
        let dir = tempdir().expect("failed to create tempdir");
        for (kind, name) in [
            (BackendKind::Sqlite, "sqlite"),
            (BackendKind::Sled, "sled"),
            (BackendKind::File, "file"),
            (BackendKind::Memory, "memory"),
        ] {
            let backend = open_backend(&storage_config(kind, dir.path())).expect("open failed");
            assert_eq!(backend.name(), name);
        }
    }

    #[test]
    fn test_open_codec_round_trips_through_sqlite() {
        let dir = tempdir().expect("failed to create tempdir");
        let codec = open_codec(&storage_config(BackendKind::Sqlite, dir.path())).expect("open failed");

        assert!(codec.load().expect("load failed").is_none());

        let mut thread = crate::session::Thread::new("Saved");
        thread.push(crate::session::Message::user("hello"));
        codec.save(std::slice::from_ref(&thread)).expect("save failed");

        let loaded = codec.load().expect("load failed").expect("record missing");
        assert_eq!(loaded, vec![thread]);
    }

    #[test]
    fn test_storage_error_display() {
        let error = StorageError::Corrupt {
            key: "ai-tutor-chats".to_string(),
            reason: "expected value at line 1 column 1".to_string(),
        };
        assert!(error.to_string().contains("ai-tutor-chats"));

        let error = StorageError::backend("sqlite", "disk I/O error");
        assert_eq!(
            error.to_string(),
            "Storage backend 'sqlite' failed: disk I/O error"
        );

        let error = StorageError::Encode {
            key: "ai-tutor-chats".to_string(),
            reason: "key must be a string".to_string(),
        };
        assert!(error.to_string().starts_with("Failed to encode"));
    }
}
