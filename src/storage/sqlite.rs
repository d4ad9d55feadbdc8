//! SQLite record backend
//!
//! Records live in a two-column key/value table. Each call opens its own
//! connection, so the backend holds nothing but the database path.

use super::{StateBackend, StorageError};
use crate::error::{ChatshelfError, Result};
use anyhow::Context;
use chrono::Utc;
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// Storage backend backed by a SQLite database file
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    db_path: PathBuf,
}

impl SqliteBackend {
    /// Create a backend that uses the specified database path
    ///
    /// Creates the parent directory and the records table if needed.
    ///
    /// # Examples
    ///
    /// ```
    /// use chatshelf::storage::SqliteBackend;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let backend = SqliteBackend::new_with_path(dir.path().join("threads.db")).unwrap();
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")?;
        }

        let backend = Self { db_path };
        backend.init()?;
        Ok(backend)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn init(&self) -> Result<()> {
        let conn = self.open()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS records (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(ChatshelfError::Sqlite)
        .context("Failed to create tables")?;
        Ok(())
    }

    fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)
            .map_err(ChatshelfError::Sqlite)
            .with_context(|| format!("Failed to open database: {}", self.db_path.display()))?;
        Ok(conn)
    }
}

impl StateBackend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn read(&self, key: &str) -> std::result::Result<Option<Vec<u8>>, StorageError> {
        let conn = self
            .open()
            .map_err(|e| StorageError::backend("sqlite", format!("{:#}", e)))?;
        conn.query_row(
            "SELECT value FROM records WHERE key = ?",
            params![key],
            |row| match row.get_ref(0)? {
                ValueRef::Text(bytes) | ValueRef::Blob(bytes) => Ok(bytes.to_vec()),
                other => Err(rusqlite::Error::InvalidColumnType(
                    0,
                    "value".to_string(),
                    other.data_type(),
                )),
            },
        )
        .optional()
        .map_err(|e| StorageError::backend("sqlite", e))
    }

    /// Valid UTF-8 is stored as TEXT, anything else as a BLOB
    fn write(&self, key: &str, blob: &[u8]) -> std::result::Result<(), StorageError> {
        let conn = self
            .open()
            .map_err(|e| StorageError::backend("sqlite", format!("{:#}", e)))?;
        let value = match String::from_utf8(blob.to_vec()) {
            Ok(text) => Value::Text(text),
            Err(e) => Value::Blob(e.into_bytes()),
        };
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO records (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )
        .map_err(|e| StorageError::backend("sqlite", e))?;
        Ok(())
    }
}
