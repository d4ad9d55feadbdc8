//! Embedded key-value backend using `sled`

use super::{StateBackend, StorageError};
use crate::error::{ChatshelfError, Result};
use sled::Db;
use std::path::Path;

/// Storage backend backed by a `sled` database directory
///
/// Clones share the same open database.
#[derive(Clone)]
pub struct SledBackend {
    db: Db,
}

impl SledBackend {
    /// Open or create a sled database at `path`
    ///
    /// # Errors
    ///
    /// Returns `ChatshelfError::Sled` if the database cannot be opened
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let db = sled::open(path).map_err(ChatshelfError::Sled)?;
        Ok(Self { db })
    }
}

impl StateBackend for SledBackend {
    fn name(&self) -> &'static str {
        "sled"
    }

    fn read(&self, key: &str) -> std::result::Result<Option<Vec<u8>>, StorageError> {
        let value = self
            .db
            .get(key.as_bytes())
            .map_err(|e| StorageError::backend("sled", format!("Get failed: {}", e)))?;
        Ok(value.map(|bytes| bytes.to_vec()))
    }

    fn write(&self, key: &str, blob: &[u8]) -> std::result::Result<(), StorageError> {
        self.db
            .insert(key.as_bytes(), blob)
            .map_err(|e| StorageError::backend("sled", format!("Insert failed: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| StorageError::backend("sled", format!("Flush failed: {}", e)))?;

        Ok(())
    }
}
