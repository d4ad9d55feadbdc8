//! Text encoding of the thread collection
//!
//! The record is a JSON array of threads. Decoding is strict about shape
//! (an array of objects with ids and message lists) and lenient about dates,
//! which are revived through [`Timestamp`](crate::session::Timestamp).

use super::{StateBackend, StorageError};
use crate::session::Thread;

/// Serialize a thread collection into the stored text form
pub fn encode(threads: &[Thread]) -> Result<String, serde_json::Error> {
    serde_json::to_string(threads)
}

/// Parse the stored text form into typed threads
pub fn decode(raw: &str) -> Result<Vec<Thread>, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Loads and saves the thread collection under one named record
pub struct ThreadCodec {
    backend: Box<dyn StateBackend>,
    key: String,
    backup_corrupt: bool,
}

impl ThreadCodec {
    /// Create a codec over `backend`, storing the collection under `key`
    pub fn new(backend: Box<dyn StateBackend>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            backup_corrupt: false,
        }
    }

    /// Copy corrupt records aside to `<key>.corrupt` before reporting them
    pub fn with_backup_corrupt(mut self, enabled: bool) -> Self {
        self.backup_corrupt = enabled;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Load the persisted collection
    ///
    /// # Returns
    ///
    /// `Ok(None)` when nothing was ever saved (a blank record counts as
    /// nothing), `Ok(Some(threads))` on a clean decode.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Corrupt` when the record does not decode,
    /// including when it is not valid UTF-8, and `StorageError::Backend`
    /// when it cannot be read at all.
    pub fn load(&self) -> Result<Option<Vec<Thread>>, StorageError> {
        let raw = match self.backend.read(&self.key)? {
            Some(raw) if !raw.iter().all(u8::is_ascii_whitespace) => raw,
            _ => return Ok(None),
        };

        match serde_json::from_slice::<Vec<Thread>>(&raw) {
            Ok(threads) => {
                tracing::debug!(
                    key = %self.key,
                    threads = threads.len(),
                    "Decoded stored threads"
                );
                Ok(Some(threads))
            }
            Err(e) => {
                if self.backup_corrupt {
                    self.archive(&raw);
                }
                Err(StorageError::Corrupt {
                    key: self.key.clone(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Overwrite the persisted collection
    pub fn save(&self, threads: &[Thread]) -> Result<(), StorageError> {
        let blob = encode(threads).map_err(|e| StorageError::Encode {
            key: self.key.clone(),
            reason: e.to_string(),
        })?;
        self.backend.write(&self.key, blob.as_bytes())
    }

    fn archive(&self, raw: &[u8]) {
        let aside = format!("{}.corrupt", self.key);
        match self.backend.write(&aside, raw) {
            Ok(()) => tracing::warn!(key = %aside, bytes = raw.len(), "Archived corrupt thread record"),
            Err(e) => tracing::warn!(key = %aside, error = %e, "Failed to archive corrupt record"),
        }
    }
}
