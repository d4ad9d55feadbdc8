//! In-process backend
//!
//! Records vanish with the process. Clones share the same records, so a test
//! can hand one clone to a codec and inspect the other.

use super::{StateBackend, StorageError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    records: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or replace a record directly
    pub fn insert(&self, key: &str, blob: &str) {
        self.insert_bytes(key, blob.as_bytes());
    }

    /// Seed or replace a record with arbitrary bytes
    pub fn insert_bytes(&self, key: &str, blob: &[u8]) {
        if let Ok(mut records) = self.records.lock() {
            records.insert(key.to_string(), blob.to_vec());
        }
    }

    /// Current contents of a record, if it holds UTF-8 text
    pub fn get(&self, key: &str) -> Option<String> {
        self.get_bytes(key).and_then(|bytes| String::from_utf8(bytes).ok())
    }

    /// Current raw contents of a record
    pub fn get_bytes(&self, key: &str) -> Option<Vec<u8>> {
        self.records.lock().ok()?.get(key).cloned()
    }

    /// Number of records held
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StateBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let records = self
            .records
            .lock()
            .map_err(|e| StorageError::backend("memory", e))?;
        Ok(records.get(key).cloned())
    }

    fn write(&self, key: &str, blob: &[u8]) -> Result<(), StorageError> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| StorageError::backend("memory", e))?;
        records.insert(key.to_string(), blob.to_vec());
        Ok(())
    }
}
