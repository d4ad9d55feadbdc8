//! Plain JSON file backend
//!
//! Each record is a file named `<key>.json` inside the backend directory.
//! Writes go to a temporary sibling first and are renamed into place so a
//! crash mid-write never leaves a truncated record behind.

use super::{StateBackend, StorageError};
use crate::error::Result;
use anyhow::Context;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Create a backend rooted at `dir`, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create storage directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`
    pub fn record_path(&self, key: &str) -> PathBuf {
        let safe_key = key.replace(['/', '\\', ':'], "_");
        self.dir.join(format!("{}.json", safe_key))
    }
}

impl StateBackend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    fn read(&self, key: &str) -> std::result::Result<Option<Vec<u8>>, StorageError> {
        let path = self.record_path(key);
        match std::fs::read(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::backend(
                "file",
                format!("Failed to read {}: {}", path.display(), e),
            )),
        }
    }

    fn write(&self, key: &str, blob: &[u8]) -> std::result::Result<(), StorageError> {
        let path = self.record_path(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, blob).map_err(|e| {
            StorageError::backend("file", format!("Failed to write {}: {}", tmp.display(), e))
        })?;
        std::fs::rename(&tmp, &path).map_err(|e| {
            StorageError::backend("file", format!("Failed to replace {}: {}", path.display(), e))
        })
    }
}
