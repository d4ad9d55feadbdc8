//! Configuration management for Chatshelf
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{ChatshelfError, Result};
use crate::presentation::{is_valid_date_format, DEFAULT_DATE_FORMAT};
use crate::session::DEFAULT_TITLE;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Chatshelf
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where and how threads are persisted
    #[serde(default)]
    pub storage: StorageConfig,
    /// Thread defaults and title inference
    #[serde(default)]
    pub session: SessionConfig,
    /// Output formatting
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Which backend holds the thread record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// SQLite key/value table
    #[default]
    Sqlite,
    /// Embedded sled database
    Sled,
    /// One JSON file per record
    File,
    /// Process memory only; nothing survives exit
    Memory,
}

impl BackendKind {
    /// Parse a backend name, case-insensitively
    pub fn parse_str(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "sqlite" => Some(Self::Sqlite),
            "sled" => Some(Self::Sled),
            "file" | "json" => Some(Self::File),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend type
    #[serde(default)]
    pub backend: BackendKind,

    /// Directory holding the backend's files; defaults to the user data dir
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Name of the record that holds the thread collection
    #[serde(default = "default_record_key")]
    pub record_key: String,

    /// Copy an unreadable record to `<record_key>.corrupt` before starting fresh
    #[serde(default = "default_backup_corrupt")]
    pub backup_corrupt: bool,
}

fn default_record_key() -> String {
    "ai-tutor-chats".to_string()
}

fn default_backup_corrupt() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            path: None,
            record_key: default_record_key(),
            backup_corrupt: default_backup_corrupt(),
        }
    }
}

impl StorageConfig {
    /// Directory the backend should use
    ///
    /// # Errors
    ///
    /// Returns `ChatshelfError::Storage` if no path is configured and the
    /// platform data directory cannot be determined.
    pub fn resolved_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        let proj_dirs = ProjectDirs::from("com", "chatshelf", "chatshelf")
            .ok_or_else(|| ChatshelfError::Storage("Could not determine data directory".into()))?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Title of freshly created threads
    #[serde(default = "default_title")]
    pub default_title: String,

    /// Longest inferred title, in characters, before truncation
    #[serde(default = "default_title_max_chars")]
    pub title_max_chars: usize,

    /// Marker appended to truncated titles
    #[serde(default = "default_title_ellipsis")]
    pub title_ellipsis: String,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_title_max_chars() -> usize {
    40
}

fn default_title_ellipsis() -> String {
    "...".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_title: default_title(),
            title_max_chars: default_title_max_chars(),
            title_ellipsis: default_title_ellipsis(),
        }
    }
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// strftime layout for dates older than a week
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Number of id characters shown in tables (0 shows full ids)
    #[serde(default = "default_id_width")]
    pub id_width: usize,
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

fn default_id_width() -> usize {
    10
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            id_width: default_id_width(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ChatshelfError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ChatshelfError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(backend) = std::env::var("CHATSHELF_STORAGE_BACKEND") {
            match BackendKind::parse_str(&backend) {
                Some(kind) => {
                    self.storage.backend = kind;
                    tracing::debug!(?kind, "Env override: CHATSHELF_STORAGE_BACKEND");
                }
                None => tracing::warn!("Invalid CHATSHELF_STORAGE_BACKEND: {}", backend),
            }
        }

        if let Ok(path) = std::env::var("CHATSHELF_STORAGE_PATH") {
            tracing::debug!(path = %path, "Env override: CHATSHELF_STORAGE_PATH");
            self.storage.path = Some(PathBuf::from(path));
        }

        if let Ok(key) = std::env::var("CHATSHELF_RECORD_KEY") {
            tracing::debug!(key = %key, "Env override: CHATSHELF_RECORD_KEY");
            self.storage.record_key = key;
        }

        if let Ok(title) = std::env::var("CHATSHELF_DEFAULT_TITLE") {
            self.session.default_title = title;
        }

        if let Ok(max_chars) = std::env::var("CHATSHELF_TITLE_MAX_CHARS") {
            if let Ok(value) = max_chars.parse() {
                self.session.title_max_chars = value;
            } else {
                tracing::warn!("Invalid CHATSHELF_TITLE_MAX_CHARS: {}", max_chars);
            }
        }

        if let Ok(format) = std::env::var("CHATSHELF_DATE_FORMAT") {
            self.display.date_format = format;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(path) = &cli.storage_path {
            tracing::info!("Using storage path override from CLI: {}", path.display());
            self.storage.path = Some(path.clone());
        }
        if let Some(kind) = cli.backend {
            self.storage.backend = kind;
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `ChatshelfError::Config` describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        if self.storage.record_key.trim().is_empty() {
            return Err(ChatshelfError::Config("storage.record_key cannot be empty".into()).into());
        }

        if self.session.default_title.trim().is_empty() {
            return Err(
                ChatshelfError::Config("session.default_title cannot be empty".into()).into(),
            );
        }

        if self.session.title_max_chars == 0 {
            return Err(ChatshelfError::Config(
                "session.title_max_chars must be greater than 0".into(),
            )
            .into());
        }

        if !is_valid_date_format(&self.display.date_format) {
            return Err(ChatshelfError::Config(format!(
                "display.date_format is not a valid strftime layout: {:?}",
                self.display.date_format
            ))
            .into());
        }

        Ok(())
    }
}
