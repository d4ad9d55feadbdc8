//! Command-line interface definition for Chatshelf
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the interactive session and one-shot thread
//! management.

use crate::config::BackendKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Chatshelf - local chat session manager
///
/// Keeps conversation threads on disk and shows them grouped by how
/// recently they were used.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatshelf")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    pub json_logs: bool,

    /// Directory holding the thread database (overrides config)
    #[arg(long, env = "CHATSHELF_STORAGE_PATH")]
    pub storage_path: Option<PathBuf>,

    /// Storage backend: sqlite, sled, file or memory (overrides config)
    #[arg(long, value_parser = parse_backend)]
    pub backend: Option<BackendKind>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Chatshelf
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive session
    Chat,

    /// List threads grouped by recency
    List {
        /// Print the list as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print a thread's messages (defaults to the most recent thread)
    Show {
        /// Thread id or unique id prefix
        id: Option<String>,
    },

    /// Start a new thread, optionally sending its first message
    New {
        /// First message; the thread is named after it
        text: Option<String>,
    },

    /// Rename a thread
    Rename {
        /// Thread id or unique id prefix
        id: String,

        /// New title
        title: String,
    },

    /// Delete a thread
    Delete {
        /// Thread id or unique id prefix
        id: String,
    },

    /// Send one message and print the reply
    Send {
        /// Message text
        text: String,

        /// Thread to send to (defaults to the most recent thread)
        #[arg(short, long)]
        thread: Option<String>,
    },

    /// Write all threads as JSON
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_backend(value: &str) -> Result<BackendKind, String> {
    BackendKind::parse_str(value).ok_or_else(|| {
        format!(
            "unknown backend '{}' (expected sqlite, sled, file or memory)",
            value
        )
    })
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            json_logs: false,
            storage_path: None,
            backend: None,
            command: Commands::List { json: false },
        }
    }
}
