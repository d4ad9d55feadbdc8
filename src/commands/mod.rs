/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `chat`    : Interactive session with slash commands
- `threads` : One-shot list/show/new/rename/delete/send/export
- `render`  : Tables and transcripts shared by both

Handlers receive an initialized [`SessionStore`] built by [`open_store`].
*/

use crate::config::Config;
use crate::error::Result;
use crate::session::{LoadOutcome, SessionStore};
use crate::storage::open_codec;

pub mod chat;
pub mod render;
pub mod special_commands;
pub mod threads;

/// Open the configured backend and load the session
///
/// # Errors
///
/// Returns error if the storage backend cannot be opened. An unreadable
/// record is not an error: the session starts fresh.
pub fn open_store(config: &Config) -> Result<SessionStore> {
    let codec = open_codec(&config.storage)?;
    tracing::debug!(
        backend = codec.backend_name(),
        key = codec.key(),
        "Opened thread storage"
    );

    let mut store = SessionStore::new(codec, config.session.clone());
    match store.init() {
        LoadOutcome::Restored {
            kept,
            discarded_empty,
            discarded_duplicate,
        } => tracing::info!(
            kept,
            discarded_empty,
            discarded_duplicate,
            "Restored conversations"
        ),
        LoadOutcome::Fresh(reason) => tracing::info!(?reason, "Started a fresh conversation"),
        LoadOutcome::AlreadyInitialized => {}
    }
    Ok(store)
}
