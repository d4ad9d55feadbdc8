//! The session store
//!
//! `SessionStore` owns the authoritative thread collection and the current
//! selection. It starts uninitialized, loads persisted state exactly once in
//! [`SessionStore::init`], and from then on writes the full collection back
//! through its codec after every mutation that changed something.
//!
//! Invariants held by every public operation once initialized:
//!
//! - thread ids are unique
//! - the collection is never empty
//! - the selected id is either `None` or names a thread in the collection

use super::thread::{Message, Thread, ThreadPatch};
use crate::config::SessionConfig;
use crate::error::{ChatshelfError, Result};
use crate::presentation::infer_title;
use crate::storage::{StorageError, ThreadCodec};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Uninitialized,
    Ready,
}

/// Why bootstrap started from a fresh thread instead of stored ones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreshReason {
    /// Nothing had been saved yet
    Absent,
    /// The stored record exists but could not be decoded
    Unreadable,
    /// The backend failed to read; the record was left untouched
    Unavailable,
    /// Every stored thread was empty
    NoMessages,
}

/// What [`SessionStore::init`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Stored threads were adopted
    Restored {
        kept: usize,
        discarded_empty: usize,
        discarded_duplicate: usize,
    },
    /// A single fresh thread was created
    Fresh(FreshReason),
    /// `init` had already run; nothing changed
    AlreadyInitialized,
}

/// Read-only view handed to renderers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub threads: Vec<Thread>,
    pub selected_id: Option<String>,
    pub initialized: bool,
}

/// Owner of the live thread collection
pub struct SessionStore {
    codec: ThreadCodec,
    settings: SessionConfig,
    threads: Vec<Thread>,
    selected: Option<String>,
    lifecycle: Lifecycle,
}

impl SessionStore {
    /// Create an uninitialized store over `codec`
    ///
    /// Nothing is read or written until [`init`](Self::init) runs.
    pub fn new(codec: ThreadCodec, settings: SessionConfig) -> Self {
        Self {
            codec,
            settings,
            threads: Vec::new(),
            selected: None,
            lifecycle: Lifecycle::Uninitialized,
        }
    }

    /// Load persisted threads and move to the ready state
    ///
    /// Stored threads without messages are dropped here, and only here:
    /// empty threads created during a live session survive until the next
    /// load. If nothing usable remains, one fresh thread is created. The
    /// first thread is selected and the result is persisted, except when the
    /// backend could not be read: then nothing is written until the next
    /// mutation.
    ///
    /// Runs once; later calls return [`LoadOutcome::AlreadyInitialized`].
    pub fn init(&mut self) -> LoadOutcome {
        if self.lifecycle == Lifecycle::Ready {
            return LoadOutcome::AlreadyInitialized;
        }

        let loaded = match self.codec.load() {
            Ok(loaded) => loaded,
            Err(e @ StorageError::Backend { .. }) => {
                tracing::warn!(error = %e, "Storage unavailable, starting fresh without saving");
                self.start_fresh();
                self.lifecycle = Lifecycle::Ready;
                return LoadOutcome::Fresh(FreshReason::Unavailable);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stored threads are unreadable, starting fresh");
                self.start_fresh();
                self.finish_init();
                return LoadOutcome::Fresh(FreshReason::Unreadable);
            }
        };

        let outcome = match loaded {
            None => {
                self.start_fresh();
                LoadOutcome::Fresh(FreshReason::Absent)
            }
            Some(stored) => {
                let total = stored.len();
                let mut seen = HashSet::new();
                let mut discarded_duplicate = 0;
                let mut kept = Vec::with_capacity(total);

                for thread in stored.into_iter().filter(|t| !t.is_empty()) {
                    if seen.insert(thread.id.clone()) {
                        kept.push(thread);
                    } else {
                        discarded_duplicate += 1;
                    }
                }
                let discarded_empty = total - kept.len() - discarded_duplicate;

                if kept.is_empty() {
                    self.start_fresh();
                    LoadOutcome::Fresh(FreshReason::NoMessages)
                } else {
                    self.selected = Some(kept[0].id.clone());
                    self.threads = kept;
                    LoadOutcome::Restored {
                        kept: self.threads.len(),
                        discarded_empty,
                        discarded_duplicate,
                    }
                }
            }
        };

        self.finish_init();
        tracing::info!(?outcome, threads = self.threads.len(), "Session initialized");
        outcome
    }

    fn start_fresh(&mut self) {
        let thread = self.fresh_thread();
        self.selected = Some(thread.id.clone());
        self.threads = vec![thread];
    }

    fn finish_init(&mut self) {
        self.lifecycle = Lifecycle::Ready;
        self.persist();
    }

    fn fresh_thread(&self) -> Thread {
        Thread::new(self.settings.default_title.clone())
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Ready => Ok(()),
            Lifecycle::Uninitialized => Err(ChatshelfError::NotInitialized.into()),
        }
    }

    /// Write the full collection through the codec
    ///
    /// Failures are logged and never reach the caller.
    fn persist(&self) {
        if self.lifecycle != Lifecycle::Ready || self.threads.is_empty() {
            return;
        }
        match self.codec.save(&self.threads) {
            Ok(()) => tracing::debug!(threads = self.threads.len(), "Persisted threads"),
            Err(e) => tracing::warn!(error = %e, "Failed to persist threads"),
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.threads.iter().position(|t| t.id == id)
    }

    pub fn is_initialized(&self) -> bool {
        self.lifecycle == Lifecycle::Ready
    }

    /// All threads, in collection order
    pub fn threads(&self) -> &[Thread] {
        &self.threads
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_thread(&self) -> Option<&Thread> {
        self.selected.as_deref().and_then(|id| self.thread(id))
    }

    pub fn thread(&self, id: &str) -> Option<&Thread> {
        self.threads.iter().find(|t| t.id == id)
    }

    /// Owned copy of everything a renderer needs
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            threads: self.threads.clone(),
            selected_id: self.selected.clone(),
            initialized: self.is_initialized(),
        }
    }

    /// Resolve a full id or a unique id prefix to a thread id
    ///
    /// # Errors
    ///
    /// Returns `ChatshelfError::Session` when nothing matches or when the
    /// prefix matches more than one thread.
    pub fn resolve_id(&self, id_or_prefix: &str) -> Result<String> {
        if let Some(thread) = self.thread(id_or_prefix) {
            return Ok(thread.id.clone());
        }

        let needle = id_or_prefix.to_uppercase();
        let mut matches = self
            .threads
            .iter()
            .filter(|t| !needle.is_empty() && t.id.to_uppercase().starts_with(&needle));

        match (matches.next(), matches.next()) {
            (Some(thread), None) => Ok(thread.id.clone()),
            (Some(_), Some(_)) => Err(ChatshelfError::Session(format!(
                "Thread id prefix '{}' is ambiguous",
                id_or_prefix
            ))
            .into()),
            (None, _) => Err(ChatshelfError::Session(format!(
                "No thread matches '{}'",
                id_or_prefix
            ))
            .into()),
        }
    }

    /// Start a new empty thread at the front of the collection and select it
    ///
    /// # Returns
    ///
    /// The id of the new thread
    pub fn create_thread(&mut self) -> Result<String> {
        self.ensure_ready()?;
        let thread = self.fresh_thread();
        let id = thread.id.clone();
        self.threads.insert(0, thread);
        self.selected = Some(id.clone());
        tracing::debug!(thread_id = %id, "Created thread");
        self.persist();
        Ok(id)
    }

    /// Select a thread
    ///
    /// Unknown ids are ignored so the selection never dangles.
    ///
    /// # Returns
    ///
    /// `true` if the selection now names `id`
    pub fn select_thread(&mut self, id: &str) -> Result<bool> {
        self.ensure_ready()?;
        if self.position(id).is_none() {
            tracing::debug!(thread_id = %id, "Ignoring selection of unknown thread");
            return Ok(false);
        }
        self.selected = Some(id.to_string());
        Ok(true)
    }

    /// Merge `patch` into a thread and refresh its `updated_at`
    ///
    /// # Returns
    ///
    /// `false` (and no change) if `id` is unknown
    pub fn update_thread(&mut self, id: &str, patch: ThreadPatch) -> Result<bool> {
        self.ensure_ready()?;
        let Some(pos) = self.position(id) else {
            tracing::debug!(thread_id = %id, "Ignoring update of unknown thread");
            return Ok(false);
        };
        self.threads[pos].apply(patch);
        self.persist();
        Ok(true)
    }

    /// Remove a thread
    ///
    /// Deleting the selected thread selects the new first thread. Deleting
    /// the last thread replaces it with a fresh one.
    ///
    /// # Returns
    ///
    /// `false` (and no change) if `id` is unknown
    pub fn delete_thread(&mut self, id: &str) -> Result<bool> {
        self.ensure_ready()?;
        let Some(pos) = self.position(id) else {
            tracing::debug!(thread_id = %id, "Ignoring deletion of unknown thread");
            return Ok(false);
        };
        self.threads.remove(pos);

        if self.threads.is_empty() {
            self.start_fresh();
        } else if self.selected.as_deref() == Some(id) {
            self.selected = Some(self.threads[0].id.clone());
        }

        tracing::debug!(thread_id = %id, remaining = self.threads.len(), "Deleted thread");
        self.persist();
        Ok(true)
    }

    /// Append a message to a thread
    ///
    /// # Returns
    ///
    /// `false` (and no change) if `thread_id` is unknown
    pub fn append_message(&mut self, thread_id: &str, message: Message) -> Result<bool> {
        self.ensure_ready()?;
        let Some(pos) = self.position(thread_id) else {
            tracing::debug!(thread_id = %thread_id, "Ignoring message for unknown thread");
            return Ok(false);
        };
        self.threads[pos].push(message);
        self.persist();
        Ok(true)
    }

    /// Title a thread after a message, truncating long text
    ///
    /// With the default settings, text over 40 characters becomes its first
    /// 40 characters followed by `...`.
    pub fn infer_title_from_message(&mut self, thread_id: &str, text: &str) -> Result<bool> {
        let title = infer_title(
            text,
            self.settings.title_max_chars,
            &self.settings.title_ellipsis,
        );
        self.update_thread(thread_id, ThreadPatch::title(title))
    }
}
