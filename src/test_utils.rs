//! Test utilities for Chatshelf
//!
//! This module provides common test helpers: in-memory stores, seeded
//! thread collections, and assertion helpers.

use crate::config::SessionConfig;
use crate::session::{Message, SessionStore, Thread};
use crate::storage::{encode, MemoryBackend, ThreadCodec};

/// Record key used by test stores
pub const TEST_KEY: &str = "ai-tutor-chats";

/// A codec over a fresh in-memory backend, plus a handle to inspect it
pub fn memory_codec() -> (ThreadCodec, MemoryBackend) {
    let backend = MemoryBackend::new();
    let codec = ThreadCodec::new(Box::new(backend.clone()), TEST_KEY);
    (codec, backend)
}

/// A store over a clone of `backend` that has not run `init` yet
pub fn unready_store(backend: &MemoryBackend) -> SessionStore {
    SessionStore::new(
        ThreadCodec::new(Box::new(backend.clone()), TEST_KEY),
        SessionConfig::default(),
    )
}

/// An initialized store with nothing persisted beforehand, plus its backend
pub fn ready_store_with_backend() -> (SessionStore, MemoryBackend) {
    let backend = MemoryBackend::new();
    let mut store = unready_store(&backend);
    store.init();
    (store, backend)
}

/// An initialized store with nothing persisted beforehand
pub fn ready_store() -> SessionStore {
    ready_store_with_backend().0
}

/// A thread with the given title and one user message
pub fn thread_with_message(title: &str) -> Thread {
    let mut thread = Thread::new(title);
    thread.messages.push(Message::user(format!("About {}", title)));
    thread
}

/// An initialized store restored from threads with the given titles
///
/// Each thread holds one message so it survives the load filter. Order is
/// preserved and the first thread is selected.
pub fn seeded_store(titles: &[&str]) -> SessionStore {
    let threads: Vec<Thread> = titles.iter().map(|t| thread_with_message(t)).collect();
    let (codec, backend) = memory_codec();
    backend.insert(TEST_KEY, &encode(&threads).expect("Failed to encode threads"));

    let mut store = SessionStore::new(codec, SessionConfig::default());
    store.init();
    store
}

/// Assert that an error's message contains a substring
///
/// # Panics
///
/// Panics if the result is Ok or the message does not contain `expected`
pub fn assert_error_contains<T: std::fmt::Debug>(result: crate::error::Result<T>, expected: &str) {
    match result {
        Ok(value) => panic!("Expected error containing '{}', got Ok({:?})", expected, value),
        Err(e) => {
            let message = format!("{:#}", e);
            assert!(
                message.contains(expected),
                "Expected error containing '{}', got '{}'",
                expected,
                message
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_store_keeps_order_and_selects_first() {
        let store = seeded_store(&["a", "b", "c"]);
        let titles: Vec<&str> = store.threads().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
        assert_eq!(store.selected_id(), Some(store.threads()[0].id.as_str()));
    }

    #[test]
    fn test_ready_store_has_one_fresh_thread() {
        let store = ready_store();
        assert_eq!(store.threads().len(), 1);
        assert!(store.threads()[0].is_empty());
    }

    #[test]
    fn test_ready_store_persists_bootstrap() {
        let (store, backend) = ready_store_with_backend();
        assert_eq!(backend.get(TEST_KEY), Some(encode(store.threads()).unwrap()));
    }
}
