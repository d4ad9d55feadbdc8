//! Reply sources and the user/assistant exchange
//!
//! The session store does not know where assistant replies come from. A
//! [`MessageSource`] produces one reply per user input, and [`exchange`]
//! sequences the store calls around it: the user's message is appended
//! first, then the reply once it is available.

use crate::error::{ChatshelfError, Result};
use crate::session::{Message, SessionStore};
use async_trait::async_trait;

/// Producer of assistant replies
///
/// # Examples
///
/// ```
/// use chatshelf::responder::MessageSource;
/// use chatshelf::session::Message;
/// use chatshelf::error::Result;
/// use async_trait::async_trait;
///
/// struct Canned;
///
/// #[async_trait]
/// impl MessageSource for Canned {
///     async fn respond(&self, _history: &[Message], _input: &str) -> Result<Message> {
///         Ok(Message::assistant("Let's work through it together."))
///     }
/// }
/// ```
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Short name shown in logs
    fn name(&self) -> &str {
        "source"
    }

    /// Produce a reply to `input`
    ///
    /// # Arguments
    ///
    /// * `history` - Messages already in the thread, excluding `input`
    /// * `input` - The new user input
    ///
    /// # Errors
    ///
    /// Returns error if no reply can be produced
    async fn respond(&self, history: &[Message], input: &str) -> Result<Message>;
}

/// Offline source that repeats the input back
///
/// Useful when no real assistant is wired in, and in tests.
#[derive(Debug, Clone, Default)]
pub struct EchoSource;

#[async_trait]
impl MessageSource for EchoSource {
    fn name(&self) -> &str {
        "echo"
    }

    async fn respond(&self, history: &[Message], input: &str) -> Result<Message> {
        Ok(Message::assistant(format!(
            "[echo #{}] {}",
            history.len() / 2 + 1,
            input
        )))
    }
}

/// Run one user/assistant round trip on a thread
///
/// Appends the user's message, names the thread after it when it is the
/// thread's first message, asks `source` for a reply and appends that too.
///
/// # Returns
///
/// The assistant message that was appended
///
/// # Errors
///
/// Returns `ChatshelfError::Session` if `thread_id` is unknown and
/// `ChatshelfError::Responder` if the source fails. In the latter case the
/// user's message has already been appended.
pub async fn exchange(
    store: &mut SessionStore,
    source: &dyn MessageSource,
    thread_id: &str,
    input: &str,
) -> Result<Message> {
    let Some(thread) = store.thread(thread_id) else {
        return Err(ChatshelfError::Session(format!("Unknown thread {}", thread_id)).into());
    };
    let first_message = thread.is_empty();
    let history = thread.messages.clone();

    store.append_message(thread_id, Message::user(input))?;
    if first_message {
        store.infer_title_from_message(thread_id, input)?;
    }

    tracing::debug!(thread_id = %thread_id, source = source.name(), "Requesting reply");
    let reply = source
        .respond(&history, input)
        .await
        .map_err(|e| ChatshelfError::Responder(e.to_string()))?;

    store.append_message(thread_id, reply.clone())?;
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;
    use crate::test_utils::ready_store;

    struct FailingSource;

    #[async_trait]
    impl MessageSource for FailingSource {
        async fn respond(&self, _history: &[Message], _input: &str) -> Result<Message> {
            anyhow::bail!("model offline")
        }
    }

    #[tokio::test]
    async fn test_exchange_appends_both_messages_in_order() {
        let mut store = ready_store();
        let id = store.selected_id().unwrap().to_string();

        let reply = exchange(&mut store, &EchoSource, &id, "What is momentum?")
            .await
            .unwrap();

        let thread = store.thread(&id).unwrap();
        assert_eq!(thread.messages.len(), 2);
        assert_eq!(thread.messages[0].role, Role::User);
        assert_eq!(thread.messages[0].content, "What is momentum?");
        assert_eq!(thread.messages[1], reply);
        assert_eq!(reply.role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_exchange_titles_thread_from_first_message_only() {
        let mut store = ready_store();
        let id = store.selected_id().unwrap().to_string();

        exchange(&mut store, &EchoSource, &id, "Explain integrals")
            .await
            .unwrap();
        exchange(&mut store, &EchoSource, &id, "And derivatives?")
            .await
            .unwrap();

        assert_eq!(store.thread(&id).unwrap().title, "Explain integrals");
    }

    #[tokio::test]
    async fn test_exchange_unknown_thread_is_error() {
        let mut store = ready_store();
        let before = store.snapshot();
        assert!(exchange(&mut store, &EchoSource, "missing", "hi").await.is_err());
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn test_exchange_keeps_user_message_when_source_fails() {
        let mut store = ready_store();
        let id = store.selected_id().unwrap().to_string();

        let err = exchange(&mut store, &FailingSource, &id, "hello")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("model offline"));

        let thread = store.thread(&id).unwrap();
        assert_eq!(thread.messages.len(), 1);
        assert_eq!(thread.messages[0].role, Role::User);
    }

    #[tokio::test]
    async fn test_echo_source_numbers_turns() {
        let history = vec![Message::user("a"), Message::assistant("b")];
        let reply = EchoSource.respond(&history, "c").await.unwrap();
        assert_eq!(reply.content, "[echo #2] c");
    }
}
