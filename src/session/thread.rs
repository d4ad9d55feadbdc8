//! Conversation threads and their messages

use super::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Title given to every thread before its first message names it
pub const DEFAULT_TITLE: &str = "New conversation";

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

/// Generate a new identifier for a thread or message
///
/// ULIDs embed their creation time and sort lexicographically by it, which
/// keeps identifiers opaque but time-derived.
///
/// # Examples
///
/// ```
/// use chatshelf::session::new_id;
///
/// let id = new_id();
/// assert_eq!(id.len(), 26);
/// ```
pub fn new_id() -> String {
    Ulid::new().to_string()
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message within a thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier
    pub id: String,
    /// Author of the message
    pub role: Role,
    /// Message body
    pub content: String,
    /// Creation time; never changes after the message is built
    #[serde(default)]
    pub timestamp: Timestamp,
}

impl Message {
    /// Create a message stamped with the current time
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            role,
            content: content.into(),
            timestamp: Timestamp::now(),
        }
    }

    /// Create a user-authored message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant-authored message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A conversation thread
///
/// Serialized with camelCase keys (`createdAt`, `updatedAt`) to stay
/// compatible with records written by earlier clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    /// Unique thread identifier
    pub id: String,
    /// Display title
    #[serde(default = "default_title")]
    pub title: String,
    /// Messages in conversation order
    pub messages: Vec<Message>,
    /// When the thread was created
    #[serde(default)]
    pub created_at: Timestamp,
    /// When the thread or any of its messages last changed
    #[serde(default)]
    pub updated_at: Timestamp,
}

impl Thread {
    /// Create an empty thread with the given title
    pub fn new(title: impl Into<String>) -> Self {
        let now = Timestamp::now();
        Self {
            id: new_id(),
            title: title.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Refresh `updated_at`, never moving it backwards or before `created_at`
    pub(crate) fn touch(&mut self) {
        self.updated_at = Timestamp::now()
            .latest(self.updated_at)
            .latest(self.created_at);
    }

    /// Merge a patch, then refresh `updated_at` unconditionally
    pub(crate) fn apply(&mut self, patch: ThreadPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(messages) = patch.messages {
            self.messages = messages;
        }
        self.touch();
    }

    /// Append a message and refresh `updated_at`
    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.touch();
    }
}

/// Partial update for a thread
///
/// Identity and creation time are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadPatch {
    pub title: Option<String>,
    pub messages: Option<Vec<Message>>,
}

impl ThreadPatch {
    /// Patch that only replaces the title
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }
}
