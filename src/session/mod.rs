//! Session state: threads, messages, and the store that owns them

pub mod store;
pub mod thread;
pub mod timestamp;

pub use store::{FreshReason, LoadOutcome, SessionSnapshot, SessionStore};
pub use thread::{new_id, Message, Role, Thread, ThreadPatch, DEFAULT_TITLE};
pub use timestamp::Timestamp;
