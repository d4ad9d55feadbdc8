//! One-shot thread commands
//!
//! Each handler works on an initialized [`SessionStore`]. Because the
//! selection is not persisted, a fresh process always starts with the first
//! thread in stored order selected; handlers that take an optional id fall
//! back to it.

use super::render::{print_thread, print_thread_list, short_id, to_pretty_json};
use crate::config::DisplayConfig;
use crate::error::{ChatshelfError, Result};
use crate::presentation::summarize;
use crate::responder::{exchange, MessageSource};
use crate::session::{SessionStore, Thread, ThreadPatch};
use anyhow::Context;
use chrono::Utc;
use colored::Colorize;
use std::path::Path;

/// Thread named by `id`, or the selected thread when `id` is `None`
///
/// # Errors
///
/// Returns `ChatshelfError::Session` if the id does not resolve or nothing
/// is selected.
pub fn target_thread_id(store: &SessionStore, id: Option<&str>) -> Result<String> {
    match id {
        Some(id) => store.resolve_id(id),
        None => store
            .selected_id()
            .map(str::to_string)
            .ok_or_else(|| ChatshelfError::Session("No thread is selected".to_string()).into()),
    }
}

/// List threads grouped by recency, as tables or JSON
pub fn list_threads(store: &SessionStore, display: &DisplayConfig, json: bool) -> Result<()> {
    let rows = summarize(
        store.threads(),
        store.selected_id(),
        Utc::now(),
        &display.date_format,
    );

    if json {
        println!("{}", to_pretty_json(&rows)?);
    } else {
        print_thread_list(&rows, display);
    }
    Ok(())
}

/// Print one thread's transcript
pub fn show_thread(store: &SessionStore, display: &DisplayConfig, id: Option<&str>) -> Result<()> {
    let thread_id = target_thread_id(store, id)?;
    let thread = lookup(store, &thread_id)?;
    print_thread(thread, display, Utc::now());
    Ok(())
}

/// Create a thread, optionally sending its first message
///
/// # Returns
///
/// The id of the new thread
pub async fn new_thread(
    store: &mut SessionStore,
    source: &dyn MessageSource,
    display: &DisplayConfig,
    text: Option<&str>,
) -> Result<String> {
    let id = store.create_thread()?;

    match text.map(str::trim).filter(|t| !t.is_empty()) {
        Some(text) => {
            let reply = exchange(store, source, &id, text).await?;
            let title = &lookup(store, &id)?.title;
            println!(
                "{} {}",
                "Started".green(),
                format!("{} ({})", title, short_id(&id, display.id_width)).cyan()
            );
            println!("\n{}\n", reply.content);
        }
        None => {
            println!(
                "{} {}",
                "Started empty thread".green(),
                short_id(&id, display.id_width).cyan()
            );
            println!(
                "{}",
                "Empty threads are discarded on the next load; send a message to keep it."
                    .yellow()
            );
        }
    }
    Ok(id)
}

/// Give a thread a new title
pub fn rename_thread(store: &mut SessionStore, id: &str, title: &str) -> Result<()> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ChatshelfError::Session("Title cannot be empty".to_string()).into());
    }
    let thread_id = store.resolve_id(id)?;
    store.update_thread(&thread_id, ThreadPatch::title(title))?;
    println!("{}", format!("Renamed {} to \"{}\"", thread_id, title).green());
    Ok(())
}

/// Delete a thread
///
/// Deleting the last thread leaves a fresh empty one behind.
pub fn delete_thread(store: &mut SessionStore, id: &str) -> Result<()> {
    let thread_id = store.resolve_id(id)?;
    store.delete_thread(&thread_id)?;
    println!("{}", format!("Deleted conversation {}", thread_id).green());
    Ok(())
}

/// Send a message to a thread and print the reply
pub async fn send_message(
    store: &mut SessionStore,
    source: &dyn MessageSource,
    text: &str,
    thread: Option<&str>,
) -> Result<()> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ChatshelfError::Session("Message cannot be empty".to_string()).into());
    }
    let thread_id = target_thread_id(store, thread)?;
    store.select_thread(&thread_id)?;

    let reply = exchange(store, source, &thread_id, text).await?;
    println!("\n{}\n", reply.content);
    Ok(())
}

/// Write every thread as JSON, to `output` or stdout
///
/// The layout matches the persisted record, so an export can be fed back
/// in as a file-backend record.
pub fn export_threads(store: &SessionStore, output: Option<&Path>) -> Result<()> {
    let json = to_pretty_json(store.threads())?;

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write export to {}", path.display()))?;
            println!(
                "{}",
                format!(
                    "Exported {} threads to {}",
                    store.threads().len(),
                    path.display()
                )
                .green()
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn lookup<'a>(store: &'a SessionStore, id: &str) -> Result<&'a Thread> {
    store
        .thread(id)
        .ok_or_else(|| ChatshelfError::Session(format!("Unknown thread {}", id)).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responder::EchoSource;
    use crate::session::{Message, Role};
    use crate::test_utils::{ready_store, seeded_store};
    use tempfile::TempDir;

    #[test]
    fn test_target_thread_defaults_to_selection() {
        let store = ready_store();
        let selected = store.selected_id().unwrap().to_string();
        assert_eq!(target_thread_id(&store, None).unwrap(), selected);
    }

    #[test]
    fn test_target_thread_resolves_prefix() {
        let store = seeded_store(&["Algebra", "Biology"]);
        let id = store.threads()[1].id.clone();
        assert_eq!(target_thread_id(&store, Some(&id[..20])).unwrap(), id);
    }

    #[test]
    fn test_rename_thread_by_prefix() {
        let mut store = seeded_store(&["Algebra"]);
        let id = store.threads()[0].id.clone();
        rename_thread(&mut store, &id[..22], "  Linear algebra ").unwrap();
        assert_eq!(store.thread(&id).unwrap().title, "Linear algebra");
    }

    #[test]
    fn test_rename_thread_rejects_blank_title() {
        let mut store = seeded_store(&["Algebra"]);
        let id = store.threads()[0].id.clone();
        assert!(rename_thread(&mut store, &id, "   ").is_err());
        assert_eq!(store.thread(&id).unwrap().title, "Algebra");
    }

    #[test]
    fn test_delete_thread_unknown_id_is_error() {
        let mut store = seeded_store(&["Algebra"]);
        let before = store.snapshot();
        assert!(delete_thread(&mut store, "ZZZZ").is_err());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_delete_last_thread_leaves_fresh_one() {
        let mut store = seeded_store(&["Algebra"]);
        let id = store.threads()[0].id.clone();
        delete_thread(&mut store, &id).unwrap();
        assert_eq!(store.threads().len(), 1);
        assert!(store.threads()[0].is_empty());
        assert_ne!(store.threads()[0].id, id);
    }

    #[tokio::test]
    async fn test_new_thread_with_text_is_titled_and_answered() {
        let mut store = ready_store();
        let id = new_thread(
            &mut store,
            &EchoSource,
            &DisplayConfig::default(),
            Some("Why is the sky blue?"),
        )
        .await
        .unwrap();

        assert_eq!(store.selected_id(), Some(id.as_str()));
        let thread = store.thread(&id).unwrap();
        assert_eq!(thread.title, "Why is the sky blue?");
        assert_eq!(thread.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_new_thread_without_text_stays_empty() {
        let mut store = ready_store();
        let id = new_thread(&mut store, &EchoSource, &DisplayConfig::default(), None)
            .await
            .unwrap();
        assert!(store.thread(&id).unwrap().is_empty());
        assert_eq!(store.threads().len(), 2);
    }

    #[tokio::test]
    async fn test_send_message_to_named_thread_selects_it() {
        let mut store = seeded_store(&["Algebra", "Biology"]);
        let target = store.threads()[1].id.clone();

        send_message(&mut store, &EchoSource, "next question", Some(&target))
            .await
            .unwrap();

        assert_eq!(store.selected_id(), Some(target.as_str()));
        let thread = store.thread(&target).unwrap();
        let last: &Message = thread.messages.last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(thread.title, "Biology");
    }

    #[tokio::test]
    async fn test_send_blank_message_is_rejected() {
        let mut store = ready_store();
        let before = store.snapshot();
        assert!(send_message(&mut store, &EchoSource, "  ", None).await.is_err());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_export_threads_writes_record_layout() {
        let store = seeded_store(&["Algebra", "Biology"]);
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.json");

        export_threads(&store, Some(&path)).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let threads = crate::storage::decode(&written).unwrap();
        assert_eq!(threads, store.threads());
        assert!(written.contains("\"createdAt\""));
    }
}
