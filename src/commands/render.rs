//! Terminal rendering for threads and thread lists
//!
//! Shared by the one-shot subcommands and the interactive session.

use crate::config::DisplayConfig;
use crate::error::{ChatshelfError, Result};
use crate::presentation::{relative_label_with_format, RecencyBucket, ThreadSummary};
use crate::session::{Message, Role, Thread};
use chrono::{DateTime, Utc};
use colored::Colorize;
use prettytable::{format, row, Table};
use serde::Serialize;

/// Leading part of an id, `width` characters long (0 keeps the whole id)
pub fn short_id(id: &str, width: usize) -> &str {
    if width == 0 {
        return id;
    }
    match id.char_indices().nth(width) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// Table of list rows belonging to one recency bucket
pub fn thread_table(rows: &[&ThreadSummary], id_width: usize) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(row![
        "".bold(),
        "ID".bold(),
        "Title".bold(),
        "Messages".bold(),
        "Updated".bold()
    ]);

    for summary in rows {
        let marker = if summary.selected { "*" } else { "" };
        table.add_row(row![
            marker.green(),
            short_id(&summary.id, id_width).cyan(),
            summary.title,
            summary.message_count,
            summary.updated
        ]);
    }

    table
}

/// Print list rows as one table per recency bucket
pub fn print_thread_list(rows: &[ThreadSummary], display: &DisplayConfig) {
    if rows.is_empty() {
        println!("{}", "No conversations found.".yellow());
        return;
    }

    for bucket in RecencyBucket::ORDER {
        let members: Vec<&ThreadSummary> = rows.iter().filter(|r| r.bucket == bucket).collect();
        if members.is_empty() {
            continue;
        }
        println!("\n{}", bucket.label().bold());
        thread_table(&members, display.id_width).printstd();
    }
    println!();
}

/// One message as it appears in a transcript
pub fn format_message(message: &Message, now: DateTime<Utc>, date_format: &str) -> String {
    let speaker = match message.role {
        Role::User => "you".blue().bold(),
        Role::Assistant => "assistant".green().bold(),
    };
    let when = relative_label_with_format(&message.timestamp, now, date_format);
    format!("{} {}\n{}", speaker, format!("({})", when).dimmed(), message.content)
}

/// Print a thread header followed by its messages
pub fn print_thread(thread: &Thread, display: &DisplayConfig, now: DateTime<Utc>) {
    println!(
        "\n{} {}",
        thread.title.bold(),
        format!("[{}]", thread.id).cyan()
    );
    println!(
        "{}",
        format!(
            "{} messages, updated {}",
            thread.messages.len(),
            relative_label_with_format(&thread.updated_at, now, &display.date_format)
        )
        .dimmed()
    );

    if thread.messages.is_empty() {
        println!("\n{}", "No messages yet.".yellow());
    }
    for message in &thread.messages {
        println!("\n{}", format_message(message, now, &display.date_format));
    }
    println!();
}

/// Pretty JSON for machine-readable output
///
/// # Errors
///
/// Returns `ChatshelfError::Serialization` if serialization fails
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ChatshelfError::Serialization(e).into())
}
