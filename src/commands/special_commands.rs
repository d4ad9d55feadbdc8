//! Special commands parser for interactive chat mode
//!
//! This module parses the slash commands that can be entered during an
//! interactive session. Special commands allow users to:
//! - Start, list, select and delete threads
//! - Rename the current thread
//! - Reprint the current thread
//! - Exit the session
//!
//! Commands are prefixed with `/`. The command word is case-insensitive;
//! arguments keep their case.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an argument it does not take
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
///
/// These commands act on the session rather than being sent as a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Start a new thread and switch to it
    NewThread,

    /// Show all threads grouped by recency
    ListThreads,

    /// Switch to the thread with this id or id prefix
    SelectThread(String),

    /// Give the current thread a new title
    RenameThread(String),

    /// Delete a thread; the current one when no id is given
    DeleteThread(Option<String>),

    /// Reprint the current thread's messages
    ShowThread,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be sent as a message.
    None,
}

/// Parse a user input string into a special command
///
/// # Returns
///
/// Returns Ok(SpecialCommand) for valid commands or SpecialCommand::None for
/// plain messages.
///
/// # Errors
///
/// Returns CommandError::UnknownCommand if input starts with "/" but is not a valid command.
/// Returns CommandError::UnsupportedArgument if a command receives an argument it does not take.
/// Returns CommandError::MissingArgument if a command requires an argument but none was provided.
///
/// # Examples
///
/// ```
/// use chatshelf::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/rename Vectors, week 2").unwrap();
/// assert_eq!(cmd, SpecialCommand::RenameThread("Vectors, week 2".to_string()));
///
/// let cmd = parse_special_command("hello tutor").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if lower == "exit" || lower == "quit" {
        return Ok(SpecialCommand::Exit);
    }
    if !trimmed.starts_with('/') {
        return Ok(SpecialCommand::None);
    }

    let (word, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word.to_lowercase(), rest.trim()),
        None => (lower, ""),
    };

    let no_arg = |command: SpecialCommand| {
        if arg.is_empty() {
            Ok(command)
        } else {
            Err(CommandError::UnsupportedArgument {
                command: word.clone(),
                arg: arg.to_string(),
            })
        }
    };
    let required = |usage: &str| {
        if arg.is_empty() {
            Err(CommandError::MissingArgument {
                command: word.clone(),
                usage: usage.to_string(),
            })
        } else {
            Ok(arg.to_string())
        }
    };

    match word.as_str() {
        "/new" => no_arg(SpecialCommand::NewThread),
        "/list" | "/threads" => no_arg(SpecialCommand::ListThreads),
        "/select" | "/open" => required("/select <id>").map(SpecialCommand::SelectThread),
        "/rename" | "/title" => required("/rename <title>").map(SpecialCommand::RenameThread),
        "/delete" => Ok(SpecialCommand::DeleteThread(
            (!arg.is_empty()).then(|| arg.to_string()),
        )),
        "/show" => no_arg(SpecialCommand::ShowThread),
        "/help" | "/?" => no_arg(SpecialCommand::Help),
        "/exit" | "/quit" => no_arg(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(word.clone())),
    }
}

/// Display help text for special commands
///
/// # Examples
///
/// ```
/// use chatshelf::commands::special_commands::print_help;
///
/// print_help();
/// ```
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat Mode
===========================================

THREADS:
  /new            - Start a new thread and switch to it
  /list           - Show all threads grouped by recency
  /threads        - Same as /list
  /select <id>    - Switch to a thread (a unique id prefix is enough)
  /rename <title> - Rename the current thread
  /delete [id]    - Delete a thread (the current one when no id is given)
  /show           - Reprint the current thread

SESSION CONTROL:
  /help           - Show this help message
  /?              - Same as /help
  exit            - Exit interactive mode
  quit            - Same as exit

NOTES:
  - Command names are case-insensitive
  - Regular text (not starting with /) is sent as a message
  - The first message of an empty thread becomes its title
"#
    );
}
