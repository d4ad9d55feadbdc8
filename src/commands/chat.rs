//! Interactive chat mode handler
//!
//! Opens the session store once, then runs a readline loop. Slash commands
//! act on the session; any other input is sent as a message to the selected
//! thread.

use super::render::{print_thread, print_thread_list, short_id};
use super::special_commands::{parse_special_command, print_help, SpecialCommand};
use super::threads::target_thread_id;
use crate::config::{Config, DisplayConfig};
use crate::error::{ChatshelfError, Result};
use crate::presentation::summarize;
use crate::responder::{exchange, MessageSource};
use crate::session::{SessionStore, ThreadPatch};
use chrono::Utc;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// What the loop should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Interactive session state
pub struct ChatSession<'a> {
    store: SessionStore,
    source: &'a dyn MessageSource,
    display: DisplayConfig,
}

impl<'a> ChatSession<'a> {
    /// Wrap an initialized store
    pub fn new(store: SessionStore, source: &'a dyn MessageSource, display: DisplayConfig) -> Self {
        Self {
            store,
            source,
            display,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Prompt showing the selected thread's title
    pub fn prompt(&self) -> String {
        let title = self
            .store
            .selected_thread()
            .map(|t| t.title.as_str())
            .unwrap_or("no thread");
        format!("[{}] >> ", title.cyan())
    }

    /// Apply a special command to the session
    ///
    /// # Errors
    ///
    /// Returns error if the command names an unknown or ambiguous thread,
    /// or if the store rejects the mutation
    pub fn handle_command(&mut self, command: SpecialCommand) -> Result<Flow> {
        match command {
            SpecialCommand::NewThread => {
                let id = self.store.create_thread()?;
                println!(
                    "{}",
                    format!("Started new thread {}\n", short_id(&id, self.display.id_width))
                        .green()
                );
            }
            SpecialCommand::ListThreads => {
                let rows = summarize(
                    self.store.threads(),
                    self.store.selected_id(),
                    Utc::now(),
                    &self.display.date_format,
                );
                print_thread_list(&rows, &self.display);
            }
            SpecialCommand::SelectThread(id) => {
                let thread_id = self.store.resolve_id(&id)?;
                self.store.select_thread(&thread_id)?;
                self.show_selected();
            }
            SpecialCommand::RenameThread(title) => {
                let thread_id = target_thread_id(&self.store, None)?;
                self.store
                    .update_thread(&thread_id, ThreadPatch::title(title.as_str()))?;
                println!("{}", format!("Renamed to \"{}\"\n", title).green());
            }
            SpecialCommand::DeleteThread(id) => {
                let thread_id = target_thread_id(&self.store, id.as_deref())?;
                self.store.delete_thread(&thread_id)?;
                println!("{}", format!("Deleted conversation {}\n", thread_id).green());
            }
            SpecialCommand::ShowThread => self.show_selected(),
            SpecialCommand::Help => print_help(),
            SpecialCommand::Exit => return Ok(Flow::Exit),
            SpecialCommand::None => {}
        }
        Ok(Flow::Continue)
    }

    /// Send `text` to the selected thread and print the reply
    pub async fn send(&mut self, text: &str) -> Result<()> {
        let thread_id = target_thread_id(&self.store, None)?;
        let reply = exchange(&mut self.store, self.source, &thread_id, text).await?;
        println!("\n{}\n", reply.content);
        Ok(())
    }

    fn show_selected(&self) {
        if let Some(thread) = self.store.selected_thread() {
            print_thread(thread, &self.display, Utc::now());
        }
    }
}

/// Start interactive chat mode
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
/// * `source` - Producer of assistant replies
pub async fn run_chat(config: Config, source: &dyn MessageSource) -> Result<()> {
    let store = super::open_store(&config)?;
    let mut session = ChatSession::new(store, source, config.display.clone());

    let mut rl = DefaultEditor::new().map_err(ChatshelfError::Readline)?;

    print_welcome_banner(&session);

    loop {
        let prompt = session.prompt();
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(trimmed)
                    .map_err(ChatshelfError::Readline)?;

                match parse_special_command(trimmed) {
                    Ok(SpecialCommand::None) => {}
                    Ok(command) => {
                        match session.handle_command(command) {
                            Ok(Flow::Exit) => break,
                            Ok(Flow::Continue) => {}
                            Err(e) => eprintln!("{}\n", format!("Error: {:#}", e).red()),
                        }
                        continue;
                    }
                    Err(e) => {
                        eprintln!("{}\n", e.to_string().red());
                        continue;
                    }
                }

                if let Err(e) = session.send(trimmed).await {
                    eprintln!("{}\n", format!("Error: {:#}", e).red());
                }
            }
            Err(err) => {
                end_of_input(err)?;
                break;
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

/// Ctrl-C and Ctrl-D end the session; any other editor failure is an error
fn end_of_input(err: ReadlineError) -> Result<()> {
    match err {
        ReadlineError::Interrupted => println!("CTRL-C"),
        ReadlineError::Eof => println!("CTRL-D"),
        other => {
            tracing::error!("Readline error: {:?}", other);
            return Err(ChatshelfError::Readline(other).into());
        }
    }
    Ok(())
}

fn print_welcome_banner(session: &ChatSession<'_>) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║              Chatshelf Interactive Session                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!(
        "Threads: {}  Replies from: {}",
        session.store().threads().len(),
        session.source.name().cyan()
    );
    println!("Type '/help' for available commands, 'exit' to quit\n");
}
