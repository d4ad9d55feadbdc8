//! Chatshelf - local chat session manager
//!
#![doc = "Main entry point for the Chatshelf application."]

use anyhow::Result;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chatshelf::cli::{Cli, Commands};
use chatshelf::commands::{self, chat, threads};
use chatshelf::config::Config;
use chatshelf::responder::EchoSource;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    init_tracing(cli.verbose, cli.json_logs);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    let source = EchoSource;

    match cli.command {
        Commands::Chat => {
            tracing::info!("Starting interactive chat mode");
            chat::run_chat(config, &source).await?;
        }
        Commands::List { json } => {
            let store = commands::open_store(&config)?;
            threads::list_threads(&store, &config.display, json)?;
        }
        Commands::Show { id } => {
            let store = commands::open_store(&config)?;
            threads::show_thread(&store, &config.display, id.as_deref())?;
        }
        Commands::New { text } => {
            let mut store = commands::open_store(&config)?;
            threads::new_thread(&mut store, &source, &config.display, text.as_deref()).await?;
        }
        Commands::Rename { id, title } => {
            let mut store = commands::open_store(&config)?;
            threads::rename_thread(&mut store, &id, &title)?;
        }
        Commands::Delete { id } => {
            let mut store = commands::open_store(&config)?;
            threads::delete_thread(&mut store, &id)?;
        }
        Commands::Send { text, thread } => {
            let mut store = commands::open_store(&config)?;
            threads::send_message(&mut store, &source, &text, thread.as_deref()).await?;
        }
        Commands::Export { output } => {
            let store = commands::open_store(&config)?;
            threads::export_threads(&store, output.as_deref())?;
        }
    }

    Ok(())
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins over `--verbose`. Logs go to stderr so command output on
/// stdout stays machine-readable.
fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose {
        "chatshelf=debug"
    } else {
        "chatshelf=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
