//! Interactive shell for tabbed master data maintenance.
//!
//! Loads every tab from an in-memory demo store or a JSON data file, then
//! reads commands from stdin until `quit` or end of input.

mod commands;
mod shell;
mod terminal;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use master_maint_core::{EditorConfig, Persistence, TabSessionController};
use master_maint_store::{mock_dataset, JsonFilePersistence, MemoryPersistence};
use tracing_subscriber::EnvFilter;

use crate::shell::{Flow, Shell};
use crate::terminal::{ConsoleNotifier, StdinConfirmation};

/// Lowest id given to added records when no config file says otherwise.
const DEFAULT_MIN_ID: u64 = 100;

/// Command-line arguments for the editor shell.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML config file (tabs, initial tab, id floor, prompt text)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON data file; the in-memory demo store is used when omitted
    #[arg(short, long)]
    data_file: Option<PathBuf>,

    /// Write the demo dataset to the data file if it does not exist
    #[arg(long)]
    seed: bool,

    /// Artificial delay for the in-memory store, in milliseconds
    #[arg(long, default_value_t = 0)]
    latency_ms: u64,

    /// Lowest id given to added records (overrides the config file)
    #[arg(long)]
    min_id: Option<u64>,
}

fn load_config(args: &Args) -> anyhow::Result<EditorConfig> {
    let mut config = match &args.config {
        Some(path) => EditorConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EditorConfig {
            min_bootstrap_id: DEFAULT_MIN_ID,
            ..Default::default()
        },
    };
    if let Some(min_id) = args.min_id {
        config.min_bootstrap_id = min_id;
    }
    Ok(config)
}

fn create_persistence(args: &Args) -> Arc<dyn Persistence> {
    match &args.data_file {
        Some(path) => {
            let store = JsonFilePersistence::new(path);
            tracing::info!("Using data file {}", path.display());
            if args.seed {
                Arc::new(store.with_seed(mock_dataset()))
            } else {
                Arc::new(store)
            }
        }
        None => {
            let latency = Duration::from_millis(args.latency_ms);
            Arc::new(MemoryPersistence::seeded().with_latency(latency, latency))
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so they do not interleave with the tables
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&args)?;
    let confirmation = Arc::new(StdinConfirmation);
    let mut session = TabSessionController::new(
        config,
        create_persistence(&args),
        confirmation.clone(),
        Arc::new(ConsoleNotifier),
    )?;

    println!("読み込み中...");
    // A failed load has already been reported; the shell still starts
    if let Err(e) = session.load_all().await {
        tracing::debug!("Starting with unloaded tabs: {}", e);
    }

    let mut shell = Shell::new(session, confirmation, std::io::stdout());
    shell.execute(commands::Command::List).await?;

    loop {
        print!("{}", shell.prompt());
        std::io::stdout().flush()?;

        let Some(line) = terminal::read_line().await? else {
            println!();
            break;
        };
        let command = match commands::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };
        if shell.execute(command).await? == Flow::Quit {
            break;
        }
    }

    let unsaved = shell.session().store().dirty_tabs();
    if !unsaved.is_empty() {
        tracing::warn!("Exiting with {} unsaved tabs", unsaved.len());
    }
    Ok(())
}
