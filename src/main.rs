use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use std::sync::mpsc;
use std::time::Duration;

use multiclip::clipboard::{self, ClipboardSource};
use multiclip::engine::HistoryEngine;
use multiclip::logging;
use multiclip::watch::{self, WatchExit};
use multiclip::storage::{Config, ConfigStorage, TomlConfigStorage, ensure_directories};

/// Characters of each clip shown in the history listing
const LIST_PREVIEW_CHARS: usize = 60;

#[derive(Parser)]
#[command(name = "multiclip")]
#[command(about = "Clipboard history manager", long_about = None)]
struct Cli {
    /// Use an in-memory clipboard instead of the system clipboard
    #[arg(long, global = true)]
    headless: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Monitor the clipboard and print the history periodically
    Watch {
        /// Number of entries to keep (overrides config)
        #[arg(short, long)]
        max_history: Option<usize>,

        /// Seconds between history printouts
        #[arg(short, long, default_value = "10")]
        print_every: u64,

        /// Stop after this many seconds (run until Ctrl+C if absent)
        #[arg(short, long)]
        duration: Option<u64>,
    },

    /// Read the clipboard once and print it
    Peek,

    /// Show the config file path and effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (data_dir, config_dir) = ensure_directories()?;
    let config_storage = TomlConfigStorage::new(config_dir.join("multiclip.toml"));
    let config = config_storage.load()?;

    if let Err(e) = logging::init_logger(
        &data_dir.join("multiclip.log"),
        &config.logging.file_level,
        &config.logging.console_level,
    ) {
        env_logger::init();
        log::warn!("File logging unavailable, using env_logger: {:#}", e);
    }

    let headless = cli.headless || config.general.headless;

    match cli.command {
        Commands::Watch {
            max_history,
            print_every,
            duration,
        } => cmd_watch(&config, headless, max_history, print_every, duration),
        Commands::Peek => cmd_peek(headless),
        Commands::Config => cmd_config(&config_storage, &config),
    }
}

/// Run the monitor and print history until Ctrl+C or the duration elapses
fn cmd_watch(
    config: &Config,
    headless: bool,
    max_history: Option<usize>,
    print_every: u64,
    duration: Option<u64>,
) -> Result<()> {
    let mut settings = config.engine_settings()?;
    if let Some(max) = max_history {
        settings.max_history = max;
    }

    let source = clipboard::create_source(headless);
    let engine = HistoryEngine::with_settings(source, settings)
        .context("Failed to create history engine")?;
    engine
        .start_monitoring()
        .context("Failed to start clipboard monitor")?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(());
    })
    .context("Failed to install Ctrl+C handler")?;

    println!("Clipboard monitor started. Copy text to see history updates.");
    println!("Press Ctrl+C to stop.");

    let (exit, stats) = watch::run_watch(
        &engine,
        &shutdown_rx,
        Duration::from_secs(print_every.max(1)),
        duration.map(Duration::from_secs),
        print_history,
    );

    if exit == WatchExit::Interrupted {
        println!("\nCtrl+C detected. Clipboard monitor stopped.");
    }
    log::info!(
        "Monitor finished: {} polls, {} failures, {} cooldowns, {} clips recorded",
        stats.polls,
        stats.read_failures,
        stats.cooldowns,
        stats.insertions
    );

    Ok(())
}

fn print_history(engine: &HistoryEngine) {
    println!("\n----- Current History (Latest First) -----");

    let history = engine.get_history();
    if history.is_empty() {
        println!("-- Empty --");
    }

    for (i, entry) in history.iter().enumerate() {
        let captured: DateTime<Local> = entry.timestamp.into();
        println!(
            "#{}: [{}] {}",
            i + 1,
            captured.format("%H:%M:%S"),
            entry.preview(LIST_PREVIEW_CHARS)
        );
    }

    println!("-------------------------------------------");
}

/// Print the current clipboard content once
fn cmd_peek(headless: bool) -> Result<()> {
    let source = clipboard::create_source(headless);
    let text = source
        .read_text()
        .with_context(|| format!("Failed to read {} clipboard", source.name()))?;

    if multiclip::models::clip::is_blank(&text) {
        println!("-- Empty --");
    } else {
        println!("{}", text);
    }

    Ok(())
}

/// Show configuration
fn cmd_config(storage: &TomlConfigStorage, config: &Config) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("Failed to serialize configuration")?;

    println!("Config file: {}", storage.path().display());
    println!("{}", "=".repeat(60));
    print!("{}", rendered);

    Ok(())
}
