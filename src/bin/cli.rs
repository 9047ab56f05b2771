//! adwatch CLI
//!
//! Long-running monitor entry point.

use std::path::PathBuf;

use adwatch::{
    error::Result,
    models::{Config, Secrets},
    pipeline::{DedupTracker, Monitor},
    services::{ChromeRenderer, TelegramNotifier},
    storage::{self, SentIdStore},
};
use clap::{Parser, Subcommand};
use tokio::sync::watch;

/// adwatch - classifieds monitor with Telegram delivery
#[derive(Parser, Debug)]
#[command(
    name = "adwatch",
    version,
    about = "Watches classifieds listings and forwards new matching ads to Telegram"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "adwatch.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Poll until interrupted
    Run,

    /// Run a single poll cycle and exit
    Once,

    /// Validate configuration and required environment
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Flip the shutdown flag on Ctrl-C.
fn spawn_interrupt_listener() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                log::info!("Interrupt received, stopping after the current step");
                let _ = tx.send(true);
            }
            Err(e) => log::warn!("Cannot listen for Ctrl-C: {e}"),
        }
    });
    rx
}

async fn monitor(
    command: Command,
    config: &Config,
    renderer: &ChromeRenderer,
    notifier: &TelegramNotifier,
    store: &dyn SentIdStore,
) -> Result<()> {
    let mut tracker = DedupTracker::load(store).await?;
    let monitor = Monitor::new(config, renderer, notifier, store)?;

    let mut shutdown = spawn_interrupt_listener();

    if command == Command::Once {
        tokio::select! {
            result = monitor.run_once(&mut tracker) => {
                result?;
            }
            Ok(_) = shutdown.wait_for(|stop| *stop) => {
                log::info!("Interrupted, abandoning the cycle");
            }
        }
        return Ok(());
    }

    monitor.run(&mut tracker, shutdown).await
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("adwatch starting...");

    let config = Config::load_or_default(&cli.config)?;
    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {e}");
        return Err(e);
    }
    let secrets = Secrets::from_env()?;

    if cli.command == Command::Validate {
        log::info!("✓ Config OK ({} source(s))", config.sources.len());
        log::info!("✓ Environment OK");
        return Ok(());
    }

    let store = storage::open(&secrets.database_url).await?;
    store.ensure_schema().await?;

    let notifier = TelegramNotifier::new(&config.notifier, secrets.bot_token, secrets.chat_id)?;

    let renderer = ChromeRenderer::launch(&config.renderer).await?;
    let result = monitor(cli.command, &config, &renderer, &notifier, store.as_ref()).await;
    renderer.shutdown().await;

    match &result {
        Ok(()) => log::info!("Done!"),
        Err(e) => log::error!("Monitor stopped: {e}"),
    }
    result
}
