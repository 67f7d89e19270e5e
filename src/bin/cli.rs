//! AoC leaderboard notifier CLI
//!
//! Polls a private leaderboard and posts changes to Telegram chats.

use std::path::{Path, PathBuf};

use aoc_notifier::{
    error::{AppError, Result},
    models::{Config, Leaderboard},
    pipeline::{self, Poller, ReportOptions},
    services::{LeaderboardClient, TelegramNotifier},
    utils::http,
};
use clap::{Parser, Subcommand};

/// AoC notifier - leaderboard change reports
#[derive(Parser, Debug)]
#[command(
    name = "aoc-notifier",
    version,
    about = "Advent of Code private leaderboard notifier"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll the leaderboard forever
    Run,

    /// Run a single fetch/compare/notify cycle
    Once,

    /// Validate configuration
    Validate,

    /// Render a leaderboard JSON file, or a diff against a previous one
    Render {
        /// Leaderboard JSON to render
        board: PathBuf,

        /// Older leaderboard JSON; renders a diff when given
        #[arg(long)]
        previous: Option<PathBuf>,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Build the poller with HTTP collaborators sharing one client.
fn build_poller(config: &Config) -> Result<Poller<LeaderboardClient, TelegramNotifier>> {
    let url = config
        .source
        .leaderboard_url
        .as_deref()
        .ok_or_else(|| AppError::config("source.leaderboard_url is not set"))?;

    let client = http::create_async_client(&config.source)?;
    let source = LeaderboardClient::new(client.clone(), url, config.source.session_id.clone())?;
    let notifier = TelegramNotifier::from_config(&config.telegram, client);

    log::info!("Polling {}", source.url());
    Ok(Poller::new(config, source, notifier))
}

fn read_board(path: &Path) -> Result<Leaderboard> {
    let bytes = std::fs::read(path)?;
    Leaderboard::from_slice(&bytes)
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // Loading logs nothing and fails loudly, so the level can come from the file
    let config = Config::from_sources(&cli.config)?;
    init_logging(cli.verbose, &config.logging.level);

    if !cli.config.exists() {
        log::warn!(
            "Config file {} not found; using defaults and environment",
            cli.config.display()
        );
    }

    match cli.command {
        Command::Run => {
            config.validate()?;
            log::info!("Current pid={}", std::process::id());

            let mut poller = build_poller(&config)?;
            if let Err(e) = poller.restore().await {
                log::warn!("Unable to restore previous leaderboard: {}", e);
            }
            poller.run_forever().await;
        }

        Command::Once => {
            config.validate()?;

            let mut poller = build_poller(&config)?;
            poller.restore().await?;
            let outcome = poller.run_once().await?;
            log::info!("Cycle finished: {}", outcome);
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK (interval {}s, {} chats)",
                config.polling.interval_secs,
                config.telegram.chats.len()
            );
        }

        Command::Render { board, previous } => {
            config.report.validate()?;
            let options = ReportOptions::from_config(&config.report);
            let current = read_board(&board)?;

            let text = match previous {
                Some(path) => {
                    let old = read_board(&path)?;
                    pipeline::render_diff(&pipeline::compute_diff(&current, &old), &options)
                }
                None => pipeline::render_board(&current, &options),
            };
            println!("{text}");
        }
    }

    Ok(())
}
