//! Minion CLI — the main entry point.
//!
//! Commands:
//! - `run`      — Build today's digest and deliver it
//! - `check`    — Validate the topic file without calling any backend
//! - `history`  — Inspect or reset the dedup history
//! - `doctor`   — Diagnose configuration and connectivity

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "minion",
    about = "Minion — a personal daily digest assembled by content agents",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ~/.minion/config.toml)
    #[arg(short, long, global = true, env = "MINION_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the digest and deliver it
    Run {
        /// Topic file (overrides `topics_path`)
        #[arg(short, long)]
        topics: Option<PathBuf>,

        /// Print to stdout instead of delivering; history is left untouched
        #[arg(long)]
        dry_run: bool,
    },

    /// Parse the topic file and list its agents
    Check {
        /// Topic file (overrides `topics_path`)
        #[arg(short, long)]
        topics: Option<PathBuf>,
    },

    /// Inspect or reset the dedup history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Diagnose system health
    Doctor,
}

#[derive(Subcommand)]
enum HistoryAction {
    /// Show what has already been sent
    Show,
    /// Forget everything (problems and references may repeat)
    Reset,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Run { topics, dry_run } => commands::run::run(config, topics, dry_run).await?,
        Commands::Check { topics } => commands::check::run(config, topics)?,
        Commands::History { action } => match action {
            HistoryAction::Show => commands::history::show(config).await?,
            HistoryAction::Reset => commands::history::reset(config)?,
        },
        Commands::Doctor => commands::doctor::run(config).await?,
    }

    Ok(())
}
