mod commands;
mod oura;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use sleepcal_core::config::SleepcalConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sleepcal")]
#[command(about = "Export your Oura sleep sessions to an iCalendar file")]
struct Cli {
    /// Config file to use instead of ~/.config/sleepcal/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch sleep sessions and add the new ones to the calendar file
    Sync {
        /// Fetch sessions from this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Fetch sessions until this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Number of days to fetch when --from isn't given
        #[arg(long)]
        days_back: Option<i64>,

        /// Calendar file to write
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip sessions with less time in bed than this many minutes
        #[arg(long)]
        min_duration: Option<i64>,

        /// Read sessions from a JSON file instead of the Oura API
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// List the events in the calendar file
    Events {
        /// Calendar file to read
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show config paths and the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Sync {
            from,
            to,
            days_back,
            output,
            min_duration,
            input,
        } => {
            let args = commands::sync::SyncArgs {
                from,
                to,
                days_back,
                output,
                min_duration,
                input,
            };
            commands::sync::run(&config, args).await
        }
        Commands::Events { output } => commands::events::run(&config, output),
        Commands::Config => commands::config::run(&config, cli.config.as_deref()),
    }
}

/// Log to stderr, filtered by RUST_LOG (warnings only by default)
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<SleepcalConfig> {
    let config = match path {
        Some(path) => SleepcalConfig::load_from(path),
        None => SleepcalConfig::load(),
    };
    config.map_err(|e| anyhow::anyhow!(e))
}
