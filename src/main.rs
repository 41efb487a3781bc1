//! Command-line entry point.
//!
//! A thin wrapper around the `geopulse` library: argument parsing, `.env`
//! loading, logger initialization, and user-facing output. All core
//! functionality lives in the library crate.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use geopulse::logging::init_logger_with;
use geopulse::refresh::UnconfiguredRefresher;
use geopulse::{Config, FreshnessScheduler, GeoPulse, LogFormat, LogLevel};

#[derive(Parser)]
#[command(name = "geopulse", about = "IP-to-country/currency lookups over refreshable range datasets", version)]
struct Cli {
    /// Directory holding the dataset, rate, and metadata files
    #[arg(long, default_value = "./geopulse_data")]
    data_dir: PathBuf,

    /// Directory to copy dataset files from on refresh
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// Refresh period in minutes (minimum 1)
    #[arg(long, default_value_t = 24 * 60)]
    refresh_period: i64,

    /// Disable the periodic due-check in `watch` mode
    #[arg(long)]
    no_auto_refresh: bool,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve an IP address and print the result as JSON
    Lookup {
        /// The IPv4 or IPv6 address to resolve
        ip: String,

        /// Base currency for the exchange rate
        #[arg(long, default_value = "USD")]
        base_currency: String,
    },
    /// Run one refresh immediately
    Refresh {
        /// Fetch only dataset files that are absent locally
        #[arg(long)]
        only_missing: bool,
    },
    /// Run the freshness scheduler until Ctrl-C
    Watch,
}

impl Cli {
    fn into_parts(self) -> (Config, Command) {
        let config = Config {
            data_dir: self.data_dir,
            source_dir: self.source_dir,
            refresh_period_minutes: self.refresh_period,
            auto_refresh: !self.no_auto_refresh,
            log_level: self.log_level,
            log_format: self.log_format,
            ..Default::default()
        };
        (config, self.command)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Allow GEOPULSE_* settings from a .env file next to the working directory
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let log_level = cli.log_level.clone();
    let log_format = cli.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    let (config, command) = cli.into_parts();
    match run(config, command).await {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("geopulse error: {e:#}");
            process::exit(1);
        }
    }
}

async fn run(config: Config, command: Command) -> Result<()> {
    let service = Arc::new(if config.source_dir.is_some() {
        GeoPulse::with_local_source(config)?
    } else {
        GeoPulse::new(config, Arc::new(UnconfiguredRefresher))?
    });

    match command {
        Command::Lookup { ip, base_currency } => {
            match service.lookup(&ip, Some(&base_currency)).await {
                Some(result) => println!("{}", serde_json::to_string_pretty(&result)?),
                None => {
                    eprintln!("no match for {ip}");
                    process::exit(1);
                }
            }
        }
        Command::Refresh { only_missing } => {
            service.refresh(only_missing).await?;
            println!("refresh completed");
        }
        Command::Watch => {
            let scheduler = FreshnessScheduler::new(Arc::clone(&service))?;
            let cancel = CancellationToken::new();

            let loop_token = cancel.clone();
            let handle = tokio::spawn(async move { scheduler.run(loop_token).await });

            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for Ctrl-C")?;
            cancel.cancel();
            let _ = handle.await;
        }
    }
    Ok(())
}
