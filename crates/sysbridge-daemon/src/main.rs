//! System Bridge Daemon
//!
//! Collects host telemetry each cycle and writes one JSON record per line to
//! stdout. Logs go to stderr.

mod collector;
mod config;
mod sensors;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use collector::Collector;
use config::Config;
use sensors::data::TelemetryRecord;

#[derive(Parser)]
#[command(name = "sysbridged")]
#[command(about = "Host telemetry daemon")]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(default_value = "config/default.toml")]
    config: PathBuf,

    /// Collect a single record and exit
    #[arg(long)]
    once: bool,

    /// Pretty-print records
    #[arg(long)]
    pretty: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    dump_config: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .init();

    // Load configuration
    let config = Config::load_or_default(&cli.config).context("Failed to load configuration")?;
    info!("Loaded configuration from: {}", cli.config.display());

    if cli.dump_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let mut collector = Collector::new(&config);

    if cli.once {
        let record = collector.collect().await;
        return emit(&record, cli.pretty);
    }

    let mut ticker = tokio::time::interval(config.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // Setup Unix signal handlers
    #[cfg(unix)]
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    info!("Collecting every {:?}", config.interval());
    loop {
        #[cfg(unix)]
        let terminate = sigterm.recv();
        #[cfg(not(unix))]
        let terminate = std::future::pending::<Option<()>>();

        tokio::select! {
            _ = ticker.tick() => {
                let record = collector.collect().await;
                emit(&record, cli.pretty)?;
                debug!("Record emitted");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received interrupt, shutting down");
                break;
            }
            _ = terminate => {
                info!("Received SIGTERM, shutting down");
                break;
            }
        }
    }

    Ok(())
}

/// Writes one record as a JSON line.
fn emit(record: &TelemetryRecord, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(record)?
    } else {
        serde_json::to_string(record)?
    };
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", json).context("Failed to write record")?;
    stdout.flush().context("Failed to flush stdout")?;
    Ok(())
}
