//! # Cellular Logger
//!
//! Logs LTE link parameters or GNSS fixes from a cellular modem and uploads
//! them to a REST server.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

use cellular_logger::app::App;
use cellular_logger::config::{AppMode, Config, LoggingConfig};
use cellular_logger::modem::SimulatedModem;
use cellular_logger::rest::RestClient;

/// File name prefix of the daily log files
const LOG_FILE_NAME: &str = "cellular-logger.log";

/// Grace period for blocking tasks when the runtime shuts down
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// cellular-logger command line arguments
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(
        short,
        long,
        default_value = "config/default.toml",
        env = "CELLULAR_LOGGER_CONFIG"
    )]
    config: PathBuf,

    /// Override the configured logging mode
    #[arg(short, long, value_enum)]
    mode: Option<AppMode>,
}

/// Installs the tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level. With a log
/// directory configured, output is also written to a daily rolling file;
/// the returned guard flushes it on drop.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.log_dir.is_empty() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_NAME);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout.and(file_writer))
        .init();

    Some(guard)
}

/// Runs the logging loop until Ctrl+C
async fn run(config: Config) -> Result<()> {
    let transport = RestClient::new(&config.rest).context("Failed to create REST client")?;
    let modem = SimulatedModem::new(config.simulator.clone());
    let mut app = App::new(config, modem, transport);

    info!("Press Ctrl+C to exit");

    app.run(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down..."),
            Err(e) => error!("Failed to listen for Ctrl+C ({}), shutting down...", e),
        }
    })
    .await;

    Ok(())
}

/// Main entry point for Cellular Logger
///
/// # Control Flow
///
/// 1. Parse arguments and load configuration
/// 2. Set up logging
/// 3. Run logging cycles until Ctrl+C
/// 4. Shut the runtime down, abandoning a data wait an interrupted cycle
///    left on the blocking pool
///
/// # Errors
///
/// Returns error if the configuration cannot be loaded, the runtime cannot
/// be started or the HTTP client cannot be created.
///
/// # Examples
///
/// ```bash
/// cargo run --release -- --config config/default.toml --mode gnss
/// ```
fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config).with_context(|| {
        format!("Failed to load configuration from {}", args.config.display())
    })?;
    if let Some(mode) = args.mode {
        config.app.mode = mode;
    }

    let _log_guard = init_logging(&config.logging);

    info!("Cellular Logger v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from {}", args.config.display());

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let result = runtime.block_on(run(config));
    runtime.shutdown_timeout(SHUTDOWN_TIMEOUT);

    result
}
