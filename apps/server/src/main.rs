//! Homework Bot - status relay
//!
//! Polls the Practicum homework API and relays review status changes to a
//! single Telegram chat.

mod config;
mod poller;

use clap::Parser;
use config::{AppConfig, ConfigError, Credentials, PollingSettings};
use homework_alerts::{Notifier, TelegramBot};
use homework_api::{PracticumClient, DEFAULT_ENDPOINT};
use poller::Poller;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Homework Bot CLI
#[derive(Parser, Debug)]
#[command(name = "homework-bot")]
#[command(about = "Relays homework review status changes to Telegram", long_about = None)]
struct Args {
    /// Seconds to sleep between two status polls
    #[arg(long, env = "RETRY_PERIOD", default_value_t = 600, value_parser = clap::value_parser!(u64).range(1..))]
    retry_period: u64,

    /// Timeout in seconds for every HTTP request
    #[arg(long, env = "REQUEST_TIMEOUT", default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    request_timeout: u64,

    /// Homework status API endpoint
    #[arg(long, env = "PRACTICUM_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Log file, opened in append mode
    #[arg(long, env = "LOG_FILE", default_value = "main.log")]
    log_file: PathBuf,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn polling_settings(&self) -> PollingSettings {
        PollingSettings {
            endpoint: self.endpoint.clone(),
            retry_period: Duration::from_secs(self.retry_period),
            request_timeout: Duration::from_secs(self.request_timeout),
        }
    }
}

const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => LevelFilter::INFO,
    }
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Log to stdout and, if it can be opened, to `log_file`.
/// `RUST_LOG` overrides `level`. The returned error only concerns the file.
fn init_logging(level: &str, log_file: &Path) -> std::io::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(parse_level(level).into())
        .from_env_lossy();

    let stdout_layer = fmt::layer()
        .with_timer(ChronoLocal::new(LOG_TIME_FORMAT.to_string()))
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stdout);

    let (file_layer, file_result) = match open_log_file(log_file) {
        Ok(file) => {
            let layer = fmt::layer()
                .with_ansi(false)
                .with_timer(ChronoLocal::new(LOG_TIME_FORMAT.to_string()))
                .with_target(true)
                .with_line_number(true)
                .with_writer(Mutex::new(file));
            (Some(layer), Ok(()))
        }
        Err(e) => (None, Err(e)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    file_result
}

/// Validate credentials and build the loop. Nothing is polled here.
fn startup(
    args: &Args,
    credentials: Result<Credentials, ConfigError>,
) -> Result<Poller, ConfigError> {
    info!("Checking required credentials");
    let config = AppConfig::new(credentials?, args.polling_settings());

    let client = PracticumClient::new(config.client_config())?;
    let bot = TelegramBot::new(&config.telegram_config())?;
    let notifier = Notifier::new(Arc::new(bot), config.credentials.telegram_chat_id.clone());

    Ok(Poller::new(
        Arc::new(client),
        notifier,
        config.polling.retry_period,
    ))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    if let Err(e) = init_logging(&args.log_level, &args.log_file) {
        warn!(
            path = %args.log_file.display(),
            error = %e,
            "Log file unavailable, logging to stdout only"
        );
    }

    info!("Homework bot starting...");
    info!("  Endpoint: {}", args.endpoint);
    info!("  Retry period: {} seconds", args.retry_period);
    info!("  Request timeout: {} seconds", args.request_timeout);

    let poller = match startup(&args, Credentials::from_env()) {
        Ok(poller) => poller,
        Err(e) => {
            error!(severity = "CRITICAL", error = %e, "Startup failed, bot stopped");
            return ExitCode::FAILURE;
        }
    };

    poller.announce_start().await;
    poller.run().await;

    ExitCode::SUCCESS
}
