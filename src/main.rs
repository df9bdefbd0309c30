use anyhow::{Context, Result};
use clap::Parser;
use hris_connect::connection_cli::{handle_connection_command, handle_job_command, Cli, Command};
use hris_connect::{start_web_server, AppConfig};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true) // Clear file on startup
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .json()
                    .with_writer(Mutex::new(file))
                    .with_current_span(false)
                    .with_span_list(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hris_connect=info,rocket=warn")),
        )
        .with(fmt::layer())
        .with(file_layer)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    init_logging(config.log_file.as_deref())?;
    info!("Configuration loaded for environment: {}", config.environment);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => start_web_server(config).await,
        Command::Connections { action } => handle_connection_command(&config, action).await,
        Command::Jobs { action } => handle_job_command(&config, action).await,
    }
}
