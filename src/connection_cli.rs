// src/connection_cli.rs
use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::core::AppConfig;
use crate::store::{ConnectionStore, JobStore};
use crate::utils::mask_token;

#[derive(Parser)]
#[command(name = "hris-connect")]
#[command(about = "Connect HR providers and browse their data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the web server (default)
    Serve,
    /// Manage stored provider connections
    Connections {
        #[command(subcommand)]
        action: ConnectionCommand,
    },
    /// Inspect recorded sync jobs
    Jobs {
        #[command(subcommand)]
        action: JobCommand,
    },
}

#[derive(Subcommand)]
pub enum ConnectionCommand {
    /// List stored connections
    List,
    /// Make a connection the active one
    Activate { connection_id: String },
    /// Forget a connection and its token
    Remove { connection_id: String },
}

#[derive(Subcommand)]
pub enum JobCommand {
    /// List recorded jobs
    List {
        /// Only jobs of this connection
        #[arg(long)]
        connection: Option<String>,
    },
}

pub async fn handle_connection_command(config: &AppConfig, action: ConnectionCommand) -> Result<()> {
    let store = ConnectionStore::new(config.tokens_path());

    match action {
        ConnectionCommand::List => {
            let rows = store.all().await?;
            if rows.is_empty() {
                info!("No connections stored in {}", store.path().display());
                return Ok(());
            }
            let active_id = crate::store::connections::pick_active(&rows)
                .map(|row| row.connection_id.clone());

            for row in &rows {
                let marker = if active_id.as_deref() == Some(row.connection_id.as_str()) {
                    "*"
                } else {
                    " "
                };
                info!(
                    "{} {}  provider={}  products={}  token={}",
                    marker,
                    row.connection_id,
                    row.provider_id.as_deref().unwrap_or("-"),
                    row.products.join("|"),
                    mask_token(&row.access_token)
                );
            }
        }

        ConnectionCommand::Activate { connection_id } => {
            if store.set_active(&connection_id).await? {
                info!("Active connection: {}", connection_id);
            } else {
                warn!("No stored connection with id {}", connection_id);
            }
        }

        ConnectionCommand::Remove { connection_id } => {
            if store.remove(&connection_id).await? {
                info!("Removed connection: {}", connection_id);
            } else {
                warn!("No stored connection with id {}", connection_id);
            }
        }
    }

    Ok(())
}

pub async fn handle_job_command(config: &AppConfig, action: JobCommand) -> Result<()> {
    let store = JobStore::new(config.jobs_path());

    match action {
        JobCommand::List { connection } => {
            let jobs = match connection.as_deref() {
                Some(connection_id) => store.for_connection(connection_id).await?,
                None => store.all().await?,
            };
            if jobs.is_empty() {
                info!("No jobs recorded in {}", store.path().display());
            }
            for job in &jobs {
                info!(
                    "{}  connection={}  type={}  status={}  created={}",
                    job.job_id,
                    job.connection_id,
                    job.job_type,
                    job.status,
                    job.created_at.to_rfc3339()
                );
            }
        }
    }

    Ok(())
}
