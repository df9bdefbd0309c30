// src/core/config_manager.rs
//! Configuration loading: `.env.local`, optional `config.yaml`, environment

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "https://api.tryfinch.com";
pub const DEFAULT_API_VERSION: &str = "2020-09-17";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const TOKENS_FILE: &str = "tokens.csv";
const JOBS_FILE: &str = "jobs.csv";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub data_dir: PathBuf,
    pub port: u16,
    pub log_file: Option<PathBuf>,
    pub finch: FinchSettings,
}

#[derive(Debug, Clone)]
pub struct FinchSettings {
    pub api_base_url: String,
    pub api_version: String,
    pub timeout_seconds: u64,
    pub credentials: Option<ClientCredentials>,
}

#[derive(Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// One section of `config.yaml`. Every key is optional.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileSection {
    pub data_dir: Option<PathBuf>,
    pub port: Option<u16>,
    pub api_base_url: Option<String>,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: FileSection,
    #[serde(default)]
    production: FileSection,
}

impl AppConfig {
    /// Load from `.env.local`, `config.yaml` (if present) and the process
    /// environment, in increasing order of precedence.
    pub fn load() -> Result<Self> {
        dotenv::from_filename(".env.local").ok();
        dotenv::dotenv().ok();

        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "local".to_string());

        let section = Self::load_file_section(Path::new("config.yaml"), &environment)?;
        let config = Self::from_sources(environment, section, |key| std::env::var(key).ok())?;
        config.resolve_paths()
    }

    fn load_file_section(path: &Path, environment: &str) -> Result<FileSection> {
        if !path.exists() {
            return Ok(FileSection::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file: ConfigFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(match environment {
            "production" => file.production,
            _ => file.local,
        })
    }

    /// Merge a file section with variables looked up through `var`.
    pub fn from_sources<F>(environment: String, section: FileSection, var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match var("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid port number, got {}", raw))?,
            None => section.port.unwrap_or(DEFAULT_PORT),
        };

        let timeout_seconds = match var("FINCH_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("FINCH_TIMEOUT_SECS must be a number, got {}", raw))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let credentials = match (var("CLIENT_ID"), var("CLIENT_SECRET"), var("REDIRECT_URI")) {
            (Some(client_id), Some(client_secret), Some(redirect_uri)) => Some(ClientCredentials {
                client_id,
                client_secret,
                redirect_uri,
            }),
            _ => None,
        };

        Ok(Self {
            environment,
            data_dir: var("DATA_DIR")
                .map(PathBuf::from)
                .or(section.data_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
            port,
            log_file: var("LOG_FILE").map(PathBuf::from).or(section.log_file),
            finch: FinchSettings {
                api_base_url: var("FINCH_API_URL")
                    .or(section.api_base_url)
                    .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                api_version: var("FINCH_API_VERSION")
                    .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
                timeout_seconds,
                credentials,
            },
        })
    }

    fn resolve_paths(mut self) -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        if self.data_dir.is_relative() {
            self.data_dir = current_dir.join(&self.data_dir);
        }
        if let Some(log_file) = self.log_file.as_mut() {
            if log_file.is_relative() {
                *log_file = current_dir.join(&*log_file);
            }
        }
        Ok(self)
    }

    /// Credentials are only needed by the Connect routes; fail with a clear
    /// message when they are missing.
    pub fn credentials(&self) -> Result<&ClientCredentials> {
        self.finch.credentials.as_ref().ok_or_else(|| {
            anyhow::anyhow!("CLIENT_ID, CLIENT_SECRET and REDIRECT_URI must all be set")
        })
    }

    pub fn tokens_path(&self) -> PathBuf {
        self.data_dir.join(TOKENS_FILE)
    }

    pub fn jobs_path(&self) -> PathBuf {
        self.data_dir.join(JOBS_FILE)
    }

    pub async fn ensure_directories(&self) -> Result<()> {
        crate::core::FsOps::ensure_dir_exists(&self.data_dir).await
    }
}
