use anyhow::Context;
use std::{net::SocketAddr, path::PathBuf, time::Duration};

use crate::aggregate::AlertThresholds;

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_WARNING_PERCENT: u32 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: PathBuf,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub thresholds: AlertThresholds,
    pub log_format: LogFormat,
}

impl Config {
    /// Defaults for everything but the database location.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            db_path: db_path.into(),
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            thresholds: AlertThresholds::default(),
            log_format: LogFormat::Text,
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = env_or("EXPENSES_LISTEN_ADDR", DEFAULT_LISTEN_ADDR)
            .parse()
            .context("Invalid EXPENSES_LISTEN_ADDR")?;

        let db_path = match std::env::var("EXPENSES_DB_PATH") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_db_path()?,
        };

        let cors_allow = env_or("EXPENSES_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let timeout_ms: u64 =
            env_or("EXPENSES_REQUEST_TIMEOUT_MS", &DEFAULT_TIMEOUT_MS.to_string())
                .parse()
                .context("Invalid EXPENSES_REQUEST_TIMEOUT_MS")?;

        let warning_percent: u32 =
            env_or("EXPENSES_WARNING_PERCENT", &DEFAULT_WARNING_PERCENT.to_string())
                .parse()
                .context("Invalid EXPENSES_WARNING_PERCENT")?;
        let thresholds = AlertThresholds::from_percent(warning_percent)
            .context("Invalid EXPENSES_WARNING_PERCENT")?;

        let log_format = match env_or("EXPENSES_LOG_FORMAT", "text").to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "text" => LogFormat::Text,
            other => anyhow::bail!("Invalid EXPENSES_LOG_FORMAT '{other}': expected text or json"),
        };

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            thresholds,
            log_format,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn default_db_path() -> anyhow::Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "expensetrack", "ExpenseTrack")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.join("expensetrack.db"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
