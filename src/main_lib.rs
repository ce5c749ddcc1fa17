use anyhow::Context;
use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::aggregate::AlertThresholds;
use crate::config::{Config, LogFormat};
use crate::db::Database;

pub struct AppState {
    pub db: Mutex<Database>,
    pub thresholds: AlertThresholds,
}

impl AppState {
    pub fn new(db: Database, thresholds: AlertThresholds) -> Arc<Self> {
        Arc::new(Self {
            db: Mutex::new(db),
            thresholds,
        })
    }
}

pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    if let Some(parent) = config.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let db = Database::open(&config.db_path)
        .with_context(|| format!("Failed to open database {}", config.db_path.display()))?;
    tracing::info!("Database path in use: {}", config.db_path.display());
    Ok(AppState::new(db, config.thresholds))
}
