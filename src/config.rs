use serde::Deserialize;
use std::{fs, path::Path, time::Duration};

use crate::errors::ConfigError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// HTTP port to listen on.
    pub port: u16,

    /// Log level for tracing (e.g. "info", "debug").
    pub log_level: String,

    /// Path to the snapshot JSON file.
    pub snapshot_path: String,

    /// Interval (seconds) between automatic snapshot saves.
    pub snapshot_interval: u64,

    pub server_version: String,

    /// Upper bound (milliseconds) for a single get/put/list against the store.
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
}

fn default_store_timeout_ms() -> u64 {
    2000
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let file = fs::read_to_string(path)?;
        Self::from_json(&file)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str::<AppConfig>(text)?)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}
