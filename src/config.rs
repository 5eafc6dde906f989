//! Daemon configuration.
//!
//! A single JSON document; every field has a default so a minimal config
//! can be just `{}` with a `store_path`.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Config file path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The config file is not valid JSON for the expected shape.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        /// Config file path.
        path: Utf8PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },
}

/// Orchestrator daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Path of the JSON descriptor store document.
    pub store_path: Utf8PathBuf,
    /// Directories probed for registrable projects at startup.
    pub seed_paths: Vec<Utf8PathBuf>,
    /// Job history cap.
    pub history_capacity: usize,
    /// Quiet period for change debouncing, in milliseconds.
    pub debounce_ms: u64,
    /// Interval between filesystem scans, in milliseconds.
    pub poll_interval_ms: u64,
    /// Hours after which an unanalysed system counts as stale.
    pub stale_after_hours: i64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            store_path: Utf8PathBuf::from("atelier-systems.json"),
            seed_paths: Vec::new(),
            history_capacity: 100,
            debounce_ms: 1500,
            poll_interval_ms: 2000,
            stale_after_hours: 24,
        }
    }
}

impl OrchestratorConfig {
    /// Loads the configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read or
    /// [`ConfigError::Parse`] when it is not a valid configuration
    /// document.
    pub async fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.to_owned(),
                    source,
                })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Returns the debounce quiet period.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Returns the filesystem scan interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Returns the staleness threshold for health evaluation.
    #[must_use]
    pub fn stale_after(&self) -> TimeDelta {
        TimeDelta::hours(self.stale_after_hours)
    }
}
