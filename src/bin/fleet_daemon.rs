//! Fleet orchestration daemon.
//!
//! Usage:
//!
//! ```text
//! fleet_daemon <config-path>
//! ```
//!
//! Opens the descriptor registry over the configured JSON store, discovers
//! projects under the seed paths, starts a debounced polling watcher for
//! every registered system, and periodically evaluates fleet health,
//! logging alerts until interrupted. Build and deploy execution is the
//! embedding interface layer's concern; this daemon keeps the fleet's
//! metadata fresh.

use atelier::config::{ConfigError, OrchestratorConfig};
use atelier::system::adapters::fs::{FsProjectAnalyzer, JsonFileDescriptorStore};
use atelier::system::services::{HealthMonitor, RegistryError, SystemRegistry};
use atelier::watch::adapters::PollingChangeSource;
use atelier::watch::services::ChangeWatcher;
use camino::Utf8PathBuf;
use mockable::DefaultClock;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

const HEALTH_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
enum DaemonError {
    #[error("usage: fleet_daemon <config-path>")]
    Usage,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("failed to wait for shutdown signal: {0}")]
    Signal(#[source] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), DaemonError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(Utf8PathBuf::from)
        .ok_or(DaemonError::Usage)?;
    let config = OrchestratorConfig::load(&config_path).await?;
    info!(config = %config_path, store = %config.store_path, "starting fleet daemon");

    let clock = Arc::new(DefaultClock);
    let registry = Arc::new(
        SystemRegistry::open(
            Arc::new(JsonFileDescriptorStore::new(config.store_path.clone())),
            Arc::new(FsProjectAnalyzer::new()),
            Arc::clone(&clock),
        )
        .await?,
    );

    let discovered = registry.discover(&config.seed_paths).await?;
    info!(
        discovered = discovered.len(),
        registered = registry.list()?.len(),
        "discovery complete"
    );

    let watcher = ChangeWatcher::new(
        Arc::clone(&registry),
        Arc::new(PollingChangeSource::new(config.poll_interval())),
        config.debounce(),
    );
    let watching = watcher.watch_all().await?;
    info!(watching, "change watchers started");

    let monitor = HealthMonitor::new(Arc::clone(&registry), Arc::clone(&clock), config.stale_after());
    let mut health_tick = tokio::time::interval(HEALTH_INTERVAL);

    loop {
        tokio::select! {
            _ = health_tick.tick() => {
                report_health(&monitor);
            }
            result = tokio::signal::ctrl_c() => {
                result.map_err(DaemonError::Signal)?;
                info!("shutdown requested");
                break;
            }
        }
    }

    // Dropping the watcher aborts every watch task.
    drop(watcher);
    Ok(())
}

fn report_health(
    monitor: &HealthMonitor<JsonFileDescriptorStore, FsProjectAnalyzer, DefaultClock>,
) {
    match monitor.evaluate() {
        Ok(alerts) => {
            for alert in alerts {
                warn!(
                    system_id = %alert.system_id,
                    severity = %alert.severity,
                    "{}", alert.message
                );
            }
        }
        Err(err) => warn!(error = %err, "health evaluation failed"),
    }
}
