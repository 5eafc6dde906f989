//! Fleet health evaluation.
//!
//! Periodic health checks derive ephemeral [`Alert`]s from descriptor
//! state. Alerts are operational telemetry: they are not persisted and are
//! not owned by any job.

use crate::system::domain::{SystemId, SystemStatus};
use crate::system::ports::{DescriptorStore, ProjectAnalyzer};
use crate::system::services::{RegistryResult, SystemRegistry};
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Severity of a derived health alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    /// Attention needed, but the system may still be serviceable.
    Warning,
    /// The system is unusable until the condition is fixed.
    Critical,
}

impl AlertSeverity {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health alert derived from a descriptor's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// System the alert concerns.
    pub system_id: SystemId,
    /// Alert severity.
    pub severity: AlertSeverity,
    /// Human-readable condition description.
    pub message: String,
    /// Evaluation timestamp.
    pub raised_at: DateTime<Utc>,
}

/// Evaluates registry state into health alerts.
pub struct HealthMonitor<S, A, C>
where
    S: DescriptorStore,
    A: ProjectAnalyzer,
    C: Clock + Send + Sync,
{
    registry: Arc<SystemRegistry<S, A, C>>,
    clock: Arc<C>,
    stale_after: TimeDelta,
}

impl<S, A, C> HealthMonitor<S, A, C>
where
    S: DescriptorStore,
    A: ProjectAnalyzer,
    C: Clock + Send + Sync,
{
    /// Creates a monitor flagging descriptors unchecked for `stale_after`.
    #[must_use]
    pub const fn new(
        registry: Arc<SystemRegistry<S, A, C>>,
        clock: Arc<C>,
        stale_after: TimeDelta,
    ) -> Self {
        Self {
            registry,
            clock,
            stale_after,
        }
    }

    /// Evaluates every registered descriptor.
    ///
    /// # Errors
    ///
    /// Returns registry errors when the descriptor map is unavailable.
    pub fn evaluate(&self) -> RegistryResult<Vec<Alert>> {
        let now = self.clock.utc();
        let mut alerts = Vec::new();

        for descriptor in self.registry.list()? {
            match descriptor.status() {
                SystemStatus::Error => alerts.push(Alert {
                    system_id: descriptor.id().clone(),
                    severity: AlertSeverity::Critical,
                    message: format!("system directory {} is not analysable", descriptor.path()),
                    raised_at: now,
                }),
                SystemStatus::NeedsSetup => alerts.push(Alert {
                    system_id: descriptor.id().clone(),
                    severity: AlertSeverity::Warning,
                    message: "system requires setup before it can build or deploy".to_owned(),
                    raised_at: now,
                }),
                _ => {}
            }

            let stale = descriptor
                .last_checked()
                .is_none_or(|checked| now - checked > self.stale_after);
            if stale {
                alerts.push(Alert {
                    system_id: descriptor.id().clone(),
                    severity: AlertSeverity::Warning,
                    message: "system has not been analysed recently".to_owned(),
                    raised_at: now,
                });
            }
        }

        Ok(alerts)
    }
}
