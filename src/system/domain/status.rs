//! Managed-system lifecycle status.

use super::ParseSystemStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a managed system.
///
/// Derived from analysis unless a manual override is in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemStatus {
    /// The project is missing a manifest or installed dependencies.
    NeedsSetup,
    /// The project is registered but deliberately not in service.
    Inactive,
    /// The project is analysable and ready to build or deploy.
    Ready,
    /// The project is live.
    Active,
    /// The project directory is missing or could not be read.
    Error,
    /// The project is undergoing manual maintenance.
    Maintenance,
}

impl SystemStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NeedsSetup => "needs_setup",
            Self::Inactive => "inactive",
            Self::Ready => "ready",
            Self::Active => "active",
            Self::Error => "error",
            Self::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SystemStatus {
    type Error = ParseSystemStatusError;

    fn try_from(value: &str) -> Result<Self, ParseSystemStatusError> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "needs_setup" => Ok(Self::NeedsSetup),
            "inactive" => Ok(Self::Inactive),
            "ready" => Ok(Self::Ready),
            "active" => Ok(Self::Active),
            "error" => Ok(Self::Error),
            "maintenance" => Ok(Self::Maintenance),
            _ => Err(ParseSystemStatusError(value.to_owned())),
        }
    }
}
