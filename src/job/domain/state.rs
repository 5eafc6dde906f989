//! Job lifecycle state machine.

use super::ParseJobStateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Job lifecycle state.
///
/// `pending -> running -> {completed, failed, cancelled}`. Pending is
/// instantaneous: the job object exists but the external process has not
/// been spawned yet. A spawn failure moves a pending job straight to
/// failed. Terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Job object created, external process not yet spawned.
    Pending,
    /// External process running, output streaming.
    Running,
    /// Process exited with code zero.
    Completed,
    /// Process exited non-zero, or could not be spawned.
    Failed,
    /// Job cancelled while running.
    Cancelled,
}

impl JobState {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns whether the state is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for JobState {
    type Error = ParseJobStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseJobStateError(value.to_owned())),
        }
    }
}
