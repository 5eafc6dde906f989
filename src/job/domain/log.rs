//! Job log lines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Origin stream of a job log line.
///
/// Stdout and stderr preserve their own ordering; interleaving between the
/// two is not guaranteed, which is acceptable because lines stay tagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStream {
    /// Line read from the process's standard output.
    Stdout,
    /// Line read from the process's standard error.
    Stderr,
    /// Line produced by the orchestrator itself (phase markers, spawn
    /// failures, exit summaries).
    System,
}

impl LogStream {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
            Self::System => "system",
        }
    }
}

impl fmt::Display for LogStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timestamped line of job output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    /// When the orchestrator recorded the line.
    pub timestamp: DateTime<Utc>,
    /// Stream the line came from.
    pub stream: LogStream,
    /// Line content without the trailing newline.
    pub message: String,
}

impl LogLine {
    /// Creates a log line.
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>, stream: LogStream, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            stream,
            message: message.into(),
        }
    }
}
