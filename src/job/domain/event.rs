//! Job lifecycle and log events.

use super::{JobId, JobKind, LogLine};
use crate::system::domain::SystemId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event payload describing what happened to a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JobEventPayload {
    /// The job's external process was spawned.
    Started {
        /// Job kind.
        kind: JobKind,
    },
    /// One line of process output arrived.
    Log {
        /// The recorded line.
        line: LogLine,
    },
    /// The process exited with code zero.
    Completed {
        /// Process exit code (always zero).
        exit_code: i32,
    },
    /// The job failed.
    Failed {
        /// Failure description.
        reason: String,
    },
    /// The job was cancelled.
    Cancelled,
}

/// Live event delivered to subscribers of a system's channel and to the
/// global channel.
///
/// Events are a best-effort status feed, not a durable log; the durable
/// record is the job's own log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobEvent {
    /// Job the event concerns.
    pub job_id: JobId,
    /// System the job ran against; scopes channel delivery.
    pub system_id: SystemId,
    /// When the orchestrator emitted the event.
    pub emitted_at: DateTime<Utc>,
    /// What happened.
    #[serde(flatten)]
    pub payload: JobEventPayload,
}

impl JobEvent {
    /// Creates an event.
    #[must_use]
    pub const fn new(
        job_id: JobId,
        system_id: SystemId,
        emitted_at: DateTime<Utc>,
        payload: JobEventPayload,
    ) -> Self {
        Self {
            job_id,
            system_id,
            emitted_at,
            payload,
        }
    }
}
