//! Job aggregate root.

use super::{JobDomainError, JobId, JobKind, JobState, LogLine};
use crate::system::domain::SystemId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deployment target environment tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvironmentTag(String);

impl EnvironmentTag {
    /// Creates an environment tag, trimming surrounding whitespace.
    ///
    /// An empty tag is replaced by `"default"` rather than rejected: deploy
    /// targets always have some environment.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        let normalized = value.into().trim().to_owned();
        if normalized.is_empty() {
            Self("default".to_owned())
        } else {
            Self(normalized)
        }
    }

    /// Returns the tag as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnvironmentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Terminal outcome applied to a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// The external process exited with code zero.
    Completed,
    /// The process exited non-zero, failed to spawn, or a build-first
    /// deploy's build phase failed.
    Failed {
        /// Human-readable failure description.
        reason: String,
        /// Exit code when the process ran to an exit.
        exit_code: Option<i32>,
    },
    /// The job was cancelled by a caller.
    Cancelled,
}

/// One build or deploy invocation and its tracked lifecycle.
///
/// The runner exclusively mutates a job during its lifetime; everything
/// else reads snapshots. The `system_id` is a weak reference: the job
/// outlives descriptor deletion for history purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    id: JobId,
    system_id: SystemId,
    kind: JobKind,
    state: JobState,
    environment: Option<EnvironmentTag>,
    pinned_version: Option<String>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    exit_code: Option<i32>,
    failure_reason: Option<String>,
    logs: Vec<LogLine>,
}

impl Job {
    /// Creates a pending job for a system.
    #[must_use]
    pub fn new(kind: JobKind, system_id: SystemId, clock: &impl Clock) -> Self {
        let created_at = clock.utc();
        Self {
            id: JobId::new(kind, &system_id, created_at),
            system_id,
            kind,
            state: JobState::Pending,
            environment: None,
            pinned_version: None,
            started_at: created_at,
            finished_at: None,
            exit_code: None,
            failure_reason: None,
            logs: Vec::new(),
        }
    }

    /// Attaches a deploy target environment.
    #[must_use]
    pub fn with_environment(mut self, environment: EnvironmentTag) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Pins the deploy to a prior version tag (rollback).
    #[must_use]
    pub fn with_pinned_version(mut self, version: impl Into<String>) -> Self {
        self.pinned_version = Some(version.into());
        self
    }

    /// Returns the job identifier.
    #[must_use]
    pub const fn id(&self) -> &JobId {
        &self.id
    }

    /// Returns the system this job ran against.
    #[must_use]
    pub const fn system_id(&self) -> &SystemId {
        &self.system_id
    }

    /// Returns the job kind.
    #[must_use]
    pub const fn kind(&self) -> JobKind {
        self.kind
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> JobState {
        self.state
    }

    /// Returns the deploy environment, if any.
    #[must_use]
    pub const fn environment(&self) -> Option<&EnvironmentTag> {
        self.environment.as_ref()
    }

    /// Returns the pinned rollback version, if any.
    #[must_use]
    pub fn pinned_version(&self) -> Option<&str> {
        self.pinned_version.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns the terminal-transition timestamp; unset while running.
    #[must_use]
    pub const fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Returns the recorded process exit code, if the process exited.
    #[must_use]
    pub const fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Returns the failure description for failed jobs.
    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Returns the ordered, append-only log.
    #[must_use]
    pub fn logs(&self) -> &[LogLine] {
        &self.logs
    }

    /// Marks the job running after its process spawned.
    ///
    /// # Errors
    ///
    /// Returns [`JobDomainError::InvalidTransition`] unless the job is
    /// pending, or [`JobDomainError::AlreadyTerminal`] when it already
    /// finished.
    pub fn mark_running(&mut self) -> Result<(), JobDomainError> {
        if self.state.is_terminal() {
            return Err(JobDomainError::AlreadyTerminal {
                job_id: self.id.clone(),
                state: self.state,
            });
        }
        if self.state != JobState::Pending {
            return Err(JobDomainError::InvalidTransition {
                job_id: self.id.clone(),
                from: self.state,
                to: JobState::Running,
            });
        }
        self.state = JobState::Running;
        Ok(())
    }

    /// Appends a log line, returning whether it was recorded.
    ///
    /// Lines are dropped once the job is terminal: after cancellation is
    /// acknowledged no further output is recorded.
    pub fn record_line(&mut self, line: LogLine) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.logs.push(line);
        true
    }

    /// Applies a terminal outcome.
    ///
    /// # Errors
    ///
    /// Returns [`JobDomainError::AlreadyTerminal`] when the job already
    /// finished, or [`JobDomainError::InvalidTransition`] for a `Completed`
    /// outcome on a job whose process never started.
    pub fn finish(&mut self, outcome: JobOutcome, clock: &impl Clock) -> Result<(), JobDomainError> {
        if self.state.is_terminal() {
            return Err(JobDomainError::AlreadyTerminal {
                job_id: self.id.clone(),
                state: self.state,
            });
        }

        match outcome {
            JobOutcome::Completed => {
                if self.state != JobState::Running {
                    return Err(JobDomainError::InvalidTransition {
                        job_id: self.id.clone(),
                        from: self.state,
                        to: JobState::Completed,
                    });
                }
                self.state = JobState::Completed;
                self.exit_code = Some(0);
            }
            JobOutcome::Failed { reason, exit_code } => {
                self.state = JobState::Failed;
                self.exit_code = exit_code;
                self.failure_reason = Some(reason);
            }
            JobOutcome::Cancelled => {
                self.state = JobState::Cancelled;
            }
        }

        self.finished_at = Some(clock.utc());
        Ok(())
    }
}
