//! Error types for job domain transitions.

use super::{JobId, JobState};
use thiserror::Error;

/// Errors returned while mutating a job aggregate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JobDomainError {
    /// The job is already in a terminal state; no further transitions or
    /// log lines are accepted.
    #[error("job {job_id} is already terminal in state {state}")]
    AlreadyTerminal {
        /// Job identifier.
        job_id: JobId,
        /// Terminal state the job is in.
        state: JobState,
    },

    /// The requested transition is not part of the state machine.
    #[error("job {job_id} cannot transition from {from} to {to}")]
    InvalidTransition {
        /// Job identifier.
        job_id: JobId,
        /// Current state.
        from: JobState,
        /// Requested state.
        to: JobState,
    },
}

/// Error returned while parsing a job state from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown job state: {0}")]
pub struct ParseJobStateError(pub String);
