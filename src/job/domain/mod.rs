//! Domain model for build and deploy jobs.
//!
//! A job is one build or deploy invocation: its state machine, its ordered
//! append-only log, and the lifecycle events it emits. Jobs reference their
//! system weakly so history survives descriptor deletion.

mod command;
mod error;
mod event;
mod ids;
mod job;
mod kind;
mod log;
mod state;

pub use command::CommandSpec;
pub use error::{JobDomainError, ParseJobStateError};
pub use event::{JobEvent, JobEventPayload};
pub use ids::JobId;
pub use job::{EnvironmentTag, Job, JobOutcome};
pub use kind::JobKind;
pub use log::{LogLine, LogStream};
pub use state::JobState;
