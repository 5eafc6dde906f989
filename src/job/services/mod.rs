//! Orchestration services for the job context.

mod runner;
mod templates;
mod tracker;

pub use runner::{JobRunner, RunnerError, RunnerResult};
pub use templates::{CommandTemplates, TemplateError};
pub use tracker::JobTracker;
