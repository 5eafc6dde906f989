//! Launcher port for spawning and supervising external processes.
//!
//! The runner depends only on this capability interface, never on a
//! concrete spawning primitive, so tests drive it with a scripted fake.

use crate::job::domain::CommandSpec;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Result type for launcher operations.
pub type LaunchResult<T> = Result<T, LaunchError>;

/// Event emitted by a supervised external process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    /// A line arrived on standard output.
    Stdout(String),
    /// A line arrived on standard error.
    Stderr(String),
    /// The process exited. Always the final event on the stream.
    Exited(ProcessExit),
}

/// Process exit summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    /// Exit code; `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl ProcessExit {
    /// Returns whether the process exited successfully.
    #[must_use]
    pub fn success(self) -> bool {
        self.code == Some(0)
    }
}

/// Best-effort termination handle for a running process.
#[async_trait]
pub trait ProcessControl: Send + Sync {
    /// Requests process termination.
    ///
    /// Termination is not guaranteed to be instant; the event stream still
    /// ends with an [`ProcessEvent::Exited`] event.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::Kill`] when the termination request could not
    /// be delivered.
    async fn kill(&self) -> LaunchResult<()>;
}

/// A spawned process: its ordered event stream and its kill handle.
pub struct LaunchedProcess {
    /// Ordered stream of output lines followed by exactly one exit event.
    pub events: mpsc::Receiver<ProcessEvent>,
    /// Best-effort termination handle.
    pub control: Arc<dyn ProcessControl>,
}

/// Contract for spawning external build/deploy commands.
#[async_trait]
pub trait CommandLauncher: Send + Sync {
    /// Spawns the command described by `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::Spawn`] when the process could not start
    /// (missing interpreter, bad working directory).
    async fn launch(&self, spec: &CommandSpec) -> LaunchResult<LaunchedProcess>;
}

/// Errors returned by launcher adapters.
#[derive(Debug, Clone, Error)]
pub enum LaunchError {
    /// The process could not be spawned.
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying error.
        source: Arc<std::io::Error>,
    },

    /// The termination request could not be delivered.
    #[error("failed to kill process: {0}")]
    Kill(String),
}

impl LaunchError {
    /// Wraps a spawn failure.
    #[must_use]
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source: Arc::new(source),
        }
    }
}
