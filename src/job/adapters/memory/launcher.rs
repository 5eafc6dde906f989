//! Scripted launcher adapter for deterministic runner tests.

use crate::job::domain::CommandSpec;
use crate::job::ports::{
    CommandLauncher, LaunchError, LaunchResult, LaunchedProcess, ProcessControl, ProcessEvent,
    ProcessExit,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;

/// One scripted process run: its output lines and how it ends.
#[derive(Debug, Clone)]
pub struct ScriptedRun {
    events: Vec<ProcessEvent>,
    exit: Option<ProcessExit>,
}

impl ScriptedRun {
    /// A run that exits immediately with code zero.
    #[must_use]
    pub const fn succeeds() -> Self {
        Self {
            events: Vec::new(),
            exit: Some(ProcessExit { code: Some(0) }),
        }
    }

    /// A run that exits immediately with the given non-zero code.
    #[must_use]
    pub const fn fails(code: i32) -> Self {
        Self {
            events: Vec::new(),
            exit: Some(ProcessExit { code: Some(code) }),
        }
    }

    /// A run that never exits on its own; it ends only when killed.
    #[must_use]
    pub const fn hangs() -> Self {
        Self {
            events: Vec::new(),
            exit: None,
        }
    }

    /// Adds stdout lines emitted before the exit.
    #[must_use]
    pub fn with_stdout(mut self, lines: impl IntoIterator<Item = String>) -> Self {
        self.events.extend(lines.into_iter().map(ProcessEvent::Stdout));
        self
    }

    /// Adds stderr lines emitted before the exit.
    #[must_use]
    pub fn with_stderr(mut self, lines: impl IntoIterator<Item = String>) -> Self {
        self.events.extend(lines.into_iter().map(ProcessEvent::Stderr));
        self
    }
}

#[derive(Debug, Clone)]
enum ScriptedBehaviour {
    Run(ScriptedRun),
    SpawnError(String),
}

#[derive(Debug, Default)]
struct ScriptedState {
    queue: VecDeque<ScriptedBehaviour>,
    launched: Vec<CommandSpec>,
}

/// Launcher replaying scripted runs instead of spawning processes.
///
/// Behaviours are consumed in FIFO order; when the queue is empty a launch
/// succeeds immediately with exit code zero. Every launched [`CommandSpec`]
/// is recorded for assertions (e.g. that a deploy command was never
/// launched after a failed build phase).
#[derive(Debug, Clone, Default)]
pub struct ScriptedLauncher {
    state: Arc<Mutex<ScriptedState>>,
}

impl ScriptedLauncher {
    /// Creates a launcher with an empty script queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a scripted run.
    pub fn push_run(&self, run: ScriptedRun) {
        self.lock_state().queue.push_back(ScriptedBehaviour::Run(run));
    }

    /// Queues a spawn failure with the given message.
    pub fn push_spawn_error(&self, message: impl Into<String>) {
        self.lock_state()
            .queue
            .push_back(ScriptedBehaviour::SpawnError(message.into()));
    }

    /// Returns every command launched so far, in order.
    #[must_use]
    pub fn launched(&self) -> Vec<CommandSpec> {
        self.lock_state().launched.clone()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, ScriptedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CommandLauncher for ScriptedLauncher {
    async fn launch(&self, spec: &CommandSpec) -> LaunchResult<LaunchedProcess> {
        let behaviour = {
            let mut state = self.lock_state();
            let next = state
                .queue
                .pop_front()
                .unwrap_or_else(|| ScriptedBehaviour::Run(ScriptedRun::succeeds()));
            if !matches!(next, ScriptedBehaviour::SpawnError(_)) {
                state.launched.push(spec.clone());
            }
            next
        };

        let run = match behaviour {
            ScriptedBehaviour::Run(run) => run,
            ScriptedBehaviour::SpawnError(message) => {
                return Err(LaunchError::spawn(
                    spec.program(),
                    std::io::Error::other(message),
                ));
            }
        };

        let (events_tx, events_rx) = mpsc::channel(64);
        let (kill_tx, mut kill_rx) = mpsc::channel::<()>(1);

        tokio::spawn(async move {
            for event in run.events {
                if events_tx.send(event).await.is_err() {
                    return;
                }
            }
            if run.exit.is_none() {
                // Hang until killed.
                kill_rx.recv().await;
            }
            let exit = run.exit.unwrap_or(ProcessExit { code: None });
            events_tx.send(ProcessEvent::Exited(exit)).await.ok();
        });

        Ok(LaunchedProcess {
            events: events_rx,
            control: Arc::new(ScriptedControl { kill: kill_tx }),
        })
    }
}

struct ScriptedControl {
    kill: mpsc::Sender<()>,
}

#[async_trait]
impl ProcessControl for ScriptedControl {
    async fn kill(&self) -> LaunchResult<()> {
        self.kill
            .send(())
            .await
            .map_err(|err| LaunchError::Kill(err.to_string()))
    }
}
