//! Launcher adapter spawning real OS processes via `tokio::process`.

use crate::job::domain::CommandSpec;
use crate::job::ports::{
    CommandLauncher, LaunchError, LaunchResult, LaunchedProcess, ProcessControl, ProcessEvent,
    ProcessExit,
};
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Launcher spawning commands as independent OS processes.
///
/// Stdout and stderr are read line by line on background tasks; the exit
/// event is sent only after both output streams drain, so subscribers see
/// every line before the terminal event.
#[derive(Debug, Clone, Copy)]
pub struct TokioCommandLauncher {
    channel_capacity: usize,
}

impl TokioCommandLauncher {
    const DEFAULT_CHANNEL_CAPACITY: usize = 256;

    /// Creates a launcher with the default event channel capacity.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            channel_capacity: Self::DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl Default for TokioCommandLauncher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandLauncher for TokioCommandLauncher {
    async fn launch(&self, spec: &CommandSpec) -> LaunchResult<LaunchedProcess> {
        let mut command = Command::new(spec.program());
        command
            .args(spec.args())
            .current_dir(spec.working_dir().as_std_path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|err| LaunchError::spawn(spec.program(), err))?;

        let (events_tx, events_rx) = mpsc::channel(self.channel_capacity);
        let (kill_tx, kill_rx) = mpsc::channel(1);

        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_line_reader(stdout, ProcessEvent::Stdout, events_tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_line_reader(stderr, ProcessEvent::Stderr, events_tx.clone()));
        }

        tokio::spawn(supervise(child, kill_rx, readers, events_tx));

        Ok(LaunchedProcess {
            events: events_rx,
            control: Arc::new(TokioProcessControl { kill: kill_tx }),
        })
    }
}

struct TokioProcessControl {
    kill: mpsc::Sender<()>,
}

#[async_trait]
impl ProcessControl for TokioProcessControl {
    async fn kill(&self) -> LaunchResult<()> {
        self.kill
            .send(())
            .await
            .map_err(|err| LaunchError::Kill(err.to_string()))
    }
}

fn spawn_line_reader<R>(
    reader: R,
    make_event: fn(String) -> ProcessEvent,
    events: mpsc::Sender<ProcessEvent>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if events.send(make_event(line)).await.is_err() {
                break;
            }
        }
    })
}

async fn supervise(
    mut child: Child,
    mut kill_requests: mpsc::Receiver<()>,
    readers: Vec<JoinHandle<()>>,
    events: mpsc::Sender<ProcessEvent>,
) {
    let status = loop {
        tokio::select! {
            result = child.wait() => break result,
            Some(()) = kill_requests.recv() => {
                child.start_kill().ok();
            }
        }
    };

    // Drain both output streams before reporting the exit.
    for reader in readers {
        reader.await.ok();
    }

    let code = status.ok().and_then(|exit_status| exit_status.code());
    events
        .send(ProcessEvent::Exited(ProcessExit { code }))
        .await
        .ok();
}
