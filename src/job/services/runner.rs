//! Build/deploy runner service.
//!
//! Resolves a system's descriptor, renders its command, spawns the
//! external process through the launcher port, and supervises it on a
//! background task: output lines stream into the tracker and out through
//! the broadcaster as they arrive, and the exit code drives the terminal
//! transition.
//!
//! The runner never retries: a failed job surfaces to the caller and is
//! recorded in history; retry is an explicit re-invocation. Concurrent
//! jobs against the same system are permitted and uncoordinated — callers
//! that care must serialize per-system submission, because a simultaneous
//! build and deploy race on the project directory.

use crate::job::domain::{
    EnvironmentTag, Job, JobEvent, JobEventPayload, JobId, JobKind, JobOutcome, LogStream,
};
use crate::job::ports::{CommandLauncher, EventSink, LaunchedProcess, ProcessControl, ProcessEvent};
use crate::job::services::{CommandTemplates, JobTracker, TemplateError};
use crate::system::domain::SystemId;
use crate::system::ports::{DescriptorStore, ProjectAnalyzer};
use crate::system::services::{RegistryError, SystemRegistry};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::debug;

/// Service-level errors for runner operations.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Descriptor resolution failed (unknown system, registry failure).
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Command template rendering failed.
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Result type for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// One command execution within a job.
#[derive(Debug, Clone)]
struct Phase {
    label: &'static str,
    spec: crate::job::domain::CommandSpec,
}

type ControlMap = Arc<Mutex<HashMap<JobId, Arc<dyn ProcessControl>>>>;

/// Runner spawning and supervising build/deploy processes.
pub struct JobRunner<S, A, C, L>
where
    S: DescriptorStore,
    A: ProjectAnalyzer,
    C: Clock + Send + Sync + 'static,
    L: CommandLauncher + 'static,
{
    registry: Arc<SystemRegistry<S, A, C>>,
    launcher: Arc<L>,
    tracker: Arc<JobTracker<C>>,
    sink: Arc<dyn EventSink>,
    templates: Arc<CommandTemplates>,
    clock: Arc<C>,
    controls: ControlMap,
}

impl<S, A, C, L> JobRunner<S, A, C, L>
where
    S: DescriptorStore,
    A: ProjectAnalyzer,
    C: Clock + Send + Sync + 'static,
    L: CommandLauncher + 'static,
{
    /// Creates a runner.
    #[must_use]
    pub fn new(
        registry: Arc<SystemRegistry<S, A, C>>,
        launcher: Arc<L>,
        tracker: Arc<JobTracker<C>>,
        sink: Arc<dyn EventSink>,
        templates: Arc<CommandTemplates>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            registry,
            launcher,
            tracker,
            sink,
            templates,
            clock,
            controls: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Starts a build job for a system.
    ///
    /// Returns the job snapshot: `running` when the process spawned, or
    /// `failed` when it could not even start (the spawn error is retained
    /// in the job's log and the job lands in history — never dangling).
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Registry`] when the system is unknown (no
    /// job is created) or [`RunnerError::Template`] when the build command
    /// fails to render.
    pub async fn start_build(&self, system_id: &SystemId) -> RunnerResult<Job> {
        let descriptor = self.registry.get(system_id)?;
        let first = Phase {
            label: "build",
            spec: self.templates.build_command(&descriptor)?,
        };
        let job = Job::new(JobKind::Build, system_id.clone(), &*self.clock);
        self.start_job(job, first, Vec::new()).await
    }

    /// Starts a deploy job for a system.
    ///
    /// With `build_first`, the build command runs as a first phase; the
    /// deploy command is only spawned when the build exits zero, so a
    /// failed build fails the deploy job without a partial deploy.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Registry`] when the system is unknown or
    /// [`RunnerError::Template`] when a command fails to render.
    pub async fn start_deploy(
        &self,
        system_id: &SystemId,
        environment: EnvironmentTag,
        build_first: bool,
    ) -> RunnerResult<Job> {
        self.deploy_pinned(system_id, environment, build_first, None)
            .await
    }

    /// Re-runs a deploy pinned to a prior version tag.
    ///
    /// Rollback never rebuilds: the pinned version is rendered into the
    /// deploy command and the existing artifact is redeployed.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Registry`] when the system is unknown or
    /// [`RunnerError::Template`] when the deploy command fails to render.
    pub async fn rollback(
        &self,
        system_id: &SystemId,
        environment: EnvironmentTag,
        version: String,
    ) -> RunnerResult<Job> {
        self.deploy_pinned(system_id, environment, false, Some(version))
            .await
    }

    /// Cancels a pending or running job.
    ///
    /// Marks the job cancelled, emits the terminal event, and requests
    /// best-effort termination of the external process. Returns `false`
    /// for unknown or already-terminal jobs, leaving their state and
    /// timestamps untouched.
    pub async fn cancel(&self, job_id: &JobId) -> bool {
        let Some(cancelled) = self.tracker.finish(job_id, JobOutcome::Cancelled) else {
            return false;
        };

        publish_event(
            &*self.sink,
            &*self.clock,
            &cancelled,
            JobEventPayload::Cancelled,
        );

        let control = self
            .controls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(job_id);
        if let Some(control) = control {
            if let Err(err) = control.kill().await {
                debug!(job_id = %job_id, error = %err, "kill request failed");
            }
        }
        true
    }

    async fn deploy_pinned(
        &self,
        system_id: &SystemId,
        environment: EnvironmentTag,
        build_first: bool,
        version: Option<String>,
    ) -> RunnerResult<Job> {
        let descriptor = self.registry.get(system_id)?;
        let deploy = Phase {
            label: "deploy",
            spec: self
                .templates
                .deploy_command(&descriptor, environment.as_str(), version.as_deref())?,
        };

        let mut job =
            Job::new(JobKind::Deploy, system_id.clone(), &*self.clock).with_environment(environment);
        if let Some(pinned) = version {
            job = job.with_pinned_version(pinned);
        }

        if build_first {
            let build = Phase {
                label: "build step",
                spec: self.templates.build_command(&descriptor)?,
            };
            self.start_job(job, build, vec![deploy]).await
        } else {
            self.start_job(job, deploy, Vec::new()).await
        }
    }

    async fn start_job(&self, job: Job, first: Phase, rest: Vec<Phase>) -> RunnerResult<Job> {
        let job_id = job.id().clone();
        let kind = job.kind();
        self.tracker.insert(job.clone());

        let driver = JobDriver {
            tracker: Arc::clone(&self.tracker),
            sink: Arc::clone(&self.sink),
            launcher: Arc::clone(&self.launcher),
            controls: Arc::clone(&self.controls),
            clock: Arc::clone(&self.clock),
            job_id: job_id.clone(),
            system_id: job.system_id().clone(),
        };

        driver.forward_line(
            LogStream::System,
            format!("running {}: {}", first.label, first.spec.display_line()),
        );

        match self.launcher.launch(&first.spec).await {
            Err(err) => {
                driver.forward_line(LogStream::System, format!("spawn failed: {err}"));
                driver.fail(err.to_string(), None);
                Ok(self.tracker.find(&job_id).unwrap_or(job))
            }
            Ok(process) => {
                let running = self.tracker.mark_running(&job_id).unwrap_or(job);
                driver.register_control(Arc::clone(&process.control));
                driver.publish(JobEventPayload::Started { kind });
                tokio::spawn(driver.run(process, rest));
                Ok(running)
            }
        }
    }
}

/// Background supervisor for one job's phases.
struct JobDriver<C, L>
where
    C: Clock + Send + Sync + 'static,
    L: CommandLauncher + 'static,
{
    tracker: Arc<JobTracker<C>>,
    sink: Arc<dyn EventSink>,
    launcher: Arc<L>,
    controls: ControlMap,
    clock: Arc<C>,
    job_id: JobId,
    system_id: SystemId,
}

impl<C, L> JobDriver<C, L>
where
    C: Clock + Send + Sync + 'static,
    L: CommandLauncher + 'static,
{
    async fn run(self, process: LaunchedProcess, rest: Vec<Phase>) {
        let mut current = process;
        let mut remaining = rest.into_iter();

        loop {
            let exit = self.stream(&mut current).await;
            self.remove_control();

            if !self.is_active() {
                // Cancelled while streaming; terminal event already emitted.
                return;
            }

            let Some(exit_status) = exit else {
                self.fail("process event stream ended unexpectedly".to_owned(), None);
                return;
            };

            if !exit_status.success() {
                let status_text = exit_status
                    .code
                    .map_or_else(|| "terminated by signal".to_owned(), |code| {
                        format!("exited with non-zero code {code}")
                    });
                self.forward_line(LogStream::System, format!("command {status_text}"));
                self.fail(format!("command {status_text}"), exit_status.code);
                return;
            }

            let Some(phase) = remaining.next() else {
                self.complete();
                return;
            };

            self.forward_line(
                LogStream::System,
                format!("running {}: {}", phase.label, phase.spec.display_line()),
            );
            match self.launcher.launch(&phase.spec).await {
                Err(err) => {
                    self.forward_line(LogStream::System, format!("spawn failed: {err}"));
                    self.fail(err.to_string(), None);
                    return;
                }
                Ok(next) => {
                    self.register_control(Arc::clone(&next.control));
                    current = next;
                }
            }
        }
    }

    async fn stream(&self, process: &mut LaunchedProcess) -> Option<crate::job::ports::ProcessExit> {
        while let Some(event) = process.events.recv().await {
            match event {
                ProcessEvent::Stdout(text) => self.forward_line(LogStream::Stdout, text),
                ProcessEvent::Stderr(text) => self.forward_line(LogStream::Stderr, text),
                ProcessEvent::Exited(exit_status) => return Some(exit_status),
            }
        }
        None
    }

    fn forward_line(&self, stream: LogStream, message: impl Into<String>) {
        if let Some(line) = self.tracker.append_line(&self.job_id, stream, message) {
            self.publish(JobEventPayload::Log { line });
        }
    }

    fn fail(&self, reason: String, exit_code: Option<i32>) {
        self.remove_control();
        if let Some(failed) = self.tracker.finish(
            &self.job_id,
            JobOutcome::Failed {
                reason: reason.clone(),
                exit_code,
            },
        ) {
            publish_event(
                &*self.sink,
                &*self.clock,
                &failed,
                JobEventPayload::Failed { reason },
            );
        }
    }

    fn complete(&self) {
        self.remove_control();
        if let Some(completed) = self.tracker.finish(&self.job_id, JobOutcome::Completed) {
            publish_event(
                &*self.sink,
                &*self.clock,
                &completed,
                JobEventPayload::Completed { exit_code: 0 },
            );
        }
    }

    fn publish(&self, payload: JobEventPayload) {
        self.sink.publish(&JobEvent::new(
            self.job_id.clone(),
            self.system_id.clone(),
            self.clock.utc(),
            payload,
        ));
    }

    fn is_active(&self) -> bool {
        self.tracker
            .find(&self.job_id)
            .is_some_and(|job| !job.state().is_terminal())
    }

    fn register_control(&self, control: Arc<dyn ProcessControl>) {
        self.controls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(self.job_id.clone(), control);
    }

    fn remove_control(&self) {
        self.controls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.job_id);
    }
}

fn publish_event(sink: &dyn EventSink, clock: &impl Clock, job: &Job, payload: JobEventPayload) {
    sink.publish(&JobEvent::new(
        job.id().clone(),
        job.system_id().clone(),
        clock.utc(),
        payload,
    ));
}
