//! Shared fixtures for job context tests.

use crate::job::adapters::ChannelBroadcaster;
use crate::job::adapters::memory::ScriptedLauncher;
use crate::job::domain::{Job, JobId};
use crate::job::ports::EventSink;
use crate::job::services::{CommandTemplates, JobRunner, JobTracker};
use crate::system::adapters::memory::{InMemoryDescriptorStore, ScriptedAnalyzer};
use crate::system::domain::{AnalysisReport, SystemId, SystemKind, SystemStatus};
use crate::system::services::{RegisterSystemRequest, SystemRegistry};
use mockable::DefaultClock;
use std::sync::Arc;
use std::time::Duration;

pub(super) type TestRegistry =
    SystemRegistry<InMemoryDescriptorStore, ScriptedAnalyzer, DefaultClock>;
pub(super) type TestRunner =
    JobRunner<InMemoryDescriptorStore, ScriptedAnalyzer, DefaultClock, ScriptedLauncher>;

pub(super) const PROJECT_PATH: &str = "/srv/projects/storefront";

pub(super) struct Harness {
    pub registry: Arc<TestRegistry>,
    pub launcher: Arc<ScriptedLauncher>,
    pub tracker: Arc<JobTracker<DefaultClock>>,
    pub broadcaster: Arc<ChannelBroadcaster>,
    pub runner: TestRunner,
}

pub(super) fn storefront_id() -> SystemId {
    SystemId::new("storefront").expect("valid system id")
}

pub(super) fn ready_react_report() -> AnalysisReport {
    AnalysisReport::new(SystemStatus::Ready, SystemKind::React)
        .with_technologies(["React".to_owned()])
        .with_deploy_capable(true)
}

/// Builds a runner wired to scripted adapters with one registered system.
pub(super) async fn harness() -> Harness {
    let clock = Arc::new(DefaultClock);
    let analyzer = Arc::new(ScriptedAnalyzer::new());
    analyzer.script(PROJECT_PATH, ready_react_report());

    let registry = Arc::new(
        SystemRegistry::open(
            Arc::new(InMemoryDescriptorStore::new()),
            analyzer,
            Arc::clone(&clock),
        )
        .await
        .expect("registry should open"),
    );
    registry
        .register(RegisterSystemRequest::new(
            "storefront",
            "Storefront",
            PROJECT_PATH,
            SystemKind::React,
        ))
        .await
        .expect("registration should succeed");

    let launcher = Arc::new(ScriptedLauncher::new());
    let tracker = Arc::new(JobTracker::with_default_capacity(Arc::clone(&clock)));
    let broadcaster = Arc::new(ChannelBroadcaster::default());
    let runner = JobRunner::new(
        Arc::clone(&registry),
        Arc::clone(&launcher),
        Arc::clone(&tracker),
        Arc::clone(&broadcaster) as Arc<dyn EventSink>,
        Arc::new(CommandTemplates::new()),
        clock,
    );

    Harness {
        registry,
        launcher,
        tracker,
        broadcaster,
        runner,
    }
}

/// Polls the tracker until the job reaches a terminal state.
pub(super) async fn wait_terminal(tracker: &JobTracker<DefaultClock>, job_id: &JobId) -> Job {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if let Some(job) = tracker.find(job_id) {
            if job.state().is_terminal() {
                return job;
            }
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "job {job_id} did not reach a terminal state in time"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
