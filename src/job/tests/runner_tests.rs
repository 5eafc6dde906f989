//! Orchestration tests for the build/deploy runner.

use super::fixtures::{Harness, harness, storefront_id, wait_terminal};
use crate::job::adapters::memory::ScriptedRun;
use crate::job::domain::{EnvironmentTag, JobKind, JobState, LogStream};
use crate::job::services::RunnerError;
use crate::system::domain::SystemId;
use crate::system::services::RegistryError;
use rstest::rstest;
use std::time::Duration;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn build_for_unknown_system_creates_no_job() {
    let harness = harness().await;
    let ghost = SystemId::new("ghost").expect("valid system id");

    let result = harness.runner.start_build(&ghost).await;

    assert!(matches!(
        result,
        Err(RunnerError::Registry(RegistryError::NotFound(_)))
    ));
    assert!(harness.tracker.active(None).is_empty());
    assert!(harness.tracker.history(None, None).is_empty());
    assert!(harness.launcher.launched().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn successful_build_streams_output_and_completes() {
    let harness = harness().await;
    harness.launcher.push_run(
        ScriptedRun::succeeds()
            .with_stdout(["compiling".to_owned(), "bundling".to_owned()])
            .with_stderr(["warning: large chunk".to_owned()]),
    );

    let started = harness
        .runner
        .start_build(&storefront_id())
        .await
        .expect("build starts");
    assert_eq!(started.state(), JobState::Running);
    assert_eq!(started.kind(), JobKind::Build);

    let finished = wait_terminal(&harness.tracker, started.id()).await;
    assert_eq!(finished.state(), JobState::Completed);
    assert_eq!(finished.exit_code(), Some(0));

    let messages: Vec<&str> = finished
        .logs()
        .iter()
        .map(|line| line.message.as_str())
        .collect();
    assert!(messages.contains(&"compiling"));
    assert!(messages.contains(&"bundling"));
    assert!(messages.contains(&"warning: large chunk"));
    assert!(
        finished
            .logs()
            .iter()
            .any(|line| line.stream == LogStream::System
                && line.message.starts_with("running build:"))
    );

    assert!(harness.tracker.active(None).is_empty());
    assert_eq!(harness.tracker.history(None, None).len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failing_build_records_exit_code_and_reason() {
    let harness = harness().await;
    harness
        .launcher
        .push_run(ScriptedRun::fails(2).with_stderr(["module not found".to_owned()]));

    let started = harness
        .runner
        .start_build(&storefront_id())
        .await
        .expect("build starts");
    let finished = wait_terminal(&harness.tracker, started.id()).await;

    assert_eq!(finished.state(), JobState::Failed);
    assert_eq!(finished.exit_code(), Some(2));
    let reason = finished.failure_reason().expect("failed job carries reason");
    assert!(reason.contains("non-zero code 2"));
    assert!(
        finished
            .logs()
            .iter()
            .any(|line| line.stream == LogStream::System && line.message.contains("non-zero"))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn spawn_failure_yields_a_failed_job_not_an_error() {
    let harness = harness().await;
    harness.launcher.push_spawn_error("sh: command not found");

    let job = harness
        .runner
        .start_build(&storefront_id())
        .await
        .expect("spawn failure is reported through the job");

    assert_eq!(job.state(), JobState::Failed);
    let reason = job.failure_reason().expect("failed job carries reason");
    assert!(reason.contains("command not found"));
    assert!(
        job.logs()
            .iter()
            .any(|line| line.stream == LogStream::System
                && line.message.starts_with("spawn failed:"))
    );
    assert_eq!(harness.tracker.history(None, None).len(), 1);
    assert!(harness.launcher.launched().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deploy_with_build_first_runs_both_phases_in_order() {
    let harness = harness().await;
    harness.launcher.push_run(ScriptedRun::succeeds());
    harness.launcher.push_run(ScriptedRun::succeeds());

    let started = harness
        .runner
        .start_deploy(&storefront_id(), EnvironmentTag::new("production"), true)
        .await
        .expect("deploy starts");
    assert_eq!(started.kind(), JobKind::Deploy);

    let finished = wait_terminal(&harness.tracker, started.id()).await;
    assert_eq!(finished.state(), JobState::Completed);
    assert_eq!(
        finished.environment().map(EnvironmentTag::as_str),
        Some("production")
    );

    let launched = harness.launcher.launched();
    assert_eq!(launched.len(), 2);
    assert!(launched[0].display_line().contains("npm run build"));
    assert!(launched[1].display_line().contains("firebase deploy --project production"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_build_phase_never_launches_the_deploy_command() {
    let harness = harness().await;
    harness.launcher.push_run(ScriptedRun::fails(1));

    let started = harness
        .runner
        .start_deploy(&storefront_id(), EnvironmentTag::new("production"), true)
        .await
        .expect("deploy starts");
    let finished = wait_terminal(&harness.tracker, started.id()).await;

    assert_eq!(finished.state(), JobState::Failed);
    let launched = harness.launcher.launched();
    assert_eq!(launched.len(), 1);
    assert!(launched[0].display_line().contains("npm run build"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rollback_pins_the_version_and_skips_the_build() {
    let harness = harness().await;
    harness.launcher.push_run(ScriptedRun::succeeds());

    let started = harness
        .runner
        .rollback(
            &storefront_id(),
            EnvironmentTag::new("production"),
            "v2026-08-01".to_owned(),
        )
        .await
        .expect("rollback starts");
    assert_eq!(started.pinned_version(), Some("v2026-08-01"));

    let finished = wait_terminal(&harness.tracker, started.id()).await;
    assert_eq!(finished.state(), JobState::Completed);

    let launched = harness.launcher.launched();
    assert_eq!(launched.len(), 1);
    assert!(launched[0].display_line().contains("rollback-v2026-08-01"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn log_reads_during_a_running_job_only_ever_grow() {
    let harness = harness().await;
    let lines: Vec<String> = (0..40).map(|step| format!("step {step}")).collect();
    harness
        .launcher
        .push_run(ScriptedRun::hangs().with_stdout(lines.clone()));

    let started = harness
        .runner
        .start_build(&storefront_id())
        .await
        .expect("build starts");

    // First read as soon as any output lands, while the job still runs.
    let first_deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    let first = loop {
        let early = harness
            .tracker
            .find(started.id())
            .expect("job is tracked")
            .logs()
            .to_vec();
        if !early.is_empty() {
            break early;
        }
        assert!(
            tokio::time::Instant::now() < first_deadline,
            "no output arrived"
        );
        tokio::time::sleep(Duration::from_millis(1)).await;
    };

    // Second read once the full scripted output has been appended.
    let full_deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    let second = loop {
        let late = harness
            .tracker
            .find(started.id())
            .expect("job is tracked")
            .logs()
            .to_vec();
        let stdout_lines = late
            .iter()
            .filter(|line| line.stream == LogStream::Stdout)
            .count();
        if stdout_lines == lines.len() {
            break late;
        }
        assert!(
            tokio::time::Instant::now() < full_deadline,
            "scripted output never fully arrived"
        );
        tokio::time::sleep(Duration::from_millis(1)).await;
    };

    // The earlier read is a prefix of the later one, never reordered.
    assert!(second.len() >= first.len());
    assert_eq!(&second[..first.len()], first.as_slice());
    let streamed: Vec<String> = second
        .iter()
        .filter(|line| line.stream == LogStream::Stdout)
        .map(|line| line.message.clone())
        .collect();
    assert_eq!(streamed, lines);

    assert!(harness.runner.cancel(started.id()).await);
    wait_terminal(&harness.tracker, started.id()).await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancel_terminates_a_hanging_job_exactly_once() {
    let harness = harness().await;
    harness.launcher.push_run(ScriptedRun::hangs());

    let started = harness
        .runner
        .start_build(&storefront_id())
        .await
        .expect("build starts");
    assert_eq!(started.state(), JobState::Running);

    assert!(harness.runner.cancel(started.id()).await);
    let finished = wait_terminal(&harness.tracker, started.id()).await;
    assert_eq!(finished.state(), JobState::Cancelled);
    assert!(finished.finished_at().is_some());

    // Already terminal: nothing to cancel, state untouched.
    assert!(!harness.runner.cancel(started.id()).await);
    let unchanged = harness
        .tracker
        .find(started.id())
        .expect("cancelled job stays in history");
    assert_eq!(unchanged.finished_at(), finished.finished_at());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancel_of_unknown_job_is_a_no_op() {
    let harness = harness().await;
    let job = crate::job::domain::Job::new(
        JobKind::Build,
        storefront_id(),
        &mockable::DefaultClock,
    );
    assert!(!harness.runner.cancel(job.id()).await);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn jobs_survive_system_removal_for_history() {
    let harness = harness().await;
    harness.launcher.push_run(ScriptedRun::succeeds());

    let started = harness
        .runner
        .start_build(&storefront_id())
        .await
        .expect("build starts");
    wait_terminal(&harness.tracker, started.id()).await;

    harness
        .registry
        .remove(&storefront_id())
        .await
        .expect("removal succeeds");

    let Harness { tracker, .. } = harness;
    let history = tracker.history(Some(&storefront_id()), None);
    assert_eq!(history.len(), 1);
}
