//! Tests for fleet health evaluation.

use super::fixtures::{open_registry, ready_report};
use crate::system::adapters::memory::{InMemoryDescriptorStore, ScriptedAnalyzer};
use crate::system::domain::{
    AnalysisReport, SystemDescriptor, SystemId, SystemKind, SystemName, SystemStatus,
};
use crate::system::services::{AlertSeverity, HealthMonitor, RegisterSystemRequest, SystemRegistry};
use chrono::TimeDelta;
use mockable::DefaultClock;
use rstest::rstest;
use std::sync::Arc;

fn week() -> TimeDelta {
    TimeDelta::days(7)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn healthy_fresh_systems_raise_no_alerts() {
    let harness = open_registry().await;
    harness
        .analyzer
        .script("/srv/projects/storefront", ready_report(SystemKind::React));
    harness
        .registry
        .register(RegisterSystemRequest::new(
            "storefront",
            "Storefront",
            "/srv/projects/storefront",
            SystemKind::React,
        ))
        .await
        .expect("registration succeeds");

    let monitor = HealthMonitor::new(
        Arc::clone(&harness.registry),
        Arc::new(DefaultClock),
        week(),
    );
    let alerts = monitor.evaluate().expect("evaluation succeeds");
    assert!(alerts.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn error_status_raises_a_critical_alert() {
    let harness = open_registry().await;
    // No scripted report: the path analyses to error.
    harness
        .registry
        .register(RegisterSystemRequest::new(
            "storefront",
            "Storefront",
            "/srv/projects/storefront",
            SystemKind::React,
        ))
        .await
        .expect("registration succeeds");

    let monitor = HealthMonitor::new(
        Arc::clone(&harness.registry),
        Arc::new(DefaultClock),
        week(),
    );
    let alerts = monitor.evaluate().expect("evaluation succeeds");

    let critical: Vec<_> = alerts
        .iter()
        .filter(|alert| alert.severity == AlertSeverity::Critical)
        .collect();
    assert_eq!(critical.len(), 1);
    let alert = critical.first().expect("one critical alert");
    assert_eq!(alert.system_id.as_str(), "storefront");
    assert!(alert.message.contains("/srv/projects/storefront"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn needs_setup_raises_a_warning() {
    let harness = open_registry().await;
    harness.analyzer.script(
        "/srv/projects/api",
        AnalysisReport::new(SystemStatus::NeedsSetup, SystemKind::NodeService),
    );
    harness
        .registry
        .register(RegisterSystemRequest::new(
            "api",
            "API",
            "/srv/projects/api",
            SystemKind::NodeService,
        ))
        .await
        .expect("registration succeeds");

    let monitor = HealthMonitor::new(
        Arc::clone(&harness.registry),
        Arc::new(DefaultClock),
        week(),
    );
    let alerts = monitor.evaluate().expect("evaluation succeeds");

    assert_eq!(alerts.len(), 1);
    let alert = alerts.first().expect("one warning");
    assert_eq!(alert.severity, AlertSeverity::Warning);
    assert!(alert.message.contains("setup"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn never_analysed_systems_are_flagged_stale() {
    let seeded = SystemDescriptor::new(
        SystemId::new("legacy").expect("valid id"),
        SystemName::new("Legacy").expect("valid name"),
        "/srv/projects/legacy".into(),
        SystemKind::Other,
        &DefaultClock,
    )
    .expect("valid descriptor");
    assert!(seeded.last_checked().is_none());

    let store = Arc::new(InMemoryDescriptorStore::seeded(vec![seeded]));
    let registry = Arc::new(
        SystemRegistry::open(store, Arc::new(ScriptedAnalyzer::new()), Arc::new(DefaultClock))
            .await
            .expect("registry opens"),
    );

    let monitor = HealthMonitor::new(registry, Arc::new(DefaultClock), week());
    let alerts = monitor.evaluate().expect("evaluation succeeds");

    assert!(alerts.iter().any(|alert| {
        alert.severity == AlertSeverity::Warning && alert.message.contains("recently")
    }));
}
