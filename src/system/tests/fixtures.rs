//! Shared fixtures for system context tests.

use crate::system::adapters::memory::{InMemoryDescriptorStore, ScriptedAnalyzer};
use crate::system::domain::{AnalysisReport, SystemKind, SystemStatus};
use crate::system::services::SystemRegistry;
use mockable::DefaultClock;
use std::sync::Arc;

pub(super) type TestRegistry =
    SystemRegistry<InMemoryDescriptorStore, ScriptedAnalyzer, DefaultClock>;

pub(super) struct RegistryHarness {
    pub store: Arc<InMemoryDescriptorStore>,
    pub analyzer: Arc<ScriptedAnalyzer>,
    pub registry: Arc<TestRegistry>,
}

pub(super) fn ready_report(kind: SystemKind) -> AnalysisReport {
    AnalysisReport::new(SystemStatus::Ready, kind)
        .with_technologies(["React".to_owned(), "Firebase".to_owned()])
        .with_deploy_capable(true)
        .with_built(true)
}

pub(super) async fn open_registry() -> RegistryHarness {
    let store = Arc::new(InMemoryDescriptorStore::new());
    let analyzer = Arc::new(ScriptedAnalyzer::new());
    let registry = Arc::new(
        SystemRegistry::open(
            Arc::clone(&store),
            Arc::clone(&analyzer),
            Arc::new(DefaultClock),
        )
        .await
        .expect("registry should open"),
    );

    RegistryHarness {
        store,
        analyzer,
        registry,
    }
}
