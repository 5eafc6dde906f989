//! Orchestration tests for the debounced change watcher.

use crate::system::adapters::memory::InMemoryDescriptorStore;
use crate::system::domain::{AnalysisReport, SystemId, SystemKind, SystemStatus};
use crate::system::ports::ProjectAnalyzer;
use crate::system::services::{RegisterSystemRequest, RegistryError, SystemRegistry};
use crate::watch::adapters::ManualChangeSource;
use crate::watch::services::ChangeWatcher;
use async_trait::async_trait;
use camino::Utf8Path;
use mockable::DefaultClock;
use rstest::rstest;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const STOREFRONT_PATH: &str = "/srv/projects/storefront";
const QUIET: Duration = Duration::from_millis(50);

/// Analyzer counting invocations so tests can assert refresh coalescing.
#[derive(Default)]
struct CountingAnalyzer {
    calls: AtomicUsize,
}

impl CountingAnalyzer {
    fn analyses(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProjectAnalyzer for CountingAnalyzer {
    async fn analyze(&self, _path: &Utf8Path) -> AnalysisReport {
        self.calls.fetch_add(1, Ordering::SeqCst);
        AnalysisReport::new(SystemStatus::Ready, SystemKind::React)
    }

    async fn probe(&self, _path: &Utf8Path) -> bool {
        true
    }
}

struct WatchHarness {
    analyzer: Arc<CountingAnalyzer>,
    registry: Arc<SystemRegistry<InMemoryDescriptorStore, CountingAnalyzer, DefaultClock>>,
    source: Arc<ManualChangeSource>,
    watcher:
        ChangeWatcher<InMemoryDescriptorStore, CountingAnalyzer, DefaultClock, ManualChangeSource>,
}

fn storefront_id() -> SystemId {
    SystemId::new("storefront").expect("valid id")
}

async fn watch_harness() -> WatchHarness {
    let analyzer = Arc::new(CountingAnalyzer::default());
    let registry = Arc::new(
        SystemRegistry::open(
            Arc::new(InMemoryDescriptorStore::new()),
            Arc::clone(&analyzer),
            Arc::new(DefaultClock),
        )
        .await
        .expect("registry opens"),
    );
    registry
        .register(RegisterSystemRequest::new(
            "storefront",
            "Storefront",
            STOREFRONT_PATH,
            SystemKind::React,
        ))
        .await
        .expect("registration succeeds");

    let source = Arc::new(ManualChangeSource::new());
    let watcher = ChangeWatcher::new(Arc::clone(&registry), Arc::clone(&source), QUIET);

    WatchHarness {
        analyzer,
        registry,
        source,
        watcher,
    }
}

/// Polls until the analyzer call count reaches `expected`.
async fn wait_for_analyses(analyzer: &CountingAnalyzer, expected: usize) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while analyzer.analyses() < expected {
        assert!(
            tokio::time::Instant::now() < deadline,
            "expected {expected} analyses, saw {}",
            analyzer.analyses()
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn watch_requires_a_registered_system() {
    let harness = watch_harness().await;
    let ghost = SystemId::new("ghost").expect("valid id");

    let result = harness.watcher.watch(&ghost).await;
    assert!(matches!(result, Err(RegistryError::NotFound(_))));
    assert!(harness.watcher.watched().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn watch_is_idempotent_per_system() {
    let harness = watch_harness().await;

    assert!(harness.watcher.watch(&storefront_id()).await.expect("watch starts"));
    assert!(!harness.watcher.watch(&storefront_id()).await.expect("second watch is a no-op"));
    assert_eq!(harness.watcher.watched(), vec![storefront_id()]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_burst_of_changes_coalesces_into_one_refresh() {
    let harness = watch_harness().await;
    harness
        .watcher
        .watch(&storefront_id())
        .await
        .expect("watch starts");
    let baseline = harness.analyzer.analyses();

    for file in ["src/App.jsx", "src/index.css", "package.json"] {
        harness
            .source
            .emit(format!("{STOREFRONT_PATH}/{file}"))
            .await;
    }

    wait_for_analyses(&harness.analyzer, baseline + 1).await;
    // Quiet period passed with no further events: exactly one refresh.
    tokio::time::sleep(QUIET * 4).await;
    assert_eq!(harness.analyzer.analyses(), baseline + 1);

    let descriptor = harness
        .registry
        .get(&storefront_id())
        .expect("descriptor present");
    assert_eq!(descriptor.status(), SystemStatus::Ready);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn separated_bursts_refresh_separately() {
    let harness = watch_harness().await;
    harness
        .watcher
        .watch(&storefront_id())
        .await
        .expect("watch starts");
    let baseline = harness.analyzer.analyses();

    harness
        .source
        .emit(format!("{STOREFRONT_PATH}/src/App.jsx"))
        .await;
    wait_for_analyses(&harness.analyzer, baseline + 1).await;

    harness
        .source
        .emit(format!("{STOREFRONT_PATH}/src/other.jsx"))
        .await;
    wait_for_analyses(&harness.analyzer, baseline + 2).await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unwatch_stops_refreshes() {
    let harness = watch_harness().await;
    harness
        .watcher
        .watch(&storefront_id())
        .await
        .expect("watch starts");
    let baseline = harness.analyzer.analyses();

    assert!(harness.watcher.unwatch(&storefront_id()));
    assert!(!harness.watcher.unwatch(&storefront_id()));

    harness
        .source
        .emit(format!("{STOREFRONT_PATH}/src/App.jsx"))
        .await;
    tokio::time::sleep(QUIET * 4).await;
    assert_eq!(harness.analyzer.analyses(), baseline);
    assert!(harness.watcher.watched().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn watch_all_covers_every_registered_system() {
    let harness = watch_harness().await;
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

    let started = harness.watcher.watch_all().await.expect("watch_all succeeds");
    assert_eq!(started, 2);

    // Already watched systems are not double-counted.
    let rerun = harness.watcher.watch_all().await.expect("watch_all succeeds");
    assert_eq!(rerun, 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn removing_a_system_ends_its_watch() {
    let harness = watch_harness().await;
    harness
        .watcher
        .watch(&storefront_id())
        .await
        .expect("watch starts");
    let baseline = harness.analyzer.analyses();

    harness
        .registry
        .remove(&storefront_id())
        .await
        .expect("removal succeeds");
    harness
        .source
        .emit(format!("{STOREFRONT_PATH}/src/App.jsx"))
        .await;

    // The debounce fire hits a removed system and the watch task ends.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !harness.watcher.watched().is_empty() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "watch task still running after removal"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    // The removed system was never re-analysed.
    assert_eq!(harness.analyzer.analyses(), baseline);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_pending_burst_is_flushed_when_the_source_ends() {
    let harness = watch_harness().await;
    harness
        .watcher
        .watch(&storefront_id())
        .await
        .expect("watch starts");
    let baseline = harness.analyzer.analyses();

    harness
        .source
        .emit(format!("{STOREFRONT_PATH}/src/App.jsx"))
        .await;
    harness.source.disconnect_all();

    wait_for_analyses(&harness.analyzer, baseline + 1).await;
}
