//! Polling change source scanning file modification times.

use crate::watch::ports::{ChangeSource, ChangeSubscription, FsChange};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use std::time::{Duration, SystemTime};
use tokio::sync::mpsc;
use tracing::debug;

/// Directories whose churn never reflects a meaningful project change.
const NOISE_DIRS: [&str; 7] = [
    "node_modules",
    ".git",
    "dist",
    "build",
    "target",
    ".firebase",
    "coverage",
];

const EVENT_BUFFER: usize = 256;

/// Change source that rescans the tree on a fixed interval and diffs file
/// modification times.
///
/// Portable fallback for environments without native watch support. A scan
/// runs on the blocking pool; the watching task exits once the subscription
/// is dropped.
#[derive(Debug, Clone, Copy)]
pub struct PollingChangeSource {
    interval: Duration,
}

impl PollingChangeSource {
    /// Creates a source scanning every `interval`.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

#[async_trait]
impl ChangeSource for PollingChangeSource {
    async fn subscribe(&self, root: &Utf8Path) -> ChangeSubscription {
        let (sender, events) = mpsc::channel(EVENT_BUFFER);
        let interval = self.interval;
        let root = root.to_owned();

        tokio::spawn(async move {
            let mut previous = scan(root.clone()).await;
            loop {
                tokio::time::sleep(interval).await;
                if sender.is_closed() {
                    return;
                }

                let current = scan(root.clone()).await;
                for path in diff(&previous, &current) {
                    debug!(root = %root, path = %path, "filesystem change detected");
                    if sender.send(FsChange { path }).await.is_err() {
                        return;
                    }
                }
                previous = current;
            }
        });

        ChangeSubscription { events }
    }
}

async fn scan(root: Utf8PathBuf) -> HashMap<Utf8PathBuf, SystemTime> {
    tokio::task::spawn_blocking(move || {
        let mut snapshot = HashMap::new();
        collect_mtimes(&root, &mut snapshot);
        snapshot
    })
    .await
    .unwrap_or_default()
}

fn collect_mtimes(dir: &Utf8Path, snapshot: &mut HashMap<Utf8PathBuf, SystemTime>) {
    let Ok(entries) = dir.as_std_path().read_dir() else {
        return;
    };

    for entry in entries.flatten() {
        let Ok(path) = Utf8PathBuf::from_path_buf(entry.path()) else {
            continue;
        };
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            let name = path.file_name().unwrap_or_default();
            if NOISE_DIRS.contains(&name) {
                continue;
            }
            collect_mtimes(&path, snapshot);
        } else if file_type.is_file() {
            if let Ok(modified) = entry.metadata().and_then(|meta| meta.modified()) {
                snapshot.insert(path, modified);
            }
        }
    }
}

fn diff(
    previous: &HashMap<Utf8PathBuf, SystemTime>,
    current: &HashMap<Utf8PathBuf, SystemTime>,
) -> Vec<Utf8PathBuf> {
    let mut changed: Vec<Utf8PathBuf> = current
        .iter()
        .filter(|(path, modified)| previous.get(*path) != Some(modified))
        .map(|(path, _)| path.clone())
        .collect();
    changed.extend(
        previous
            .keys()
            .filter(|path| !current.contains_key(*path))
            .cloned(),
    );
    changed.sort_unstable();
    changed
}
