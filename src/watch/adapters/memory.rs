//! Manual change source for deterministic watcher tests.

use crate::watch::ports::{ChangeSource, ChangeSubscription, FsChange};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;

struct ManualSubscriber {
    root: Utf8PathBuf,
    sender: mpsc::Sender<FsChange>,
}

/// Change source driven by explicit test calls instead of the filesystem.
#[derive(Default)]
pub struct ManualChangeSource {
    subscribers: Mutex<Vec<ManualSubscriber>>,
}

impl ManualChangeSource {
    /// Creates a source with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits a change for a path, delivered to every subscription whose
    /// root contains it.
    pub async fn emit(&self, path: impl Into<Utf8PathBuf>) {
        let change = FsChange { path: path.into() };
        let senders: Vec<mpsc::Sender<FsChange>> = {
            let subscribers = self
                .subscribers
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            subscribers
                .iter()
                .filter(|subscriber| change.path.starts_with(&subscriber.root))
                .map(|subscriber| subscriber.sender.clone())
                .collect()
        };

        for sender in senders {
            sender.send(change.clone()).await.ok();
        }
    }

    /// Drops every subscription, ending their event streams.
    pub fn disconnect_all(&self) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[async_trait]
impl ChangeSource for ManualChangeSource {
    async fn subscribe(&self, root: &Utf8Path) -> ChangeSubscription {
        let (sender, events) = mpsc::channel(64);
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ManualSubscriber {
                root: root.to_owned(),
                sender,
            });
        ChangeSubscription { events }
    }
}
