//! Filesystem change source port.

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use tokio::sync::mpsc;

/// One filesystem change notification under a watched root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsChange {
    /// Path that changed (created, modified, or removed).
    pub path: Utf8PathBuf,
}

/// Live stream of changes for one watched root.
///
/// The stream ends when the source stops observing the root; dropping the
/// subscription releases the source's resources for it.
pub struct ChangeSubscription {
    /// Ordered change notifications.
    pub events: mpsc::Receiver<FsChange>,
}

/// Source of filesystem change notifications.
///
/// Subscribing is infallible: a root that is missing or disappears simply
/// yields no further events. The registry's own refresh analysis is the
/// authority on whether a directory still exists.
#[async_trait]
pub trait ChangeSource: Send + Sync {
    /// Starts observing a directory tree.
    async fn subscribe(&self, root: &Utf8Path) -> ChangeSubscription;
}
