//! Per-system debounced change watcher.

use crate::system::domain::SystemId;
use crate::system::ports::{DescriptorStore, ProjectAnalyzer};
use crate::system::services::{RegistryError, RegistryResult, SystemRegistry};
use crate::watch::domain::DebounceWindow;
use crate::watch::ports::{ChangeSource, ChangeSubscription};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Watches registered systems' directories and refreshes their analysis.
///
/// One background task per watched system: change notifications feed a
/// [`DebounceWindow`], and when the window fires the registry re-analyses
/// the directory. Refresh failures are logged and the watch continues; a
/// deleted directory surfaces through the refreshed descriptor's `error`
/// status, not by tearing the watch down. Removing the system from the
/// registry is different: the watch task ends itself at its next refresh.
pub struct ChangeWatcher<S, A, C, W>
where
    S: DescriptorStore + Send + Sync + 'static,
    A: ProjectAnalyzer + Send + Sync + 'static,
    C: Clock + Send + Sync + 'static,
    W: ChangeSource,
{
    registry: Arc<SystemRegistry<S, A, C>>,
    source: Arc<W>,
    quiet: Duration,
    tasks: Mutex<HashMap<SystemId, JoinHandle<()>>>,
}

impl<S, A, C, W> ChangeWatcher<S, A, C, W>
where
    S: DescriptorStore + Send + Sync + 'static,
    A: ProjectAnalyzer + Send + Sync + 'static,
    C: Clock + Send + Sync + 'static,
    W: ChangeSource,
{
    /// Creates a watcher with the given debounce quiet period.
    #[must_use]
    pub fn new(registry: Arc<SystemRegistry<S, A, C>>, source: Arc<W>, quiet: Duration) -> Self {
        Self {
            registry,
            source,
            quiet,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Starts watching a system's directory.
    ///
    /// Returns `false` when the system is already watched.
    ///
    /// # Errors
    ///
    /// Returns [`crate::system::services::RegistryError::NotFound`] when
    /// the system is not registered.
    pub async fn watch(&self, id: &SystemId) -> RegistryResult<bool> {
        let descriptor = self.registry.get(id)?;

        if self.lock_tasks().contains_key(id) {
            return Ok(false);
        }

        let subscription = self.source.subscribe(descriptor.path()).await;
        let handle = tokio::spawn(run_watch(
            Arc::clone(&self.registry),
            id.clone(),
            subscription,
            self.quiet,
        ));

        let mut tasks = self.lock_tasks();
        if tasks.contains_key(id) {
            // Lost a subscribe race; keep the first watch.
            handle.abort();
            return Ok(false);
        }
        tasks.insert(id.clone(), handle);
        debug!(system_id = %id, "watch started");
        Ok(true)
    }

    /// Stops watching a system.
    ///
    /// Returns `false` when the system was not watched.
    #[must_use]
    pub fn unwatch(&self, id: &SystemId) -> bool {
        let Some(handle) = self.lock_tasks().remove(id) else {
            return false;
        };
        handle.abort();
        debug!(system_id = %id, "watch stopped");
        true
    }

    /// Starts watching every registered system, returning how many new
    /// watches began.
    ///
    /// # Errors
    ///
    /// Returns registry errors when the descriptor map is unavailable.
    pub async fn watch_all(&self) -> RegistryResult<usize> {
        let mut started = 0;
        for descriptor in self.registry.list()? {
            if self.watch(descriptor.id()).await? {
                started += 1;
            }
        }
        Ok(started)
    }

    /// Returns the systems currently watched.
    #[must_use]
    pub fn watched(&self) -> Vec<SystemId> {
        let mut ids: Vec<SystemId> = self.lock_tasks().keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    fn lock_tasks(&self) -> std::sync::MutexGuard<'_, HashMap<SystemId, JoinHandle<()>>> {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        // Watch tasks end themselves when their system is removed.
        tasks.retain(|_, handle| !handle.is_finished());
        tasks
    }
}

impl<S, A, C, W> Drop for ChangeWatcher<S, A, C, W>
where
    S: DescriptorStore + Send + Sync + 'static,
    A: ProjectAnalyzer + Send + Sync + 'static,
    C: Clock + Send + Sync + 'static,
    W: ChangeSource,
{
    fn drop(&mut self) {
        for handle in self.lock_tasks().values() {
            handle.abort();
        }
    }
}

async fn run_watch<S, A, C>(
    registry: Arc<SystemRegistry<S, A, C>>,
    id: SystemId,
    mut subscription: ChangeSubscription,
    quiet: Duration,
) where
    S: DescriptorStore + Send + Sync + 'static,
    A: ProjectAnalyzer + Send + Sync + 'static,
    C: Clock + Send + Sync + 'static,
{
    let mut window = DebounceWindow::new(quiet);

    loop {
        let deadline = window.deadline();
        tokio::select! {
            received = subscription.events.recv() => {
                let Some(change) = received else {
                    // Source ended; flush any pending burst before exit.
                    if window.is_pending() {
                        refresh(&registry, &id).await;
                    }
                    return;
                };
                debug!(system_id = %id, path = %change.path, "change observed");
                window.observe(Instant::now());
            }
            () = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)),
                if deadline.is_some() =>
            {
                if window.fire(Instant::now()) && !refresh(&registry, &id).await {
                    return;
                }
            }
        }
    }
}

/// Refreshes a system after a debounce fire.
///
/// Returns `false` when the system is no longer registered and the watch
/// should end.
async fn refresh<S, A, C>(registry: &SystemRegistry<S, A, C>, id: &SystemId) -> bool
where
    S: DescriptorStore + Send + Sync + 'static,
    A: ProjectAnalyzer + Send + Sync + 'static,
    C: Clock + Send + Sync + 'static,
{
    match registry.refresh(id).await {
        Ok(descriptor) => {
            debug!(system_id = %id, status = %descriptor.status(), "refreshed after changes");
            true
        }
        Err(RegistryError::NotFound(_)) => {
            debug!(system_id = %id, "system no longer registered; watch ending");
            false
        }
        Err(err) => {
            warn!(system_id = %id, error = %err, "refresh after changes failed");
            true
        }
    }
}
