//! Active-job and history tracking.

use crate::job::domain::{Job, JobId, JobOutcome, LogLine, LogStream};
use crate::system::domain::SystemId;
use mockable::Clock;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

#[derive(Debug, Default)]
struct TrackerState {
    active: HashMap<JobId, Job>,
    history: VecDeque<Job>,
}

/// Tracks in-flight jobs and a bounded, most-recent-first history.
///
/// The tracker owns the transition of a job from the active set to the
/// history and the eviction policy: history is capped, and inserting
/// beyond the cap evicts the oldest entry. History is memory-only
/// operational telemetry and resets on process restart.
pub struct JobTracker<C>
where
    C: Clock + Send + Sync,
{
    clock: Arc<C>,
    capacity: usize,
    state: RwLock<TrackerState>,
}

impl<C> JobTracker<C>
where
    C: Clock + Send + Sync,
{
    /// Default history cap.
    pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

    /// Creates a tracker with the given history cap.
    #[must_use]
    pub fn new(clock: Arc<C>, capacity: usize) -> Self {
        Self {
            clock,
            capacity,
            state: RwLock::new(TrackerState::default()),
        }
    }

    /// Creates a tracker with the default history cap.
    #[must_use]
    pub fn with_default_capacity(clock: Arc<C>) -> Self {
        Self::new(clock, Self::DEFAULT_HISTORY_CAPACITY)
    }

    /// Returns the configured history cap.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Inserts a freshly created job into the active set.
    pub fn insert(&self, job: Job) {
        let mut state = self.write_state();
        state.active.insert(job.id().clone(), job);
    }

    /// Marks an active job as running, returning the updated snapshot.
    ///
    /// Returns `None` when the job is not in the active set or the
    /// transition is invalid.
    #[must_use]
    pub fn mark_running(&self, job_id: &JobId) -> Option<Job> {
        let mut state = self.write_state();
        let job = state.active.get_mut(job_id)?;
        match job.mark_running() {
            Ok(()) => Some(job.clone()),
            Err(err) => {
                debug!(job_id = %job_id, error = %err, "ignoring invalid running transition");
                None
            }
        }
    }

    /// Appends a log line to an active job.
    ///
    /// Returns the recorded line, or `None` when the job is unknown or
    /// already terminal (lines arriving after cancellation are dropped).
    #[must_use]
    pub fn append_line(
        &self,
        job_id: &JobId,
        stream: LogStream,
        message: impl Into<String>,
    ) -> Option<LogLine> {
        let line = LogLine::new(self.clock.utc(), stream, message);
        let mut state = self.write_state();
        let job = state.active.get_mut(job_id)?;
        job.record_line(line.clone()).then_some(line)
    }

    /// Applies a terminal outcome, moving the job from the active set to
    /// the front of the history.
    ///
    /// Returns the finished snapshot, or `None` when the job is unknown or
    /// already terminal — guaranteeing at most one terminal transition per
    /// job.
    #[must_use]
    pub fn finish(&self, job_id: &JobId, outcome: JobOutcome) -> Option<Job> {
        let mut state = self.write_state();
        let mut job = state.active.remove(job_id)?;

        if let Err(err) = job.finish(outcome, &*self.clock) {
            debug!(job_id = %job_id, error = %err, "ignoring invalid terminal transition");
            state.active.insert(job.id().clone(), job);
            return None;
        }

        let snapshot = job.clone();
        state.history.push_front(job);
        while state.history.len() > self.capacity {
            state.history.pop_back();
        }
        Some(snapshot)
    }

    /// Finds a job by id in the active set or the history.
    #[must_use]
    pub fn find(&self, job_id: &JobId) -> Option<Job> {
        let state = self.read_state();
        state
            .active
            .get(job_id)
            .or_else(|| state.history.iter().find(|job| job.id() == job_id))
            .cloned()
    }

    /// Returns active jobs, optionally filtered by system, newest first.
    #[must_use]
    pub fn active(&self, system_id: Option<&SystemId>) -> Vec<Job> {
        let state = self.read_state();
        let mut jobs: Vec<Job> = state
            .active
            .values()
            .filter(|job| system_id.is_none_or(|id| job.system_id() == id))
            .cloned()
            .collect();
        jobs.sort_by_key(|job| std::cmp::Reverse(job.started_at()));
        jobs
    }

    /// Returns historical jobs, optionally filtered by system, most recent
    /// first, up to `limit` entries.
    #[must_use]
    pub fn history(&self, system_id: Option<&SystemId>, limit: Option<usize>) -> Vec<Job> {
        let state = self.read_state();
        state
            .history
            .iter()
            .filter(|job| system_id.is_none_or(|id| job.system_id() == id))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, TrackerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, TrackerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
