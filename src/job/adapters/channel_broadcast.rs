//! Broadcast adapter fanning events out over tokio channels.

use crate::job::domain::JobEvent;
use crate::job::ports::EventSink;
use crate::system::domain::SystemId;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tokio::sync::broadcast;

/// Fan-out hub with one broadcast channel per system plus a global
/// channel for cross-system dashboards.
///
/// Channels are created lazily on first subscription or publish. Send
/// errors (no connected subscriber) are ignored: this is a live feed, not
/// a durable log.
pub struct ChannelBroadcaster {
    capacity: usize,
    global: broadcast::Sender<JobEvent>,
    channels: RwLock<HashMap<SystemId, broadcast::Sender<JobEvent>>>,
}

impl ChannelBroadcaster {
    const DEFAULT_CAPACITY: usize = 512;

    /// Creates a broadcaster with the given per-channel buffer capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (global, _) = broadcast::channel(capacity);
        Self {
            capacity,
            global,
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribes to one system's channel ("joining its room").
    #[must_use]
    pub fn subscribe(&self, system_id: &SystemId) -> broadcast::Receiver<JobEvent> {
        let mut channels = self
            .channels
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        channels
            .entry(system_id.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Subscribes to every system's events.
    #[must_use]
    pub fn subscribe_all(&self) -> broadcast::Receiver<JobEvent> {
        self.global.subscribe()
    }
}

impl Default for ChannelBroadcaster {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl EventSink for ChannelBroadcaster {
    fn publish(&self, event: &JobEvent) {
        self.global.send(event.clone()).ok();

        let channels = self.channels.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(sender) = channels.get(&event.system_id) {
            sender.send(event.clone()).ok();
        }
    }
}
