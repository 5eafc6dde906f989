//! Broadcast port for live job events.

use crate::job::domain::JobEvent;

/// Fan-out contract for job lifecycle and log events.
///
/// Delivery is best-effort: with no subscriber connected the event is
/// dropped. The runner publishes through this interface and never knows
/// how subscribers are managed.
pub trait EventSink: Send + Sync {
    /// Delivers an event to the system-scoped channel and the global
    /// channel.
    fn publish(&self, event: &JobEvent);
}
