//! Trailing-edge debounce window.

use tokio::time::Instant;

/// Coalesces bursts of change notifications into a single trigger.
///
/// Every observed event pushes the deadline out by the full quiet period;
/// the window fires only once no event has arrived for that long. Pure
/// state machine over caller-supplied instants, so it is testable without
/// timers.
#[derive(Debug, Clone)]
pub struct DebounceWindow {
    quiet: std::time::Duration,
    deadline: Option<Instant>,
}

impl DebounceWindow {
    /// Creates a window with the given quiet period.
    #[must_use]
    pub const fn new(quiet: std::time::Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// Records an event at `now`, restarting the quiet period.
    pub fn observe(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    /// Returns the instant the window would fire, if an event is pending.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns whether an event is waiting for the window to fire.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Fires the window if the quiet period has elapsed by `now`.
    ///
    /// Returns `true` exactly once per burst; the pending state is cleared
    /// on fire.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
