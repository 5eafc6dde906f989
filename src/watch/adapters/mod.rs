//! Adapter implementations for the watch context ports.

mod memory;
mod polling;

pub use memory::ManualChangeSource;
pub use polling::PollingChangeSource;
