//! Adapter implementations for the job context ports.

mod channel_broadcast;
pub mod memory;
mod tokio_launcher;

pub use channel_broadcast::ChannelBroadcaster;
pub use tokio_launcher::TokioCommandLauncher;
