//! Orchestration services for the watch context.

mod watcher;

pub use watcher::ChangeWatcher;
