//! In-memory adapters for job context tests.

mod launcher;

pub use launcher::{ScriptedLauncher, ScriptedRun};
