//! Port contracts for the job context.

mod broadcast;
mod launcher;

pub use broadcast::EventSink;
pub use launcher::{
    CommandLauncher, LaunchError, LaunchResult, LaunchedProcess, ProcessControl, ProcessEvent,
    ProcessExit,
};
