//! Port contracts for the watch context.

mod source;

pub use source::{ChangeSource, ChangeSubscription, FsChange};
