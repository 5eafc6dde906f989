//! Port contracts for the system context.

mod analyzer;
mod store;

pub use analyzer::ProjectAnalyzer;
pub use store::{DescriptorStore, DescriptorStoreError, DescriptorStoreResult};
