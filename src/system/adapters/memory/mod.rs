//! In-memory adapters for system context tests and local orchestration.

mod analyzer;
mod store;

pub use analyzer::ScriptedAnalyzer;
pub use store::InMemoryDescriptorStore;
