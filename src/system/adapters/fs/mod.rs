//! Filesystem-backed adapters for analysis and persistence.

mod analyzer;
mod json_store;

pub use analyzer::FsProjectAnalyzer;
pub use json_store::JsonFileDescriptorStore;
