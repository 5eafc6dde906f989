//! Analyzer port for classifying project directories.

use crate::system::domain::AnalysisReport;
use async_trait::async_trait;
use camino::Utf8Path;

/// Inspection contract turning a project directory into descriptor fields.
///
/// Analysis is deterministic modulo filesystem state and has no side
/// effects beyond reads. Implementations never fail: IO problems fold into
/// an [`AnalysisReport`] with `error` status and a detail message.
#[async_trait]
pub trait ProjectAnalyzer: Send + Sync {
    /// Analyses the directory at `path`.
    async fn analyze(&self, path: &Utf8Path) -> AnalysisReport;

    /// Reports whether `path` exists at all.
    ///
    /// Used by discovery to skip absent seed paths silently.
    async fn probe(&self, path: &Utf8Path) -> bool;
}
