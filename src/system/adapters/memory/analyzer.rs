//! Scripted analyzer adapter for deterministic tests.

use crate::system::domain::AnalysisReport;
use crate::system::ports::ProjectAnalyzer;
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Analyzer returning canned reports per path.
///
/// Paths without a scripted report analyse to `error`, matching the real
/// analyzer's behaviour for a missing directory.
#[derive(Debug, Clone, Default)]
pub struct ScriptedAnalyzer {
    reports: Arc<RwLock<HashMap<Utf8PathBuf, AnalysisReport>>>,
}

impl ScriptedAnalyzer {
    /// Creates an analyzer with no scripted reports.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the report returned for a path.
    ///
    /// Replaces any previous script for the same path.
    pub fn script(&self, path: impl Into<Utf8PathBuf>, report: AnalysisReport) {
        if let Ok(mut reports) = self.reports.write() {
            reports.insert(path.into(), report);
        }
    }

    /// Removes the script for a path, making it analyse to `error`.
    pub fn forget(&self, path: &Utf8Path) {
        if let Ok(mut reports) = self.reports.write() {
            reports.remove(path);
        }
    }
}

#[async_trait]
impl ProjectAnalyzer for ScriptedAnalyzer {
    async fn analyze(&self, path: &Utf8Path) -> AnalysisReport {
        self.reports
            .read()
            .ok()
            .and_then(|reports| reports.get(path).cloned())
            .unwrap_or_else(|| {
                AnalysisReport::error(format!(
                    "project path {path} does not exist or is not a directory"
                ))
            })
    }

    async fn probe(&self, path: &Utf8Path) -> bool {
        self.reports
            .read()
            .is_ok_and(|reports| reports.contains_key(path))
    }
}
