//! Analysis report produced by inspecting a project directory.

use super::{SystemKind, SystemStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Outcome of analysing one project directory.
///
/// Reports are plain data: the analyser folds its own IO failures into
/// [`SystemStatus::Error`] with a detail message rather than surfacing an
/// error, so registry operations stay robust to a single bad project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    status: SystemStatus,
    suggested_kind: SystemKind,
    technologies: BTreeSet<String>,
    deploy_capable: bool,
    built: bool,
    detail: Option<String>,
}

impl AnalysisReport {
    /// Creates a report with the given derived status and kind suggestion.
    #[must_use]
    pub const fn new(status: SystemStatus, suggested_kind: SystemKind) -> Self {
        Self {
            status,
            suggested_kind,
            technologies: BTreeSet::new(),
            deploy_capable: false,
            built: false,
            detail: None,
        }
    }

    /// Creates an `error` report carrying a diagnostic message.
    ///
    /// Used when the path is missing or unreadable; no technology or
    /// capability information is attached.
    #[must_use]
    pub fn error(detail: impl Into<String>) -> Self {
        Self::new(SystemStatus::Error, SystemKind::Other).with_detail(detail)
    }

    /// Replaces the detected technology tag set.
    #[must_use]
    pub fn with_technologies(mut self, technologies: impl IntoIterator<Item = String>) -> Self {
        self.technologies = technologies.into_iter().collect();
        self
    }

    /// Marks whether a deployment configuration file was found.
    #[must_use]
    pub const fn with_deploy_capable(mut self, deploy_capable: bool) -> Self {
        self.deploy_capable = deploy_capable;
        self
    }

    /// Marks whether a build-output directory was found.
    #[must_use]
    pub const fn with_built(mut self, built: bool) -> Self {
        self.built = built;
        self
    }

    /// Attaches a diagnostic detail message.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        let normalized = detail.into().trim().to_owned();
        if !normalized.is_empty() {
            self.detail = Some(normalized);
        }
        self
    }

    /// Returns the derived status.
    #[must_use]
    pub const fn status(&self) -> SystemStatus {
        self.status
    }

    /// Returns the kind the analyser would classify this project as.
    #[must_use]
    pub const fn suggested_kind(&self) -> SystemKind {
        self.suggested_kind
    }

    /// Returns the detected technology tags.
    #[must_use]
    pub const fn technologies(&self) -> &BTreeSet<String> {
        &self.technologies
    }

    /// Returns whether a deployment configuration was detected.
    #[must_use]
    pub const fn deploy_capable(&self) -> bool {
        self.deploy_capable
    }

    /// Returns whether build output was detected.
    #[must_use]
    pub const fn built(&self) -> bool {
        self.built
    }

    /// Returns the diagnostic detail, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}
