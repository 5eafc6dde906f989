//! System descriptor aggregate root.

use super::{AnalysisReport, SystemDomainError, SystemId, SystemKind, SystemStatus};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Validated display name for a managed system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemName(String);

impl SystemName {
    /// Creates a validated display name.
    ///
    /// # Errors
    ///
    /// Returns [`SystemDomainError::EmptySystemName`] when the value is
    /// empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, SystemDomainError> {
        let normalized = value.into().trim().to_owned();
        if normalized.is_empty() {
            return Err(SystemDomainError::EmptySystemName);
        }
        Ok(Self(normalized))
    }

    /// Returns the name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SystemName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for SystemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registry record for one managed project.
///
/// The registry exclusively owns descriptor mutation. The `status` field
/// always reflects the most recent analysis unless a manual override is in
/// force; an analysis reporting [`SystemStatus::Error`] always wins over an
/// override because a missing path is ground truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemDescriptor {
    id: SystemId,
    name: SystemName,
    path: Utf8PathBuf,
    kind: SystemKind,
    status: SystemStatus,
    status_overridden: bool,
    technologies: BTreeSet<String>,
    deploy_capable: bool,
    built: bool,
    registered_at: DateTime<Utc>,
    last_checked: Option<DateTime<Utc>>,
}

impl SystemDescriptor {
    /// Creates a descriptor for a newly registered system.
    ///
    /// The initial status is [`SystemStatus::NeedsSetup`] until the first
    /// analysis is merged via [`Self::apply_analysis`].
    ///
    /// # Errors
    ///
    /// Returns [`SystemDomainError::RelativePath`] when the path is not
    /// absolute.
    pub fn new(
        id: SystemId,
        name: SystemName,
        path: Utf8PathBuf,
        kind: SystemKind,
        clock: &impl Clock,
    ) -> Result<Self, SystemDomainError> {
        if !path.is_absolute() {
            return Err(SystemDomainError::RelativePath(path.into_string()));
        }

        Ok(Self {
            id,
            name,
            path,
            kind,
            status: SystemStatus::NeedsSetup,
            status_overridden: false,
            technologies: BTreeSet::new(),
            deploy_capable: false,
            built: false,
            registered_at: clock.utc(),
            last_checked: None,
        })
    }

    /// Returns the system identifier.
    #[must_use]
    pub const fn id(&self) -> &SystemId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(&self) -> &SystemName {
        &self.name
    }

    /// Returns the absolute project path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Returns the project classification.
    #[must_use]
    pub const fn kind(&self) -> SystemKind {
        self.kind
    }

    /// Returns the current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> SystemStatus {
        self.status
    }

    /// Returns whether the status was manually overridden.
    #[must_use]
    pub const fn status_overridden(&self) -> bool {
        self.status_overridden
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

    /// Returns the registration timestamp.
    #[must_use]
    pub const fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    /// Returns the timestamp of the most recent analysis, if any.
    #[must_use]
    pub const fn last_checked(&self) -> Option<DateTime<Utc>> {
        self.last_checked
    }

    /// Merges an analysis report into the descriptor.
    ///
    /// Technology tags and capability flags always update. The status
    /// updates unless a manual override is in force, except that an
    /// `error` result from analysis replaces an override.
    pub fn apply_analysis(&mut self, report: &AnalysisReport, clock: &impl Clock) {
        self.technologies = report.technologies().clone();
        self.deploy_capable = report.deploy_capable();
        self.built = report.built();
        self.last_checked = Some(clock.utc());

        if !self.status_overridden || report.status() == SystemStatus::Error {
            self.status = report.status();
        }
    }

    /// Renames the system.
    pub fn rename(&mut self, name: SystemName) {
        self.name = name;
    }

    /// Reclassifies the system.
    pub const fn set_kind(&mut self, kind: SystemKind) {
        self.kind = kind;
    }

    /// Manually overrides the lifecycle status.
    ///
    /// The override persists across refreshes until cleared, except when a
    /// later analysis reports `error`.
    pub const fn override_status(&mut self, status: SystemStatus) {
        self.status = status;
        self.status_overridden = true;
    }

    /// Clears a manual status override.
    ///
    /// The next analysis merge restores the derived status.
    pub const fn clear_status_override(&mut self) {
        self.status_overridden = false;
    }
}
