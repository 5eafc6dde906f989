//! Job identifier.

use super::JobKind;
use crate::system::domain::SystemId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for one build or deploy invocation.
///
/// Encodes the job kind, the system, and the creation timestamp for
/// traceability, plus a random suffix so two jobs created in the same
/// millisecond stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Creates an identifier for a job created at `created_at`.
    #[must_use]
    pub fn new(kind: JobKind, system_id: &SystemId, created_at: DateTime<Utc>) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        let short_suffix: String = suffix.chars().take(8).collect();
        Self(format!(
            "{}-{}-{}-{}",
            kind.as_str(),
            system_id,
            created_at.timestamp_millis(),
            short_suffix
        ))
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
