//! Identifier types for the system domain.

use super::SystemDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a managed system.
///
/// Identifiers are caller-supplied slugs, immutable once the descriptor is
/// created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemId(String);

impl SystemId {
    const MAX_LENGTH: usize = 64;

    /// Creates a validated system identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SystemDomainError::EmptySystemId`] when the value is empty
    /// after trimming, [`SystemDomainError::InvalidSystemId`] when it
    /// contains characters outside `[a-z0-9_-]`, or
    /// [`SystemDomainError::SystemIdTooLong`] when it exceeds 64 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, SystemDomainError> {
        let raw = value.into();
        let normalized = raw.trim();

        if normalized.is_empty() {
            return Err(SystemDomainError::EmptySystemId);
        }
        if normalized.len() > Self::MAX_LENGTH {
            return Err(SystemDomainError::SystemIdTooLong(raw));
        }
        let valid = normalized
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' || ch == '-');
        if !valid {
            return Err(SystemDomainError::InvalidSystemId(raw));
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Derives an identifier slug from an arbitrary directory name.
    ///
    /// Uppercase letters are lowered and runs of other invalid characters
    /// collapse to a single underscore. Returns `None` when nothing usable
    /// remains.
    #[must_use]
    pub fn slug_from(value: &str) -> Option<Self> {
        let mut slug = String::with_capacity(value.len());
        let mut last_was_separator = true;
        for ch in value.trim().chars() {
            if ch.is_ascii_alphanumeric() {
                slug.push(ch.to_ascii_lowercase());
                last_was_separator = false;
            } else if !last_was_separator {
                slug.push('_');
                last_was_separator = true;
            }
        }
        let trimmed = slug.trim_matches('_');
        if trimmed.is_empty() {
            return None;
        }
        Self::new(trimmed.chars().take(Self::MAX_LENGTH).collect::<String>()).ok()
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SystemId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
