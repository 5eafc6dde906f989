//! Error types for system domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing system domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SystemDomainError {
    /// The system identifier is empty after trimming.
    #[error("system id must not be empty")]
    EmptySystemId,

    /// The system identifier contains characters outside `[a-z0-9_-]`.
    #[error(
        "system id '{0}' contains invalid characters (only lowercase alphanumeric, underscores, and hyphens allowed)"
    )]
    InvalidSystemId(String),

    /// The system identifier exceeds the 64-character limit.
    #[error("system id exceeds 64 character limit: {0}")]
    SystemIdTooLong(String),

    /// The display name is empty after trimming.
    #[error("system name must not be empty")]
    EmptySystemName,

    /// The project path is not absolute.
    #[error("system path '{0}' must be absolute")]
    RelativePath(String),
}

/// Error returned while parsing a system kind from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown system kind: {0}")]
pub struct ParseSystemKindError(pub String);

/// Error returned while parsing a system status from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown system status: {0}")]
pub struct ParseSystemStatusError(pub String);
