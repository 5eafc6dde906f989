//! Managed-system classification.

use super::ParseSystemKindError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Project classification deciding which command templates apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemKind {
    /// Client-side React application.
    React,
    /// React application backed by a hosted backend-as-a-service.
    ReactBaas,
    /// Standalone Node.js service.
    NodeService,
    /// Combined client and server project.
    FullStack,
    /// Anything that does not match a known shape.
    Other,
}

impl SystemKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::React => "react",
            Self::ReactBaas => "react_baas",
            Self::NodeService => "node_service",
            Self::FullStack => "full_stack",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for SystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SystemKind {
    type Error = ParseSystemKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "react" => Ok(Self::React),
            "react_baas" => Ok(Self::ReactBaas),
            "node_service" => Ok(Self::NodeService),
            "full_stack" => Ok(Self::FullStack),
            "other" => Ok(Self::Other),
            _ => Err(ParseSystemKindError(value.to_owned())),
        }
    }
}
