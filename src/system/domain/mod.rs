//! Domain model for managed-system descriptors.
//!
//! The system domain models the identity, classification, and analysed
//! state of one managed project directory. All infrastructure concerns are
//! kept outside the domain boundary.

mod analysis;
mod descriptor;
mod error;
mod ids;
mod kind;
mod status;

pub use analysis::AnalysisReport;
pub use descriptor::{SystemDescriptor, SystemName};
pub use error::{ParseSystemKindError, ParseSystemStatusError, SystemDomainError};
pub use ids::SystemId;
pub use kind::SystemKind;
pub use status::SystemStatus;
