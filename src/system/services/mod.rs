//! Orchestration services for the system context.

mod health;
mod registry;

pub use health::{Alert, AlertSeverity, HealthMonitor};
pub use registry::{
    RegisterSystemRequest, RegistryError, RegistryResult, SystemRegistry, UpdateSystemRequest,
};
