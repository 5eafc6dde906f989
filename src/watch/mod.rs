//! Debounced filesystem change watching for Atelier.
//!
//! Each watched system gets its own background task: filesystem change
//! notifications feed a trailing-edge debounce window, and when the window
//! fires the registry re-analyses the system's directory. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
