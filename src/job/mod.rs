//! Build and deploy job orchestration for Atelier.
//!
//! This module owns the job lifecycle: the runner spawns the external
//! build/deploy process for a system, streams its output into the job's
//! log, the tracker records active and historical jobs, and the broadcaster
//! fans lifecycle and log events out to subscribers. The module follows
//! hexagonal architecture:
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
