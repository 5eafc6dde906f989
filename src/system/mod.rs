//! Descriptor registry and project analysis for Atelier.
//!
//! This module tracks the fleet of managed projects: each project directory
//! is analysed into a [`domain::SystemDescriptor`], registered in the
//! in-memory registry, and persisted through a document store. The module
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
