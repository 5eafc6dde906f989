//! Atelier: fleet registry and deployment orchestrator.
//!
//! This crate tracks a fleet of independently hosted web projects, analyses
//! their directories into descriptors, runs their build and deploy commands
//! as supervised external processes, and broadcasts live job progress to
//! subscribers.
//!
//! # Architecture
//!
//! Atelier follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (filesystem, processes,
//!   channels)
//!
//! # Modules
//!
//! - [`system`]: Descriptor registry, project analysis, and persistence
//! - [`job`]: Build/deploy jobs, the runner, history tracking, and event
//!   broadcasting
//! - [`watch`]: Debounced filesystem change watching that re-analyses
//!   registered projects
//! - [`config`]: Daemon configuration loading

pub mod config;
pub mod job;
pub mod system;
pub mod watch;
