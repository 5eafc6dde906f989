//! Adapter implementations for the system context ports.

pub mod fs;
pub mod memory;
