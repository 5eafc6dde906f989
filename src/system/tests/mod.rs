//! Tests for the system context.

mod domain_tests;
mod fixtures;
mod health_tests;
