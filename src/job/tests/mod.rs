//! Tests for the job context.

mod fixtures;
mod runner_tests;
