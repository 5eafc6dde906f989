//! Tests for the watch context.

mod watcher_tests;
