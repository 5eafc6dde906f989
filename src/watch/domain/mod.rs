//! Domain types for the watch context.

mod debounce;

pub use debounce::DebounceWindow;
