//! Shared test utilities for mediaguard integration tests.
//!
//! - `TestHarness` wraps a `MediaProcessor` wired to in-process doubles
//! - builders for configs and processing options

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::*;
