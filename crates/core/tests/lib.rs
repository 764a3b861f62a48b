//! # DIMM Simulator Integration Tests
//!
//! Central entry point for the crate's integration test suite, exercising
//! the public API end to end rather than the private internals the
//! `#[cfg(test)]` modules inside each source file cover.

/// End-to-end and cross-module tests grouped by the area of the simulator
/// they exercise.
pub mod unit;
