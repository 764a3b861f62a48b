//! Common types shared across the simulator.
//!
//! This module provides the fundamental building blocks used by every other
//! component:
//! 1. **Error handling:** the unified [`error::SimError`] taxonomy.
//! 2. **Constants:** address bit-layout and scheduling defaults.

/// Constants: address bit-layout, clock-domain scaling, scheduling defaults.
pub mod constants;

/// Error types shared by every component.
pub mod error;

pub use constants::SCALE_FACTOR;
pub use error::SimError;
