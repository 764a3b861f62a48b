//! Command-log output (spec §4.5).
//!
//! Two emitters share the [`Emitter`] trait: [`terse::TerseEmitter`] writes
//! one bit-exact line per issued command, directly to the output stream.
//! [`verbose::VerboseEmitter`] is a supplemental human-readable mode (see
//! `SPEC_FULL.md`) that defers formatted messages through a delay-sorted
//! queue so begin/end pairs of a command's effect can be reported at the
//! right tick.

pub mod terse;
pub mod verbose;

use std::io;

use crate::scheduler::IssuedCommand;

/// A sink for simulation output, driven once per simulated tick.
pub trait Emitter {
    /// Reports a DRAM command issued at `cmd.now`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::common::SimError::IoError`] if the underlying
    /// writer fails.
    fn on_issue(&mut self, cmd: IssuedCommand) -> Result<(), crate::common::SimError>;

    /// Advances emitter-internal time by `delta` cycles and flushes any
    /// messages now due. The terse emitter ignores this (it has no
    /// deferred state); the verbose emitter drains its delay queue.
    ///
    /// # Errors
    ///
    /// Returns [`crate::common::SimError::IoError`] if the underlying
    /// writer fails.
    fn tick(&mut self, delta: u64) -> Result<(), crate::common::SimError>;

    /// Flushes the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the flush fails.
    fn flush(&mut self) -> io::Result<()>;
}
