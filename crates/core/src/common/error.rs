//! Error taxonomy for the DIMM timing simulator.
//!
//! This module defines the single error type shared by every component. It
//! provides:
//! 1. **Recoverable errors:** `ParseError` and `AddressOutOfRange`, handled
//!    locally by the trace reader's caller (the line is skipped).
//! 2. **Fatal errors:** `QueueFull` (throttles ingest, not actually fatal —
//!    see [`SimError::QueueFull`] docs), `BadArgs`, `IllegalCommand`,
//!    `IoError`, and `Overflow`, which propagate out of the simulation
//!    driver and become the process exit code.

use std::fmt;

/// The unified error type for every fallible operation in the simulator.
///
/// Mirrors the taxonomy in the specification's error handling design:
/// locally-recovered parse errors, and fatal errors that indicate either a
/// malformed trace, a programmer error in the scheduler, or an I/O failure.
#[derive(thiserror::Error, Debug)]
pub enum SimError {
    /// A trace line did not have the expected `<cycle> <op> <addr>` shape.
    #[error("parse error at line {line}: {reason}")]
    ParseError {
        /// 1-based line number in the trace file.
        line: usize,
        /// Human-readable description of what was wrong with the line.
        reason: String,
    },

    /// A trace line decoded to a row address outside the DIMM's geometry.
    #[error("address out of range at line {line}: row {row} >= {rows_per_bank}")]
    AddressOutOfRange {
        /// 1-based line number in the trace file.
        line: usize,
        /// The decoded row index that was out of range.
        row: u32,
        /// The configured number of rows per bank.
        rows_per_bank: u32,
    },

    /// The pending queue rejected a push because it is at capacity.
    ///
    /// This is not actually fatal in the driver: a full queue naturally
    /// throttles trace ingest (the reader retries the request next tick).
    /// It is an error type rather than an `Option` return because some
    /// call sites (tests exercising the queue directly) do treat it as a
    /// hard failure.
    #[error("pending queue is full (capacity {capacity})")]
    QueueFull {
        /// The queue's configured capacity.
        capacity: usize,
    },

    /// A DIMM-core call received an out-of-range bank, group, or row index.
    #[error("bad arguments to {function}: {detail}")]
    BadArgs {
        /// The DIMM-core function that rejected its arguments.
        function: &'static str,
        /// What was wrong with the arguments.
        detail: String,
    },

    /// A command was issued that the addressed bank's state forbids.
    #[error("illegal command {command} on bank (group {group}, bank {bank}): {detail}")]
    IllegalCommand {
        /// The command that could not be issued.
        command: &'static str,
        /// The bank group index.
        group: u8,
        /// The bank index within the group.
        bank: u8,
        /// Why the command was illegal in the bank's current state.
        detail: String,
    },

    /// Writing to the output stream failed.
    #[error("output I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The CPU-cycle counter `now` would wrap on the next advance.
    #[error("simulation time overflowed at cycle {at}")]
    Overflow {
        /// The cycle value at which the overflow was detected.
        at: u64,
    },
}

/// Coarse classification used by `main` to select a process exit code.
///
/// Recoverable errors never reach this type; it exists only to give
/// [`SimError`] variants a stable, small exit-code mapping independent of
/// their `Display` text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitClass {
    /// Clean termination: EOF with an empty queue.
    Clean,
    /// A fatal error occurred; the process should exit nonzero.
    Fatal,
}

impl fmt::Display for ExitClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitClass::Clean => write!(f, "clean"),
            ExitClass::Fatal => write!(f, "fatal"),
        }
    }
}

impl SimError {
    /// Returns `true` if this error is locally recoverable by skipping the
    /// offending trace line, `false` if it must propagate and abort the
    /// simulation.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SimError::ParseError { .. } | SimError::AddressOutOfRange { .. }
        )
    }
}
