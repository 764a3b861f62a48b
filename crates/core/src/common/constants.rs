//! Global simulator constants.
//!
//! This module defines the fixed bit-layout of a decoded trace address and
//! the CPU/memory clock-domain ratio. These values are architectural
//! (defined by the trace address format in the specification), not
//! per-DIMM configuration — DIMM geometry itself lives in
//! [`crate::config`].

/// Ratio between the CPU clock and the memory clock.
///
/// Every DRAM timing parameter in [`crate::config::TimingConfig`] is stored
/// in memory-clock cycles; multiply by `SCALE_FACTOR` to obtain CPU cycles,
/// the unit the event loop's `now` counter advances in.
pub const SCALE_FACTOR: u64 = 2;

/// Bit width of the byte-select field (address bits `[2:0]`).
pub const BYTE_SELECT_BITS: u32 = 3;
/// Bit width of the lower-column field (address bits `[5:3]`).
pub const LOWER_COLUMN_BITS: u32 = 3;
/// Bit width of the bank-group field (address bits `[7:6]`).
pub const BANK_GROUP_BITS: u32 = 2;
/// Bit width of the bank field (address bits `[9:8]`).
pub const BANK_BITS: u32 = 2;
/// Bit width of the upper-column field (address bits `[17:10]`).
pub const UPPER_COLUMN_BITS: u32 = 8;
/// Bit width of the row field (address bits `[32:18]`).
pub const ROW_BITS: u32 = 15;

/// Default pending-queue capacity (spec §4.2).
pub const DEFAULT_QUEUE_CAPACITY: usize = 16;

/// Default bank groups per DIMM.
pub const DEFAULT_GROUPS: usize = 4;
/// Default banks per bank group.
pub const DEFAULT_BANKS_PER_GROUP: usize = 4;
/// Default rows per bank (bounded by the 15-bit row field, `1 << 15`).
pub const DEFAULT_ROWS_PER_BANK: u32 = 1 << ROW_BITS;

/// Default starvation threshold (CPU cycles of time-in-queue) for IFETCH
/// requests under the optimized scheduling policy.
pub const DEFAULT_IFETCH_THRESHOLD: u16 = 500;
/// Default starvation threshold for READ requests under the optimized
/// scheduling policy.
pub const DEFAULT_READ_THRESHOLD: u16 = 1000;
/// Default starvation threshold for WRITE requests under the optimized
/// scheduling policy.
pub const DEFAULT_WRITE_THRESHOLD: u16 = 2000;
