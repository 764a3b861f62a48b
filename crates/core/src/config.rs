//! Configuration for the DIMM timing simulator.
//!
//! This module defines every value the specification treats as a constant
//! but which the spec's own external interface (`dimm_init(groups,
//! banks_per_group, rows_per_bank)`) requires to be reusable for tests. It
//! provides:
//! 1. **Defaults:** baseline geometry, DRAM timing parameters, and
//!    scheduler starvation thresholds.
//! 2. **Structures:** `DimmConfig`, `TimingConfig`, `SchedulerConfig`, and
//!    the root `Config`.
//! 3. **Policy selection:** the `Policy` enum choosing among the three
//!    scheduling strategies.

use crate::common::constants::{
    DEFAULT_BANKS_PER_GROUP, DEFAULT_GROUPS, DEFAULT_IFETCH_THRESHOLD, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_READ_THRESHOLD, DEFAULT_ROWS_PER_BANK, DEFAULT_WRITE_THRESHOLD, SCALE_FACTOR,
};

/// Baseline DRAM timing constants (memory-clock cycles; see
/// [`TimingConfig`] doc comment for the scale-factor convention).
mod defaults {
    /// Row-to-column delay: time from ACTIVATE to the first READ/WRITE.
    pub const T_RCD: u32 = 24;
    /// Row active time: minimum time a row must stay open before PRECHARGE.
    pub const T_RAS: u32 = 52;
    /// Column access strobe latency.
    pub const T_CAS: u32 = 24;
    /// Read-to-precharge delay.
    pub const T_RTP: u32 = 12;
    /// Row precharge time: time from PRECHARGE to the next ACTIVATE.
    pub const T_RP: u32 = 24;
    /// Burst transfer length.
    pub const T_BURST: u32 = 4;
    /// CAS write latency.
    pub const CWL: u32 = 20;
    /// Write recovery time.
    pub const T_WR: u32 = 20;
    /// Same-group activate-to-activate spacing.
    pub const T_RRD_S: u32 = 4;
    /// Cross-group activate-to-activate spacing.
    pub const T_RRD_L: u32 = 6;
    /// Same-group column-to-column spacing.
    pub const T_CCD_S: u32 = 4;
    /// Cross-group column-to-column spacing.
    pub const T_CCD_L: u32 = 8;
    /// Same-group write-to-read turnaround.
    pub const T_WTR_S: u32 = 4;
    /// Cross-group write-to-read turnaround.
    pub const T_WTR_L: u32 = 12;
    /// Read-to-write turnaround.
    pub const T_RTW: u32 = 4;
}

/// DIMM geometry and pending-queue capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimmConfig {
    /// Number of bank groups on the DIMM.
    pub groups: usize,
    /// Number of banks per bank group.
    pub banks_per_group: usize,
    /// Number of rows per bank.
    pub rows_per_bank: u32,
    /// Maximum number of requests the pending queue may hold at once.
    pub queue_capacity: usize,
}

impl Default for DimmConfig {
    fn default() -> Self {
        Self {
            groups: DEFAULT_GROUPS,
            banks_per_group: DEFAULT_BANKS_PER_GROUP,
            rows_per_bank: DEFAULT_ROWS_PER_BANK,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// DRAM timing parameters and the CPU/memory clock scale factor.
///
/// All fields are stored in memory-clock cycles — the literal values from
/// the specification's timing table. Every timing computation in
/// [`crate::dimm`] multiplies the relevant field by [`Self::scale_factor`]
/// to obtain the CPU-cycle duration used by the event loop's `now` counter.
/// See `DESIGN.md` for why this convention (rather than pre-scaling the
/// stored constants) matches the specification's own worked examples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    /// Row-to-column delay (ACTIVATE → READ/WRITE).
    pub t_rcd: u32,
    /// Row active time (ACTIVATE → PRECHARGE minimum).
    pub t_ras: u32,
    /// Column access strobe latency.
    pub t_cas: u32,
    /// Read-to-precharge delay.
    pub t_rtp: u32,
    /// Row precharge time (PRECHARGE → ACTIVATE).
    pub t_rp: u32,
    /// Burst transfer length.
    pub t_burst: u32,
    /// CAS write latency.
    pub cwl: u32,
    /// Write recovery time.
    pub t_wr: u32,
    /// Same-bank-group activate-to-activate spacing.
    pub t_rrd_s: u32,
    /// Cross-bank-group activate-to-activate spacing.
    pub t_rrd_l: u32,
    /// Same-bank-group column-to-column spacing.
    pub t_ccd_s: u32,
    /// Cross-bank-group column-to-column spacing.
    pub t_ccd_l: u32,
    /// Same-bank-group write-to-read turnaround.
    pub t_wtr_s: u32,
    /// Cross-bank-group write-to-read turnaround.
    pub t_wtr_l: u32,
    /// Read-to-write turnaround.
    pub t_rtw: u32,
    /// Ratio between the CPU clock and the memory clock.
    pub scale_factor: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            t_rcd: defaults::T_RCD,
            t_ras: defaults::T_RAS,
            t_cas: defaults::T_CAS,
            t_rtp: defaults::T_RTP,
            t_rp: defaults::T_RP,
            t_burst: defaults::T_BURST,
            cwl: defaults::CWL,
            t_wr: defaults::T_WR,
            t_rrd_s: defaults::T_RRD_S,
            t_rrd_l: defaults::T_RRD_L,
            t_ccd_s: defaults::T_CCD_S,
            t_ccd_l: defaults::T_CCD_L,
            t_wtr_s: defaults::T_WTR_S,
            t_wtr_l: defaults::T_WTR_L,
            t_rtw: defaults::T_RTW,
            scale_factor: SCALE_FACTOR,
        }
    }
}

impl TimingConfig {
    /// Converts a memory-clock-cycle value to CPU cycles using
    /// [`Self::scale_factor`].
    #[inline]
    #[must_use]
    pub fn scale(&self, memory_cycles: u32) -> u64 {
        u64::from(memory_cycles) * self.scale_factor
    }
}

/// Scheduling policy selecting how the scheduler picks the next request to
/// advance on an eligible tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Policy {
    /// Strict in-order: the oldest ready request not blocked by an older,
    /// same-group, not-yet-ready request advances; no look-ahead.
    Strict,
    /// Loose in-order (default): oldest-first scan with per-tick resource
    /// reservation, allowing a younger request to slot in if it would not
    /// delay any already-reserved command.
    #[default]
    LooseInOrder,
    /// Optimized: priority order built from starvation aging and open-row
    /// locality before falling back to oldest-first per op kind.
    Optimized,
}

/// Per-op-kind starvation thresholds for the optimized scheduling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarvationThresholds {
    /// Time-in-queue (CPU cycles) after which an IFETCH is treated as aged.
    pub ifetch: u16,
    /// Time-in-queue (CPU cycles) after which a READ is treated as aged.
    pub read: u16,
    /// Time-in-queue (CPU cycles) after which a WRITE is treated as aged.
    pub write: u16,
}

impl Default for StarvationThresholds {
    fn default() -> Self {
        Self {
            ifetch: DEFAULT_IFETCH_THRESHOLD,
            read: DEFAULT_READ_THRESHOLD,
            write: DEFAULT_WRITE_THRESHOLD,
        }
    }
}

/// Scheduler behavior configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchedulerConfig {
    /// Active scheduling policy.
    pub policy: Policy,
    /// Starvation thresholds used by the optimized policy.
    pub thresholds: StarvationThresholds,
}

/// Root configuration for a simulation run.
///
/// # Examples
///
/// ```
/// use dimmsim_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.dimm.groups, 4);
/// assert_eq!(config.timing.t_rcd, 24);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    /// DIMM geometry and queue capacity.
    pub dimm: DimmConfig,
    /// DRAM timing parameters.
    pub timing: TimingConfig,
    /// Scheduler policy and starvation thresholds.
    pub scheduler: SchedulerConfig,
}
