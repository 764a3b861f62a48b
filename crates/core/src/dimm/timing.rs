//! Timing primitives shared by the bank, bank-group, and DIMM levels.
//!
//! This module provides:
//! 1. **`TimingResult`:** the tagged outcome of every `can_C`/`C` call,
//!    replacing the original's signed integer return codes (Design Notes §9).
//! 2. **Recovery tables:** pure `recovery(first, second)` functions per
//!    level, used by the scheduler's reservation logic (spec §4.3).
//! 3. **Completion durations:** how many CPU cycles after issue a command's
//!    effect is visible, which becomes the issuing request's new `age`.

use crate::config::TimingConfig;
use crate::request::DramCommand;

/// The outcome of a `can_C`/`C` call at any of the three timing levels.
///
/// Replaces the original implementation's convention of `-2` (bad args),
/// `-1` (illegal), `0` (ready), and positive integers (cycles to wait).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingResult {
    /// The command can fire now; the associated value is the number of CPU
    /// cycles until its effect completes (spec "Command completion").
    Ready(u64),
    /// The command is legal in the current state but not yet timed;
    /// the associated value is the number of CPU cycles to wait.
    Wait(u64),
    /// The command cannot be issued in the bank's current state (e.g.
    /// PRECHARGE on an already-precharged bank, READ to a closed row).
    Illegal,
    /// The supplied group/bank/row index was out of range.
    BadArgs,
}

impl TimingResult {
    /// Combines this result with another from a different timing level,
    /// keeping the more restrictive outcome.
    ///
    /// `Illegal`/`BadArgs` dominate; otherwise the larger wait/ready
    /// duration wins (the DIMM-level result is the max of the three
    /// levels' wait times, spec §4.3).
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        match (self, other) {
            (TimingResult::BadArgs, _) | (_, TimingResult::BadArgs) => TimingResult::BadArgs,
            (TimingResult::Illegal, _) | (_, TimingResult::Illegal) => TimingResult::Illegal,
            (TimingResult::Wait(a), TimingResult::Wait(b)) => TimingResult::Wait(a.max(b)),
            (TimingResult::Wait(a), TimingResult::Ready(_))
            | (TimingResult::Ready(_), TimingResult::Wait(a)) => TimingResult::Wait(a),
            (TimingResult::Ready(a), TimingResult::Ready(b)) => TimingResult::Ready(a.max(b)),
        }
    }

    /// Returns the wait/ready cycle count, or `None` for `Illegal`/`BadArgs`.
    #[must_use]
    pub fn cycles(self) -> Option<u64> {
        match self {
            TimingResult::Ready(c) | TimingResult::Wait(c) => Some(c),
            TimingResult::Illegal | TimingResult::BadArgs => None,
        }
    }

    /// Returns `true` if the command can be issued immediately (`Ready(0)`)
    /// or is merely waiting on timing (`Wait`) — i.e. it is legal in the
    /// current bank state. Used by the scheduler's request-decode step.
    #[must_use]
    pub fn is_legal(self) -> bool {
        matches!(self, TimingResult::Ready(_) | TimingResult::Wait(_))
    }
}

/// How many CPU cycles after issue a command's effect completes.
///
/// This becomes the issuing request's new `age` (spec §4.3 "Command
/// completion"). All base values are in memory-clock cycles and are scaled
/// by [`TimingConfig::scale`].
#[must_use]
pub fn completion_duration(cmd: DramCommand, timing: &TimingConfig) -> u64 {
    match cmd {
        DramCommand::Activate => timing.scale(timing.t_rcd),
        DramCommand::Precharge => timing.scale(timing.t_rp),
        DramCommand::Read => timing.scale(timing.t_cas + timing.t_burst),
        DramCommand::Write => timing.scale(timing.cwl + timing.t_burst),
    }
}

/// Minimum CPU cycles that must elapse between `first` finishing and
/// `second` being issuable on the **same bank**.
///
/// Mirrors the bank-level `next_*` update rules in spec §4.3: an entry is
/// nonzero only where issuing `first` directly sets the `next_<second>`
/// timestamp on that bank. Combinations the state machine makes
/// unreachable anyway (e.g. `Read → Activate`, which requires an
/// intervening `Precharge`) return `0` — the bank's own legality check,
/// not this table, is what forbids them.
#[must_use]
pub fn bank_recovery(timing: &TimingConfig, first: DramCommand, second: DramCommand) -> u64 {
    use DramCommand::{Activate, Precharge, Read, Write};
    match (first, second) {
        (Activate, Read | Write) => timing.scale(timing.t_rcd),
        (Activate, Precharge) => timing.scale(timing.t_ras),
        (Precharge, Activate) => timing.scale(timing.t_rp),
        (Read, Precharge) => timing.scale(timing.t_rtp),
        (Read, Write) => read_to_write(timing),
        (Write, Precharge) => timing.scale(timing.cwl + timing.t_burst + timing.t_wr),
        _ => 0,
    }
}

/// Minimum CPU cycles that must elapse between `first` finishing and
/// `second` being issuable **anywhere else in the same bank group**.
///
/// Mirrors the group-level spacing rules in spec §4.3. The group tracks no
/// `next_precharge`, so any pair involving `Precharge` returns `0`.
#[must_use]
pub fn group_recovery(timing: &TimingConfig, first: DramCommand, second: DramCommand) -> u64 {
    use DramCommand::{Activate, Read, Write};
    match (first, second) {
        (Activate, Activate) => timing.scale(timing.t_rrd_l),
        (Read, Read | Write) => timing.scale(timing.t_ccd_l),
        (Write, Write) => timing.scale(timing.t_ccd_l),
        (Write, Read) => timing.scale(timing.cwl + timing.t_burst + timing.t_wtr_l),
        _ => 0,
    }
}

/// Minimum CPU cycles that must elapse between `first` finishing and
/// `second` being issuable **anywhere else on the DIMM (cross-group)**.
///
/// Mirrors the DIMM-level (bus) spacing rules in spec §4.3. The DIMM
/// tracks no `next_precharge`, so any pair involving `Precharge` returns
/// `0`.
#[must_use]
pub fn dimm_recovery(timing: &TimingConfig, first: DramCommand, second: DramCommand) -> u64 {
    use DramCommand::{Activate, Read, Write};
    match (first, second) {
        (Activate, Activate) => timing.scale(timing.t_rrd_s),
        (Read, Read) => timing.scale(timing.t_ccd_s),
        (Read, Write) => read_to_write(timing) + timing.scale(timing.t_rtw),
        (Write, Write) => timing.scale(timing.t_ccd_s),
        (Write, Read) => timing.scale(timing.cwl + timing.t_burst + timing.t_wtr_s),
        _ => 0,
    }
}

/// The read-to-write CAS boundary shared by the bank- and DIMM-level
/// tables: `tCAS + tBURST − CWL`, scaled to CPU cycles.
///
/// Computed in memory-clock cycles first so the subtraction cannot
/// underflow on configurations where `CWL > tCAS + tBURST` before scaling.
fn read_to_write(timing: &TimingConfig) -> u64 {
    let mem_cycles = i64::from(timing.t_cas) + i64::from(timing.t_burst) - i64::from(timing.cwl);
    let mem_cycles = mem_cycles.max(0) as u32;
    timing.scale(mem_cycles)
}
