//! The three-level DIMM timing state machine (spec §4.3).
//!
//! A [`Dimm`] owns a flat vector of [`group::BankGroup`]s, each owning its
//! own [`bank::Bank`]s. Every `can_C`/`C` pair is dispatched top-down: the
//! DIMM checks the request's group/bank/row are in range, then asks the
//! group (which asks the bank) whether the command is legal, combining the
//! three levels' wait times via [`timing::TimingResult::combine`] so the
//! caller always sees the most restrictive answer.

pub mod bank;
pub mod group;
pub mod timing;

use crate::config::{Config, TimingConfig};
use crate::request::DramCommand;
use group::BankGroup;
use timing::TimingResult;

/// The full DIMM: bank groups plus the DIMM-wide (cross-group) `next_*`
/// timestamps and the geometry/timing configuration every level reads from.
#[derive(Debug, Clone)]
pub struct Dimm {
    groups: Vec<BankGroup>,
    next_activate: u64,
    next_read: u64,
    next_write: u64,
    timing: TimingConfig,
    rows_per_bank: u32,
}

impl Dimm {
    /// Builds a DIMM with `config.dimm.groups` groups of
    /// `config.dimm.banks_per_group` freshly precharged banks.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            groups: (0..config.dimm.groups)
                .map(|_| BankGroup::new(config.dimm.banks_per_group))
                .collect(),
            next_activate: 0,
            next_read: 0,
            next_write: 0,
            timing: config.timing,
            rows_per_bank: config.dimm.rows_per_bank,
        }
    }

    fn group(&self, group: u8) -> Option<&BankGroup> {
        self.groups.get(group as usize)
    }

    fn group_mut(&mut self, group: u8) -> Option<&mut BankGroup> {
        self.groups.get_mut(group as usize)
    }

    fn check_row(&self, row: u32) -> TimingResult {
        if row < self.rows_per_bank {
            TimingResult::Ready(0)
        } else {
            TimingResult::BadArgs
        }
    }

    /// Inspects the bank at `(group, bank)`, for the optimized scheduler's
    /// row-buffer locality heuristic.
    #[must_use]
    pub fn bank(&self, group: u8, bank: u8) -> Option<&bank::Bank> {
        self.group(group)?.get(bank as usize)
    }

    #[must_use]
    pub fn can_activate(&self, group: u8, bank: u8, row: u32, now: u64) -> TimingResult {
        let row_ok = self.check_row(row);
        if !row_ok.is_legal() {
            return row_ok;
        }
        let Some(g) = self.group(group) else {
            return TimingResult::BadArgs;
        };
        g.can_activate(bank as usize, now)
            .combine(wait_or_ready(now, self.next_activate))
    }

    pub fn activate(&mut self, group: u8, bank: u8, row: u32, now: u64) -> TimingResult {
        let result = self.can_activate(group, bank, row, now);
        if !matches!(result, TimingResult::Ready(_)) {
            return result;
        }
        let timing = self.timing;
        let Some(g) = self.group_mut(group) else {
            return TimingResult::BadArgs;
        };
        let outcome = g.activate(bank as usize, row, now, &timing);
        self.next_activate =
            now + timing::dimm_recovery(&timing, DramCommand::Activate, DramCommand::Activate);
        outcome
    }

    #[must_use]
    pub fn can_precharge(&self, group: u8, bank: u8, now: u64) -> TimingResult {
        let Some(g) = self.group(group) else {
            return TimingResult::BadArgs;
        };
        g.can_precharge(bank as usize, now)
    }

    pub fn precharge(&mut self, group: u8, bank: u8, now: u64) -> TimingResult {
        let timing = self.timing;
        let Some(g) = self.group_mut(group) else {
            return TimingResult::BadArgs;
        };
        g.precharge(bank as usize, now, &timing)
    }

    #[must_use]
    pub fn can_read(&self, group: u8, bank: u8, row: u32, now: u64) -> TimingResult {
        let row_ok = self.check_row(row);
        if !row_ok.is_legal() {
            return row_ok;
        }
        let Some(g) = self.group(group) else {
            return TimingResult::BadArgs;
        };
        g.can_read(bank as usize, row, now)
            .combine(wait_or_ready(now, self.next_read))
    }

    pub fn read(&mut self, group: u8, bank: u8, row: u32, now: u64) -> TimingResult {
        let result = self.can_read(group, bank, row, now);
        if !matches!(result, TimingResult::Ready(_)) {
            return result;
        }
        let timing = self.timing;
        let Some(g) = self.group_mut(group) else {
            return TimingResult::BadArgs;
        };
        let outcome = g.read(bank as usize, row, now, &timing);
        self.next_read = now + timing::dimm_recovery(&timing, DramCommand::Read, DramCommand::Read);
        self.next_write = now + timing::dimm_recovery(&timing, DramCommand::Read, DramCommand::Write);
        outcome
    }

    #[must_use]
    pub fn can_write(&self, group: u8, bank: u8, row: u32, now: u64) -> TimingResult {
        let row_ok = self.check_row(row);
        if !row_ok.is_legal() {
            return row_ok;
        }
        let Some(g) = self.group(group) else {
            return TimingResult::BadArgs;
        };
        g.can_write(bank as usize, row, now)
            .combine(wait_or_ready(now, self.next_write))
    }

    pub fn write(&mut self, group: u8, bank: u8, row: u32, now: u64) -> TimingResult {
        let result = self.can_write(group, bank, row, now);
        if !matches!(result, TimingResult::Ready(_)) {
            return result;
        }
        let timing = self.timing;
        let Some(g) = self.group_mut(group) else {
            return TimingResult::BadArgs;
        };
        let outcome = g.write(bank as usize, row, now, &timing);
        self.next_write = now + timing::dimm_recovery(&timing, DramCommand::Write, DramCommand::Write);
        self.next_read = now + timing::dimm_recovery(&timing, DramCommand::Write, DramCommand::Read);
        outcome
    }

    /// Dispatches a single DRAM command through the `can_C`/`C` pair for
    /// `cmd`, mutating bank/group/DIMM state only when the command is
    /// immediately issuable (`Ready`). A legal-but-not-yet-timed `Wait`
    /// leaves every level untouched, exactly like `Illegal`/`BadArgs` —
    /// callers must re-check at `now + wait` rather than treat a premature
    /// call as having fired.
    pub fn issue(&mut self, group: u8, bank: u8, row: u32, now: u64, cmd: DramCommand) -> TimingResult {
        match cmd {
            DramCommand::Activate => self.activate(group, bank, row, now),
            DramCommand::Precharge => self.precharge(group, bank, now),
            DramCommand::Read => self.read(group, bank, row, now),
            DramCommand::Write => self.write(group, bank, row, now),
        }
    }

    /// Dispatches the read-only `can_C` check for `cmd`.
    #[must_use]
    pub fn can_issue(&self, group: u8, bank: u8, row: u32, now: u64, cmd: DramCommand) -> TimingResult {
        match cmd {
            DramCommand::Activate => self.can_activate(group, bank, row, now),
            DramCommand::Precharge => self.can_precharge(group, bank, now),
            DramCommand::Read => self.can_read(group, bank, row, now),
            DramCommand::Write => self.can_write(group, bank, row, now),
        }
    }
}

fn wait_or_ready(now: u64, ready_at: u64) -> TimingResult {
    if now >= ready_at {
        TimingResult::Ready(0)
    } else {
        TimingResult::Wait(ready_at - now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dimm() -> Dimm {
        Dimm::new(&Config::default())
    }

    #[test]
    fn row_out_of_range_is_bad_args() {
        let d = dimm();
        assert_eq!(d.can_activate(0, 0, 1 << 20, 0), TimingResult::BadArgs);
    }

    #[test]
    fn group_out_of_range_is_bad_args() {
        let d = dimm();
        assert_eq!(d.can_activate(200, 0, 0, 0), TimingResult::BadArgs);
    }

    #[test]
    fn full_open_read_write_precharge_cycle() {
        let config = Config::default();
        let t = config.timing;
        let mut d = Dimm::new(&config);
        assert!(d.activate(0, 0, 5, 0).cycles().is_some());
        let ready = t.scale(t.t_rcd);
        assert_eq!(d.can_read(0, 0, 5, ready), TimingResult::Ready(0));
        d.read(0, 0, 5, ready);
        assert_eq!(d.can_read(0, 0, 9, ready), TimingResult::Illegal);
    }

    #[test]
    fn cross_group_activate_waits_on_rrd_s() {
        let config = Config::default();
        let t = config.timing;
        let mut d = Dimm::new(&config);
        d.activate(0, 0, 1, 0);
        let gate = t.scale(t.t_rrd_s);
        assert_eq!(d.can_activate(1, 0, 2, 0), TimingResult::Wait(gate));
    }
}
