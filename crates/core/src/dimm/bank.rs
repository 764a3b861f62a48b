//! Single-bank timing state (spec §4.3, bank level).

use crate::config::TimingConfig;
use crate::dimm::timing::TimingResult;

/// Whether a bank currently holds an open row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankState {
    /// No row open; only ACTIVATE is legal.
    Precharged,
    /// A row is open; READ/WRITE to that row or PRECHARGE are legal.
    Active,
}

/// One DRAM bank: its open-row state and the four `next_*` timestamps that
/// gate each command family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bank {
    state: BankState,
    open_row: Option<u32>,
    next_activate: u64,
    next_precharge: u64,
    next_read: u64,
    next_write: u64,
}

impl Default for Bank {
    fn default() -> Self {
        Self {
            state: BankState::Precharged,
            open_row: None,
            next_activate: 0,
            next_precharge: 0,
            next_read: 0,
            next_write: 0,
        }
    }
}

impl Bank {
    /// The row currently open, or `None` if the bank is precharged.
    #[must_use]
    pub fn open_row(&self) -> Option<u32> {
        self.open_row
    }

    /// Whether this bank currently has any row open.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == BankState::Active
    }

    /// Whether `row` is the currently open row (used by the optimized
    /// scheduler's row-buffer locality heuristic).
    #[must_use]
    pub fn has_open_row(&self, row: u32) -> bool {
        self.open_row == Some(row)
    }

    #[must_use]
    pub fn can_activate(&self, now: u64) -> TimingResult {
        if self.state == BankState::Active {
            return TimingResult::Illegal;
        }
        wait_or_ready(now, self.next_activate)
    }

    pub fn activate(&mut self, row: u32, now: u64, timing: &TimingConfig) -> TimingResult {
        let result = self.can_activate(now);
        if !matches!(result, TimingResult::Ready(_)) {
            return result;
        }
        self.state = BankState::Active;
        self.open_row = Some(row);
        self.next_read = now + timing.scale(timing.t_rcd);
        self.next_write = self.next_read;
        self.next_precharge = now + timing.scale(timing.t_ras);
        TimingResult::Ready(timing.scale(timing.t_rcd))
    }

    #[must_use]
    pub fn can_precharge(&self, now: u64) -> TimingResult {
        if self.state == BankState::Precharged {
            return TimingResult::Illegal;
        }
        wait_or_ready(now, self.next_precharge)
    }

    pub fn precharge(&mut self, now: u64, timing: &TimingConfig) -> TimingResult {
        let result = self.can_precharge(now);
        if !matches!(result, TimingResult::Ready(_)) {
            return result;
        }
        self.state = BankState::Precharged;
        self.open_row = None;
        self.next_activate = now + timing.scale(timing.t_rp);
        TimingResult::Ready(timing.scale(timing.t_rp))
    }

    #[must_use]
    pub fn can_read(&self, row: u32, now: u64) -> TimingResult {
        if self.state == BankState::Precharged || self.open_row != Some(row) {
            return TimingResult::Illegal;
        }
        wait_or_ready(now, self.next_read)
    }

    pub fn read(&mut self, row: u32, now: u64, timing: &TimingConfig) -> TimingResult {
        let result = self.can_read(row, now);
        if !matches!(result, TimingResult::Ready(_)) {
            return result;
        }
        self.next_write = now + crate::dimm::timing::bank_recovery(
            timing,
            crate::request::DramCommand::Read,
            crate::request::DramCommand::Write,
        );
        self.next_precharge = self.next_precharge.max(now + timing.scale(timing.t_rtp));
        TimingResult::Ready(timing.scale(timing.t_cas + timing.t_burst))
    }

    #[must_use]
    pub fn can_write(&self, row: u32, now: u64) -> TimingResult {
        if self.state == BankState::Precharged || self.open_row != Some(row) {
            return TimingResult::Illegal;
        }
        wait_or_ready(now, self.next_write)
    }

    pub fn write(&mut self, row: u32, now: u64, timing: &TimingConfig) -> TimingResult {
        let result = self.can_write(row, now);
        if !matches!(result, TimingResult::Ready(_)) {
            return result;
        }
        self.next_precharge = self
            .next_precharge
            .max(now + timing.scale(timing.cwl + timing.t_burst + timing.t_wr));
        TimingResult::Ready(timing.scale(timing.cwl + timing.t_burst))
    }
}

fn wait_or_ready(now: u64, ready_at: u64) -> TimingResult {
    if now >= ready_at {
        TimingResult::Ready(0)
    } else {
        TimingResult::Wait(ready_at - now)
    }
}
