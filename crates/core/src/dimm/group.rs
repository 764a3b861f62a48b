//! Bank-group timing state: one level up from [`super::bank::Bank`], adding
//! same-group command spacing (spec §4.3, group level).

use crate::config::TimingConfig;
use crate::dimm::bank::Bank;
use crate::dimm::timing::{self, TimingResult};
use crate::request::DramCommand;

/// A bank group: its member banks plus the `next_*` timestamps that gate
/// commands issued to *any* bank in the group.
#[derive(Debug, Clone)]
pub struct BankGroup {
    banks: Vec<Bank>,
    next_activate: u64,
    next_read: u64,
    next_write: u64,
}

impl BankGroup {
    /// Creates a bank group with `banks_per_group` freshly precharged banks.
    #[must_use]
    pub fn new(banks_per_group: usize) -> Self {
        Self {
            banks: vec![Bank::default(); banks_per_group],
            next_activate: 0,
            next_read: 0,
            next_write: 0,
        }
    }

    fn bank(&self, bank: usize) -> Option<&Bank> {
        self.banks.get(bank)
    }

    fn bank_mut(&mut self, bank: usize) -> Option<&mut Bank> {
        self.banks.get_mut(bank)
    }

    /// Returns the addressed bank, for read-only inspection (row-buffer
    /// locality heuristics, diagnostics).
    #[must_use]
    pub fn get(&self, bank: usize) -> Option<&Bank> {
        self.bank(bank)
    }

    #[must_use]
    pub fn can_activate(&self, bank: usize, now: u64) -> TimingResult {
        let Some(bank) = self.bank(bank) else {
            return TimingResult::BadArgs;
        };
        bank.can_activate(now)
            .combine(wait_or_ready(now, self.next_activate))
    }

    pub fn activate(
        &mut self,
        bank: usize,
        row: u32,
        now: u64,
        timing: &TimingConfig,
    ) -> TimingResult {
        let result = self.can_activate(bank, now);
        if !matches!(result, TimingResult::Ready(_)) {
            return result;
        }
        let Some(bank_ref) = self.bank_mut(bank) else {
            return TimingResult::BadArgs;
        };
        let outcome = bank_ref.activate(row, now, timing);
        self.next_activate = now + timing::group_recovery(timing, DramCommand::Activate, DramCommand::Activate);
        outcome
    }

    #[must_use]
    pub fn can_precharge(&self, bank: usize, now: u64) -> TimingResult {
        let Some(bank) = self.bank(bank) else {
            return TimingResult::BadArgs;
        };
        bank.can_precharge(now)
    }

    pub fn precharge(&mut self, bank: usize, now: u64, timing: &TimingConfig) -> TimingResult {
        let Some(bank_ref) = self.bank_mut(bank) else {
            return TimingResult::BadArgs;
        };
        bank_ref.precharge(now, timing)
    }

    #[must_use]
    pub fn can_read(&self, bank: usize, row: u32, now: u64) -> TimingResult {
        let Some(bank) = self.bank(bank) else {
            return TimingResult::BadArgs;
        };
        bank.can_read(row, now)
            .combine(wait_or_ready(now, self.next_read))
    }

    pub fn read(&mut self, bank: usize, row: u32, now: u64, timing: &TimingConfig) -> TimingResult {
        let result = self.can_read(bank, row, now);
        if !matches!(result, TimingResult::Ready(_)) {
            return result;
        }
        let Some(bank_ref) = self.bank_mut(bank) else {
            return TimingResult::BadArgs;
        };
        let outcome = bank_ref.read(row, now, timing);
        self.next_read = now + timing::group_recovery(timing, DramCommand::Read, DramCommand::Read);
        self.next_write = now + timing::group_recovery(timing, DramCommand::Read, DramCommand::Write);
        outcome
    }

    #[must_use]
    pub fn can_write(&self, bank: usize, row: u32, now: u64) -> TimingResult {
        let Some(bank) = self.bank(bank) else {
            return TimingResult::BadArgs;
        };
        bank.can_write(row, now)
            .combine(wait_or_ready(now, self.next_write))
    }

    pub fn write(&mut self, bank: usize, row: u32, now: u64, timing: &TimingConfig) -> TimingResult {
        let result = self.can_write(bank, row, now);
        if !matches!(result, TimingResult::Ready(_)) {
            return result;
        }
        let Some(bank_ref) = self.bank_mut(bank) else {
            return TimingResult::BadArgs;
        };
        let outcome = bank_ref.write(row, now, timing);
        self.next_write = now + timing::group_recovery(timing, DramCommand::Write, DramCommand::Write);
        self.next_read = now + timing::group_recovery(timing, DramCommand::Write, DramCommand::Read);
        outcome
    }
}

fn wait_or_ready(now: u64, ready_at: u64) -> TimingResult {
    if now >= ready_at {
        TimingResult::Ready(0)
    } else {
        TimingResult::Wait(ready_at - now)
    }
}
