//! Per-tick resource reservation scratch (spec §4.3 "Schedule", §4.4 steps 2–4).

use std::collections::HashMap;

use crate::config::TimingConfig;
use crate::dimm::timing::{bank_recovery, dimm_recovery, group_recovery};
use crate::request::DramCommand;

/// A single reserved future command at one timing level: the command and
/// the absolute CPU cycle it is expected to fire at.
#[derive(Debug, Clone, Copy)]
struct Reservation {
    cmd: DramCommand,
    at: u64,
}

/// Tracks, at each of the three timing levels, the single earliest reserved
/// future command — built fresh at the top of every `schedule_one` call and
/// discarded at the end (spec: "never observed outside one tick").
///
/// Only the earliest reservation per level is kept: it is the most
/// constraining one for any later candidate at that level, so a later
/// candidate that is compatible with it is automatically compatible with
/// anything reserved after it.
#[derive(Debug, Default)]
pub struct Schedule {
    dimm: Option<Reservation>,
    groups: HashMap<u8, Reservation>,
    banks: HashMap<(u8, u8), Reservation>,
}

impl Schedule {
    /// Creates an empty reservation table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes how much additional delay `cmd` (targeting `group`/`bank`)
    /// must observe so as not to arrive ahead of any reservation already
    /// recorded at a level it shares, beyond `now` (spec §4.4 step 2b).
    #[must_use]
    pub fn reservation_delay(
        &self,
        group: u8,
        bank: u8,
        cmd: DramCommand,
        now: u64,
        timing: &TimingConfig,
    ) -> u64 {
        let mut delay = 0;
        if let Some(r) = self.banks.get(&(group, bank)) {
            delay = delay.max((r.at + bank_recovery(timing, r.cmd, cmd)).saturating_sub(now));
        }
        if let Some(r) = self.groups.get(&group) {
            delay = delay.max((r.at + group_recovery(timing, r.cmd, cmd)).saturating_sub(now));
        }
        if let Some(r) = self.dimm {
            delay = delay.max((r.at + dimm_recovery(timing, r.cmd, cmd)).saturating_sub(now));
        }
        delay
    }

    /// Attempts to record a reservation for `cmd` at `at` across all three
    /// levels, stopping at the first level where it would delay an
    /// existing, earlier-or-equal reservation.
    ///
    /// Returns `Ok(())` if recorded at every level, or `Err(existing_at)`
    /// giving the absolute cycle of the conflicting reservation — the
    /// caller bumps the request's `age` to `existing_at + SCALE_FACTOR`
    /// (spec §4.4 step 4).
    pub fn reserve(
        &mut self,
        group: u8,
        bank: u8,
        cmd: DramCommand,
        at: u64,
        timing: &TimingConfig,
    ) -> Result<(), u64> {
        try_record(&mut self.banks, (group, bank), cmd, at, timing, bank_recovery)?;
        try_record(&mut self.groups, group, cmd, at, timing, group_recovery)?;
        try_record_dimm(&mut self.dimm, cmd, at, timing)?;
        Ok(())
    }
}

fn try_record<K: std::hash::Hash + Eq + Copy>(
    table: &mut HashMap<K, Reservation>,
    key: K,
    cmd: DramCommand,
    at: u64,
    timing: &TimingConfig,
    recovery: fn(&TimingConfig, DramCommand, DramCommand) -> u64,
) -> Result<(), u64> {
    if let Some(existing) = table.get(&key) {
        if at <= existing.at && existing.at >= at + recovery(timing, cmd, existing.cmd) {
            // fine, falls through to overwrite below
        } else {
            return Err(existing.at);
        }
    }
    table.insert(key, Reservation { cmd, at });
    Ok(())
}

fn try_record_dimm(
    slot: &mut Option<Reservation>,
    cmd: DramCommand,
    at: u64,
    timing: &TimingConfig,
) -> Result<(), u64> {
    if let Some(existing) = slot {
        if at <= existing.at && existing.at >= at + dimm_recovery(timing, cmd, existing.cmd) {
            // fine
        } else {
            return Err(existing.at);
        }
    }
    *slot = Some(Reservation { cmd, at });
    Ok(())
}
