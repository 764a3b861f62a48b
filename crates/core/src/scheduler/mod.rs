//! Request-to-command decoding and the three scheduling policies (spec §4.4).

pub mod schedule;

use std::cmp::Reverse;
use std::collections::HashSet;

use crate::common::SimError;
use crate::config::{Policy, SchedulerConfig, TimingConfig};
use crate::dimm::timing::TimingResult;
use crate::dimm::Dimm;
use crate::queue::PendingQueue;
use crate::request::{DramCommand, NextAction, OpKind, Request};
use schedule::Schedule;

/// Builds the fatal error for a DIMM-core outcome of `Illegal`: the
/// scheduler's decoded command is forbidden by the addressed bank's current
/// state. Per spec §7 this is a programmer error in the scheduler, not a
/// recoverable condition — it aborts the simulation.
fn illegal_command_error(cmd: DramCommand, group: u8, bank: u8, detail: &str) -> SimError {
    SimError::IllegalCommand {
        command: cmd.mnemonic(),
        group,
        bank,
        detail: detail.to_string(),
    }
}

/// Builds the fatal error for a DIMM-core outcome of `BadArgs`: the
/// scheduler addressed a group/bank/row index outside the configured DIMM
/// geometry.
fn bad_args_error(function: &'static str, group: u8, bank: u8, row: u32) -> SimError {
    SimError::BadArgs {
        function,
        detail: format!("group={group} bank={bank} row={row} outside configured DIMM geometry"),
    }
}

/// A DRAM command the scheduler issued this tick, in enough detail for the
/// emitter to format a command-log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuedCommand {
    /// CPU cycle the command was issued at.
    pub now: u64,
    /// The command issued.
    pub cmd: DramCommand,
    /// Target bank group.
    pub group: u8,
    /// Target bank.
    pub bank: u8,
    /// Row argument (meaningful only for `ACTIVATE`).
    pub row: u32,
    /// Column argument (meaningful only for `READ`/`WRITE`).
    pub col: u16,
    /// CPU cycles until the command's effect completes (spec §4.3 "Command
    /// completion"). Used only by the verbose emitter to schedule an `END`
    /// message; the terse format does not report it.
    pub duration: u64,
    /// The row that was open on this bank immediately before a `PRECHARGE`,
    /// captured for the verbose emitter's "open row closed" message.
    /// `None` for every other command.
    pub closed_row: Option<u32>,
}

/// A request that finished all its commands and was removed from the
/// pending queue this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedRequest {
    /// The kind of memory operation that completed.
    pub kind: OpKind,
    /// Total CPU cycles the request spent in the pending queue.
    pub time_in_queue: u16,
}

/// What happened during one `schedule_one` call: at most one issued
/// command, plus every request that drained its completion latency and was
/// removed.
#[derive(Debug, Default)]
pub struct TickOutcome {
    /// The command issued this tick, if any.
    pub issued: Option<IssuedCommand>,
    /// Requests removed from the queue this tick.
    pub completed: Vec<CompletedRequest>,
}

/// Determines the next DRAM command a request needs, given the DIMM's
/// current bank state.
///
/// Every state after the first is fully determined by the request's own
/// progression (`PRECHARGE → ACTIVATE → {READ|WRITE} → done`, spec §4.4
/// "State-machine summary"). Only the initial `Pending(Activate)` state
/// needs a live check against bank state, to take the row-buffer-hit
/// shortcut of skipping `ACTIVATE` entirely when the target row is already
/// open, or to substitute `PRECHARGE` when the bank is open on a different
/// row.
fn decode(request: &Request, dimm: &Dimm) -> DramCommand {
    let column_cmd = if request.kind.is_write() {
        DramCommand::Write
    } else {
        DramCommand::Read
    };
    match request.next_cmd {
        NextAction::Done => column_cmd,
        NextAction::Pending(DramCommand::Activate) => {
            match dimm.bank(request.group(), request.bank()) {
                Some(bank) if bank.has_open_row(request.row()) => column_cmd,
                Some(bank) if bank.is_active() => DramCommand::Precharge,
                _ => DramCommand::Activate,
            }
        }
        NextAction::Pending(cmd) => cmd,
    }
}

/// Advances a request's `next_cmd` after `issued` fires, per the
/// `PRECHARGE → ACTIVATE → {READ|WRITE} → Done` state machine.
fn advance(issued: DramCommand, kind: OpKind) -> NextAction {
    match issued {
        DramCommand::Precharge => NextAction::Pending(DramCommand::Activate),
        DramCommand::Activate => {
            let next = if kind.is_write() {
                DramCommand::Write
            } else {
                DramCommand::Read
            };
            NextAction::Pending(next)
        }
        DramCommand::Read | DramCommand::Write => NextAction::Done,
    }
}

fn issued_command(
    now: u64,
    cmd: DramCommand,
    request: &Request,
    duration: u64,
    closed_row: Option<u32>,
) -> IssuedCommand {
    IssuedCommand {
        now,
        cmd,
        group: request.group(),
        bank: request.bank(),
        row: request.row(),
        col: request.addr.column(),
        duration,
        closed_row,
    }
}

/// Removes every request that has fully drained (`next_cmd == Done` and
/// `age == 0`) from the queue, returning one [`CompletedRequest`] per
/// removal. Scans back-to-front so 1-based indices stay valid mid-removal.
fn reap_completed(queue: &mut PendingQueue) -> Vec<CompletedRequest> {
    let mut completed = Vec::new();
    let indices: Vec<usize> = queue
        .iter_indexed()
        .filter(|(_, r)| r.is_complete())
        .map(|(i, _)| i)
        .collect();
    for index in indices.into_iter().rev() {
        if let Some(request) = queue.remove(index) {
            completed.push(CompletedRequest {
                kind: request.kind,
                time_in_queue: request.time_in_queue,
            });
        }
    }
    completed
}

/// Attempts to advance `request` by one DRAM command using the loose
/// in-order reservation protocol (spec §4.4 steps 1–4), shared by the
/// loose-in-order and optimized policies.
///
/// Returns `Some(issued)` if a command was issued this tick (the caller
/// stops scanning for the rest of this tick), `None` if the request merely
/// waited or reserved. Returns `Err` if the DIMM core reports `Illegal`/
/// `BadArgs` for the decoded command — per spec §7 this indicates a
/// programmer error in the scheduler's decode step, not a timing wait, and
/// must abort the simulation rather than be treated as "not ready yet".
fn try_advance(
    request: &mut Request,
    dimm: &mut Dimm,
    schedule: &mut Schedule,
    now: u64,
    timing: &TimingConfig,
) -> Result<Option<IssuedCommand>, SimError> {
    if request.age > 0 {
        return Ok(None);
    }
    let cmd = decode(request, dimm);
    let group = request.group();
    let bank = request.bank();
    let row = request.row();

    let raw_wait = match dimm.can_issue(group, bank, row, now, cmd) {
        TimingResult::Illegal => {
            return Err(illegal_command_error(
                cmd,
                group,
                bank,
                "decoded command is illegal for the bank's current state",
            ));
        }
        TimingResult::BadArgs => return Err(bad_args_error("can_issue", group, bank, row)),
        TimingResult::Ready(_) => 0,
        TimingResult::Wait(w) => w,
    };
    let reservation_delay = schedule.reservation_delay(group, bank, cmd, now, timing);
    let time_till_cmd = raw_wait.max(reservation_delay);

    if time_till_cmd == 0 {
        let closed_row = (cmd == DramCommand::Precharge)
            .then(|| dimm.bank(group, bank).and_then(crate::dimm::bank::Bank::open_row))
            .flatten();
        let duration = match dimm.issue(group, bank, row, now, cmd) {
            TimingResult::Ready(d) => d,
            TimingResult::Wait(_) => {
                return Err(illegal_command_error(
                    cmd,
                    group,
                    bank,
                    "issue reported Wait immediately after can_issue reported Ready",
                ));
            }
            TimingResult::Illegal => {
                return Err(illegal_command_error(
                    cmd,
                    group,
                    bank,
                    "issue reported Illegal immediately after can_issue reported Ready",
                ));
            }
            TimingResult::BadArgs => return Err(bad_args_error("issue", group, bank, row)),
        };
        request.age = u8::try_from(duration).unwrap_or(u8::MAX);
        request.next_cmd = advance(cmd, request.kind);
        return Ok(Some(issued_command(now, cmd, request, duration, closed_row)));
    }

    if let Err(existing_at) = schedule.reserve(group, bank, cmd, now + time_till_cmd, timing) {
        let bump = (existing_at + timing.scale_factor).saturating_sub(now);
        request.age = u8::try_from(bump).unwrap_or(u8::MAX);
    }
    Ok(None)
}

fn schedule_strict(
    queue: &mut PendingQueue,
    dimm: &mut Dimm,
    now: u64,
) -> Result<Option<IssuedCommand>, SimError> {
    let mut touched_groups: HashSet<u8> = HashSet::new();
    let indices: Vec<usize> = queue.iter_indexed().map(|(i, _)| i).collect();
    for index in indices {
        let Some(request) = queue.peek(index) else {
            continue;
        };
        let group = request.group();
        if touched_groups.contains(&group) {
            continue;
        }
        if request.age > 0 {
            touched_groups.insert(group);
            continue;
        }
        let cmd = decode(request, dimm);
        let (bank, row) = (request.bank(), request.row());
        match dimm.can_issue(group, bank, row, now, cmd) {
            TimingResult::Ready(_) => {
                let closed_row = (cmd == DramCommand::Precharge)
                    .then(|| dimm.bank(group, bank).and_then(crate::dimm::bank::Bank::open_row))
                    .flatten();
                let duration = match dimm.issue(group, bank, row, now, cmd) {
                    TimingResult::Ready(d) => d,
                    TimingResult::Wait(_) => {
                        return Err(illegal_command_error(
                            cmd,
                            group,
                            bank,
                            "issue reported Wait immediately after can_issue reported Ready",
                        ));
                    }
                    TimingResult::Illegal => {
                        return Err(illegal_command_error(
                            cmd,
                            group,
                            bank,
                            "issue reported Illegal immediately after can_issue reported Ready",
                        ));
                    }
                    TimingResult::BadArgs => return Err(bad_args_error("issue", group, bank, row)),
                };
                let Some(request) = queue.peek_mut(index) else {
                    continue;
                };
                request.age = u8::try_from(duration).unwrap_or(u8::MAX);
                let kind = request.kind;
                request.next_cmd = advance(cmd, kind);
                return Ok(Some(issued_command(now, cmd, request, duration, closed_row)));
            }
            TimingResult::Wait(_) => {
                touched_groups.insert(group);
            }
            TimingResult::Illegal => {
                return Err(illegal_command_error(
                    cmd,
                    group,
                    bank,
                    "decoded command is illegal for the bank's current state",
                ));
            }
            TimingResult::BadArgs => return Err(bad_args_error("can_issue", group, bank, row)),
        }
    }
    Ok(None)
}

fn schedule_loose(
    queue: &mut PendingQueue,
    dimm: &mut Dimm,
    now: u64,
    timing: &TimingConfig,
) -> Result<Option<IssuedCommand>, SimError> {
    let mut schedule = Schedule::new();
    let indices: Vec<usize> = queue.iter_indexed().map(|(i, _)| i).collect();
    for index in indices {
        let Some(request) = queue.peek_mut(index) else {
            continue;
        };
        if let Some(issued) = try_advance(request, dimm, &mut schedule, now, timing)? {
            return Ok(Some(issued));
        }
    }
    Ok(None)
}

fn threshold_for(kind: OpKind, thresholds: crate::config::StarvationThresholds) -> u16 {
    match kind {
        OpKind::Ifetch => thresholds.ifetch,
        OpKind::Read => thresholds.read,
        OpKind::Write => thresholds.write,
    }
}

fn optimized_order(
    queue: &PendingQueue,
    dimm: &Dimm,
    thresholds: crate::config::StarvationThresholds,
) -> Vec<usize> {
    let mut touched = vec![false; queue.size() + 1];
    let mut order = Vec::with_capacity(queue.size());

    let mut starved: Vec<(usize, u16)> = queue
        .iter_indexed()
        .filter(|(_, r)| !r.is_complete())
        .filter_map(|(i, r)| {
            let threshold = threshold_for(r.kind, thresholds);
            (r.time_in_queue > threshold).then_some((i, r.time_in_queue - threshold))
        })
        .collect();
    starved.sort_by_key(|&(_, excess)| Reverse(excess));
    for (index, _) in starved {
        order.push(index);
        touched[index] = true;
    }

    for kind in [OpKind::Ifetch, OpKind::Read, OpKind::Write] {
        for (index, request) in queue.iter_indexed() {
            if touched[index] || request.is_complete() || request.kind != kind {
                continue;
            }
            let open = dimm
                .bank(request.group(), request.bank())
                .is_some_and(|b| b.has_open_row(request.row()));
            if open {
                order.push(index);
                touched[index] = true;
            }
        }
    }

    for kind in [OpKind::Ifetch, OpKind::Read, OpKind::Write] {
        for (index, request) in queue.iter_indexed() {
            if touched[index] || request.is_complete() || request.kind != kind {
                continue;
            }
            order.push(index);
            touched[index] = true;
        }
    }

    order
}

fn schedule_optimized(
    queue: &mut PendingQueue,
    dimm: &mut Dimm,
    now: u64,
    timing: &TimingConfig,
    config: &SchedulerConfig,
) -> Result<Option<IssuedCommand>, SimError> {
    let mut schedule = Schedule::new();
    let order = optimized_order(queue, dimm, config.thresholds);
    for index in order {
        let Some(request) = queue.peek_mut(index) else {
            continue;
        };
        if let Some(issued) = try_advance(request, dimm, &mut schedule, now, timing)? {
            return Ok(Some(issued));
        }
    }
    Ok(None)
}

/// Runs one scheduling tick: reaps every request that finished draining its
/// completion latency, then lets the configured policy attempt to issue at
/// most one DRAM command.
///
/// # Errors
///
/// Returns [`SimError::IllegalCommand`] or [`SimError::BadArgs`] if the DIMM
/// core rejects a command the scheduler decoded as legal — a programmer
/// error in the scheduler, not a recoverable timing condition. Per spec §7
/// the caller must treat this as fatal and abort.
pub fn schedule_one(
    queue: &mut PendingQueue,
    dimm: &mut Dimm,
    config: &SchedulerConfig,
    timing: &TimingConfig,
    now: u64,
) -> Result<TickOutcome, SimError> {
    let completed = reap_completed(queue);
    let issued = match config.policy {
        Policy::Strict => schedule_strict(queue, dimm, now)?,
        Policy::LooseInOrder => schedule_loose(queue, dimm, now, timing)?,
        Policy::Optimized => schedule_optimized(queue, dimm, now, timing, config)?,
    };
    Ok(TickOutcome { issued, completed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn setup() -> (PendingQueue, Dimm, Config) {
        let config = Config::default();
        (
            PendingQueue::new(config.dimm.queue_capacity),
            Dimm::new(&config),
            config,
        )
    }

    #[test]
    fn single_read_cold_bank_activates_then_reads() {
        let (mut queue, mut dimm, config) = setup();
        queue.push(Request::new(0, OpKind::Read, 0x0)).unwrap();
        let outcome = schedule_one(&mut queue, &mut dimm, &config.scheduler, &config.timing, 0).unwrap();
        let issued = outcome.issued.expect("activate should issue");
        assert_eq!(issued.cmd, DramCommand::Activate);

        let t_rcd = config.timing.scale(config.timing.t_rcd);
        queue.age(t_rcd);
        let outcome = schedule_one(
            &mut queue,
            &mut dimm,
            &config.scheduler,
            &config.timing,
            t_rcd,
        )
        .unwrap();
        let issued = outcome.issued.expect("read should issue");
        assert_eq!(issued.cmd, DramCommand::Read);
    }

    #[test]
    fn completed_request_is_reaped_and_reported() {
        let (mut queue, mut dimm, config) = setup();
        queue.push(Request::new(0, OpKind::Read, 0x0)).unwrap();
        let t_rcd = config.timing.scale(config.timing.t_rcd);
        let t_cas_burst = config.timing.scale(config.timing.t_cas + config.timing.t_burst);

        schedule_one(&mut queue, &mut dimm, &config.scheduler, &config.timing, 0).unwrap();
        queue.age(t_rcd);
        schedule_one(
            &mut queue,
            &mut dimm,
            &config.scheduler,
            &config.timing,
            t_rcd,
        )
        .unwrap();
        queue.age(t_cas_burst);
        let outcome = schedule_one(
            &mut queue,
            &mut dimm,
            &config.scheduler,
            &config.timing,
            t_rcd + t_cas_burst,
        )
        .unwrap();
        assert_eq!(outcome.completed.len(), 1);
        assert_eq!(outcome.completed[0].kind, OpKind::Read);
        assert!(queue.is_empty());
    }

    #[test]
    fn optimized_order_prioritizes_starved_write_over_open_row_reads() {
        let (mut queue, _, config) = setup();
        let dimm = Dimm::new(&config);
        let mut starved_write = Request::new(0, OpKind::Write, 0xC00_0000);
        starved_write.time_in_queue = config.scheduler.thresholds.write + 1;
        queue.push(starved_write).unwrap();
        queue.push(Request::new(0, OpKind::Read, 0x0)).unwrap();
        let order = optimized_order(&queue, &dimm, config.scheduler.thresholds);
        assert_eq!(order[0], 1);
    }
}
