//! Verbose, human-readable emitter (supplemental mode; see `SPEC_FULL.md`).
//!
//! Per the Design Notes' rearchitecture guidance for the original's
//! integer-keyed aged message list, this is a binary heap of
//! `(emit_at, sequence, message)` rather than an intrusive list that every
//! caller must remember to age. `tick` advances the internal clock and
//! drains everything due; insertion order among equal `emit_at` values is
//! preserved by the monotonic `sequence` tiebreaker.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::io::{self, Write};

use crate::common::SimError;
use crate::request::DramCommand;
use crate::scheduler::IssuedCommand;

use super::Emitter;

/// Formats and defers human-readable begin/end messages for issued DRAM
/// commands, draining them in emission-time order as ticks advance.
pub struct VerboseEmitter<W> {
    writer: W,
    now: u64,
    sequence: u64,
    pending: BinaryHeap<Reverse<(u64, u64, String)>>,
}

impl<W: Write> VerboseEmitter<W> {
    /// Wraps `writer` as a verbose emitter starting at cycle `0`.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            now: 0,
            sequence: 0,
            pending: BinaryHeap::new(),
        }
    }

    /// Consumes the emitter, returning the underlying writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Queues `message` for emission `delay` cycles from the current time.
    fn write_output(&mut self, delay: u64, message: String) {
        let emit_at = self.now + delay;
        self.pending.push(Reverse((emit_at, self.sequence, message)));
        self.sequence += 1;
    }

    fn drain_due(&mut self) -> io::Result<()> {
        while let Some(Reverse((emit_at, _, _))) = self.pending.peek() {
            if *emit_at > self.now {
                break;
            }
            let Some(Reverse((_, _, message))) = self.pending.pop() else {
                break;
            };
            writeln!(self.writer, "{message}")?;
        }
        Ok(())
    }

    fn begin_message(cmd: IssuedCommand) -> String {
        match cmd.cmd {
            DramCommand::Precharge => format!(
                "{}: BEGIN PRECHARGE group={} bank={}",
                cmd.now, cmd.group, cmd.bank
            ),
            DramCommand::Activate => format!(
                "{}: BEGIN ACTIVATE group={} bank={} row={}",
                cmd.now, cmd.group, cmd.bank, cmd.row
            ),
            DramCommand::Read => format!(
                "{}: BEGIN READ group={} bank={} col={}",
                cmd.now, cmd.group, cmd.bank, cmd.col
            ),
            DramCommand::Write => format!(
                "{}: BEGIN WRITE group={} bank={} col={}",
                cmd.now, cmd.group, cmd.bank, cmd.col
            ),
        }
    }

    fn end_message(cmd: IssuedCommand, emit_at: u64) -> String {
        match cmd.cmd {
            DramCommand::Precharge => {
                let closed = cmd
                    .closed_row
                    .map_or_else(|| "none".to_string(), |r| r.to_string());
                format!(
                    "{}: END PRECHARGE group={} bank={} closed_row={}",
                    emit_at, cmd.group, cmd.bank, closed
                )
            }
            DramCommand::Activate => format!(
                "{}: END ACTIVATE group={} bank={} row={}",
                emit_at, cmd.group, cmd.bank, cmd.row
            ),
            DramCommand::Read => format!(
                "{}: END READ group={} bank={} col={}",
                emit_at, cmd.group, cmd.bank, cmd.col
            ),
            DramCommand::Write => format!(
                "{}: END WRITE group={} bank={} col={}",
                emit_at, cmd.group, cmd.bank, cmd.col
            ),
        }
    }
}

impl<W: Write> Emitter for VerboseEmitter<W> {
    fn on_issue(&mut self, cmd: IssuedCommand) -> Result<(), SimError> {
        let begin = Self::begin_message(cmd);
        self.write_output(0, begin);
        let end = Self::end_message(cmd, self.now + cmd.duration);
        self.write_output(cmd.duration, end);
        self.drain_due()?;
        Ok(())
    }

    fn tick(&mut self, delta: u64) -> Result<(), SimError> {
        self.now += delta;
        self.drain_due()?;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(kind: DramCommand, duration: u64) -> IssuedCommand {
        IssuedCommand {
            now: 0,
            cmd: kind,
            group: 0,
            bank: 0,
            row: 2,
            col: 4,
            duration,
            closed_row: Some(9),
        }
    }

    #[test]
    fn begin_message_emits_immediately() {
        let mut emitter = VerboseEmitter::new(Vec::new());
        emitter.on_issue(cmd(DramCommand::Activate, 48)).unwrap();
        let output = String::from_utf8(emitter.writer.clone()).unwrap();
        assert!(output.contains("BEGIN ACTIVATE"));
        assert!(!output.contains("END ACTIVATE"));
    }

    #[test]
    fn end_message_waits_for_duration_to_elapse() {
        let mut emitter = VerboseEmitter::new(Vec::new());
        emitter.on_issue(cmd(DramCommand::Read, 48)).unwrap();
        emitter.tick(47).unwrap();
        assert!(!String::from_utf8(emitter.writer.clone())
            .unwrap()
            .contains("END READ"));
        emitter.tick(1).unwrap();
        assert!(String::from_utf8(emitter.writer.clone())
            .unwrap()
            .contains("END READ"));
    }

    #[test]
    fn precharge_end_message_reports_closed_row() {
        let mut emitter = VerboseEmitter::new(Vec::new());
        emitter.on_issue(cmd(DramCommand::Precharge, 48)).unwrap();
        emitter.tick(48).unwrap();
        let output = String::from_utf8(emitter.writer.clone()).unwrap();
        assert!(output.contains("closed_row=9"));
    }

    #[test]
    fn messages_drain_in_emission_time_order() {
        let mut emitter = VerboseEmitter::new(Vec::new());
        emitter.on_issue(cmd(DramCommand::Activate, 10)).unwrap();
        emitter.on_issue(cmd(DramCommand::Read, 5)).unwrap();
        emitter.tick(10).unwrap();
        let output = String::from_utf8(emitter.writer.clone()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        let end_read = lines.iter().position(|l| l.contains("END READ")).unwrap();
        let end_activate = lines.iter().position(|l| l.contains("END ACTIVATE")).unwrap();
        assert!(end_read < end_activate);
    }
}
