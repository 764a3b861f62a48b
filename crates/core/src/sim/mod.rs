//! The discrete-event simulation driver (spec §4.6).

use std::io::Read;

use tracing::{debug, trace};

use crate::common::error::ExitClass;
use crate::common::SimError;
use crate::config::Config;
use crate::dimm::Dimm;
use crate::emit::Emitter;
use crate::queue::PendingQueue;
use crate::scheduler::{self, TickOutcome};
use crate::stats::{StatsCollector, StatsReport};
use crate::trace::TraceReader;

/// Outcome of a completed simulation run.
#[derive(Debug)]
pub struct SimulationReport {
    /// Whether the run ended cleanly (trace EOF, empty queue) or because
    /// `now` would have overflowed.
    pub exit: ExitClass,
    /// The final CPU cycle reached.
    pub final_cycle: u64,
    /// Time-in-queue statistics, if the caller enabled stats collection.
    pub stats: Option<StatsReport>,
}

/// Owns every piece of simulator state and drives the event loop described
/// in spec §4.6. Replaces the original's scattered globals (`currentTime`,
/// `commandQueue`, `dimm`, `parser`, `output_file`) with one value so tests
/// can run many simulations in parallel (Design Notes §9).
pub struct Simulator<R, E> {
    now: u64,
    queue: PendingQueue,
    dimm: Dimm,
    trace: TraceReader<R>,
    emitter: E,
    stats: Option<StatsCollector>,
    config: Config,
}

impl<R: Read, E: Emitter> Simulator<R, E> {
    /// Builds a simulator reading from `trace_source`, writing through
    /// `emitter`, honoring `config`'s geometry/timing/policy. Pass
    /// `collect_stats = true` to enable the `-stat` report.
    #[must_use]
    pub fn new(trace_source: R, emitter: E, config: Config, collect_stats: bool) -> Self {
        Self {
            now: 0,
            queue: PendingQueue::new(config.dimm.queue_capacity),
            dimm: Dimm::new(&config),
            trace: TraceReader::new(trace_source, config.dimm.rows_per_bank),
            emitter,
            stats: collect_stats.then(StatsCollector::new),
            config,
        }
    }

    /// Runs the event loop to completion.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::IoError`] if the emitter's underlying writer
    /// fails, or [`SimError::IllegalCommand`]/[`SimError::BadArgs`] if the
    /// scheduler hands the DIMM core a command it rejects — both fatal,
    /// aborting the run immediately. `ParseError`/`AddressOutOfRange` are
    /// handled internally by the trace reader and never propagate here;
    /// `now` overflow ends the run cleanly via [`SimulationReport::exit`]
    /// rather than an `Err`.
    pub fn run(&mut self) -> Result<SimulationReport, SimError> {
        loop {
            self.refill_queue()?;

            if self.now % 2 == 0 {
                self.run_tick()?;
            }

            if self.queue.is_empty() && self.trace.is_eof() {
                self.emitter.flush()?;
                return Ok(SimulationReport {
                    exit: ExitClass::Clean,
                    final_cycle: self.now,
                    stats: self.stats.as_ref().map(StatsCollector::report),
                });
            }

            let Some(step) = self.time_to_next_event() else {
                self.emitter.flush()?;
                return Ok(SimulationReport {
                    exit: ExitClass::Fatal,
                    final_cycle: self.now,
                    stats: self.stats.as_ref().map(StatsCollector::report),
                });
            };

            self.now += step;
            self.queue.age(step);
            self.emitter.tick(step)?;
        }
    }

    fn refill_queue(&mut self) -> Result<(), SimError> {
        while !self.queue.is_full() {
            let Some(request) = self.trace.take_if_ready(self.now) else {
                break;
            };
            trace!(now = self.now, t_arrive = request.t_arrive, "admitted request to pending queue");
            self.queue.push(request)?;
        }
        Ok(())
    }

    fn run_tick(&mut self) -> Result<(), SimError> {
        let TickOutcome { issued, completed } = scheduler::schedule_one(
            &mut self.queue,
            &mut self.dimm,
            &self.config.scheduler,
            &self.config.timing,
            self.now,
        )?;

        if let Some(cmd) = issued {
            debug!(now = self.now, cmd = ?cmd.cmd, group = cmd.group, bank = cmd.bank, "issued command");
            self.emitter.on_issue(cmd)?;
        }

        if let Some(stats) = &mut self.stats {
            for request in completed {
                stats.record(request.kind, request.time_in_queue);
            }
        }

        Ok(())
    }

    /// `min` of every queued request's `age` (floored at 1) and the
    /// trace's next arrival offset, or `None` if advancing by that amount
    /// would overflow `now`.
    fn time_to_next_event(&self) -> Option<u64> {
        let min_age = self
            .queue
            .iter_indexed()
            .map(|(_, r)| u64::from(r.age).max(1))
            .min();

        let trace_step = if self.queue.is_full() || self.trace.is_eof() {
            None
        } else {
            self.trace.peek_next_time().map(|t| {
                if t <= self.now {
                    1
                } else {
                    t - self.now
                }
            })
        };

        let step = match (min_age, trace_step) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => 1,
        }
        .max(1);

        self.now.checked_add(step).map(|_| step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::terse::TerseEmitter;
    use std::io::Cursor;

    fn run_trace(contents: &str) -> (SimulationReport, String) {
        let source = Cursor::new(contents.as_bytes().to_vec());
        let output = Vec::new();
        let emitter = TerseEmitter::new(output);
        let mut sim = Simulator::new(source, emitter, Config::default(), true);
        let report = sim.run().unwrap();
        (report, String::new())
    }

    #[test]
    fn empty_trace_ends_cleanly_at_cycle_zero() {
        let (report, _) = run_trace("");
        assert_eq!(report.exit, ExitClass::Clean);
        assert_eq!(report.final_cycle, 0);
    }

    #[test]
    fn single_read_drains_queue_and_records_stats() {
        let (report, _) = run_trace("0 0 0x0\n");
        assert_eq!(report.exit, ExitClass::Clean);
        let stats = report.stats.expect("stats enabled");
        assert!(stats.read.is_some());
        assert_eq!(stats.read.unwrap().min, 0);
    }

    #[test]
    fn two_requests_to_different_groups_both_complete() {
        let (report, _) = run_trace("0 0 0x0\n0 1 0x100\n");
        assert_eq!(report.exit, ExitClass::Clean);
        let stats = report.stats.unwrap();
        assert!(stats.read.is_some());
        assert!(stats.write.is_some());
    }
}
