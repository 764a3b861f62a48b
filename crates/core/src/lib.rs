//! DDR4 DRAM memory-controller timing simulator library.
//!
//! This crate implements a cycle-accurate model of a single DIMM's timing
//! behavior in front of a CPU trace, with the following:
//! 1. **Common:** the unified [`common::SimError`] error taxonomy and
//!    address-layout/scheduling constants.
//! 2. **Configuration:** DIMM geometry, DRAM timing parameters, and
//!    scheduler policy/thresholds ([`config::Config`]).
//! 3. **Requests:** address decoding and per-request scheduling state
//!    ([`request::Request`]).
//! 4. **Queue:** the bounded pending-request queue ([`queue::PendingQueue`]).
//! 5. **DIMM core:** the three-level bank/group/DIMM timing state machine
//!    ([`dimm::Dimm`]).
//! 6. **Trace:** the trace-file reader ([`trace::TraceReader`]).
//! 7. **Scheduler:** request-to-command decoding and the three scheduling
//!    policies ([`scheduler::schedule_one`]).
//! 8. **Emit:** terse and verbose command-log emitters ([`emit::Emitter`]).
//! 9. **Stats:** time-in-queue statistics collection and reporting
//!    ([`stats::StatsCollector`]).
//! 10. **Simulation:** the top-level event loop driving all of the above
//!     ([`sim::Simulator`]).

/// Common types and constants (error taxonomy, address layout, defaults).
pub mod common;
/// Simulator configuration (defaults, policy enum, hierarchical structures).
pub mod config;
/// The three-level bank/bank-group/DIMM timing state machine.
pub mod dimm;
/// Command-log emitters (terse and verbose).
pub mod emit;
/// The bounded pending-request queue.
pub mod queue;
/// Decoded memory requests and the DRAM commands that service them.
pub mod request;
/// Request-to-command decoding and scheduling policies.
pub mod scheduler;
/// The top-level event loop.
pub mod sim;
/// Time-in-queue statistics collection and reporting.
pub mod stats;
/// Trace-file reader with one-element lookahead.
pub mod trace;

/// Root configuration type; use `Config::default()`.
pub use crate::config::Config;
/// Top-level simulator; owns the trace reader, queue, DIMM, and emitter.
pub use crate::sim::Simulator;
