//! End-to-end event-loop tests driving [`Simulator`] against in-memory and
//! on-disk traces under every scheduling policy.

use std::io::{Cursor, Write};

use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::NamedTempFile;

use dimmsim_core::common::error::ExitClass;
use dimmsim_core::config::{Config, Policy, SchedulerConfig};
use dimmsim_core::emit::terse::TerseEmitter;
use dimmsim_core::Simulator;

fn config_with(policy: Policy) -> Config {
    Config {
        scheduler: SchedulerConfig {
            policy,
            ..SchedulerConfig::default()
        },
        ..Config::default()
    }
}

#[rstest]
#[case(Policy::Strict)]
#[case(Policy::LooseInOrder)]
#[case(Policy::Optimized)]
fn every_policy_drains_a_small_trace_cleanly(#[case] policy: Policy) {
    let trace = "0 0 0x0\n0 1 0x100\n5 2 0x400000\n";
    let source = Cursor::new(trace.as_bytes().to_vec());
    let output = Vec::new();
    let emitter = TerseEmitter::new(output);
    let mut sim = Simulator::new(source, emitter, config_with(policy), true);

    let report = sim.run().expect("simulation should not error");
    assert_eq!(report.exit, ExitClass::Clean);

    let stats = report.stats.expect("stats were requested");
    let total = stats.total.expect("three requests completed");
    assert!(total.max >= total.min);
}

#[test]
fn trace_read_from_a_real_file_matches_in_memory_behavior() {
    let contents = "0 0 0x0\n1 0 0x8\n2 0 0x10\n";

    let mut file = NamedTempFile::new().expect("tempfile");
    write!(file, "{contents}").expect("write trace");
    let path = file.path().to_path_buf();

    let from_disk = std::fs::File::open(&path).expect("reopen trace");
    let mut sim_disk = Simulator::new(
        from_disk,
        TerseEmitter::new(Vec::new()),
        config_with(Policy::LooseInOrder),
        false,
    );
    let report_disk = sim_disk.run().expect("disk-backed run should not error");

    let mut sim_mem = Simulator::new(
        Cursor::new(contents.as_bytes().to_vec()),
        TerseEmitter::new(Vec::new()),
        config_with(Policy::LooseInOrder),
        false,
    );
    let report_mem = sim_mem.run().expect("in-memory run should not error");

    assert_eq!(report_disk.exit, report_mem.exit);
    assert_eq!(report_disk.final_cycle, report_mem.final_cycle);
}

#[test]
fn queue_capacity_throttles_ingest_without_dropping_requests() {
    let mut trace = String::new();
    for cycle in 0..20u64 {
        trace.push_str(&format!("{cycle} 0 0x{:x}\n", cycle * 8));
    }

    let mut config = config_with(Policy::LooseInOrder);
    config.dimm.queue_capacity = 2;

    let mut sim = Simulator::new(
        Cursor::new(trace.into_bytes()),
        TerseEmitter::new(Vec::new()),
        config,
        true,
    );
    let report = sim.run().expect("throttled run should still drain");
    assert_eq!(report.exit, ExitClass::Clean);
    let total = report.stats.unwrap().total.unwrap();
    assert!(total.max > 0);
}

#[test]
fn malformed_lines_are_skipped_and_the_rest_of_the_trace_still_runs() {
    let trace = "not a real line\n0 9 0x0\n0 0 0x0\n";
    let mut sim = Simulator::new(
        Cursor::new(trace.as_bytes().to_vec()),
        TerseEmitter::new(Vec::new()),
        config_with(Policy::LooseInOrder),
        true,
    );
    let report = sim.run().expect("recoverable errors must not abort the run");
    assert_eq!(report.exit, ExitClass::Clean);
    assert_eq!(report.stats.unwrap().total.unwrap().min, report.stats.unwrap().total.unwrap().max);
}

#[test]
fn empty_trace_produces_no_stats_sections() {
    let mut sim = Simulator::new(
        Cursor::new(Vec::new()),
        TerseEmitter::new(Vec::new()),
        config_with(Policy::LooseInOrder),
        true,
    );
    let report = sim.run().unwrap();
    assert_eq!(report.final_cycle, 0);
    assert!(report.stats.unwrap().total.is_none());
}
