//! Cross-policy scheduling behavior, exercised through the public
//! scheduling entry point against hand-built queues.

use rstest::rstest;

use dimmsim_core::config::{Config, Policy, SchedulerConfig};
use dimmsim_core::dimm::Dimm;
use dimmsim_core::queue::PendingQueue;
use dimmsim_core::request::{DramCommand, OpKind, Request};
use dimmsim_core::scheduler::schedule_one;

fn drive_to_completion(policy: Policy, requests: Vec<Request>) -> Vec<OpKind> {
    let mut config = Config::default();
    config.scheduler = SchedulerConfig {
        policy,
        ..SchedulerConfig::default()
    };
    let mut dimm = Dimm::new(&config);
    let mut queue = PendingQueue::new(config.dimm.queue_capacity);
    for request in requests {
        queue.push(request).unwrap();
    }

    let mut completed_order = Vec::new();
    let mut now = 0u64;
    for _ in 0..10_000 {
        let outcome = schedule_one(&mut queue, &mut dimm, &config.scheduler, &config.timing, now).unwrap();
        for completed in outcome.completed {
            completed_order.push(completed.kind);
        }
        if queue.is_empty() {
            break;
        }
        let step = queue
            .iter_indexed()
            .map(|(_, r)| u64::from(r.age).max(1))
            .min()
            .unwrap_or(1);
        now += step;
        queue.age(step);
    }
    completed_order
}

#[rstest]
#[case(Policy::Strict)]
#[case(Policy::LooseInOrder)]
#[case(Policy::Optimized)]
fn every_policy_eventually_completes_every_request(#[case] policy: Policy) {
    let requests = vec![
        Request::new(0, OpKind::Read, 0x0),
        Request::new(0, OpKind::Write, 0x400),
        Request::new(0, OpKind::Ifetch, 0x80_0000),
    ];
    let completed = drive_to_completion(policy, requests);
    assert_eq!(completed.len(), 3);
}

#[test]
fn strict_policy_never_reorders_within_a_bank_group() {
    let requests = vec![
        Request::new(0, OpKind::Read, 0x0),
        Request::new(0, OpKind::Write, 0x8),
    ];
    let completed = drive_to_completion(Policy::Strict, requests);
    assert_eq!(completed, vec![OpKind::Read, OpKind::Write]);
}

#[test]
fn loose_policy_lets_an_independent_bank_group_slot_in_early() {
    let requests = vec![
        Request::new(0, OpKind::Read, 0xC00_0000),
        Request::new(0, OpKind::Write, 0x40),
    ];
    let completed = drive_to_completion(Policy::LooseInOrder, requests);
    assert_eq!(completed.len(), 2);
    assert!(completed.contains(&OpKind::Read));
    assert!(completed.contains(&OpKind::Write));
}

#[test]
fn decode_never_issues_a_column_command_before_activate_on_a_cold_bank() {
    let config = Config::default();
    let mut dimm = Dimm::new(&config);
    let mut queue = PendingQueue::new(config.dimm.queue_capacity);
    queue.push(Request::new(0, OpKind::Read, 0x0)).unwrap();

    let outcome = schedule_one(&mut queue, &mut dimm, &config.scheduler, &config.timing, 0).unwrap();
    let issued = outcome.issued.expect("activate should issue on a cold bank");
    assert_eq!(issued.cmd, DramCommand::Activate);
}
