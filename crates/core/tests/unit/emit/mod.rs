//! Emitter output-format tests driven through a short, hand-scheduled
//! command sequence rather than the emitters' own module-local unit tests.

use dimmsim_core::config::Config;
use dimmsim_core::dimm::Dimm;
use dimmsim_core::emit::terse::TerseEmitter;
use dimmsim_core::emit::verbose::VerboseEmitter;
use dimmsim_core::emit::Emitter;
use dimmsim_core::queue::PendingQueue;
use dimmsim_core::request::OpKind;
use dimmsim_core::request::Request;
use dimmsim_core::scheduler::schedule_one;

fn run_commands(config: &Config, ticks: u64) -> Vec<dimmsim_core::scheduler::IssuedCommand> {
    let mut dimm = Dimm::new(config);
    let mut queue = PendingQueue::new(config.dimm.queue_capacity);
    queue.push(Request::new(0, OpKind::Read, 0x0)).unwrap();

    let mut issued = Vec::new();
    let mut now = 0u64;
    for _ in 0..ticks {
        let outcome = schedule_one(&mut queue, &mut dimm, &config.scheduler, &config.timing, now).unwrap();
        if let Some(cmd) = outcome.issued {
            issued.push(cmd);
        }
        now += 1;
    }
    issued
}

#[test]
fn terse_emitter_produces_one_line_per_issued_command() {
    let config = Config::default();
    let commands = run_commands(&config, 200);
    assert!(!commands.is_empty());

    let mut emitter = TerseEmitter::new(Vec::new());
    for cmd in &commands {
        emitter.on_issue(*cmd).unwrap();
    }

    let output = String::from_utf8(emitter.into_writer()).unwrap();
    assert_eq!(output.lines().count(), commands.len());
    for line in output.lines() {
        assert!(line.contains('\t'));
    }
}

#[test]
fn verbose_emitter_reports_a_begin_and_end_for_every_command() {
    let config = Config::default();
    let commands = run_commands(&config, 200);
    assert!(!commands.is_empty());

    let mut emitter = VerboseEmitter::new(Vec::new());
    for cmd in &commands {
        emitter.on_issue(*cmd).unwrap();
        emitter.tick(cmd.duration.max(1)).unwrap();
    }
    emitter.tick(10_000).unwrap();

    let output = String::from_utf8(emitter.into_writer()).unwrap();
    let begins = output.matches("BEGIN").count();
    let ends = output.matches("END").count();
    assert_eq!(begins, commands.len());
    assert_eq!(ends, commands.len());
}
