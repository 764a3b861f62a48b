//! Cross-level DIMM timing invariants exercised through the public
//! [`Dimm`] API rather than the private per-level unit tests.

use proptest::prelude::*;

use dimmsim_core::config::Config;
use dimmsim_core::dimm::timing::TimingResult;
use dimmsim_core::dimm::Dimm;

fn activate_read_precharge_cycle(dimm: &mut Dimm, group: u8, bank: u8, row: u32, start: u64) -> u64 {
    let config = Config::default();
    let t = config.timing;

    let activated = dimm.activate(group, bank, row, start);
    let act_done = activated.cycles().expect("activate should be legal and ready");

    let read_at = start + act_done.max(t.scale(t.t_rcd));
    let read = dimm.can_read(group, bank, row, read_at);
    assert!(read.is_legal(), "read should become legal after tRCD");

    let precharge_at = read_at + t.scale(t.t_ras);
    let precharge = dimm.can_precharge(group, bank, precharge_at);
    assert!(precharge.is_legal());
    precharge_at
}

#[test]
fn full_cycle_never_reports_illegal_once_timing_elapses() {
    let config = Config::default();
    let mut dimm = Dimm::new(&config);
    activate_read_precharge_cycle(&mut dimm, 0, 0, 7, 0);
}

#[test]
fn reading_the_wrong_row_while_active_is_always_illegal() {
    let config = Config::default();
    let mut dimm = Dimm::new(&config);
    dimm.activate(0, 0, 3, 0);
    let t = config.timing;
    let ready = t.scale(t.t_rcd);
    assert_eq!(dimm.can_read(0, 0, 4, ready), TimingResult::Illegal);
    assert_eq!(dimm.can_read(0, 0, 3, ready), TimingResult::Ready(0));
}

proptest! {
    #[test]
    fn activate_wait_cycles_never_exceed_the_largest_configured_spacing(
        gap in 0u64..200,
    ) {
        let config = Config::default();
        let mut dimm = Dimm::new(&config);
        dimm.activate(1, 0, 0, 0);
        let result = dimm.can_activate(1, 1, 0, gap);
        let t = config.timing;
        let worst_case = t.scale(t.t_rrd_l.max(t.t_rrd_s)).max(t.scale(t.t_rcd + t.t_ras));
        match result {
            TimingResult::Wait(w) => prop_assert!(w <= worst_case),
            TimingResult::Ready(_) | TimingResult::Illegal | TimingResult::BadArgs => {}
        }
    }

    #[test]
    fn out_of_range_rows_are_always_bad_args(row in (1u32 << 15)..u32::MAX) {
        let config = Config::default();
        let dimm = Dimm::new(&config);
        prop_assert_eq!(dimm.can_activate(0, 0, row, 0), TimingResult::BadArgs);
    }
}
