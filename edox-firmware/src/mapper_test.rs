extern crate std;

use core::sync::atomic::{AtomicBool, Ordering};
use std::vec::Vec;

use edox_common::keycodes as kc;
use embassy_futures::{block_on, select::select};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;

use crate::{
    firmware_functions,
    keymap::{Action, ChordSpec, KeyAssign, Layout},
    matrix::{ScanChannel, ScanKey},
    report::{HidChannel, REPORT_SIZE},
};

use super::*;

const T: KeyAssign = KeyAssign::transp();

#[rustfmt::skip]
static LAYERS: [[[KeyAssign; 4]; 2]; 3] = [
    // layer 0
    [
        [KeyAssign::kc(kc::A), KeyAssign::layer_push_pop(1, 1), KeyAssign::chord(0, kc::LEFT_SHIFT), KeyAssign::bootloader()],
        [KeyAssign::kc(kc::B), KeyAssign::capslock(),           KeyAssign::chord(0, kc::RIGHT_SHIFT), KeyAssign::kc(kc::E)],
    ],
    // layer 1
    [
        [KeyAssign::kc(kc::C), T, T, T],
        [T, KeyAssign::num_layer_push_pop(10, 2), T, KeyAssign::side(Action::Key(kc::D), Action::Transp)],
    ],
    // layer 2
    [
        [T, T, T, T],
        [T, T, T, T],
    ],
];

static CHORDS: [ChordSpec; 1] = [ChordSpec {
    threshold: 2,
    effect: Action::ToggleCapslock,
}];

type TestMapper<'c> = Mapper<'c, 2, 4, NoopRawMutex, 64>;
type TestChannel = HidChannel<NoopRawMutex, 64>;

fn mapper(channel: &TestChannel) -> TestMapper<'_> {
    Mapper::new(Layout::new(&LAYERS, &CHORDS), channel)
}

fn drain(channel: &TestChannel) -> Vec<[u8; REPORT_SIZE]> {
    let mut reports = Vec::new();
    while let Some(report) = channel.try_receive() {
        reports.push(report);
    }
    reports
}

fn keys_down(report: &[u8; REPORT_SIZE]) -> Vec<u8> {
    let mut keys = Vec::new();
    for (i, byte) in report[2..].iter().enumerate() {
        for bit in 0..8usize {
            if byte & (1u8 << bit) != 0 {
                keys.push((i * 8 + bit) as u8);
            }
        }
    }
    keys
}

fn press(mapper: &mut TestMapper, row: usize, column: usize) {
    let layer = mapper.top_layer();
    mapper.resolve_and_execute(true, layer, row, column);
}

fn release(mapper: &mut TestMapper, row: usize, column: usize) {
    let layer = mapper.top_layer();
    mapper.resolve_and_execute(false, layer, row, column);
}

#[test]
fn plain_key_press_and_release() {
    let channel = TestChannel::default();
    let mut m = mapper(&channel);

    press(&mut m, 0, 0);
    release(&mut m, 0, 0);

    let reports = drain(&channel);
    assert_eq!(reports.len(), 2);
    assert_eq!(keys_down(&reports[0]), [kc::A]);
    assert!(keys_down(&reports[1]).is_empty());
}

#[test]
fn layer_push_key_changes_resolution() {
    let channel = TestChannel::default();
    let mut m = mapper(&channel);
    assert_eq!(m.top_layer(), 0);

    press(&mut m, 0, 1);
    assert_eq!(m.top_layer(), 1);

    // (0,0) now resolves against layer 1
    press(&mut m, 0, 0);
    assert_eq!(keys_down(&drain(&channel)[0]), [kc::C]);
    release(&mut m, 0, 0);

    release(&mut m, 0, 1);
    assert_eq!(m.top_layer(), 0);

    press(&mut m, 0, 0);
    let reports = drain(&channel);
    assert_eq!(keys_down(reports.last().unwrap()), [kc::A]);
}

#[test]
fn transparent_key_falls_through_to_base() {
    let channel = TestChannel::default();
    let mut m = mapper(&channel);
    press(&mut m, 0, 1);
    drain(&channel);

    // (1,0) is transparent on layer 1
    press(&mut m, 1, 0);
    assert_eq!(keys_down(&drain(&channel)[0]), [kc::B]);
}

#[test]
fn transparent_base_layer_resolves_to_nop() {
    static ALL_TRANSPARENT: [[[KeyAssign; 1]; 1]; 1] = [[[KeyAssign::transp()]]];

    let channel = TestChannel::default();
    let mut m: Mapper<1, 1, NoopRawMutex, 64> =
        Mapper::new(Layout::new(&ALL_TRANSPARENT, &[]), &channel);

    m.resolve_and_execute(true, m.top_layer(), 0, 0);
    m.resolve_and_execute(false, m.top_layer(), 0, 0);
    assert!(drain(&channel).is_empty());
}

#[test]
fn release_resolves_against_release_time_layer() {
    let channel = TestChannel::default();
    let mut m = mapper(&channel);

    press(&mut m, 0, 1); // layer 1 on
    press(&mut m, 1, 3); // D down (layer 1 press side)
    release(&mut m, 0, 1); // layer 1 off
    drain(&channel);

    // release side of (1,3) is now found on layer 0: E goes up, D stays down
    release(&mut m, 1, 3);
    let reports = drain(&channel);
    assert_eq!(reports.len(), 1);
    assert_eq!(keys_down(&reports[0]), [kc::D]);
}

#[test]
fn stacked_layers_resolve_top_down() {
    let channel = TestChannel::default();
    let mut m = mapper(&channel);

    press(&mut m, 0, 1); // layer 1
    press(&mut m, 1, 1); // numpad key: layer 2 plus lock pulse
    assert_eq!(m.top_layer(), 2);

    let reports = drain(&channel);
    let pulses: Vec<_> = reports.iter().map(keys_down).collect();
    assert_eq!(pulses[0], [kc::LOCKING_NUM_LOCK]);
    assert!(pulses[1].is_empty());

    // layer 2 is all transparent; walk reaches layer 1 then base
    press(&mut m, 0, 0);
    assert_eq!(keys_down(&drain(&channel)[0]), [kc::C]);
    release(&mut m, 0, 0);

    // releasing the numpad key walks down to its layer-1 pop side
    release(&mut m, 1, 1);
    assert_eq!(m.top_layer(), 1);
    let reports = drain(&channel);
    assert_eq!(keys_down(&reports[reports.len() - 2]), [kc::LOCKING_NUM_LOCK]);
}

#[test]
fn chord_fires_effect_once_at_threshold() {
    let channel = TestChannel::default();
    let mut m = mapper(&channel);

    press(&mut m, 0, 2);
    let reports = drain(&channel);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0][1], 0b0000_0010); // left shift forwarded

    press(&mut m, 1, 2);
    let reports = drain(&channel);
    // right shift forwarded, then the capslock pulse
    assert_eq!(reports[0][1], 0b0010_0010);
    let caps: Vec<_> = reports
        .iter()
        .filter(|r| keys_down(r).contains(&kc::CAPS_LOCK))
        .collect();
    assert_eq!(caps.len(), 1);
    // shifts restored after the pulse
    assert_eq!(reports[reports.len() - 1][1], 0b0010_0010);

    release(&mut m, 0, 2);
    release(&mut m, 1, 2);
    let reports = drain(&channel);
    assert!(reports.iter().all(|r| !keys_down(r).contains(&kc::CAPS_LOCK)));
    assert_eq!(reports[reports.len() - 1][1], 0);

    // a lone press after the full cycle does not re-fire
    press(&mut m, 0, 2);
    let reports = drain(&channel);
    assert_eq!(reports.len(), 1);
}

#[test]
fn chord_release_without_press_clamps() {
    let channel = TestChannel::default();
    let mut m = mapper(&channel);

    release(&mut m, 0, 2);
    release(&mut m, 0, 2);
    drain(&channel);

    // two presses still needed to fire
    press(&mut m, 0, 2);
    press(&mut m, 1, 2);
    let reports = drain(&channel);
    assert!(reports.iter().any(|r| keys_down(r).contains(&kc::CAPS_LOCK)));
}

#[test]
fn bootloader_key_fires_hook_on_press() {
    static JUMPED: AtomicBool = AtomicBool::new(false);

    firmware_functions::handle_bootloader(Some(&|| JUMPED.store(true, Ordering::Relaxed)));

    let channel = TestChannel::default();
    let mut m = mapper(&channel);

    assert!(!JUMPED.load(Ordering::Relaxed));
    press(&mut m, 0, 3);
    assert!(JUMPED.load(Ordering::Relaxed));
    // the release side is a no-op
    release(&mut m, 0, 3);
    assert!(drain(&channel).is_empty());
}

#[test]
fn toggle_flips_key_state() {
    let channel = TestChannel::default();
    let mut m = mapper(&channel);

    m.run_action(Action::Toggle(kc::E), true);
    assert_eq!(keys_down(&drain(&channel)[0]), [kc::E]);

    m.run_action(Action::Toggle(kc::E), false);
    assert!(drain(&channel).is_empty());

    m.run_action(Action::Toggle(kc::E), true);
    assert!(keys_down(&drain(&channel)[0]).is_empty());
}

#[test]
fn shifted_key_wraps_keycode_in_left_shift() {
    let channel = TestChannel::default();
    let mut m = mapper(&channel);

    m.run_action(Action::Shifted(kc::N1), true);
    m.run_action(Action::Shifted(kc::N1), false);

    let reports = drain(&channel);
    assert_eq!(reports.len(), 4);
    assert_eq!(reports[0][1], 0b0000_0010);
    assert_eq!(keys_down(&reports[1]), [kc::N1]);
    assert!(keys_down(&reports[2]).is_empty());
    assert_eq!(reports[3][1], 0);
}

#[test]
fn sequence_taps_each_action_in_order() {
    let channel = TestChannel::default();
    let mut m = mapper(&channel);

    m.run_action(
        Action::Sequence(&[Action::Key(kc::A), Action::Key(kc::B)]),
        true,
    );

    let reports = drain(&channel);
    let keys: Vec<_> = reports.iter().map(keys_down).collect();
    assert_eq!(keys.len(), 4);
    assert_eq!(keys[0], [kc::A]);
    assert!(keys[1].is_empty());
    assert_eq!(keys[2], [kc::B]);
    assert!(keys[3].is_empty());
}

#[test]
fn run_resolves_scanned_transitions() {
    block_on(async {
        let channel = TestChannel::default();
        let scan: ScanChannel<NoopRawMutex, 4> = ScanChannel::default();
        let mut m = mapper(&channel);

        scan.send(ScanKey::new(0, 0, true)).await;
        scan.send(ScanKey::new(0, 0, false)).await;

        select(m.run(&scan), async {
            let report = channel.receive().await;
            assert_eq!(keys_down(&report), [kc::A]);
            let report = channel.receive().await;
            assert!(keys_down(&report).is_empty());
        })
        .await;
    });
}
