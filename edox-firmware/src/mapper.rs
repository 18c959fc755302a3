//! The key resolver: turns matrix transitions into HID reports.
//!
//! Each transition is resolved synchronously against the layer that was on
//! top of the stack when it was detected. A transparent side falls through
//! the remaining stack elements and finally the base layer. The resolved
//! action may mutate the layer stack, so the starting layer is captured once
//! per transition and never re-read mid-resolution.

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::{
    chord::ChordCounters,
    firmware_functions,
    keymap::{Action, Layout},
    layer_stack::{LayerStack, BASE_LAYER},
    matrix::ScanChannel,
    report::{HidChannel, KeyboardReport},
};

mod special;

pub struct Mapper<
    'c,
    const ROW_COUNT: usize,
    const COL_COUNT: usize,
    M: RawMutex,
    const HID_BUFFER_SIZE: usize,
> {
    layout: Layout<ROW_COUNT, COL_COUNT>,
    stack: LayerStack,
    chords: ChordCounters,
    report: KeyboardReport,
    hid_channel: &'c HidChannel<M, HID_BUFFER_SIZE>,
}

impl<'c, const ROW_COUNT: usize, const COL_COUNT: usize, M: RawMutex, const HID_BUFFER_SIZE: usize>
    Mapper<'c, ROW_COUNT, COL_COUNT, M, HID_BUFFER_SIZE>
{
    pub fn new(
        layout: Layout<ROW_COUNT, COL_COUNT>,
        hid_channel: &'c HidChannel<M, HID_BUFFER_SIZE>,
    ) -> Self {
        Self {
            layout,
            stack: LayerStack::default(),
            chords: ChordCounters::default(),
            report: KeyboardReport::default(),
            hid_channel,
        }
    }

    /// Layer a new transition will resolve against.
    pub fn top_layer(&self) -> u8 {
        self.stack.top_layer()
    }

    pub async fn run<const SCAN_BUFFER_SIZE: usize>(
        &mut self,
        scan_channel: &'c ScanChannel<M, SCAN_BUFFER_SIZE>,
    ) {
        loop {
            let key = scan_channel.receive().await;
            let layer = self.top_layer();
            self.resolve_and_execute(key.is_down(), layer, key.row(), key.column());
        }
    }

    /// Resolve one transition against `layer` and run the action it lands
    /// on. Push/pop side effects are visible to the next transition, never
    /// to this one.
    pub fn resolve_and_execute(&mut self, is_down: bool, layer: u8, row: usize, column: usize) {
        let action = self.resolve(is_down, layer, row, column);
        self.run_action(action, is_down);
    }

    /// Transparency walk: the captured layer, then the rest of the stack
    /// top to bottom, then the base layer. Terminates at the base layer even
    /// when it is misconfigured as transparent.
    fn resolve(&self, is_down: bool, layer: u8, row: usize, column: usize) -> Action {
        let walk = core::iter::once(layer)
            .chain(self.stack.iter_top_down().skip(1))
            .chain(core::iter::once(BASE_LAYER));
        for candidate in walk {
            let assign = self.layout.get(candidate, row, column);
            let action = if is_down { assign.press } else { assign.release };
            if action != Action::Transp {
                return action;
            }
        }
        crate::error!("transparent key on base layer at {},{}", row, column);
        Action::Nop
    }

    fn run_action(&mut self, action: Action, is_down: bool) {
        match action {
            Action::Nop | Action::Transp => {}
            Action::Key(keycode) => self.key(keycode, is_down),
            Action::Shifted(keycode) => self.shifted(keycode, is_down),
            Action::Toggle(keycode) => {
                if is_down {
                    let held = self.report.read_key(keycode);
                    self.key(keycode, !held);
                }
            }
            Action::LayerPush { id, layer } => {
                self.stack.push(id, layer);
            }
            Action::LayerPop { id } => self.stack.pop_id(id),
            Action::LockLayerPush { id, layer, lock } => {
                self.stack.push(id, layer);
                self.pulse(lock);
            }
            Action::LockLayerPop { id, lock } => {
                self.stack.pop_id(id);
                self.pulse(lock);
            }
            Action::ToggleCapslock => {
                if is_down {
                    self.toggle_capslock();
                }
            }
            Action::Unicode(utf8) => {
                if is_down {
                    self.send_unicode(utf8);
                }
            }
            Action::Sequence(actions) => {
                if is_down {
                    for action in actions {
                        self.run_action(*action, true);
                        self.run_action(*action, false);
                    }
                }
            }
            Action::Chord { group, keycode } => self.chord(group, keycode, is_down),
            Action::Bootloader => {
                if is_down {
                    firmware_functions::jump_to_bootloader();
                }
            }
        }
    }

    fn key(&mut self, keycode: u8, is_down: bool) {
        self.report.set_key(is_down, keycode);
        self.send_report();
    }

    fn shifted(&mut self, keycode: u8, is_down: bool) {
        if is_down {
            self.key(edox_common::keycodes::LEFT_SHIFT, true);
            self.key(keycode, true);
        } else {
            self.key(keycode, false);
            self.key(edox_common::keycodes::LEFT_SHIFT, false);
        }
    }

    /// Full press/release report pair; hosts require the pulse for lock
    /// keycodes.
    fn pulse(&mut self, keycode: u8) {
        self.key(keycode, true);
        self.key(keycode, false);
    }

    /// Chord membership is additive: the member keycode always acts as a
    /// plain key, and the group effect fires once on the press that reaches
    /// the threshold.
    fn chord(&mut self, group: u8, keycode: u8, is_down: bool) {
        if is_down {
            let fired = match self.layout.chord_spec(group) {
                Some(spec) => self.chords.press(group, spec.threshold),
                None => {
                    crate::error!("chord group {} is not configured", group);
                    false
                }
            };
            self.key(keycode, true);
            if fired {
                if let Some(spec) = self.layout.chord_spec(group) {
                    self.run_action(spec.effect, true);
                    self.run_action(spec.effect, false);
                }
            }
        } else {
            self.chords.release(group);
            self.key(keycode, false);
        }
    }

    fn send_report(&mut self) {
        self.hid_channel.send(&self.report);
    }
}

#[cfg(test)]
#[path = "mapper_test.rs"]
mod test;
