//! Key descriptors and the layout table.
//!
//! Every matrix position on every layer carries a [`KeyAssign`]: one action
//! for the press edge and one for the release edge. Actions form a closed
//! catalog so dispatch is a plain match, no function pointers.

use edox_common::keycodes;

/// One primitive a key edge can trigger.
///
/// `Key`, `Shifted` and `Chord` take their direction from the edge that
/// invoked them; the layer variants fire the same way regardless of edge, so
/// push/pop pairs are wired by putting each half on its own side.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    Nop,
    /// Defer to the next lower active layer.
    Transp,
    /// Press or release a plain HID keycode.
    Key(u8),
    /// Press or release a keycode wrapped in LeftShift.
    Shifted(u8),
    /// Flip the pressed state of a keycode (press edge only).
    Toggle(u8),
    LayerPush { id: u8, layer: u8 },
    LayerPop { id: u8 },
    /// Layer push plus a full press/release pulse of a lock keycode.
    LockLayerPush { id: u8, layer: u8, lock: u8 },
    LockLayerPop { id: u8, lock: u8 },
    /// Toggle capslock, preserving held shifts around the pulse.
    ToggleCapslock,
    /// Type a modified-UTF-8 string as unicode escape sequences.
    Unicode(&'static [u8]),
    /// Tap each action in order.
    Sequence(&'static [Action]),
    /// Chord-group membership; the keycode still acts as a plain key.
    Chord { group: u8, keycode: u8 },
    /// Hand control to the hardware bootloader (press edge).
    Bootloader,
}

/// Press/release action pair for one matrix position on one layer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyAssign {
    pub press: Action,
    pub release: Action,
}

impl KeyAssign {
    pub const fn side(press: Action, release: Action) -> Self {
        Self { press, release }
    }

    pub const fn nop() -> Self {
        Self::side(Action::Nop, Action::Nop)
    }

    pub const fn transp() -> Self {
        Self::side(Action::Transp, Action::Transp)
    }

    pub const fn kc(keycode: u8) -> Self {
        Self::side(Action::Key(keycode), Action::Key(keycode))
    }

    pub const fn shifted(keycode: u8) -> Self {
        Self::side(Action::Shifted(keycode), Action::Shifted(keycode))
    }

    pub const fn toggle(keycode: u8) -> Self {
        Self::side(Action::Toggle(keycode), Action::Nop)
    }

    /// Hold-style layer key: push while held, pop on release.
    pub const fn layer_push_pop(id: u8, layer: u8) -> Self {
        Self::side(Action::LayerPush { id, layer }, Action::LayerPop { id })
    }

    pub const fn layer_push(id: u8, layer: u8) -> Self {
        Self::side(Action::LayerPush { id, layer }, Action::Nop)
    }

    pub const fn layer_pop(id: u8) -> Self {
        Self::side(Action::LayerPop { id }, Action::Nop)
    }

    /// Numpad-style layer key: the layer change is bracketed by a NumLock
    /// pulse so the host registers the lock toggle.
    pub const fn num_layer_push_pop(id: u8, layer: u8) -> Self {
        Self::side(
            Action::LockLayerPush {
                id,
                layer,
                lock: keycodes::LOCKING_NUM_LOCK,
            },
            Action::LockLayerPop {
                id,
                lock: keycodes::LOCKING_NUM_LOCK,
            },
        )
    }

    pub const fn capslock() -> Self {
        Self::side(Action::ToggleCapslock, Action::Nop)
    }

    pub const fn unicode(utf8: &'static [u8]) -> Self {
        Self::side(Action::Unicode(utf8), Action::Nop)
    }

    pub const fn sequence(actions: &'static [Action]) -> Self {
        Self::side(Action::Sequence(actions), Action::Nop)
    }

    pub const fn chord(group: u8, keycode: u8) -> Self {
        Self::side(
            Action::Chord { group, keycode },
            Action::Chord { group, keycode },
        )
    }

    pub const fn bootloader() -> Self {
        Self::side(Action::Bootloader, Action::Nop)
    }
}

/// Configuration of one chord group.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChordSpec {
    /// Member count at which the effect fires (on the press that reaches it).
    pub threshold: u8,
    pub effect: Action,
}

/// The `[layer][row][column]` table plus chord-group configuration. Built at
/// compile time, read-only at runtime.
#[derive(Clone, Copy)]
pub struct Layout<const ROW_COUNT: usize, const COL_COUNT: usize> {
    pub layers: &'static [[[KeyAssign; COL_COUNT]; ROW_COUNT]],
    pub chords: &'static [ChordSpec],
}

impl<const ROW_COUNT: usize, const COL_COUNT: usize> Layout<ROW_COUNT, COL_COUNT> {
    pub const fn new(
        layers: &'static [[[KeyAssign; COL_COUNT]; ROW_COUNT]],
        chords: &'static [ChordSpec],
    ) -> Self {
        Self { layers, chords }
    }

    /// Descriptor at `[layer][row][column]`, or a no-op pair when the layer
    /// is out of range.
    pub fn get(&self, layer: u8, row: usize, column: usize) -> KeyAssign {
        self.layers
            .get(layer as usize)
            .map_or(KeyAssign::nop(), |l| l[row][column])
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn chord_spec(&self, group: u8) -> Option<ChordSpec> {
        self.chords.get(group as usize).copied()
    }
}

#[cfg(test)]
#[path = "keymap_test.rs"]
mod test;
