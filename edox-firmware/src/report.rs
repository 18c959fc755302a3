//! In-RAM HID keyboard report and the channel that carries finished report
//! images to the USB writer.
//!
//! The report layout matches the NKRO descriptor in [`crate::usb`]: report
//! id, modifier byte, then a 256-bit key bitmap.

use edox_common::keycodes::{MODIFIER_MAX, MODIFIER_MIN};
use embassy_sync::{blocking_mutex::raw::RawMutex, channel::Channel};

use crate::{add_key_bit, del_key_bit};

pub const KEYBOARD_REPORT_ID: u8 = 1;
pub const REPORT_SIZE: usize = crate::KEY_BITS_SIZE + 2;

/// Point-in-time copy of the eight modifier bits.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModifierSnapshot(u8);

impl ModifierSnapshot {
    pub fn bits(&self) -> u8 {
        self.0
    }
}

pub struct KeyboardReport([u8; REPORT_SIZE]);

impl Default for KeyboardReport {
    fn default() -> Self {
        let mut report = [0; REPORT_SIZE];
        report[0] = KEYBOARD_REPORT_ID;
        Self(report)
    }
}

impl KeyboardReport {
    pub fn set_key(&mut self, is_down: bool, keycode: u8) {
        if (MODIFIER_MIN..=MODIFIER_MAX).contains(&keycode) {
            let bit = 1 << (keycode - MODIFIER_MIN);
            if is_down {
                self.0[1] |= bit;
            } else {
                self.0[1] &= !bit;
            }
            return;
        }
        if keycode > 3 {
            if is_down {
                add_key_bit(&mut self.0[2..], keycode);
            } else {
                del_key_bit(&mut self.0[2..], keycode);
            }
        }
    }

    pub fn read_key(&self, keycode: u8) -> bool {
        if (MODIFIER_MIN..=MODIFIER_MAX).contains(&keycode) {
            return self.0[1] & (1 << (keycode - MODIFIER_MIN)) != 0;
        }
        self.0[2 + (keycode >> 3) as usize] & (1 << (keycode & 7)) != 0
    }

    pub fn modifiers(&self) -> u8 {
        self.0[1]
    }

    pub fn snapshot_modifiers(&self) -> ModifierSnapshot {
        ModifierSnapshot(self.0[1])
    }

    /// Clear the modifier bits selected by `mask`.
    pub fn clear_modifiers(&mut self, mask: u8) {
        self.0[1] &= !mask;
    }

    /// Restore the `mask` bits of the modifier byte from `snapshot`, leaving
    /// the other bits as they are now.
    pub fn restore_modifiers(&mut self, snapshot: ModifierSnapshot, mask: u8) {
        self.0[1] = (self.0[1] & !mask) | (snapshot.0 & mask);
    }

    pub fn clear(&mut self) {
        self.0.iter_mut().skip(1).for_each(|b| *b = 0);
    }

    pub fn as_bytes(&self) -> &[u8; REPORT_SIZE] {
        &self.0
    }
}

/// Bounded queue of finished report images between the mapper and the USB
/// writer task. A full queue drops the oldest image rather than blocking the
/// resolution path.
pub struct HidChannel<M: RawMutex, const N: usize>(Channel<M, [u8; REPORT_SIZE], N>);

impl<M: RawMutex, const N: usize> Default for HidChannel<M, N> {
    fn default() -> Self {
        Self(Channel::new())
    }
}

impl<M: RawMutex, const N: usize> HidChannel<M, N> {
    pub async fn receive(&self) -> [u8; REPORT_SIZE] {
        self.0.receive().await
    }

    pub fn try_receive(&self) -> Option<[u8; REPORT_SIZE]> {
        self.0.try_receive().ok()
    }

    pub fn send(&self, report: &KeyboardReport) {
        let image = *report.as_bytes();
        if self.0.try_send(image).is_err() {
            crate::warn!("report queue full; dropping oldest report");
            let _ = self.0.try_receive();
            let _ = self.0.try_send(image);
        }
    }
}

#[cfg(test)]
#[path = "report_test.rs"]
mod test;
