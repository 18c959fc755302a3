//! Modifier-scoped actions: capslock toggle and unicode injection.
//!
//! Both bracket their reports between a modifier snapshot and a bit-for-bit
//! restore so the host sees deterministic modifier state around the pulse,
//! whatever the user is holding.

use edox_common::keycodes::{self, SHIFT_MASK};
use embassy_sync::blocking_mutex::raw::RawMutex;

use super::Mapper;

const ALL_MODIFIERS: u8 = 0xff;

impl<const ROW_COUNT: usize, const COL_COUNT: usize, M: RawMutex, const HID_BUFFER_SIZE: usize>
    Mapper<'_, ROW_COUNT, COL_COUNT, M, HID_BUFFER_SIZE>
{
    /// Pulse CapsLock with both shifts lifted, then restore them.
    pub(crate) fn toggle_capslock(&mut self) {
        let snapshot = self.report.snapshot_modifiers();
        self.report.clear_modifiers(SHIFT_MASK);
        self.send_report();

        self.report.set_key(true, keycodes::CAPS_LOCK);
        self.send_report();
        self.report.set_key(false, keycodes::CAPS_LOCK);
        self.send_report();

        self.report.restore_modifiers(snapshot, SHIFT_MASK);
        self.send_report();
    }

    /// Type `utf8` as unicode escape sequences: per code point, LeftAlt held
    /// around an `=` pulse and four hex-digit pulses, most significant
    /// nibble first. All modifiers are lifted for the duration.
    pub(crate) fn send_unicode(&mut self, utf8: &'static [u8]) {
        let snapshot = self.report.snapshot_modifiers();
        self.report.clear_modifiers(ALL_MODIFIERS);
        self.send_report();

        for code_point in decode_modified_utf8(utf8) {
            self.report.set_key(true, keycodes::LEFT_ALT);
            self.send_report();
            self.pulse(keycodes::EQUAL);

            for shift in [12, 8, 4, 0] {
                self.pulse(keycodes::hex_digit((code_point >> shift) as u8));
            }

            self.report.set_key(false, keycodes::LEFT_ALT);
            self.send_report();
        }

        self.report.restore_modifiers(snapshot, ALL_MODIFIERS);
        self.send_report();
    }
}

/// Decode modified UTF-8 into 16-bit code points.
///
/// A NUL byte or the end of the slice terminates. Code points above 0xFFFF
/// cannot be typed as four hex digits, so a 4-byte lead and its three
/// continuation bytes are consumed without emitting anything. Other invalid
/// bytes are skipped. Continuation bytes are not validated; strings are
/// expected to come from the compiler.
pub(crate) fn decode_modified_utf8(bytes: &[u8]) -> DecodeModifiedUtf8<'_> {
    DecodeModifiedUtf8 { bytes, pos: 0 }
}

pub(crate) struct DecodeModifiedUtf8<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl DecodeModifiedUtf8<'_> {
    fn take_byte(&mut self) -> Option<u8> {
        let byte = *self.bytes.get(self.pos)?;
        self.pos += 1;
        Some(byte)
    }
}

impl Iterator for DecodeModifiedUtf8<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        loop {
            let c = self.take_byte()?;
            if c == 0 {
                self.pos = self.bytes.len();
                return None;
            }
            if c >> 7 == 0 {
                return Some((c & 0x7f) as u16);
            }
            if c >> 5 == 0b110 {
                let c2 = self.take_byte()?;
                return Some(((c as u16 & 0x1f) << 6) | (c2 as u16 & 0x3f));
            }
            if c >> 4 == 0b1110 {
                let c2 = self.take_byte()?;
                let c3 = self.take_byte()?;
                return Some(
                    ((c as u16 & 0x0f) << 12) | ((c2 as u16 & 0x3f) << 6) | (c3 as u16 & 0x3f),
                );
            }
            if c >> 3 == 0b11110 {
                self.pos += 3;
                continue;
            }
            // stray continuation or invalid lead byte
        }
    }
}

#[cfg(test)]
#[path = "special_test.rs"]
mod test;
