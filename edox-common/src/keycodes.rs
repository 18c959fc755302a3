//! USB HID Keyboard/Keypad usage page (0x07) codes used by the firmware.
//!
//! Only the usages the resolver and key-functions need by name are listed;
//! layout tables may use any code in the basic range directly.

pub const NO_EVENT: u8 = 0x00;

pub const A: u8 = 0x04;
pub const B: u8 = 0x05;
pub const C: u8 = 0x06;
pub const D: u8 = 0x07;
pub const E: u8 = 0x08;
pub const F: u8 = 0x09;

pub const N1: u8 = 0x1e;
pub const N2: u8 = 0x1f;
pub const N3: u8 = 0x20;
pub const N4: u8 = 0x21;
pub const N5: u8 = 0x22;
pub const N6: u8 = 0x23;
pub const N7: u8 = 0x24;
pub const N8: u8 = 0x25;
pub const N9: u8 = 0x26;
pub const N0: u8 = 0x27;

pub const ENTER: u8 = 0x28;
pub const ESCAPE: u8 = 0x29;
pub const BACKSPACE: u8 = 0x2a;
pub const TAB: u8 = 0x2b;
pub const SPACE: u8 = 0x2c;
pub const MINUS: u8 = 0x2d;
pub const EQUAL: u8 = 0x2e;

pub const CAPS_LOCK: u8 = 0x39;
pub const LOCKING_CAPS_LOCK: u8 = 0x82;
pub const LOCKING_NUM_LOCK: u8 = 0x83;
pub const KEYPAD_NUM_LOCK: u8 = 0x53;

pub const BASIC_MIN: u8 = 0x04;
pub const BASIC_MAX: u8 = 0xdd;

pub const MODIFIER_MIN: u8 = 0xe0;
pub const MODIFIER_MAX: u8 = 0xe7;

pub const LEFT_CONTROL: u8 = 0xe0;
pub const LEFT_SHIFT: u8 = 0xe1;
pub const LEFT_ALT: u8 = 0xe2;
pub const LEFT_GUI: u8 = 0xe3;
pub const RIGHT_CONTROL: u8 = 0xe4;
pub const RIGHT_SHIFT: u8 = 0xe5;
pub const RIGHT_ALT: u8 = 0xe6;
pub const RIGHT_GUI: u8 = 0xe7;

/// Modifier-byte mask covering both shift keys.
pub const SHIFT_MASK: u8 = 1 << (LEFT_SHIFT - MODIFIER_MIN) | 1 << (RIGHT_SHIFT - MODIFIER_MIN);

pub fn is_modifier(keycode: u8) -> bool {
    (MODIFIER_MIN..=MODIFIER_MAX).contains(&keycode)
}

/// The bit this keycode occupies in the HID modifier byte, or 0 for
/// non-modifier codes.
pub fn modifier_bit(keycode: u8) -> u8 {
    if is_modifier(keycode) {
        1 << (keycode - MODIFIER_MIN)
    } else {
        0
    }
}

/// Keycode that types the hex digit in the low nibble of `digit`
/// (0-9 then a-f). The high nibble is ignored.
pub fn hex_digit(digit: u8) -> u8 {
    match digit & 0x0f {
        0 => N0,
        d @ 1..=9 => N1 + d - 1,
        d => A + d - 10,
    }
}

#[cfg(test)]
#[path = "keycodes_test.rs"]
mod test;
