//! BLE HID keyboard reports (report ID 1).
//!
//! Input report layout (8 bytes):
//! ```text
//! Byte 0: Modifier keys (bitfield)
//!         Bit 0 = Left Ctrl,  Bit 1 = Left Shift,
//!         Bit 2 = Left Alt,   Bit 3 = Left GUI,
//!         Bit 4 = Right Ctrl, Bit 5 = Right Shift,
//!         Bit 6 = Right Alt,  Bit 7 = Right GUI
//! Byte 1: Reserved (0x00)
//! Byte 2-7: Up to 6 simultaneous key codes (HID usage codes)
//! ```
//!
//! Output report layout (1 byte):
//! ```text
//! Bit 0-4: Num Lock, Caps Lock, Scroll Lock, Compose, Kana
//! Bit 5-7: Padding
//! ```
//!
//! Reports are (de)serialised explicitly; the byte layout must match
//! [`REPORT_MAP`](super::report_map::REPORT_MAP), which is checked at
//! compile time.

/// Report ID shared by the input and output report.
pub const KEYBOARD_REPORT_ID: u8 = 1;

/// Input report size in bytes.
pub const INPUT_REPORT_SIZE: usize = 8;

/// Output report size in bytes.
pub const OUTPUT_REPORT_SIZE: usize = 1;

/// Number of key slots in an input report.
pub const MAX_PRESSED_KEYS: usize = 6;

/// Left Shift modifier bit.
pub const MOD_LEFT_SHIFT: u8 = 0x02;

/// Keyboard input report.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputReport {
    /// Modifier key bitfield.
    pub modifiers: u8,
    /// Reserved byte (always 0x00).
    pub reserved: u8,
    /// Up to 6 simultaneously pressed key codes.
    pub pressed_keys: [u8; MAX_PRESSED_KEYS],
}

/// Sent between two key presses so the host sees a release transition.
pub const NO_KEY_PRESSED: InputReport = InputReport::released();

impl InputReport {
    /// All keys released.
    pub const fn released() -> Self {
        Self {
            modifiers: 0,
            reserved: 0,
            pressed_keys: [0; MAX_PRESSED_KEYS],
        }
    }

    /// A single key held down together with `modifiers`.
    pub const fn single_key(modifiers: u8, usage: u8) -> Self {
        Self {
            modifiers,
            reserved: 0,
            pressed_keys: [usage, 0, 0, 0, 0, 0],
        }
    }

    /// Wire representation.
    pub fn to_bytes(&self) -> [u8; INPUT_REPORT_SIZE] {
        let mut buf = [0u8; INPUT_REPORT_SIZE];
        buf[0] = self.modifiers;
        buf[1] = self.reserved;
        buf[2..].copy_from_slice(&self.pressed_keys);
        buf
    }

    /// Parse from raw report bytes.
    #[cfg(test)]
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < INPUT_REPORT_SIZE {
            return None;
        }
        Some(Self {
            modifiers: data[0],
            reserved: data[1],
            pressed_keys: [data[2], data[3], data[4], data[5], data[6], data[7]],
        })
    }

    /// Returns `true` if no keys are pressed (release event).
    #[cfg(test)]
    pub fn is_released(&self) -> bool {
        self.modifiers == 0 && self.pressed_keys.iter().all(|&k| k == 0)
    }
}

/// Keyboard LED state written by the host.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputReport {
    /// LED bitfield; padding bits are cleared.
    pub leds: u8,
}

impl OutputReport {
    const LED_MASK: u8 = 0x1F;

    pub const NUM_LOCK: u8 = 0x01;
    pub const CAPS_LOCK: u8 = 0x02;
    pub const SCROLL_LOCK: u8 = 0x04;

    /// Parse a host write. Padding bits are dropped.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        let leds = *data.first()?;
        Some(Self {
            leds: leds & Self::LED_MASK,
        })
    }

    #[cfg(test)]
    pub fn to_bytes(&self) -> [u8; OUTPUT_REPORT_SIZE] {
        [self.leds & Self::LED_MASK]
    }

    pub fn num_lock(&self) -> bool {
        self.leds & Self::NUM_LOCK != 0
    }

    pub fn caps_lock(&self) -> bool {
        self.leds & Self::CAPS_LOCK != 0
    }

    pub fn scroll_lock(&self) -> bool {
        self.leds & Self::SCROLL_LOCK != 0
    }
}
