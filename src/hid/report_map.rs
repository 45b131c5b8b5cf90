//! HID report map served through the Report Map characteristic (0x2A4B).
//!
//! Hosts that have already paired with the reader cache this descriptor,
//! so its bytes must not change. The layout it declares is checked
//! against [`InputReport`](super::keyboard::InputReport) /
//! [`OutputReport`](super::keyboard::OutputReport) and the keymap at
//! compile time.

use super::keyboard::{INPUT_REPORT_SIZE, KEYBOARD_REPORT_ID, OUTPUT_REPORT_SIZE};
use super::keymap::KEYMAP;
use super::report_protocol::{DesktopUsage, ReportLayout, UsagePage};

/// Keyboard report map.
///
///   - 8 modifier key bits (input)
///   - 1 reserved byte (input)
///   - 6 key code bytes, usages 0x00..=0x65 (input)
///   - 5 LED bits + 3 padding bits (output)
pub const REPORT_MAP: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xA1, 0x01, // Collection (Application)
    //
    0x85, 0x01, //   Report ID (1)
    //
    //   - Modifier keys (8 bits) -> InputReport.modifiers -
    0x05, 0x07, //   Usage Page (Keyboard/Keypad)
    0x19, 0xE0, //   Usage Minimum (Left Control)
    0x29, 0xE7, //   Usage Maximum (Right GUI)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x95, 0x08, //   Report Count (8)
    0x75, 0x01, //   Report Size (1)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    //   - Reserved byte -> InputReport.reserved -
    0x95, 0x01, //   Report Count (1)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x01, //   Input (Constant)
    //
    //   - Key codes (6 bytes) -> InputReport.pressed_keys -
    0x95, 0x06, //   Report Count (6)
    0x75, 0x08, //   Report Size (8)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x65, //   Logical Maximum (101)
    0x19, 0x00, //   Usage Minimum (0)
    0x29, 0x65, //   Usage Maximum (101)
    0x81, 0x00, //   Input (Data, Array, Absolute)
    //
    //   - LED output (5 bits) -> OutputReport.leds -
    0x95, 0x05, //   Report Count (5)
    0x75, 0x01, //   Report Size (1)
    0x05, 0x08, //   Usage Page (LEDs)
    0x19, 0x01, //   Usage Minimum (Num Lock)
    0x29, 0x05, //   Usage Maximum (Kana)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x91, 0x02, //   Output (Data, Variable, Absolute)
    //
    //   - LED padding (3 bits) -
    0x95, 0x01, //   Report Count (1)
    0x75, 0x03, //   Report Size (3)
    0x91, 0x01, //   Output (Constant)
    //
    0xC0, // End Collection
];

/// Layout of [`REPORT_MAP`] for report ID 1.
pub const KEYBOARD_LAYOUT: ReportLayout = ReportLayout::parse(REPORT_MAP, KEYBOARD_REPORT_ID);

const _: () = {
    let layout = KEYBOARD_LAYOUT;
    assert!(layout.well_formed);
    assert!(matches!(layout.application_page, UsagePage::GenericDesktop));
    assert!(matches!(layout.application_usage, DesktopUsage::Keyboard));
    assert!(layout.input_bits as usize == INPUT_REPORT_SIZE * 8);
    assert!(layout.output_bits as usize == OUTPUT_REPORT_SIZE * 8);

    // Every usage we can type must be inside the declared key array range.
    let mut i = 0;
    while i < KEYMAP.len() {
        assert!(KEYMAP[i].usage <= layout.key_usage_max);
        i += 1;
    }
};
