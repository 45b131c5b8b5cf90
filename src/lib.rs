//! Host-testable core of nfc2ble.
//!
//! Everything that does not touch the radio or the I²C peripheral lives
//! here: keystroke synthesis, the HID report map, the session state
//! machine, the PN532 driver (generic over `embedded-hal-async`) and the
//! scan loop step.
//!
//! Usage: `cargo test --lib` or `cargo test` for the integration tests.
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main]
//! and adds the SoftDevice BLE peripheral on top of this library.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod error;
pub mod hid;
pub mod nfc;
pub mod scan;
pub mod session;

pub use error::{BleError, Error, NfcError};
pub use scan::{ScanLoop, ScanOutcome};
pub use session::{InputChannel, LinkState, Session, SessionEvents};

// ═══════════════════════════════════════════════════════════════════════════
// Cross-module Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::config::*;
    use super::hid::keyboard::{INPUT_REPORT_SIZE, OUTPUT_REPORT_SIZE};
    use super::hid::report_map::KEYBOARD_LAYOUT;
    use super::hid::{KeyMapping, KEYMAP, REPORT_MAP};
    use super::nfc::pn532::FrameError;
    use super::nfc::{uid::decode_uid, ScanEvent, TagUid, SCAN_STRING_CAPACITY};
    use super::*;

    // ════════════════════════════════════════════════════════════════════════
    // Report Map vs Report Structs
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn report_structs_match_descriptor() {
        assert_eq!(REPORT_MAP.len(), 67);
        assert_eq!(usize::from(KEYBOARD_LAYOUT.input_bits), INPUT_REPORT_SIZE * 8);
        assert_eq!(usize::from(KEYBOARD_LAYOUT.output_bits), OUTPUT_REPORT_SIZE * 8);
    }

    #[test]
    fn every_mapped_usage_is_declared() {
        assert!(KEYMAP
            .iter()
            .all(|m| m.usage <= KEYBOARD_LAYOUT.key_usage_max));
    }

    #[test]
    fn every_decimal_digit_is_typeable() {
        // Decoded UIDs only contain digits plus the suffix.
        for c in ('0'..='9').chain(HID_INPUT_SUFFIX.chars()) {
            assert!(KeyMapping::for_char(c).is_some(), "{c:?} has no mapping");
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Tag Events
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn detected_uid_becomes_decimal_text() {
        let uid = TagUid::from_slice(&[4, 24, 9, 2]).unwrap();
        match ScanEvent::from(Some(uid)) {
            ScanEvent::TagDetected(text) => assert_eq!(text.as_str(), "42492"),
            ScanEvent::NoTag => panic!("expected a tag"),
        }
    }

    #[test]
    fn absent_uid_is_no_tag() {
        assert_eq!(ScanEvent::from(None::<TagUid>), ScanEvent::NoTag);
    }

    #[test]
    fn scan_string_holds_longest_uid_and_suffix() {
        assert_eq!(SCAN_STRING_CAPACITY, 32);
        assert_eq!(decode_uid(&[200; 10]).len() + HID_INPUT_SUFFIX.len(), 32);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Configuration
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn timing_constants() {
        assert_eq!(POLL_INTERVAL_MS, 100);
        assert_eq!(DEBOUNCE_US, 200_000);
        assert_eq!(KEYSTROKE_DELAY_MS, 5);
        assert_eq!(HID_INPUT_SUFFIX, "\r\n");
    }

    #[test]
    fn device_name_fits_scan_response() {
        // AD structure header (2 bytes) + name within 31 bytes.
        assert!(DEVICE_NAME.len() + 2 <= 31);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Error Conversions
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn frame_error_lifts_to_top_level() {
        let nfc: NfcError = FrameError::DataChecksum.into();
        assert_eq!(nfc, NfcError::Frame(FrameError::DataChecksum));

        let top: Error = nfc.into();
        assert_eq!(top, Error::Nfc(NfcError::Frame(FrameError::DataChecksum)));

        let ble: Error = BleError::NotConnected.into();
        assert_eq!(ble, Error::Ble(BleError::NotConnected));
    }
}
