//! Application-wide constants and compile-time configuration.
//!
//! All timing parameters, device identity strings, and protocol
//! constants live here so they can be tuned in one place. Nothing is
//! reconfigurable at runtime.

// Scan loop

/// Pause between two NFC polls (ms).
pub const POLL_INTERVAL_MS: u64 = 100;

/// Minimum time between two accepted tag reads (µs).
pub const DEBOUNCE_US: u64 = 200_000;

/// Delay after every transmitted keyboard report (ms).
pub const KEYSTROKE_DELAY_MS: u32 = 5;

/// Appended to every injected tag UID.
pub const HID_INPUT_SUFFIX: &str = "\r\n";

// At least one poll tick must fall inside the debounce window.
const _: () = assert!(DEBOUNCE_US > POLL_INTERVAL_MS * 1000);

// BLE identity

/// GAP device name, shown by the host during pairing.
pub const DEVICE_NAME: &str = "Bluetooth RFID Reader";

/// Device Information Service manufacturer string.
pub const MANUFACTURER_NAME: &str = "BRS";

/// PnP ID: vendor ID source (0x02 = USB Implementer's Forum).
pub const PNP_VENDOR_ID_SOURCE: u8 = 0x02;
pub const PNP_VENDOR_ID: u16 = 0xE502;
pub const PNP_PRODUCT_ID: u16 = 0xA111;
pub const PNP_PRODUCT_VERSION: u16 = 0x0210;

/// HID Information: bcdHID 1.11, not localized, normally connectable.
pub const HID_INFO_BCD: u16 = 0x0111;
pub const HID_INFO_COUNTRY_CODE: u8 = 0x00;
pub const HID_INFO_FLAGS: u8 = 0x02;

/// Reported battery level. The reader is bus powered.
pub const BATTERY_LEVEL_PERCENT: u8 = 100;

/// Advertising interval (in 0.625 ms units). 400 = 250 ms.
pub const BLE_ADV_INTERVAL: u32 = 400;

/// GAP appearance: HID keyboard.
pub const BLE_APPEARANCE_KEYBOARD: u16 = 0x03C1;

// NFC (PN532 over I²C)
//
//   I²C SDA → P0.26
//   I²C SCL → P0.27

/// 7-bit I²C address of the PN532.
pub const PN532_I2C_ADDRESS: u8 = 0x24;

/// Passive activation retries per InListPassiveTarget (0xFF = forever).
pub const NFC_PASSIVE_ACTIVATION_RETRIES: u8 = 0xFE;

/// Upper bound for the PN532 to signal a ready response (ms).
pub const NFC_RESPONSE_TIMEOUT_MS: u32 = 1000;

/// Interval between PN532 ready-status polls (ms).
pub const NFC_READY_POLL_MS: u32 = 1;
