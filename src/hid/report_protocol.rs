//! HID Report Descriptor walker.
//!
//! Computes the shape a descriptor declares for one report ID, so the
//! served report map can be checked against the Rust report structs.
//! The walker is a `const fn`, which lets the check run at compile time.
//!
//! ## HID Report Descriptor Structure
//!
//! A Report Descriptor is a sequence of short items:
//! - Usage Page: Category of usages (keyboard, LEDs, ...)
//! - Usage: Specific function within a page
//! - Report ID: Identifies which report follows (if multiple)
//! - Report Size: Bits per field
//! - Report Count: Number of fields
//! - Input/Output/Feature: Direction of the report
//!
//! ## Limitations
//!
//! - Long items are treated as malformed
//! - Push/Pop state is not supported
//! - Feature reports are skipped

/// Usage page codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsagePage {
    /// Generic Desktop (mouse, keyboard, joystick).
    GenericDesktop,
    /// Keyboard/Keypad.
    Keyboard,
    /// LEDs.
    Led,
    /// Unknown/unsupported.
    Unknown(u16),
}

impl UsagePage {
    pub const fn from_code(code: u16) -> Self {
        match code {
            0x01 => UsagePage::GenericDesktop,
            0x07 => UsagePage::Keyboard,
            0x08 => UsagePage::Led,
            other => UsagePage::Unknown(other),
        }
    }
}

/// Generic Desktop usage codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DesktopUsage {
    Pointer,
    Mouse,
    Keyboard,
    Keypad,
    Unknown(u16),
}

impl DesktopUsage {
    pub const fn from_code(code: u16) -> Self {
        match code {
            0x01 => DesktopUsage::Pointer,
            0x02 => DesktopUsage::Mouse,
            0x06 => DesktopUsage::Keyboard,
            0x07 => DesktopUsage::Keypad,
            other => DesktopUsage::Unknown(other),
        }
    }
}

/// Shape of one report as declared by a descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReportLayout {
    /// Report ID the sizes were collected for.
    pub report_id: u8,
    /// Usage page in effect when the first application collection opened.
    pub application_page: UsagePage,
    /// Usage of the first application collection.
    pub application_usage: DesktopUsage,
    /// Total input bits for `report_id`.
    pub input_bits: u16,
    /// Total output bits for `report_id`.
    pub output_bits: u16,
    /// Logical maximum of the keyboard key array, 0 if there is none.
    pub key_usage_max: u8,
    /// Every item was complete and collections are balanced.
    pub well_formed: bool,
}

// Item types.
const TYPE_MAIN: u8 = 0;
const TYPE_GLOBAL: u8 = 1;
const TYPE_LOCAL: u8 = 2;

// Main item tags.
const MAIN_INPUT: u8 = 0x08;
const MAIN_OUTPUT: u8 = 0x09;
const MAIN_COLLECTION: u8 = 0x0A;
const MAIN_END_COLLECTION: u8 = 0x0C;

// Global item tags.
const GLOBAL_USAGE_PAGE: u8 = 0x00;
const GLOBAL_LOGICAL_MAX: u8 = 0x02;
const GLOBAL_REPORT_SIZE: u8 = 0x07;
const GLOBAL_REPORT_ID: u8 = 0x08;
const GLOBAL_REPORT_COUNT: u8 = 0x09;

// Local item tags.
const LOCAL_USAGE: u8 = 0x00;

/// Main item flags: Constant, Variable (clear = Array).
const FLAG_CONSTANT: u32 = 0x01;
const FLAG_VARIABLE: u32 = 0x02;

/// Collection type: Application.
const COLLECTION_APPLICATION: u32 = 0x01;

impl ReportLayout {
    /// Walk `data` and collect the layout of `report_id`.
    ///
    /// A descriptor without Report ID items is treated as declaring
    /// `report_id` for all of its fields.
    pub const fn parse(data: &[u8], report_id: u8) -> Self {
        let mut layout = ReportLayout {
            report_id,
            application_page: UsagePage::Unknown(0),
            application_usage: DesktopUsage::Unknown(0),
            input_bits: 0,
            output_bits: 0,
            key_usage_max: 0,
            well_formed: true,
        };

        // Parser state.
        let mut usage_page: u16 = 0;
        let mut usage: u16 = 0;
        let mut current_id: Option<u8> = None;
        let mut report_size: u16 = 0;
        let mut report_count: u16 = 0;
        let mut logical_max: u32 = 0;
        let mut depth: u16 = 0;
        let mut seen_application = false;

        let mut i = 0;
        while i < data.len() {
            let prefix = data[i];
            if prefix == 0xFE {
                // Long item.
                layout.well_formed = false;
                break;
            }

            let tag = (prefix >> 4) & 0x0F;
            let item_type = (prefix >> 2) & 0x03;
            let size = match prefix & 0x03 {
                0 => 0,
                1 => 1,
                2 => 2,
                _ => 4,
            };

            if i + 1 + size > data.len() {
                layout.well_formed = false;
                break;
            }

            let value: u32 = match size {
                0 => 0,
                1 => data[i + 1] as u32,
                2 => u16::from_le_bytes([data[i + 1], data[i + 2]]) as u32,
                _ => u32::from_le_bytes([data[i + 1], data[i + 2], data[i + 3], data[i + 4]]),
            };

            let selected = match current_id {
                Some(id) => id == report_id,
                None => true,
            };

            match item_type {
                TYPE_MAIN => {
                    match tag {
                        MAIN_INPUT => {
                            if selected {
                                layout.input_bits += report_size * report_count;
                                let is_key_array =
                                    value & (FLAG_CONSTANT | FLAG_VARIABLE) == 0;
                                if is_key_array && usage_page == 0x07 && logical_max <= 0xFF {
                                    layout.key_usage_max = logical_max as u8;
                                }
                            }
                        }
                        MAIN_OUTPUT => {
                            if selected {
                                layout.output_bits += report_size * report_count;
                            }
                        }
                        MAIN_COLLECTION => {
                            if value == COLLECTION_APPLICATION && !seen_application {
                                layout.application_page = UsagePage::from_code(usage_page);
                                layout.application_usage = DesktopUsage::from_code(usage);
                                seen_application = true;
                            }
                            depth += 1;
                        }
                        MAIN_END_COLLECTION => {
                            if depth == 0 {
                                layout.well_formed = false;
                            } else {
                                depth -= 1;
                            }
                        }
                        _ => {}
                    }
                    // Local items only apply to the next main item.
                    usage = 0;
                }
                TYPE_GLOBAL => match tag {
                    GLOBAL_USAGE_PAGE => usage_page = value as u16,
                    GLOBAL_LOGICAL_MAX => logical_max = value,
                    GLOBAL_REPORT_SIZE => report_size = value as u16,
                    GLOBAL_REPORT_ID => current_id = Some(value as u8),
                    GLOBAL_REPORT_COUNT => report_count = value as u16,
                    _ => {}
                },
                TYPE_LOCAL => {
                    if tag == LOCAL_USAGE {
                        usage = value as u16;
                    }
                }
                _ => {}
            }

            i += 1 + size;
        }

        if depth != 0 {
            layout.well_formed = false;
        }

        layout
    }
}
