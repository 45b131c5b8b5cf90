//! HID-over-GATT service exposing one keyboard.
//!
//! Registered with the builder API because the report characteristics
//! need Report Reference descriptors:
//!
//! | Characteristic  | Properties                 | Value / descriptor        |
//! |-----------------|----------------------------|---------------------------|
//! | HID Information | read                       | bcdHID, country, flags    |
//! | Report Map      | read                       | [`REPORT_MAP`]            |
//! | Control Point   | write without response     | suspend / exit suspend    |
//! | Protocol Mode   | read, write w/o response   | 1 (report protocol)       |
//! | Report (input)  | read, notify               | ref `[1, 1]` + CCCD       |
//! | Report (output) | read, write, write w/o rsp | ref `[1, 2]`              |

use defmt::debug;
use nfc2ble::config::{HID_INFO_BCD, HID_INFO_COUNTRY_CODE, HID_INFO_FLAGS};
use nfc2ble::hid::keyboard::{INPUT_REPORT_SIZE, KEYBOARD_REPORT_ID, OUTPUT_REPORT_SIZE};
use nfc2ble::hid::REPORT_MAP;
use nrf_softdevice::ble::gatt_server::builder::ServiceBuilder;
use nrf_softdevice::ble::gatt_server::characteristic::{Attribute, Metadata, Properties};
use nrf_softdevice::ble::gatt_server::{CharacteristicHandles, RegisterError};
use nrf_softdevice::ble::SecurityMode;
use nrf_softdevice::Softdevice;

use super::uuids;

/// Report Reference report types.
const REPORT_TYPE_INPUT: u8 = 0x01;
const REPORT_TYPE_OUTPUT: u8 = 0x02;

/// Protocol Mode: report protocol.
const PROTOCOL_MODE_REPORT: u8 = 0x01;

/// Host writes the HID service reacts to.
pub enum HidEvent<'a> {
    /// Input report CCCD written.
    InputCccd { notifications: bool },
    /// Output report (keyboard LEDs) written.
    OutputReport(&'a [u8]),
    /// Control Point: 0 = suspend, 1 = exit suspend.
    ControlPoint(u8),
    ProtocolMode(u8),
}

pub struct HidService {
    input_report: CharacteristicHandles,
    output_report: CharacteristicHandles,
    control_point: CharacteristicHandles,
    protocol_mode: CharacteristicHandles,
}

impl HidService {
    pub fn new(sd: &mut Softdevice) -> Result<Self, RegisterError> {
        let mut service = ServiceBuilder::new(sd, uuids::HID_SERVICE)?;

        let [bcd_lo, bcd_hi] = HID_INFO_BCD.to_le_bytes();
        service
            .add_characteristic(
                uuids::HID_INFO,
                Attribute::new([bcd_lo, bcd_hi, HID_INFO_COUNTRY_CODE, HID_INFO_FLAGS])
                    .security(SecurityMode::JustWorks),
                Metadata::new(Properties::new().read()),
            )?
            .build();

        service
            .add_characteristic(
                uuids::REPORT_MAP,
                Attribute::new(REPORT_MAP).security(SecurityMode::JustWorks),
                Metadata::new(Properties::new().read()),
            )?
            .build();

        let control_point = service
            .add_characteristic(
                uuids::HID_CONTROL_POINT,
                Attribute::new([0u8]).security(SecurityMode::JustWorks),
                Metadata::new(Properties::new().write_without_response()),
            )?
            .build();

        let protocol_mode = service
            .add_characteristic(
                uuids::PROTOCOL_MODE,
                Attribute::new([PROTOCOL_MODE_REPORT]).security(SecurityMode::JustWorks),
                Metadata::new(Properties::new().read().write_without_response()),
            )?
            .build();

        let mut input = service.add_characteristic(
            uuids::HID_REPORT,
            Attribute::new([0u8; INPUT_REPORT_SIZE]).security(SecurityMode::JustWorks),
            Metadata::new(Properties::new().read().notify()),
        )?;
        input.add_descriptor(
            uuids::REPORT_REFERENCE,
            Attribute::new([KEYBOARD_REPORT_ID, REPORT_TYPE_INPUT])
                .security(SecurityMode::JustWorks),
        )?;
        let input_report = input.build();

        let mut output = service.add_characteristic(
            uuids::HID_REPORT,
            Attribute::new([0u8; OUTPUT_REPORT_SIZE]).security(SecurityMode::JustWorks),
            Metadata::new(
                Properties::new()
                    .read()
                    .write()
                    .write_without_response(),
            ),
        )?;
        output.add_descriptor(
            uuids::REPORT_REFERENCE,
            Attribute::new([KEYBOARD_REPORT_ID, REPORT_TYPE_OUTPUT])
                .security(SecurityMode::JustWorks),
        )?;
        let output_report = output.build();

        let _service_handle = service.build();

        debug!(
            "HID service registered: input={} cccd={} output={}",
            input_report.value_handle, input_report.cccd_handle, output_report.value_handle
        );

        Ok(Self {
            input_report,
            output_report,
            control_point,
            protocol_mode,
        })
    }

    /// Value handle notifications are sent on.
    pub fn input_handle(&self) -> u16 {
        self.input_report.value_handle
    }

    /// CCCD of the input report.
    pub fn input_cccd_handle(&self) -> u16 {
        self.input_report.cccd_handle
    }

    /// Classify a write. `None` if `handle` is not ours.
    pub fn on_write<'a>(&self, handle: u16, data: &'a [u8]) -> Option<HidEvent<'a>> {
        if handle == self.input_report.cccd_handle {
            let notifications = data.first().is_some_and(|v| v & 0x01 != 0);
            Some(HidEvent::InputCccd { notifications })
        } else if handle == self.output_report.value_handle {
            Some(HidEvent::OutputReport(data))
        } else if handle == self.control_point.value_handle {
            data.first().copied().map(HidEvent::ControlPoint)
        } else if handle == self.protocol_mode.value_handle {
            data.first().copied().map(HidEvent::ProtocolMode)
        } else {
            None
        }
    }
}
