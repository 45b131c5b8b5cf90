//! Bluetooth Low Energy subsystem.
//!
//! This module drives the Nordic SoftDevice S140 in **Peripheral** role:
//!
//! 1. **GATT services** - HID-over-GATT keyboard, Device Information and
//!    Battery, registered once at boot.
//! 2. **Server** - routes host writes (input report CCCD, LED output
//!    report) to the shared [`Session`](nfc2ble::Session).
//! 3. **Peripheral** - advertises as a keyboard, accepts one bonded
//!    central at a time and exposes the connection to the scan task.

pub mod hid_service;
pub mod peripheral;
pub mod server;
pub mod services;

use core::mem;

use nfc2ble::config::DEVICE_NAME;
use nrf_softdevice::ble::Uuid;
use nrf_softdevice::raw;

/// Assigned numbers used by the services below.
pub mod uuids {
    use super::Uuid;

    pub const HID_SERVICE: Uuid = Uuid::new_16(0x1812);
    pub const DEVICE_INFORMATION: Uuid = Uuid::new_16(0x180A);
    pub const BATTERY_SERVICE: Uuid = Uuid::new_16(0x180F);

    pub const BATTERY_LEVEL: Uuid = Uuid::new_16(0x2A19);
    pub const MANUFACTURER_NAME: Uuid = Uuid::new_16(0x2A29);
    pub const PNP_ID: Uuid = Uuid::new_16(0x2A50);

    pub const HID_INFO: Uuid = Uuid::new_16(0x2A4A);
    pub const REPORT_MAP: Uuid = Uuid::new_16(0x2A4B);
    pub const HID_CONTROL_POINT: Uuid = Uuid::new_16(0x2A4C);
    pub const HID_REPORT: Uuid = Uuid::new_16(0x2A4D);
    pub const PROTOCOL_MODE: Uuid = Uuid::new_16(0x2A4E);

    pub const REPORT_REFERENCE: Uuid = Uuid::new_16(0x2908);
}

/// SoftDevice configuration: one peripheral link, no central role.
pub fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_XTAL as u8,
            rc_ctiv: 0,
            rc_temp_ctiv: 0,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_20_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t {
            att_mtu: raw::BLE_GATT_ATT_MTU_DEFAULT as u16,
        }),
        conn_gatts: Some(raw::ble_gatts_conn_cfg_t {
            hvn_tx_queue_size: 4,
        }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: DEVICE_NAME.as_ptr() as _,
            current_len: DEVICE_NAME.len() as u16,
            max_len: DEVICE_NAME.len() as u16,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}
