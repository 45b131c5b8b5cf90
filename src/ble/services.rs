//! Device Information and Battery services.

use nfc2ble::config::{
    BATTERY_LEVEL_PERCENT, MANUFACTURER_NAME, PNP_PRODUCT_ID, PNP_PRODUCT_VERSION,
    PNP_VENDOR_ID, PNP_VENDOR_ID_SOURCE,
};
use nrf_softdevice::ble::gatt_server::builder::ServiceBuilder;
use nrf_softdevice::ble::gatt_server::characteristic::{Attribute, Metadata, Properties};
use nrf_softdevice::ble::gatt_server::{CharacteristicHandles, RegisterError};
use nrf_softdevice::ble::SecurityMode;
use nrf_softdevice::Softdevice;

use super::uuids;

/// PnP ID characteristic value: source, vendor, product, version (LE).
const fn pnp_id() -> [u8; 7] {
    let vid = PNP_VENDOR_ID.to_le_bytes();
    let pid = PNP_PRODUCT_ID.to_le_bytes();
    let ver = PNP_PRODUCT_VERSION.to_le_bytes();
    [PNP_VENDOR_ID_SOURCE, vid[0], vid[1], pid[0], pid[1], ver[0], ver[1]]
}

/// Manufacturer name and PnP ID. Read-only, never changes.
pub struct DeviceInformationService;

impl DeviceInformationService {
    pub fn new(sd: &mut Softdevice) -> Result<Self, RegisterError> {
        let mut service = ServiceBuilder::new(sd, uuids::DEVICE_INFORMATION)?;

        service
            .add_characteristic(
                uuids::MANUFACTURER_NAME,
                Attribute::new(MANUFACTURER_NAME.as_bytes()).security(SecurityMode::JustWorks),
                Metadata::new(Properties::new().read()),
            )?
            .build();

        service
            .add_characteristic(
                uuids::PNP_ID,
                Attribute::new(pnp_id()).security(SecurityMode::JustWorks),
                Metadata::new(Properties::new().read()),
            )?
            .build();

        let _service_handle = service.build();
        Ok(Self)
    }
}

/// Battery level. The reader is bus powered, so the level is fixed.
pub struct BatteryService {
    level: CharacteristicHandles,
}

impl BatteryService {
    pub fn new(sd: &mut Softdevice) -> Result<Self, RegisterError> {
        let mut service = ServiceBuilder::new(sd, uuids::BATTERY_SERVICE)?;

        let level = service
            .add_characteristic(
                uuids::BATTERY_LEVEL,
                Attribute::new([BATTERY_LEVEL_PERCENT]).security(SecurityMode::JustWorks),
                Metadata::new(Properties::new().read().notify()),
            )?
            .build();

        let _service_handle = service.build();
        Ok(Self { level })
    }

    /// `true` if `handle` is the level CCCD.
    pub fn is_level_cccd(&self, handle: u16) -> bool {
        handle == self.level.cccd_handle
    }
}
