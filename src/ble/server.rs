//! GATT server: owns the registered services and routes host writes.

use defmt::{debug, info};
use nfc2ble::session::SessionEvents;
use nfc2ble::{BleError, Session};
use nrf_softdevice::ble::gatt_server::{self, WriteOp};
use nrf_softdevice::ble::Connection;
use nrf_softdevice::Softdevice;

use super::hid_service::{HidEvent, HidService};
use super::services::{BatteryService, DeviceInformationService};

pub struct Server {
    pub hid: HidService,
    _dis: DeviceInformationService,
    bas: BatteryService,
    session: &'static Session,
}

impl Server {
    /// Register all services. Must run before the SoftDevice task starts.
    pub fn new(sd: &mut Softdevice, session: &'static Session) -> Result<Self, BleError> {
        let hid = HidService::new(sd).map_err(|_| BleError::RegisterFailed)?;
        let dis = DeviceInformationService::new(sd).map_err(|_| BleError::RegisterFailed)?;
        let bas = BatteryService::new(sd).map_err(|_| BleError::RegisterFailed)?;
        info!("GATT services registered");

        Ok(Self {
            hid,
            _dis: dis,
            bas,
            session,
        })
    }
}

impl gatt_server::Server for Server {
    type Event = ();

    fn on_write(
        &self,
        _conn: &Connection,
        handle: u16,
        _op: WriteOp,
        _offset: usize,
        data: &[u8],
    ) -> Option<Self::Event> {
        if let Some(event) = self.hid.on_write(handle, data) {
            match event {
                HidEvent::InputCccd { notifications } => {
                    info!("host set input notifications: {}", notifications);
                    self.session.on_input_cccd_write(notifications);
                }
                HidEvent::OutputReport(data) => match self.session.on_output_write(data) {
                    Some(leds) => debug!(
                        "LEDs: num={} caps={} scroll={}",
                        leds.num_lock(),
                        leds.caps_lock(),
                        leds.scroll_lock()
                    ),
                    None => debug!("empty LED output report"),
                },
                HidEvent::ControlPoint(cmd) => debug!("HID control point: {}", cmd),
                HidEvent::ProtocolMode(mode) => debug!("HID protocol mode: {}", mode),
            }
        } else if self.bas.is_level_cccd(handle) {
            debug!("battery level CCCD written");
        }
        None
    }
}
