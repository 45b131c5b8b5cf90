//! Advertising, bonding and the live connection.
//!
//! One central at a time. The connection is published through
//! [`KeyboardLink`] so the scan task can notify input reports while the
//! BLE task sits in the GATT server loop.

use core::cell::RefCell;

use defmt::{info, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Timer;
use nfc2ble::config::{BLE_ADV_INTERVAL, BLE_APPEARANCE_KEYBOARD, DEVICE_NAME};
use nfc2ble::hid::keyboard::INPUT_REPORT_SIZE;
use nfc2ble::hid::ReportSink;
use nfc2ble::session::{InputChannel, SessionEvents};
use nfc2ble::{BleError, Session};
use nrf_softdevice::ble::advertisement_builder::{
    AdvertisementDataType, Flag, LegacyAdvertisementBuilder, LegacyAdvertisementPayload,
    ServiceList, ServiceUuid16,
};
use nrf_softdevice::ble::gatt_server::{self, NotifyValueError};
use nrf_softdevice::ble::security::{IoCapabilities, SecurityHandler};
use nrf_softdevice::ble::{
    peripheral, Connection, EncryptionInfo, IdentityKey, MasterId, SecurityMode,
};
use nrf_softdevice::{raw, RawError, Softdevice};
use static_cell::StaticCell;

use super::server::Server;

const APPEARANCE: [u8; 2] = BLE_APPEARANCE_KEYBOARD.to_le_bytes();

static ADV_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .flags(&[Flag::GeneralDiscovery, Flag::LE_Only])
    .services_16(
        ServiceList::Incomplete,
        &[
            ServiceUuid16::HUMAN_INTERFACE_DEVICE,
            ServiceUuid16::DEVICE_INFORMATION,
            ServiceUuid16::BATTERY,
        ],
    )
    .raw(AdvertisementDataType::APPEARANCE, &APPEARANCE)
    .build();

// The full name does not fit next to the flags and service list.
static SCAN_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .full_name(DEVICE_NAME)
    .build();

// ═══════════════════════════════════════════════════════════════════════════
// Bonding
// ═══════════════════════════════════════════════════════════════════════════

struct PeerBond {
    master_id: MasterId,
    key: EncryptionInfo,
    peer_id: IdentityKey,
}

/// Just-works bonding, remembering the most recent host until reset.
struct Bonder {
    peer: RefCell<Option<PeerBond>>,
}

impl Bonder {
    fn new() -> Self {
        Self {
            peer: RefCell::new(None),
        }
    }
}

impl SecurityHandler for Bonder {
    fn io_capabilities(&self) -> IoCapabilities {
        IoCapabilities::None
    }

    fn can_bond(&self, _conn: &Connection) -> bool {
        true
    }

    fn on_bonded(
        &self,
        _conn: &Connection,
        master_id: MasterId,
        key: EncryptionInfo,
        peer_id: IdentityKey,
    ) {
        info!("bonded with new host");
        self.peer.replace(Some(PeerBond {
            master_id,
            key,
            peer_id,
        }));
    }

    fn get_key(&self, _conn: &Connection, master_id: MasterId) -> Option<EncryptionInfo> {
        self.peer
            .borrow()
            .as_ref()
            .and_then(|p| (p.master_id == master_id).then_some(p.key))
    }

    fn get_peripheral_key(&self, conn: &Connection) -> Option<(MasterId, EncryptionInfo)> {
        self.peer.borrow().as_ref().and_then(|p| {
            p.peer_id
                .is_match(conn.peer_address())
                .then_some((p.master_id, p.key))
        })
    }

    fn on_security_update(&self, _conn: &Connection, mode: SecurityMode) {
        info!("BLE security mode updated: {}", mode);
    }
}

fn bonder() -> &'static Bonder {
    static BONDER: StaticCell<Bonder> = StaticCell::new();
    BONDER.init(Bonder::new())
}

// ═══════════════════════════════════════════════════════════════════════════
// Connection sharing
// ═══════════════════════════════════════════════════════════════════════════

/// The current connection, if any.
pub struct KeyboardLink {
    conn: Mutex<CriticalSectionRawMutex, RefCell<Option<Connection>>>,
}

impl KeyboardLink {
    pub const fn new() -> Self {
        Self {
            conn: Mutex::new(RefCell::new(None)),
        }
    }

    fn set(&self, conn: Option<Connection>) {
        self.conn.lock(|c| c.replace(conn));
    }

    fn get(&self) -> Option<Connection> {
        self.conn.lock(|c| c.borrow().clone())
    }
}

/// Sends input reports as notifications on the live connection.
pub struct NotifySink {
    link: &'static KeyboardLink,
    value_handle: u16,
}

impl NotifySink {
    pub fn new(link: &'static KeyboardLink, value_handle: u16) -> Self {
        Self { link, value_handle }
    }
}

impl ReportSink for NotifySink {
    type Error = BleError;

    async fn send_input(
        &mut self,
        _report_id: u8,
        report: &[u8; INPUT_REPORT_SIZE],
    ) -> Result<(), BleError> {
        // A single report characteristic: the ID is carried by its
        // Report Reference descriptor, not the payload.
        let conn = self.link.get().ok_or(BleError::NotConnected)?;
        gatt_server::notify_value(&conn, self.value_handle, report).map_err(|e| match e {
            NotifyValueError::Disconnected => BleError::NotConnected,
            NotifyValueError::Raw(err) => BleError::Raw(err as u32),
        })
    }
}

/// Writes the input report CCCD directly, so reports flow without the
/// host subscribing first.
struct CccdSwitch<'a> {
    conn: &'a Connection,
    cccd_handle: u16,
}

impl InputChannel for CccdSwitch<'_> {
    fn set_notifications(&self, enabled: bool) {
        // Gone together with the connection.
        let Some(conn_handle) = self.conn.handle() else {
            return;
        };

        if enabled && gatt_server::set_sys_attrs(self.conn, None).is_err() {
            warn!("could not initialise system attributes");
        }

        let mut cccd = [u8::from(enabled), 0x00];
        let mut value = raw::ble_gatts_value_t {
            len: cccd.len() as u16,
            offset: 0,
            p_value: cccd.as_mut_ptr(),
        };
        let ret = unsafe { raw::sd_ble_gatts_value_set(conn_handle, self.cccd_handle, &mut value) };
        if let Err(e) = RawError::convert(ret) {
            warn!("input CCCD update failed: {:?}", e);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Advertising loop
// ═══════════════════════════════════════════════════════════════════════════

/// Advertise, serve one central until it disconnects, repeat.
pub async fn run(
    sd: &'static Softdevice,
    server: &Server,
    link: &'static KeyboardLink,
    session: &'static Session,
) -> ! {
    let config = peripheral::Config {
        interval: BLE_ADV_INTERVAL,
        ..Default::default()
    };
    let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
        adv_data: &ADV_DATA,
        scan_data: &SCAN_DATA,
    };
    let bonder = bonder();

    loop {
        info!("advertising as \"{}\"", DEVICE_NAME);
        let conn = match peripheral::advertise_pairable(sd, adv, &config, bonder).await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("advertising failed: {:?}", e);
                Timer::after_secs(1).await;
                continue;
            }
        };

        info!("host connected");
        link.set(Some(conn.clone()));
        let channel = CccdSwitch {
            conn: &conn,
            cccd_handle: server.hid.input_cccd_handle(),
        };
        session.on_connect(&channel);

        let _ = gatt_server::run(&conn, server, |_| {}).await;
        info!("host disconnected");

        session.on_disconnect(&channel);
        link.set(None);
    }
}
