//! nfc2ble - NFC tag reader that types tag UIDs over BLE HID.
//!
//! Target: nRF52840 + SoftDevice S140, PN532 on TWIM0.
//!
//! ## Task Architecture
//!
//! ```text
//! ┌──────────────┐     KeyboardLink      ┌─────────────┐
//! │  ble_task    │ ─── (connection) ───► │  scan_task  │ ◄── PN532 (I²C)
//! │ adv + GATT   │                       │ poll/type   │
//! └──────┬───────┘                       └──────┬──────┘
//!        │ connect / CCCD / disconnect          │ can_transmit()
//!        └──────────────► SESSION ◄─────────────┘
//! ```
//!
//! - `softdevice_task` runs the SoftDevice event loop.
//! - `ble_task` advertises, bonds and serves one host at a time.
//! - `scan_task` polls the PN532 every [`POLL_INTERVAL_MS`] and types
//!   accepted tag UIDs as keyboard input.

#![no_std]
#![no_main]

mod ble;

use defmt::{error, info, unwrap, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_nrf::interrupt::{self, InterruptExt, Priority};
use embassy_nrf::twim::{self, Twim};
use embassy_nrf::{bind_interrupts, peripherals};
use embassy_time::{Delay, Instant, Timer};
use nfc2ble::config::POLL_INTERVAL_MS;
use nfc2ble::nfc::pn532::FirmwareVersion;
use nfc2ble::nfc::reader::Pn532;
use nfc2ble::nfc::{ScanEvent, TagReader};
use nfc2ble::{Error, ScanLoop, ScanOutcome, Session};
use nrf_softdevice::Softdevice;
use panic_probe as _;
use static_cell::StaticCell;

use crate::ble::peripheral::{KeyboardLink, NotifySink};
use crate::ble::server::Server;

bind_interrupts!(struct Irqs {
    SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0 => twim::InterruptHandler<peripherals::TWISPI0>;
});

type NfcReader = Pn532<Twim<'static, peripherals::TWISPI0>, Delay>;

static SESSION: Session = Session::new();
static LINK: KeyboardLink = KeyboardLink::new();
static SERVER: StaticCell<Server> = StaticCell::new();

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

#[embassy_executor::task]
async fn ble_task(sd: &'static Softdevice, server: &'static Server) -> ! {
    ble::peripheral::run(sd, server, &LINK, &SESSION).await
}

#[embassy_executor::task]
async fn scan_task(mut nfc: NfcReader, input_handle: u16) -> ! {
    let mut scan = ScanLoop::new();
    let mut sink = NotifySink::new(&LINK, input_handle);
    let mut delay = Delay;

    info!("waiting for tags");
    loop {
        let event = match nfc.poll().await {
            Ok(uid) => ScanEvent::from(uid),
            Err(e) => {
                warn!("NFC poll failed: {:?}", e);
                ScanEvent::NoTag
            }
        };

        let now_us = Instant::now().as_micros();
        match scan.tick(event, now_us, &SESSION, &mut sink, &mut delay).await {
            ScanOutcome::Idle => {}
            ScanOutcome::Skipped => info!("tag still present, skipped"),
            ScanOutcome::Offline { uid } => {
                info!("tag {} read, no host to type into", uid.as_str())
            }
            ScanOutcome::Typed { uid, reports } => {
                info!("typed tag {} ({} reports)", uid.as_str(), reports)
            }
            ScanOutcome::TransportFailed { uid, error } => {
                warn!("typing tag {} aborted: {:?}", uid.as_str(), error)
            }
        }

        Timer::after_millis(POLL_INTERVAL_MS).await;
    }
}

/// Identify and configure the PN532.
async fn init_reader(nfc: &mut NfcReader) -> Result<FirmwareVersion, Error> {
    let fw = nfc.firmware_version().await?;
    nfc.configure().await?;
    Ok(fw)
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("nfc2ble starting");

    // The SoftDevice reserves priorities 0, 1 and 4.
    let mut config = embassy_nrf::config::Config::default();
    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(config);
    interrupt::SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0.set_priority(Priority::P3);

    let sd = Softdevice::enable(&ble::softdevice_config());
    let server = SERVER.init(unwrap!(Server::new(sd, &SESSION)));
    let input_handle = server.hid.input_handle();
    let sd: &'static Softdevice = sd;
    unwrap!(spawner.spawn(softdevice_task(sd)));
    unwrap!(spawner.spawn(ble_task(sd, server)));

    // SDA P0.26, SCL P0.27
    let i2c = Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim::Config::default());
    let mut nfc = Pn532::new(i2c, Delay);
    match init_reader(&mut nfc).await {
        Ok(fw) => info!(
            "PN532 found: IC {=u8:#x}, firmware {}.{}",
            fw.ic, fw.version, fw.revision
        ),
        Err(e) => {
            error!("PN532 not found: {:?}", e);
            cortex_m::peripheral::SCB::sys_reset();
        }
    }

    unwrap!(spawner.spawn(scan_task(nfc, input_handle)));
}
