//! Unified error type for nfc2ble.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (behind the `defmt` feature) for efficient
//! on-target logging.

use crate::nfc::pn532::FrameError;

/// Top-level error type used by the firmware bring-up path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // NFC
    /// The PN532 front-end failed.
    Nfc(NfcError),

    // BLE
    /// The SoftDevice returned a BLE-level error.
    Ble(BleError),
}

/// Errors raised while talking to the PN532.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NfcError {
    /// I²C transaction failed.
    Bus,
    /// The PN532 never signalled a ready response.
    Timeout,
    /// The command was not acknowledged.
    NoAck,
    /// The response frame was malformed.
    Frame(FrameError),
    /// Something other than a PN532 answered (IC code).
    WrongChip(u8),
}

/// Subset of BLE errors we propagate (keeps the enum `Copy`-friendly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BleError {
    /// GAP / GATT raw error code from the SoftDevice.
    Raw(u32),
    /// No central is connected.
    NotConnected,
    /// GATT service registration failed.
    RegisterFailed,
}

// Convenience conversions

impl From<NfcError> for Error {
    fn from(e: NfcError) -> Self {
        Error::Nfc(e)
    }
}

impl From<BleError> for Error {
    fn from(e: BleError) -> Self {
        Error::Ble(e)
    }
}

impl From<FrameError> for NfcError {
    fn from(e: FrameError) -> Self {
        NfcError::Frame(e)
    }
}
