//! NFC tag acquisition: PN532 driver, UID decoding and scan debouncing.
//!
//! Data flow per poll tick:
//!
//! ```text
//! TagReader::poll ─► Option<TagUid> ─► ScanEvent ─► Debouncer
//!                         (uid::decode_uid)
//! ```

pub mod debounce;
pub mod pn532;
pub mod reader;
pub mod uid;

use heapless::{String, Vec};

use crate::config::HID_INPUT_SUFFIX;

/// Longest ISO14443A UID (triple size).
pub const MAX_UID_LEN: usize = 10;

/// Every byte decodes to at most three digits; the suffix is appended later.
pub const SCAN_STRING_CAPACITY: usize = MAX_UID_LEN * 3 + HID_INPUT_SUFFIX.len();

/// Raw tag identifier as reported by the reader (4 or 7 bytes in practice).
pub type TagUid = Vec<u8, MAX_UID_LEN>;

/// Decimal text form of a [`TagUid`], plus room for the line ending.
pub type ScanString = String<SCAN_STRING_CAPACITY>;

/// Result of one poll tick.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanEvent {
    NoTag,
    TagDetected(ScanString),
}

impl From<Option<TagUid>> for ScanEvent {
    fn from(uid: Option<TagUid>) -> Self {
        match uid {
            Some(uid) => ScanEvent::TagDetected(uid::decode_uid(&uid)),
            None => ScanEvent::NoTag,
        }
    }
}

/// Source of tag detections, polled once per scan loop tick.
#[allow(async_fn_in_trait)]
pub trait TagReader {
    type Error;

    /// Look for a tag in the field. `Ok(None)` means no tag is present.
    async fn poll(&mut self) -> Result<Option<TagUid>, Self::Error>;
}
