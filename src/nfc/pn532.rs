//! PN532 host-interface framing.
//!
//! Normal information frame:
//!
//! ```text
//! 00 00 FF LEN LCS TFI CMD DATA... DCS 00
//! ```
//!
//! - `LEN` counts `TFI`, `CMD` and `DATA`; `LEN + LCS == 0 (mod 256)`
//! - `TFI` is `D4` host → PN532 and `D5` PN532 → host
//! - a response carries `CMD + 1`
//! - `TFI + CMD + DATA + DCS == 0 (mod 256)`
//!
//! The PN532 acknowledges every command with `00 00 FF 00 FF 00` before
//! the response is available. Over I²C each read starts with a status
//! byte that is `0x01` once data is ready; the helpers here operate on
//! frames with that byte already stripped.

use super::{TagUid, MAX_UID_LEN};

/// PN532 command codes.
pub mod commands {
    pub const GET_FIRMWARE_VERSION: u8 = 0x02;
    pub const SAM_CONFIGURATION: u8 = 0x14;
    pub const RF_CONFIGURATION: u8 = 0x32;
    pub const IN_LIST_PASSIVE_TARGET: u8 = 0x4A;
}

/// Frame identifiers.
pub const TFI_HOST_TO_PN532: u8 = 0xD4;
pub const TFI_PN532_TO_HOST: u8 = 0xD5;

/// Acknowledge frame. Sent by the host it aborts the running command.
pub const ACK_FRAME: [u8; 6] = [0x00, 0x00, 0xFF, 0x00, 0xFF, 0x00];

/// I²C status byte value once a frame can be read.
pub const STATUS_READY: u8 = 0x01;

/// IC code reported by GetFirmwareVersion for a PN532.
pub const PN532_IC: u8 = 0x32;

/// Largest frame this driver sends or accepts.
pub const MAX_FRAME_LEN: usize = 64;

/// Preamble + start code + LEN + LCS + TFI + CMD + DCS + postamble.
const FRAME_OVERHEAD: usize = 9;

/// SAMConfiguration: normal mode, 1 s virtual card timeout, use IRQ pin.
pub const SAM_NORMAL_MODE: [u8; 3] = [0x01, 0x14, 0x01];

/// RFConfiguration item: MaxRetries.
pub const RF_CONFIG_MAX_RETRIES: u8 = 0x05;

/// InListPassiveTarget: one target, 106 kbps type A (ISO14443A).
pub const LIST_ONE_ISO14443A: [u8; 2] = [0x01, 0x00];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Output buffer cannot hold the frame.
    BufferTooSmall,
    /// No `00 FF` start code found.
    NoStartCode,
    /// `LEN + LCS` does not sum to zero.
    LengthChecksum,
    /// Frame ends before `LEN` bytes plus `DCS`.
    Truncated,
    /// `TFI + CMD + DATA + DCS` does not sum to zero.
    DataChecksum,
    /// The PN532 sent its application error frame.
    ErrorFrame,
    /// Wrong TFI or response code.
    UnexpectedResponse,
    /// Reported UID longer than [`MAX_UID_LEN`].
    UidTooLong,
}

fn checksum(bytes: &[u8]) -> u8 {
    bytes
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b))
        .wrapping_neg()
}

/// Encode a host → PN532 command frame into `buf`.
///
/// Returns the number of bytes written.
pub fn encode_command(command: u8, params: &[u8], buf: &mut [u8]) -> Result<usize, FrameError> {
    let total = params.len() + FRAME_OVERHEAD;
    if total > buf.len() || total > MAX_FRAME_LEN {
        return Err(FrameError::BufferTooSmall);
    }

    let len = (params.len() + 2) as u8;
    buf[0] = 0x00;
    buf[1] = 0x00;
    buf[2] = 0xFF;
    buf[3] = len;
    buf[4] = len.wrapping_neg();
    buf[5] = TFI_HOST_TO_PN532;
    buf[6] = command;
    buf[7..7 + params.len()].copy_from_slice(params);
    buf[7 + params.len()] = checksum(&buf[5..7 + params.len()]);
    buf[8 + params.len()] = 0x00;

    Ok(total)
}

/// `true` if `frame` starts with the ACK frame.
pub fn is_ack(frame: &[u8]) -> bool {
    frame.starts_with(&ACK_FRAME)
}

/// Validate a PN532 → host response to `command` and return its data.
///
/// Leading preamble bytes are skipped.
pub fn decode_response(command: u8, frame: &[u8]) -> Result<&[u8], FrameError> {
    let start = frame
        .windows(2)
        .position(|w| w == [0x00, 0xFF])
        .ok_or(FrameError::NoStartCode)?;
    let header = &frame[start + 2..];
    if header.len() < 2 {
        return Err(FrameError::Truncated);
    }

    let len = header[0];
    let lcs = header[1];
    if len.wrapping_add(lcs) != 0 {
        return Err(FrameError::LengthChecksum);
    }

    let len = usize::from(len);
    let body = header.get(2..2 + len).ok_or(FrameError::Truncated)?;
    let dcs = *header.get(2 + len).ok_or(FrameError::Truncated)?;
    if checksum(body) != dcs {
        return Err(FrameError::DataChecksum);
    }

    match body {
        // Application level error frame.
        [0x7F] => Err(FrameError::ErrorFrame),
        [TFI_PN532_TO_HOST, code, data @ ..] if *code == command.wrapping_add(1) => Ok(data),
        _ => Err(FrameError::UnexpectedResponse),
    }
}

/// GetFirmwareVersion response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FirmwareVersion {
    pub ic: u8,
    pub version: u8,
    pub revision: u8,
    pub support: u8,
}

impl FirmwareVersion {
    pub fn parse(data: &[u8]) -> Option<Self> {
        match data {
            [ic, version, revision, support, ..] => Some(Self {
                ic: *ic,
                version: *version,
                revision: *revision,
                support: *support,
            }),
            _ => None,
        }
    }
}

/// Parse an InListPassiveTarget response for an ISO14443A target.
///
/// ```text
/// NbTg Tg SENS_RES(2) SEL_RES NFCIDLength NFCID...
/// ```
///
/// Returns `None` when no target was found.
pub fn parse_passive_target(data: &[u8]) -> Result<Option<TagUid>, FrameError> {
    match data.first() {
        None => Err(FrameError::Truncated),
        Some(0) => Ok(None),
        Some(_) => {
            let uid_len = usize::from(*data.get(5).ok_or(FrameError::Truncated)?);
            if uid_len > MAX_UID_LEN {
                return Err(FrameError::UidTooLong);
            }
            let uid = data.get(6..6 + uid_len).ok_or(FrameError::Truncated)?;
            TagUid::from_slice(uid)
                .map(Some)
                .map_err(|_| FrameError::UidTooLong)
        }
    }
}
