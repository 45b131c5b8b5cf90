use core::fmt::Write;

use super::ScanString;

/// Render a UID as the concatenated decimal value of each byte.
///
/// No padding and no separators: `[4, 24, 9, 2]` becomes `"42492"`.
pub fn decode_uid(uid: &[u8]) -> ScanString {
    let mut s = ScanString::new();
    for byte in uid {
        // At most MAX_UID_LEN * 3 digits, within capacity.
        let _ = write!(&mut s, "{}", byte);
    }
    s
}
