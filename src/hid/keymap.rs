//! US keyboard layout: character code -> (modifier, HID usage).
//!
//! Codes 0x00..=0x7F follow ASCII. Codes 0x80..=0x97 address the
//! non-printing keys listed in [`FunctionKey`]. Anything beyond the
//! table has no mapping and is skipped by the typer.

use super::keyboard::MOD_LEFT_SHIFT;

/// Number of entries in [`KEYMAP`].
pub const KEYMAP_SIZE: usize = 152;

/// Modifier bitmask plus key usage needed to produce one character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyMapping {
    pub modifier: u8,
    pub usage: u8,
}

impl KeyMapping {
    /// In range but produces no key (e.g. CR).
    pub const NONE: Self = Self {
        modifier: 0,
        usage: 0,
    };

    const fn key(usage: u8) -> Self {
        Self { modifier: 0, usage }
    }

    const fn shifted(usage: u8) -> Self {
        Self {
            modifier: MOD_LEFT_SHIFT,
            usage,
        }
    }

    /// Look up a character. `None` when its code is outside the table.
    pub fn for_char(c: char) -> Option<Self> {
        usize::try_from(u32::from(c))
            .ok()
            .and_then(|code| KEYMAP.get(code))
            .copied()
    }
}

/// Keys reachable through codes above ASCII.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FunctionKey {
    F1 = 0x80,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    PrintScreen,
    ScrollLock,
    CapsLock,
    NumLock,
    Insert,
    Home,
    PageUp,
    PageDown,
    RightArrow,
    LeftArrow,
    DownArrow,
    UpArrow,
}

impl FunctionKey {
    /// Character that types this key when passed to the typer.
    pub fn as_char(self) -> char {
        char::from(self as u8)
    }
}

/// Layout table, indexed by character code.
pub const KEYMAP: [KeyMapping; KEYMAP_SIZE] = build_keymap();

const fn build_keymap() -> [KeyMapping; KEYMAP_SIZE] {
    let mut map = [KeyMapping::NONE; KEYMAP_SIZE];

    // Control characters. CR stays unmapped so "\r\n" yields one Enter.
    map[0x08] = KeyMapping::key(0x2A); // BS  -> Backspace
    map[0x09] = KeyMapping::key(0x2B); // TAB -> Tab
    map[0x0A] = KeyMapping::key(0x28); // LF  -> Enter
    map[0x1B] = KeyMapping::key(0x29); // ESC -> Escape

    // Letters.
    let mut i = 0;
    while i < 26 {
        map[b'a' as usize + i] = KeyMapping::key(0x04 + i as u8);
        map[b'A' as usize + i] = KeyMapping::shifted(0x04 + i as u8);
        i += 1;
    }

    // Digits: '1'..'9' -> 0x1E..0x26, '0' -> 0x27.
    let mut d = 0;
    while d < 9 {
        map[b'1' as usize + d] = KeyMapping::key(0x1E + d as u8);
        d += 1;
    }
    map[b'0' as usize] = KeyMapping::key(0x27);

    // Shifted digit row.
    map[b'!' as usize] = KeyMapping::shifted(0x1E);
    map[b'@' as usize] = KeyMapping::shifted(0x1F);
    map[b'#' as usize] = KeyMapping::shifted(0x20);
    map[b'$' as usize] = KeyMapping::shifted(0x21);
    map[b'%' as usize] = KeyMapping::shifted(0x22);
    map[b'^' as usize] = KeyMapping::shifted(0x23);
    map[b'&' as usize] = KeyMapping::shifted(0x24);
    map[b'*' as usize] = KeyMapping::shifted(0x25);
    map[b'(' as usize] = KeyMapping::shifted(0x26);
    map[b')' as usize] = KeyMapping::shifted(0x27);

    // Punctuation.
    map[b' ' as usize] = KeyMapping::key(0x2C);
    map[b'-' as usize] = KeyMapping::key(0x2D);
    map[b'_' as usize] = KeyMapping::shifted(0x2D);
    map[b'=' as usize] = KeyMapping::key(0x2E);
    map[b'+' as usize] = KeyMapping::shifted(0x2E);
    map[b'[' as usize] = KeyMapping::key(0x2F);
    map[b'{' as usize] = KeyMapping::shifted(0x2F);
    map[b']' as usize] = KeyMapping::key(0x30);
    map[b'}' as usize] = KeyMapping::shifted(0x30);
    map[b'\\' as usize] = KeyMapping::key(0x31);
    map[b'|' as usize] = KeyMapping::shifted(0x31);
    map[b';' as usize] = KeyMapping::key(0x33);
    map[b':' as usize] = KeyMapping::shifted(0x33);
    map[b'\'' as usize] = KeyMapping::key(0x34);
    map[b'"' as usize] = KeyMapping::shifted(0x34);
    map[b'`' as usize] = KeyMapping::key(0x35);
    map[b'~' as usize] = KeyMapping::shifted(0x35);
    map[b',' as usize] = KeyMapping::key(0x36);
    map[b'<' as usize] = KeyMapping::shifted(0x36);
    map[b'.' as usize] = KeyMapping::key(0x37);
    map[b'>' as usize] = KeyMapping::shifted(0x37);
    map[b'/' as usize] = KeyMapping::key(0x38);
    map[b'?' as usize] = KeyMapping::shifted(0x38);

    map[0x7F] = KeyMapping::key(0x4C); // DEL -> Delete Forward

    // Function keys F1..F12 -> 0x3A..0x45.
    let mut f = 0;
    while f < 12 {
        map[FunctionKey::F1 as usize + f] = KeyMapping::key(0x3A + f as u8);
        f += 1;
    }
    map[FunctionKey::PrintScreen as usize] = KeyMapping::key(0x46);
    map[FunctionKey::ScrollLock as usize] = KeyMapping::key(0x47);
    map[FunctionKey::CapsLock as usize] = KeyMapping::key(0x39);
    map[FunctionKey::NumLock as usize] = KeyMapping::key(0x53);
    map[FunctionKey::Insert as usize] = KeyMapping::key(0x49);
    map[FunctionKey::Home as usize] = KeyMapping::key(0x4A);
    map[FunctionKey::PageUp as usize] = KeyMapping::key(0x4B);
    map[FunctionKey::PageDown as usize] = KeyMapping::key(0x4E);
    map[FunctionKey::RightArrow as usize] = KeyMapping::key(0x4F);
    map[FunctionKey::LeftArrow as usize] = KeyMapping::key(0x50);
    map[FunctionKey::DownArrow as usize] = KeyMapping::key(0x51);
    map[FunctionKey::UpArrow as usize] = KeyMapping::key(0x52);

    map
}
