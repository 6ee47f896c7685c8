//! Key translation: symbolic key names and characters to HID keyboard usages.
//!
//! Names are matched case-insensitively and include the aliases payload
//! libraries rely on (`GUI`/`WINDOWS`, `UP`/`UPARROW`, `CTRL`/`CONTROL`, ...).
//! Characters are translated against a US layout; each entry records whether
//! the character needs Shift held.

use std::fmt;

/// A USB HID keyboard usage ID (Keyboard/Keypad page).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode(pub u8);

impl KeyCode {
    pub const A: KeyCode = KeyCode(0x04);
    pub const C: KeyCode = KeyCode(0x06);
    pub const L: KeyCode = KeyCode(0x0F);
    pub const R: KeyCode = KeyCode(0x15);
    pub const Z: KeyCode = KeyCode(0x1D);
    pub const DIGIT_1: KeyCode = KeyCode(0x1E);
    pub const DIGIT_0: KeyCode = KeyCode(0x27);
    pub const ENTER: KeyCode = KeyCode(0x28);
    pub const ESCAPE: KeyCode = KeyCode(0x29);
    pub const BACKSPACE: KeyCode = KeyCode(0x2A);
    pub const TAB: KeyCode = KeyCode(0x2B);
    pub const SPACE: KeyCode = KeyCode(0x2C);
    pub const MINUS: KeyCode = KeyCode(0x2D);
    pub const EQUALS: KeyCode = KeyCode(0x2E);
    pub const LEFT_BRACKET: KeyCode = KeyCode(0x2F);
    pub const RIGHT_BRACKET: KeyCode = KeyCode(0x30);
    pub const BACKSLASH: KeyCode = KeyCode(0x31);
    pub const SEMICOLON: KeyCode = KeyCode(0x33);
    pub const QUOTE: KeyCode = KeyCode(0x34);
    pub const GRAVE_ACCENT: KeyCode = KeyCode(0x35);
    pub const COMMA: KeyCode = KeyCode(0x36);
    pub const PERIOD: KeyCode = KeyCode(0x37);
    pub const FORWARD_SLASH: KeyCode = KeyCode(0x38);
    pub const CAPS_LOCK: KeyCode = KeyCode(0x39);
    pub const F1: KeyCode = KeyCode(0x3A);
    pub const F12: KeyCode = KeyCode(0x45);
    pub const PRINT_SCREEN: KeyCode = KeyCode(0x46);
    pub const SCROLL_LOCK: KeyCode = KeyCode(0x47);
    pub const PAUSE: KeyCode = KeyCode(0x48);
    pub const INSERT: KeyCode = KeyCode(0x49);
    pub const HOME: KeyCode = KeyCode(0x4A);
    pub const PAGE_UP: KeyCode = KeyCode(0x4B);
    pub const DELETE: KeyCode = KeyCode(0x4C);
    pub const END: KeyCode = KeyCode(0x4D);
    pub const PAGE_DOWN: KeyCode = KeyCode(0x4E);
    pub const RIGHT_ARROW: KeyCode = KeyCode(0x4F);
    pub const LEFT_ARROW: KeyCode = KeyCode(0x50);
    pub const DOWN_ARROW: KeyCode = KeyCode(0x51);
    pub const UP_ARROW: KeyCode = KeyCode(0x52);
    pub const NUM_LOCK: KeyCode = KeyCode(0x53);
    pub const APPLICATION: KeyCode = KeyCode(0x65);
    pub const LEFT_CONTROL: KeyCode = KeyCode(0xE0);
    pub const LEFT_SHIFT: KeyCode = KeyCode(0xE1);
    pub const LEFT_ALT: KeyCode = KeyCode(0xE2);
    pub const LEFT_GUI: KeyCode = KeyCode(0xE3);
    pub const RIGHT_CONTROL: KeyCode = KeyCode(0xE4);
    pub const RIGHT_SHIFT: KeyCode = KeyCode(0xE5);
    pub const RIGHT_ALT: KeyCode = KeyCode(0xE6);
    pub const RIGHT_GUI: KeyCode = KeyCode(0xE7);

    /// Whether this usage is one of the eight modifier keys.
    pub fn is_modifier(self) -> bool {
        (0xE0..=0xE7).contains(&self.0)
    }

    /// Bit in the report modifier byte, for modifier usages.
    pub fn modifier_bit(self) -> Option<u8> {
        self.is_modifier().then(|| 1 << (self.0 - 0xE0))
    }

    /// The letter key for an ASCII letter of either case.
    pub fn letter(ch: char) -> Option<KeyCode> {
        ch.is_ascii_alphabetic()
            .then(|| KeyCode(Self::A.0 + (ch.to_ascii_uppercase() as u8 - b'A')))
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

static NAMED_KEYS: &[(&str, KeyCode)] = &[
    ("WINDOWS", KeyCode::LEFT_GUI),
    ("GUI", KeyCode::LEFT_GUI),
    ("COMMAND", KeyCode::LEFT_GUI),
    ("LEFT_GUI", KeyCode::LEFT_GUI),
    ("RIGHT_GUI", KeyCode::RIGHT_GUI),
    ("APP", KeyCode::APPLICATION),
    ("MENU", KeyCode::APPLICATION),
    ("APPLICATION", KeyCode::APPLICATION),
    ("SHIFT", KeyCode::LEFT_SHIFT),
    ("LEFT_SHIFT", KeyCode::LEFT_SHIFT),
    ("RIGHT_SHIFT", KeyCode::RIGHT_SHIFT),
    ("ALT", KeyCode::LEFT_ALT),
    ("OPTION", KeyCode::LEFT_ALT),
    ("LEFT_ALT", KeyCode::LEFT_ALT),
    ("RIGHT_ALT", KeyCode::RIGHT_ALT),
    ("CONTROL", KeyCode::LEFT_CONTROL),
    ("CTRL", KeyCode::LEFT_CONTROL),
    ("LEFT_CONTROL", KeyCode::LEFT_CONTROL),
    ("RIGHT_CONTROL", KeyCode::RIGHT_CONTROL),
    ("DOWNARROW", KeyCode::DOWN_ARROW),
    ("DOWN", KeyCode::DOWN_ARROW),
    ("DOWN_ARROW", KeyCode::DOWN_ARROW),
    ("LEFTARROW", KeyCode::LEFT_ARROW),
    ("LEFT", KeyCode::LEFT_ARROW),
    ("LEFT_ARROW", KeyCode::LEFT_ARROW),
    ("RIGHTARROW", KeyCode::RIGHT_ARROW),
    ("RIGHT", KeyCode::RIGHT_ARROW),
    ("RIGHT_ARROW", KeyCode::RIGHT_ARROW),
    ("UPARROW", KeyCode::UP_ARROW),
    ("UP", KeyCode::UP_ARROW),
    ("UP_ARROW", KeyCode::UP_ARROW),
    ("BREAK", KeyCode::PAUSE),
    ("PAUSE", KeyCode::PAUSE),
    ("CAPSLOCK", KeyCode::CAPS_LOCK),
    ("CAPS_LOCK", KeyCode::CAPS_LOCK),
    ("DELETE", KeyCode::DELETE),
    ("END", KeyCode::END),
    ("ESC", KeyCode::ESCAPE),
    ("ESCAPE", KeyCode::ESCAPE),
    ("HOME", KeyCode::HOME),
    ("INSERT", KeyCode::INSERT),
    ("NUMLOCK", KeyCode::NUM_LOCK),
    ("PAGEUP", KeyCode::PAGE_UP),
    ("PAGE_UP", KeyCode::PAGE_UP),
    ("PAGEDOWN", KeyCode::PAGE_DOWN),
    ("PAGE_DOWN", KeyCode::PAGE_DOWN),
    ("PRINTSCREEN", KeyCode::PRINT_SCREEN),
    ("PRINT_SCREEN", KeyCode::PRINT_SCREEN),
    ("ENTER", KeyCode::ENTER),
    ("RETURN", KeyCode::ENTER),
    ("SCROLLLOCK", KeyCode::SCROLL_LOCK),
    ("SCROLL_LOCK", KeyCode::SCROLL_LOCK),
    ("SPACE", KeyCode::SPACE),
    ("SPACEBAR", KeyCode::SPACE),
    ("TAB", KeyCode::TAB),
    ("BACKSPACE", KeyCode::BACKSPACE),
    ("MINUS", KeyCode::MINUS),
    ("EQUALS", KeyCode::EQUALS),
    ("LEFT_BRACKET", KeyCode::LEFT_BRACKET),
    ("RIGHT_BRACKET", KeyCode::RIGHT_BRACKET),
    ("BACKSLASH", KeyCode::BACKSLASH),
    ("SEMICOLON", KeyCode::SEMICOLON),
    ("QUOTE", KeyCode::QUOTE),
    ("GRAVE_ACCENT", KeyCode::GRAVE_ACCENT),
    ("COMMA", KeyCode::COMMA),
    ("PERIOD", KeyCode::PERIOD),
    ("FORWARD_SLASH", KeyCode::FORWARD_SLASH),
    ("ONE", KeyCode(0x1E)),
    ("TWO", KeyCode(0x1F)),
    ("THREE", KeyCode(0x20)),
    ("FOUR", KeyCode(0x21)),
    ("FIVE", KeyCode(0x22)),
    ("SIX", KeyCode(0x23)),
    ("SEVEN", KeyCode(0x24)),
    ("EIGHT", KeyCode(0x25)),
    ("NINE", KeyCode(0x26)),
    ("ZERO", KeyCode::DIGIT_0),
];

/// Look up a symbolic key name, case-insensitively.
///
/// Besides the named keys this accepts single letters (`a`, `L`), single
/// digits and the function keys `F1` through `F12`.
pub fn lookup(name: &str) -> Option<KeyCode> {
    let upper = name.trim().to_ascii_uppercase();
    if let Some((_, code)) = NAMED_KEYS.iter().find(|(key, _)| *key == upper) {
        return Some(*code);
    }

    let mut chars = upper.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        if ch.is_ascii_digit() {
            return char_to_key(ch).map(|(code, _)| code);
        }
        return KeyCode::letter(ch);
    }

    let n: u8 = upper.strip_prefix('F')?.parse().ok()?;
    (1..=12)
        .contains(&n)
        .then(|| KeyCode(KeyCode::F1.0 + n - 1))
}

// Each table entry stores the usage in the low byte and a Shift flag above it.

/// Shift must be held while the key is pressed.
const SHIFT: u16 = 0x100;

/// A character with no key on the layout.
const NONE: u16 = 0xffff;

/// Encode an unshifted key.
const fn n(key: KeyCode) -> u16 {
    key.0 as u16
}

/// Encode a key that needs Shift.
const fn s(key: KeyCode) -> u16 {
    SHIFT | (key.0 as u16)
}

/// Punctuation keys: (unshifted, shifted, key).
const PUNCTUATION: [(u8, u8, KeyCode); 11] = [
    (b'-', b'_', KeyCode::MINUS),
    (b'=', b'+', KeyCode::EQUALS),
    (b'[', b'{', KeyCode::LEFT_BRACKET),
    (b']', b'}', KeyCode::RIGHT_BRACKET),
    (b'\\', b'|', KeyCode::BACKSLASH),
    (b';', b':', KeyCode::SEMICOLON),
    (b'\'', b'"', KeyCode::QUOTE),
    (b'`', b'~', KeyCode::GRAVE_ACCENT),
    (b',', b'<', KeyCode::COMMA),
    (b'.', b'>', KeyCode::PERIOD),
    (b'/', b'?', KeyCode::FORWARD_SLASH),
];

/// Shifted symbols on the number row, in key order `1` .. `9`, `0`.
const NUMBER_ROW_SHIFTED: [u8; 10] = *b"!@#$%^&*()";

static US_LAYOUT: [u16; 128] = build_us_layout();

const fn build_us_layout() -> [u16; 128] {
    let mut table = [NONE; 128];
    table[b'\t' as usize] = n(KeyCode::TAB);
    table[b'\n' as usize] = n(KeyCode::ENTER);
    table[b' ' as usize] = n(KeyCode::SPACE);

    let mut i = 0;
    while i < 26 {
        let key = KeyCode(KeyCode::A.0 + i as u8);
        table[b'a' as usize + i] = n(key);
        table[b'A' as usize + i] = s(key);
        i += 1;
    }

    // The number row runs 1..9 then 0.
    let mut i = 0;
    while i < 10 {
        let key = KeyCode(KeyCode::DIGIT_1.0 + i as u8);
        let digit = if i == 9 { b'0' } else { b'1' + i as u8 };
        table[digit as usize] = n(key);
        table[NUMBER_ROW_SHIFTED[i] as usize] = s(key);
        i += 1;
    }

    let mut i = 0;
    while i < PUNCTUATION.len() {
        let (plain, shifted, key) = PUNCTUATION[i];
        table[plain as usize] = n(key);
        table[shifted as usize] = s(key);
        i += 1;
    }

    table
}

/// Translate a character to its key and whether Shift is needed.
///
/// Returns `None` for characters the layout cannot type.
pub fn char_to_key(ch: char) -> Option<(KeyCode, bool)> {
    if !ch.is_ascii() {
        return None;
    }
    match US_LAYOUT[ch as usize] {
        NONE => None,
        entry => Some((KeyCode((entry & 0xff) as u8), entry & SHIFT != 0)),
    }
}

/// Reverse of [`char_to_key`]: the character a key produces with or without Shift.
pub fn key_to_char(key: KeyCode, shifted: bool) -> Option<char> {
    let wanted = if shifted { s(key) } else { n(key) };
    US_LAYOUT
        .iter()
        .position(|entry| *entry == wanted)
        .map(|idx| idx as u8 as char)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(lookup("enter"), Some(KeyCode::ENTER));
        assert_eq!(lookup("Enter"), Some(KeyCode::ENTER));
        assert_eq!(lookup("ENTER"), Some(KeyCode::ENTER));
    }

    #[test]
    fn test_lookup_aliases() {
        assert_eq!(lookup("GUI"), lookup("WINDOWS"));
        assert_eq!(lookup("UP"), lookup("UPARROW"));
        assert_eq!(lookup("CTRL"), lookup("control"));
        assert_eq!(lookup("esc"), Some(KeyCode::ESCAPE));
        assert_eq!(lookup("MENU"), Some(KeyCode::APPLICATION));
    }

    #[test]
    fn test_lookup_letters_digits_function_keys() {
        assert_eq!(lookup("l"), Some(KeyCode::L));
        assert_eq!(lookup("R"), Some(KeyCode::R));
        assert_eq!(lookup("0"), Some(KeyCode::DIGIT_0));
        assert_eq!(lookup("1"), Some(KeyCode::DIGIT_1));
        assert_eq!(lookup("F1"), Some(KeyCode::F1));
        assert_eq!(lookup("f12"), Some(KeyCode::F12));
        assert_eq!(lookup("F13"), None);
        assert_eq!(lookup("F0"), None);
    }

    #[test]
    fn test_lookup_unknown() {
        assert_eq!(lookup("FOOBAR"), None);
        assert_eq!(lookup(""), None);
        assert_eq!(lookup("%"), None);
    }

    #[test]
    fn test_modifiers() {
        assert!(KeyCode::LEFT_CONTROL.is_modifier());
        assert!(!KeyCode::ENTER.is_modifier());
        assert_eq!(KeyCode::LEFT_CONTROL.modifier_bit(), Some(0x01));
        assert_eq!(KeyCode::LEFT_SHIFT.modifier_bit(), Some(0x02));
        assert_eq!(KeyCode::RIGHT_GUI.modifier_bit(), Some(0x80));
        assert_eq!(KeyCode::TAB.modifier_bit(), None);
    }

    #[test]
    fn test_char_to_key() {
        assert_eq!(char_to_key('a'), Some((KeyCode::A, false)));
        assert_eq!(char_to_key('A'), Some((KeyCode::A, true)));
        assert_eq!(char_to_key('1'), Some((KeyCode::DIGIT_1, false)));
        assert_eq!(char_to_key('!'), Some((KeyCode::DIGIT_1, true)));
        assert_eq!(char_to_key(')'), Some((KeyCode::DIGIT_0, true)));
        assert_eq!(char_to_key('"'), Some((KeyCode::QUOTE, true)));
        assert_eq!(char_to_key(' '), Some((KeyCode::SPACE, false)));
        assert_eq!(char_to_key('\n'), Some((KeyCode::ENTER, false)));
        assert_eq!(char_to_key('é'), None);
        assert_eq!(char_to_key('\x07'), None);
    }

    #[test]
    fn test_key_to_char() {
        assert_eq!(key_to_char(KeyCode::A, false), Some('a'));
        assert_eq!(key_to_char(KeyCode::A, true), Some('A'));
        assert_eq!(key_to_char(KeyCode::FORWARD_SLASH, true), Some('?'));
        assert_eq!(key_to_char(KeyCode::F1, false), None);
    }
}
