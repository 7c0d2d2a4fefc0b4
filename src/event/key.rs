//! Key codes - Translation between backend integer codes and [`Key`].
//!
//! Backends report keys as curses-compatible integers: printable
//! characters are their code point, control characters are 1..=31, and
//! special keys use the curses `KEY_*` values below.

use bitflags::bitflags;

// =============================================================================
// RAW CODES
// =============================================================================

pub mod codes {
    pub const TAB: i32 = 9;
    pub const LINE_FEED: i32 = 10;
    pub const CARRIAGE_RETURN: i32 = 13;
    pub const ESCAPE: i32 = 27;
    pub const DELETE_ASCII: i32 = 127;

    pub const KEY_DOWN: i32 = 0o402;
    pub const KEY_UP: i32 = 0o403;
    pub const KEY_LEFT: i32 = 0o404;
    pub const KEY_RIGHT: i32 = 0o405;
    pub const KEY_HOME: i32 = 0o406;
    pub const KEY_BACKSPACE: i32 = 0o407;
    /// F0; Fn is `KEY_F0 + n`.
    pub const KEY_F0: i32 = 0o410;
    pub const KEY_DELETE: i32 = 0o512;
    pub const KEY_INSERT: i32 = 0o513;
    pub const KEY_PAGE_DOWN: i32 = 0o522;
    pub const KEY_PAGE_UP: i32 = 0o523;
    pub const KEY_ENTER: i32 = 0o527;
    pub const KEY_BACK_TAB: i32 = 0o541;
    pub const KEY_END: i32 = 0o550;
}

// =============================================================================
// TYPES
// =============================================================================

bitflags! {
    /// Keyboard/mouse modifier state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL = 0b0010;
        const ALT = 0b0100;
    }
}

/// A decoded key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    BackTab,
    Backspace,
    Delete,
    Insert,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
    /// A code the toolkit has no name for.
    Unknown(i32),
}

impl Key {
    /// Decode a backend key code.
    pub fn decode(code: i32) -> (Key, Modifiers) {
        use codes::*;

        let key = match code {
            TAB => Key::Tab,
            LINE_FEED | CARRIAGE_RETURN | KEY_ENTER => Key::Enter,
            ESCAPE => Key::Escape,
            DELETE_ASCII | KEY_BACKSPACE => Key::Backspace,
            KEY_DOWN => Key::Down,
            KEY_UP => Key::Up,
            KEY_LEFT => Key::Left,
            KEY_RIGHT => Key::Right,
            KEY_HOME => Key::Home,
            KEY_END => Key::End,
            KEY_DELETE => Key::Delete,
            KEY_INSERT => Key::Insert,
            KEY_PAGE_DOWN => Key::PageDown,
            KEY_PAGE_UP => Key::PageUp,
            KEY_BACK_TAB => return (Key::BackTab, Modifiers::SHIFT),
            c if (KEY_F0..=KEY_F0 + 63).contains(&c) => Key::F((c - KEY_F0) as u8),
            // Ctrl-A .. Ctrl-Z (Tab, LF and CR already matched above)
            c @ 1..=26 => {
                let letter = char::from(b'a' + (c - 1) as u8);
                return (Key::Char(letter), Modifiers::CTRL);
            }
            c if c >= 32 => match char::from_u32(c as u32) {
                Some(ch) => Key::Char(ch),
                None => Key::Unknown(c),
            },
            c => Key::Unknown(c),
        };
        (key, Modifiers::empty())
    }

    /// Encode back to a backend key code (inverse of [`Key::decode`] for
    /// unmodified keys).
    pub fn code(&self) -> i32 {
        use codes::*;

        match *self {
            Key::Char(ch) => ch as i32,
            Key::Enter => LINE_FEED,
            Key::Tab => TAB,
            Key::BackTab => KEY_BACK_TAB,
            Key::Backspace => KEY_BACKSPACE,
            Key::Delete => KEY_DELETE,
            Key::Insert => KEY_INSERT,
            Key::Escape => ESCAPE,
            Key::Up => KEY_UP,
            Key::Down => KEY_DOWN,
            Key::Left => KEY_LEFT,
            Key::Right => KEY_RIGHT,
            Key::Home => KEY_HOME,
            Key::End => KEY_END,
            Key::PageUp => KEY_PAGE_UP,
            Key::PageDown => KEY_PAGE_DOWN,
            Key::F(n) => KEY_F0 + n as i32,
            Key::Unknown(c) => c,
        }
    }

    /// True if the key produces a character (and thus a key-typed event).
    pub fn is_printable(&self) -> bool {
        matches!(self, Key::Char(ch) if !ch.is_control())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_printable() {
        assert_eq!(Key::decode('x' as i32), (Key::Char('x'), Modifiers::empty()));
        assert!(Key::Char('x').is_printable());
    }

    #[test]
    fn test_decode_control_letters() {
        assert_eq!(Key::decode(1), (Key::Char('a'), Modifiers::CTRL));
        assert_eq!(Key::decode(24), (Key::Char('x'), Modifiers::CTRL));
        assert_eq!(Key::decode(codes::TAB).0, Key::Tab);
        assert_eq!(Key::decode(codes::CARRIAGE_RETURN).0, Key::Enter);
    }

    #[test]
    fn test_decode_special_keys() {
        assert_eq!(Key::decode(codes::KEY_UP).0, Key::Up);
        assert_eq!(Key::decode(codes::KEY_F0 + 5).0, Key::F(5));
        assert_eq!(Key::decode(codes::KEY_BACK_TAB), (Key::BackTab, Modifiers::SHIFT));
        assert_eq!(Key::decode(-7).0, Key::Unknown(-7));
    }

    #[test]
    fn test_code_inverts_decode() {
        for key in [Key::Up, Key::End, Key::F(12), Key::Tab, Key::Char('q'), Key::Escape] {
            assert_eq!(Key::decode(key.code()).0, key);
        }
    }
}
