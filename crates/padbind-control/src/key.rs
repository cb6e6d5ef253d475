use std::fmt;

/// A keyboard key that can be emulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Control,
    RControl,
    Shift,
    RShift,
    Alt,
    RAlt,
    Meta,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    Delete,
    Backspace,
    Escape,
    Tab,
    Space,
    Return,
    CapsLock,
    VolumeUp,
    VolumeDown,
    VolumeMute,
    /// Function key `F1..=F20`.
    F(u8),
}

impl Key {
    /// Returns `true` for keys that are folded into [`crate::Modifiers`]
    /// when they appear in a combo.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Key::Control
                | Key::RControl
                | Key::Shift
                | Key::RShift
                | Key::Alt
                | Key::RAlt
                | Key::Meta
        )
    }

    #[cfg(feature = "enigo")]
    pub fn to_enigo(self) -> enigo::Key {
        use enigo::Key as EnigoKey;

        match self {
            Key::Char(ch) => EnigoKey::Unicode(ch),
            // Right-hand modifiers are not portable across enigo backends.
            Key::Control | Key::RControl => EnigoKey::Control,
            Key::Shift | Key::RShift => EnigoKey::Shift,
            Key::Alt | Key::RAlt => EnigoKey::Alt,
            Key::Meta => EnigoKey::Meta,
            Key::Home => EnigoKey::Home,
            Key::End => EnigoKey::End,
            Key::PageUp => EnigoKey::PageUp,
            Key::PageDown => EnigoKey::PageDown,
            Key::Up => EnigoKey::UpArrow,
            Key::Down => EnigoKey::DownArrow,
            Key::Left => EnigoKey::LeftArrow,
            Key::Right => EnigoKey::RightArrow,
            Key::Delete => EnigoKey::Delete,
            Key::Backspace => EnigoKey::Backspace,
            Key::Escape => EnigoKey::Escape,
            Key::Tab => EnigoKey::Tab,
            Key::Space => EnigoKey::Space,
            Key::Return => EnigoKey::Return,
            Key::CapsLock => EnigoKey::CapsLock,
            Key::VolumeUp => EnigoKey::VolumeUp,
            Key::VolumeDown => EnigoKey::VolumeDown,
            Key::VolumeMute => EnigoKey::VolumeMute,
            Key::F(n) => function_key(n),
        }
    }
}

#[cfg(feature = "enigo")]
fn function_key(n: u8) -> enigo::Key {
    use enigo::Key as EnigoKey;

    match n {
        1 => EnigoKey::F1,
        2 => EnigoKey::F2,
        3 => EnigoKey::F3,
        4 => EnigoKey::F4,
        5 => EnigoKey::F5,
        6 => EnigoKey::F6,
        7 => EnigoKey::F7,
        8 => EnigoKey::F8,
        9 => EnigoKey::F9,
        10 => EnigoKey::F10,
        11 => EnigoKey::F11,
        12 => EnigoKey::F12,
        13 => EnigoKey::F13,
        14 => EnigoKey::F14,
        15 => EnigoKey::F15,
        16 => EnigoKey::F16,
        17 => EnigoKey::F17,
        18 => EnigoKey::F18,
        19 => EnigoKey::F19,
        _ => EnigoKey::F20,
    }
}

#[cfg(feature = "enigo")]
impl From<Key> for enigo::Key {
    fn from(key: Key) -> Self {
        key.to_enigo()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Key::Char(' ') => "space",
            Key::Char(ch) => return write!(f, "{ch}"),
            Key::F(n) => return write!(f, "f{n}"),
            Key::Control => "ctrl",
            Key::RControl => "rctrl",
            Key::Shift => "shift",
            Key::RShift => "rshift",
            Key::Alt => "alt",
            Key::RAlt => "ralt",
            Key::Meta => "meta",
            Key::Home => "home",
            Key::End => "end",
            Key::PageUp => "pageup",
            Key::PageDown => "pagedown",
            Key::Up => "up",
            Key::Down => "down",
            Key::Left => "left",
            Key::Right => "right",
            Key::Delete => "delete",
            Key::Backspace => "backspace",
            Key::Escape => "esc",
            Key::Tab => "tab",
            Key::Space => "space",
            Key::Return => "enter",
            Key::CapsLock => "capslock",
            Key::VolumeUp => "volumeup",
            Key::VolumeDown => "volumedown",
            Key::VolumeMute => "mute",
        };
        f.write_str(name)
    }
}

/// Parse a key name.
///
/// Names are case-insensitive and may carry the uinput `KEY_` prefix, so
/// `a`, `KEY_A`, `leftctrl` and `KEY_LEFTCTRL` are all accepted.
pub(crate) fn parse_key(input: &str) -> Option<Key> {
    let lower = input.trim().to_ascii_lowercase();
    let name = lower.strip_prefix("key_").unwrap_or(&lower);
    if name.is_empty() {
        return None;
    }

    let mut chars = name.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        if ch.is_ascii_graphic() {
            return Some(Key::Char(ch));
        }
    }

    if let Some(n) = name.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
        return (1..=20).contains(&n).then_some(Key::F(n));
    }

    let key = match name {
        // Modifiers
        "ctrl" | "control" | "leftctrl" => Key::Control,
        "rctrl" | "rightctrl" => Key::RControl,
        "shift" | "leftshift" => Key::Shift,
        "rshift" | "rightshift" => Key::RShift,
        "alt" | "option" | "leftalt" => Key::Alt,
        "ralt" | "rightalt" => Key::RAlt,
        "meta" | "super" | "cmd" | "command" | "leftmeta" => Key::Meta,

        // Navigation
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" | "page_up" => Key::PageUp,
        "pagedown" | "page_down" => Key::PageDown,
        "up" | "arrow_up" => Key::Up,
        "down" | "arrow_down" => Key::Down,
        "left" | "arrow_left" => Key::Left,
        "right" | "arrow_right" => Key::Right,

        // Editing
        "delete" => Key::Delete,
        "backspace" => Key::Backspace,
        "esc" | "escape" => Key::Escape,
        "tab" => Key::Tab,
        "space" | "spacebar" => Key::Space,
        "enter" | "return" => Key::Return,
        "capslock" => Key::CapsLock,

        // Punctuation by uinput name
        "minus" => Key::Char('-'),
        "equal" => Key::Char('='),
        "comma" => Key::Char(','),
        "dot" | "period" => Key::Char('.'),
        "slash" => Key::Char('/'),
        "backslash" => Key::Char('\\'),
        "semicolon" => Key::Char(';'),
        "apostrophe" | "quote" => Key::Char('\''),
        "grave" | "backtick" => Key::Char('`'),
        "leftbrace" => Key::Char('['),
        "rightbrace" => Key::Char(']'),

        // Media
        "volumeup" | "volume_up" => Key::VolumeUp,
        "volumedown" | "volume_down" => Key::VolumeDown,
        "mute" | "volume_mute" => Key::VolumeMute,
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_uinput_names() {
        assert_eq!(parse_key("a"), Some(Key::Char('a')));
        assert_eq!(parse_key("KEY_A"), Some(Key::Char('a')));
        assert_eq!(parse_key("KEY_LEFTCTRL"), Some(Key::Control));
        assert_eq!(parse_key("KEY_ENTER"), Some(Key::Return));
        assert_eq!(parse_key("KEY_1"), Some(Key::Char('1')));
        assert_eq!(parse_key("KEY_DOT"), Some(Key::Char('.')));
    }

    #[test]
    fn parses_function_keys_in_range() {
        assert_eq!(parse_key("f1"), Some(Key::F(1)));
        assert_eq!(parse_key("KEY_F20"), Some(Key::F(20)));
        assert_eq!(parse_key("f21"), None);
        assert_eq!(parse_key("f0"), None);
        // A bare `f` is a letter.
        assert_eq!(parse_key("f"), Some(Key::Char('f')));
    }

    #[test]
    fn rejects_unknown_names() {
        assert_eq!(parse_key(""), None);
        assert_eq!(parse_key("KEY_"), None);
        assert_eq!(parse_key("hyper"), None);
    }

    #[test]
    fn display_round_trips_through_parse() {
        for key in [Key::Char('x'), Key::F(7), Key::PageDown, Key::Return, Key::RAlt] {
            assert_eq!(parse_key(&key.to_string()), Some(key));
        }
    }

    #[test]
    fn modifier_keys() {
        assert!(Key::Control.is_modifier());
        assert!(Key::RShift.is_modifier());
        assert!(!Key::Char('a').is_modifier());
    }
}
