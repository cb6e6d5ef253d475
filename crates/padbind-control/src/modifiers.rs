use padbind_bit_derive::Bit;
use padbind_bit_mask::Bitmask;

use crate::key::Key;

/// Modifier held for the duration of a combo.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Bit)]
pub enum Modifier {
    Ctrl,
    Meta,
    Shift,
    Alt,
}

pub type Modifiers = Bitmask<Modifier>;

impl Modifier {
    pub const fn key(self) -> Key {
        match self {
            Modifier::Ctrl => Key::Control,
            Modifier::Meta => Key::Meta,
            Modifier::Shift => Key::Shift,
            Modifier::Alt => Key::Alt,
        }
    }

    pub fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Control | Key::RControl => Some(Modifier::Ctrl),
            Key::Meta => Some(Modifier::Meta),
            Key::Shift | Key::RShift => Some(Modifier::Shift),
            Key::Alt | Key::RAlt => Some(Modifier::Alt),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_key_mapping() {
        assert_eq!(Modifier::from_key(Key::RControl), Some(Modifier::Ctrl));
        assert_eq!(Modifier::from_key(Key::Meta), Some(Modifier::Meta));
        assert_eq!(Modifier::from_key(Key::Char('a')), None);
        assert_eq!(Modifier::Alt.key(), Key::Alt);
    }

    #[test]
    fn modifiers_iterate_in_press_order() {
        let mods = Modifiers::new(&[Modifier::Alt, Modifier::Ctrl]);
        let keys: Vec<_> = mods.iter().map(Modifier::key).collect();
        assert_eq!(keys, vec![Key::Control, Key::Alt]);
    }
}
