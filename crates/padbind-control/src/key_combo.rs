use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use smallvec::SmallVec;

use crate::key::{parse_key, Key};
use crate::modifiers::{Modifier, Modifiers};

/// Modifiers plus up to a few regular keys, written as `ctrl+shift+t`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub modifiers: Modifiers,
    pub keys: SmallVec<[Key; 4]>,
}

impl KeyCombo {
    pub fn from_key(key: Key) -> Self {
        let mut combo = Self {
            modifiers: Modifiers::empty(),
            keys: SmallVec::new(),
        };
        combo.push(key);
        combo
    }

    fn push(&mut self, key: Key) {
        match Modifier::from_key(key) {
            Some(modifier) => {
                self.modifiers.insert(modifier);
            }
            None => self.keys.push(key),
        }
    }

    /// Keys in press order: modifiers first, then regular keys.
    pub fn press_order(&self) -> impl Iterator<Item = Key> + '_ {
        self.modifiers
            .iter()
            .map(Modifier::key)
            .chain(self.keys.iter().copied())
    }

    /// Keys in release order, the reverse of [`KeyCombo::press_order`].
    pub fn release_order(&self) -> impl Iterator<Item = Key> + '_ {
        let modifiers: SmallVec<[Key; 4]> =
            self.modifiers.iter().map(Modifier::key).collect();
        self.keys
            .iter()
            .rev()
            .copied()
            .chain(modifiers.into_iter().rev())
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty() && self.keys.is_empty()
    }
}

impl FromStr for KeyCombo {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut combo = KeyCombo {
            modifiers: Modifiers::empty(),
            keys: SmallVec::new(),
        };
        for part in s.split('+') {
            let part = part.trim();
            let key = parse_key(part).ok_or_else(|| format!("Invalid key: {part}"))?;
            combo.push(key);
        }
        Ok(combo)
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for key in self.press_order() {
            if !first {
                f.write_str("+")?;
            }
            first = false;
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

impl<'de> Deserialize<'de> for KeyCombo {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct KeyComboVisitor;

        impl Visitor<'_> for KeyComboVisitor {
            type Value = KeyCombo;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("key combination string")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(KeyComboVisitor)
    }
}
