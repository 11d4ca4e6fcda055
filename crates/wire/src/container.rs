//! Container assembly
//!
//! Builds `Array` and `Map` values out of already-boxed children.
//!
//! ## Key Normalization
//!
//! | Key | Map key |
//! |-----|---------|
//! | non-negative integer (any width) | `UnsignedInt` |
//! | negative integer | `TextString` of its decimal form |
//! | text, bool, char, UUID | `TextString` of its canonical text |
//!
//! Integer `5` and text `"5"` stay different keys.
//!
//! ## Duplicate Keys
//!
//! No deduplication happens here. If two entries normalize to the same key,
//! both are carried into the map in input order. Key uniqueness is the
//! caller's responsibility.

use std::fmt;
use tagbox_core::WireValue;
use uuid::Uuid;

/// A dynamic map key before normalization
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    /// Unsigned integer of any width
    Unsigned(u64),
    /// Signed integer of any width
    Signed(i64),
    /// Text
    Text(String),
    /// Boolean
    Bool(bool),
    /// Single character
    Char(char),
    /// UUID
    Uuid(Uuid),
}

impl MapKey {
    /// Integer value if the key is a non-negative integer
    pub fn as_index(&self) -> Option<u64> {
        match self {
            MapKey::Unsigned(u) => Some(*u),
            MapKey::Signed(i) => u64::try_from(*i).ok(),
            _ => None,
        }
    }

    /// Canonical text form of the key
    pub fn canonical_text(&self) -> String {
        match self {
            MapKey::Unsigned(u) => u.to_string(),
            MapKey::Signed(i) => i.to_string(),
            MapKey::Text(s) => s.clone(),
            MapKey::Bool(b) => b.to_string(),
            MapKey::Char(c) => c.to_string(),
            MapKey::Uuid(u) => u.hyphenated().to_string(),
        }
    }

    /// The map key as it goes on the wire
    pub fn normalize(self) -> WireValue {
        match self.as_index() {
            Some(index) => WireValue::UnsignedInt(index),
            None => match self {
                MapKey::Text(s) => WireValue::TextString(s),
                other => WireValue::TextString(other.canonical_text()),
            },
        }
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_text())
    }
}

macro_rules! impl_key_from {
    ($($t:ty => $variant:ident as $wide:ty),* $(,)?) => {
        $(impl From<$t> for MapKey {
            fn from(v: $t) -> Self {
                MapKey::$variant(v as $wide)
            }
        })*
    };
}

impl_key_from!(
    u8 => Unsigned as u64,
    u16 => Unsigned as u64,
    u32 => Unsigned as u64,
    u64 => Unsigned as u64,
    usize => Unsigned as u64,
    i8 => Signed as i64,
    i16 => Signed as i64,
    i32 => Signed as i64,
    i64 => Signed as i64,
    isize => Signed as i64,
);

impl From<String> for MapKey {
    fn from(v: String) -> Self {
        MapKey::Text(v)
    }
}

impl From<&str> for MapKey {
    fn from(v: &str) -> Self {
        MapKey::Text(v.to_string())
    }
}

impl From<bool> for MapKey {
    fn from(v: bool) -> Self {
        MapKey::Bool(v)
    }
}

impl From<char> for MapKey {
    fn from(v: char) -> Self {
        MapKey::Char(v)
    }
}

impl From<Uuid> for MapKey {
    fn from(v: Uuid) -> Self {
        MapKey::Uuid(v)
    }
}

/// Assemble an array; order is preserved
pub fn assemble_array<I>(values: I) -> WireValue
where
    I: IntoIterator<Item = WireValue>,
{
    WireValue::Array(values.into_iter().collect())
}

/// Assemble a map, normalizing every key
///
/// Entries keep their input order. Duplicate normalized keys are all kept.
pub fn assemble_map<K, I>(entries: I) -> WireValue
where
    K: Into<MapKey>,
    I: IntoIterator<Item = (K, WireValue)>,
{
    WireValue::Map(
        entries
            .into_iter()
            .map(|(k, v)| (k.into().normalize(), v))
            .collect(),
    )
}
