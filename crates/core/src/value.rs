//! Value model for tagbox
//!
//! This module defines `WireValue`, the in-memory representation of one
//! CBOR data item. Every boxing function produces a `WireValue`, and the
//! byte-level serializer consumes a finished `WireValue` tree.
//!
//! ## Contract
//!
//! - No implicit type coercions: `UnsignedInt(1) != SignedInt(1)`
//! - IEEE-754 float equality semantics, per width
//! - `ByteString` and `TextString` are distinct types
//! - Map equality ignores entry order; duplicate keys are carried verbatim

use crate::tags::TAGGED_MARKER;
use serde::ser::{SerializeMap, SerializeTupleStruct};
use serde::{Serialize, Serializer};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// One CBOR data item.
///
/// ## The Eleven Kinds
///
/// 1. `Null` - CBOR null
/// 2. `Bool` - CBOR true / false
/// 3. `UnsignedInt` - major type 0
/// 4. `SignedInt` - major types 0/1, from a signed source type
/// 5. `Float32` - single-precision float
/// 6. `Float64` - double-precision float
/// 7. `ByteString` - major type 2
/// 8. `TextString` - major type 3, UTF-8
/// 9. `Array` - major type 4, ordered
/// 10. `Map` - major type 5, entry order irrelevant
/// 11. `Tagged` - major type 6, a tag number plus the tagged item
///
/// ## Map Keys
///
/// Keys are full `WireValue`s. Uniqueness is NOT enforced here: if the
/// caller hands in two entries with equal keys, both are kept. Rejecting
/// duplicates is a policy of the byte serializer or the decoder.
#[derive(Debug, Clone)]
pub enum WireValue {
    /// CBOR null
    Null,

    /// Boolean true or false
    Bool(bool),

    /// Unsigned integer, from any unsigned source width
    UnsignedInt(u64),

    /// Signed integer, from any signed source width
    SignedInt(i64),

    /// Single-precision float
    Float32(f32),

    /// Double-precision float
    Float64(f64),

    /// Arbitrary binary data
    /// NOT equivalent to TextString - distinct type
    ByteString(Vec<u8>),

    /// UTF-8 text
    TextString(String),

    /// Ordered sequence of values
    Array(Vec<WireValue>),

    /// Key/value entries; equality ignores entry order
    Map(Vec<(WireValue, WireValue)>),

    /// Tag number applied to an inner value
    Tagged(u64, Box<WireValue>),
}

impl WireValue {
    /// Wrap `inner` in a tag
    pub fn tagged(tag: u64, inner: WireValue) -> Self {
        WireValue::Tagged(tag, Box::new(inner))
    }

    /// Returns the kind name as a string (for error messages)
    pub fn type_name(&self) -> &'static str {
        match self {
            WireValue::Null => "Null",
            WireValue::Bool(_) => "Bool",
            WireValue::UnsignedInt(_) => "UnsignedInt",
            WireValue::SignedInt(_) => "SignedInt",
            WireValue::Float32(_) => "Float32",
            WireValue::Float64(_) => "Float64",
            WireValue::ByteString(_) => "ByteString",
            WireValue::TextString(_) => "TextString",
            WireValue::Array(_) => "Array",
            WireValue::Map(_) => "Map",
            WireValue::Tagged(..) => "Tagged",
        }
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, WireValue::Null)
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            WireValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as u64
    pub fn as_unsigned(&self) -> Option<u64> {
        match self {
            WireValue::UnsignedInt(u) => Some(*u),
            _ => None,
        }
    }

    /// Try to get as i64
    pub fn as_signed(&self) -> Option<i64> {
        match self {
            WireValue::SignedInt(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as f64, widening a `Float32`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            WireValue::Float32(f) => Some(f64::from(*f)),
            WireValue::Float64(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            WireValue::TextString(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as bytes slice
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            WireValue::ByteString(b) => Some(b),
            _ => None,
        }
    }

    /// Try to get as array slice
    pub fn as_array(&self) -> Option<&[WireValue]> {
        match self {
            WireValue::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Try to get the map entries
    pub fn as_map(&self) -> Option<&[(WireValue, WireValue)]> {
        match self {
            WireValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Try to get the outermost tag and the value it wraps
    pub fn as_tagged(&self) -> Option<(u64, &WireValue)> {
        match self {
            WireValue::Tagged(tag, inner) => Some((*tag, inner)),
            _ => None,
        }
    }

    /// Outermost tag number, if any
    pub fn tag(&self) -> Option<u64> {
        self.as_tagged().map(|(tag, _)| tag)
    }

    /// Peel every tag layer and return the innermost value
    pub fn untagged(&self) -> &WireValue {
        let mut current = self;
        while let WireValue::Tagged(_, inner) = current {
            current = inner;
        }
        current
    }

    /// Look up the first entry whose key equals `key`
    ///
    /// With duplicate keys present, later entries are unreachable through
    /// this accessor; iterate `as_map()` to see all of them.
    pub fn map_get(&self, key: &WireValue) -> Option<&WireValue> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

// ============================================================================
// Conversions from plain Rust values
// ============================================================================

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for WireValue {
            fn from(v: $t) -> Self {
                WireValue::UnsignedInt(u64::from(v))
            }
        })*
    };
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for WireValue {
            fn from(v: $t) -> Self {
                WireValue::SignedInt(i64::from(v))
            }
        })*
    };
}

impl_from_unsigned!(u8, u16, u32, u64);
impl_from_signed!(i8, i16, i32, i64);

impl From<bool> for WireValue {
    fn from(b: bool) -> Self {
        WireValue::Bool(b)
    }
}

impl From<f32> for WireValue {
    fn from(f: f32) -> Self {
        WireValue::Float32(f)
    }
}

impl From<f64> for WireValue {
    fn from(f: f64) -> Self {
        WireValue::Float64(f)
    }
}

impl From<String> for WireValue {
    fn from(s: String) -> Self {
        WireValue::TextString(s)
    }
}

impl From<&str> for WireValue {
    fn from(s: &str) -> Self {
        WireValue::TextString(s.to_string())
    }
}

impl From<Vec<u8>> for WireValue {
    fn from(b: Vec<u8>) -> Self {
        WireValue::ByteString(b)
    }
}

impl From<Vec<WireValue>> for WireValue {
    fn from(a: Vec<WireValue>) -> Self {
        WireValue::Array(a)
    }
}

// ============================================================================
// Custom PartialEq Implementation (IEEE-754 semantics, no type coercion)
// ============================================================================

impl PartialEq for WireValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (WireValue::Null, WireValue::Null) => true,
            (WireValue::Bool(a), WireValue::Bool(b)) => a == b,
            (WireValue::UnsignedInt(a), WireValue::UnsignedInt(b)) => a == b,
            (WireValue::SignedInt(a), WireValue::SignedInt(b)) => a == b,
            // IEEE-754 equality: NaN != NaN, but -0.0 == 0.0
            (WireValue::Float32(a), WireValue::Float32(b)) => a == b,
            (WireValue::Float64(a), WireValue::Float64(b)) => a == b,
            (WireValue::ByteString(a), WireValue::ByteString(b)) => a == b,
            (WireValue::TextString(a), WireValue::TextString(b)) => a == b,
            (WireValue::Array(a), WireValue::Array(b)) => a == b,
            (WireValue::Map(a), WireValue::Map(b)) => map_entries_eq(a, b),
            (WireValue::Tagged(ta, a), WireValue::Tagged(tb, b)) => ta == tb && a == b,

            // Different kinds: NEVER equal (NO TYPE COERCION)
            _ => false,
        }
    }
}

// Same caveat as IEEE floats everywhere: NaN breaks reflexivity.
impl Eq for WireValue {}

/// Multiset comparison of map entries
fn map_entries_eq(a: &[(WireValue, WireValue)], b: &[(WireValue, WireValue)]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut used = vec![false; b.len()];
    for entry in a {
        let found = b
            .iter()
            .enumerate()
            .find(|(i, other)| !used[*i] && *other == entry)
            .map(|(i, _)| i);
        match found {
            Some(i) => used[i] = true,
            None => return false,
        }
    }
    true
}

impl Hash for WireValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Discriminant first for kind distinction
        std::mem::discriminant(self).hash(state);

        match self {
            WireValue::Null => {}
            WireValue::Bool(b) => b.hash(state),
            WireValue::UnsignedInt(u) => u.hash(state),
            WireValue::SignedInt(i) => i.hash(state),
            WireValue::Float32(f) => {
                // -0.0 == 0.0, so both hash as 0
                if *f == 0.0 {
                    0u32.hash(state);
                } else {
                    f.to_bits().hash(state);
                }
            }
            WireValue::Float64(f) => {
                if *f == 0.0 {
                    0u64.hash(state);
                } else {
                    f.to_bits().hash(state);
                }
            }
            WireValue::ByteString(b) => b.hash(state),
            WireValue::TextString(s) => s.hash(state),
            WireValue::Array(a) => {
                a.len().hash(state);
                for v in a {
                    v.hash(state);
                }
            }
            WireValue::Map(entries) => {
                // Order-independent: sum of per-entry hashes
                let combined = entries.iter().fold(0u64, |acc, (k, v)| {
                    let mut h = DefaultHasher::new();
                    k.hash(&mut h);
                    v.hash(&mut h);
                    acc.wrapping_add(h.finish())
                });
                entries.len().hash(state);
                combined.hash(state);
            }
            WireValue::Tagged(tag, inner) => {
                tag.hash(state);
                inner.hash(state);
            }
        }
    }
}

// ============================================================================
// Serialize (natural CBOR shape)
// ============================================================================

/// Serializes as the data item itself, so a serde-based CBOR writer emits
/// the tree as-is. Tags use the reserved `TAGGED_MARKER` tuple struct.
impl Serialize for WireValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            WireValue::Null => serializer.serialize_unit(),
            WireValue::Bool(b) => serializer.serialize_bool(*b),
            WireValue::UnsignedInt(u) => serializer.serialize_u64(*u),
            WireValue::SignedInt(i) => serializer.serialize_i64(*i),
            WireValue::Float32(f) => serializer.serialize_f32(*f),
            WireValue::Float64(f) => serializer.serialize_f64(*f),
            WireValue::ByteString(b) => serializer.serialize_bytes(b),
            WireValue::TextString(s) => serializer.serialize_str(s),
            WireValue::Array(a) => serializer.collect_seq(a),
            WireValue::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            WireValue::Tagged(tag, inner) => {
                let mut ts = serializer.serialize_tuple_struct(TAGGED_MARKER, 2)?;
                ts.serialize_field(tag)?;
                ts.serialize_field(inner.as_ref())?;
                ts.end()
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
