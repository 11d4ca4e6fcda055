//! serde bridge
//!
//! [`WireSerializer`] is a `serde::Serializer` whose leaves go through the
//! scalar boxers and whose composites go through container assembly, so any
//! `Serialize` type becomes a `WireValue` tree.
//!
//! ## Shapes
//!
//! | serde | wire |
//! |-------|------|
//! | `None`, `()`, unit struct | `Null` |
//! | `char`, `str` | `TextString` |
//! | bytes | `ByteString` |
//! | seq, tuple, tuple struct | `Array` |
//! | map | `Map`, keys normalized like [`assemble_map`](crate::container::assemble_map) |
//! | struct | `Map` with text keys renamed by the key naming strategy |
//! | unit variant | `TextString(variant)` |
//! | other variants | single-entry `Map` of variant name to payload |
//!
//! A tuple struct named [`TAGGED_MARKER`] with fields `(tag, value)` turns
//! back into `WireValue::Tagged`. [`Tagged`] and `WireValue` itself
//! serialize that way, so an already boxed tree passes through unchanged.
//!
//! Newtype structs named by one of the [`semantic`](crate::semantic) markers
//! are rebuilt into their chrono, uuid or url value and boxed by the matching
//! scalar boxer, so timestamps follow the active `DateStrategy` and UUIDs,
//! URLs and dates keep their tags.
//!
//! The bridge reports `is_human_readable() == false`, except while
//! serializing a map key.

use crate::container::{assemble_array, MapKey};
use crate::context::EncodeContext;
use crate::scalar::*;
use crate::semantic::Marker;
use serde::ser::{self, Impossible, Serialize, SerializeTupleStruct};
use tagbox_core::tags::TAGGED_MARKER;
use tagbox_core::{BoxError, WireValue};

/// Box any `Serialize` value
///
/// Errors raised by the value's own `Serialize` impl carry the path of the
/// value that raised them.
pub fn to_wire_value<T>(value: &T, ctx: &EncodeContext<'_>) -> Result<WireValue, BoxError>
where
    T: Serialize + ?Sized,
{
    value
        .serialize(WireSerializer::new(ctx.clone()))
        .map_err(|e| e.at_path(ctx.path()))
}

/// Explicit tag around a serializable value
///
/// Through the bridge this becomes `WireValue::Tagged(tag, value)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tagged<T> {
    /// Tag number
    pub tag: u64,
    /// Tagged content
    pub value: T,
}

impl<T> Tagged<T> {
    /// Wrap `value` in `tag`
    pub fn new(tag: u64, value: T) -> Self {
        Self { tag, value }
    }
}

impl<T: Serialize> Serialize for Tagged<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        let mut state = serializer.serialize_tuple_struct(TAGGED_MARKER, 2)?;
        state.serialize_field(&self.tag)?;
        state.serialize_field(&self.value)?;
        state.end()
    }
}

/// Serializer producing a [`WireValue`]
pub struct WireSerializer<'a> {
    ctx: EncodeContext<'a>,
}

impl<'a> WireSerializer<'a> {
    /// Serializer rooted at `ctx`
    pub fn new(ctx: EncodeContext<'a>) -> Self {
        Self { ctx }
    }
}

fn child<T>(value: &T, ctx: EncodeContext<'_>) -> Result<WireValue, BoxError>
where
    T: Serialize + ?Sized,
{
    let path = ctx.path().clone();
    value
        .serialize(WireSerializer::new(ctx))
        .map_err(|e| e.at_path(&path))
}

impl<'a> ser::Serializer for WireSerializer<'a> {
    type Ok = WireValue;
    type Error = BoxError;

    type SerializeSeq = SeqSerializer<'a>;
    type SerializeTuple = SeqSerializer<'a>;
    type SerializeTupleStruct = TupleStructSerializer<'a>;
    type SerializeTupleVariant = VariantSerializer<SeqSerializer<'a>>;
    type SerializeMap = MapSerializer<'a>;
    type SerializeStruct = StructSerializer<'a>;
    type SerializeStructVariant = VariantSerializer<StructSerializer<'a>>;

    fn is_human_readable(&self) -> bool {
        false
    }

    fn serialize_bool(self, v: bool) -> Result<WireValue, BoxError> {
        Ok(box_bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<WireValue, BoxError> {
        Ok(box_i8(v))
    }

    fn serialize_i16(self, v: i16) -> Result<WireValue, BoxError> {
        Ok(box_i16(v))
    }

    fn serialize_i32(self, v: i32) -> Result<WireValue, BoxError> {
        Ok(box_i32(v))
    }

    fn serialize_i64(self, v: i64) -> Result<WireValue, BoxError> {
        Ok(box_i64(v))
    }

    fn serialize_i128(self, v: i128) -> Result<WireValue, BoxError> {
        if let Ok(small) = i64::try_from(v) {
            Ok(box_i64(small))
        } else if let Ok(big) = u64::try_from(v) {
            Ok(box_u64(big))
        } else {
            Err(BoxError::unsupported("i128 out of range", self.ctx.path()))
        }
    }

    fn serialize_u8(self, v: u8) -> Result<WireValue, BoxError> {
        Ok(box_u8(v))
    }

    fn serialize_u16(self, v: u16) -> Result<WireValue, BoxError> {
        Ok(box_u16(v))
    }

    fn serialize_u32(self, v: u32) -> Result<WireValue, BoxError> {
        Ok(box_u32(v))
    }

    fn serialize_u64(self, v: u64) -> Result<WireValue, BoxError> {
        Ok(box_u64(v))
    }

    fn serialize_u128(self, v: u128) -> Result<WireValue, BoxError> {
        u64::try_from(v)
            .map(box_u64)
            .map_err(|_| BoxError::unsupported("u128 out of range", self.ctx.path()))
    }

    fn serialize_f32(self, v: f32) -> Result<WireValue, BoxError> {
        Ok(box_f32(v))
    }

    fn serialize_f64(self, v: f64) -> Result<WireValue, BoxError> {
        Ok(box_f64(v))
    }

    fn serialize_char(self, v: char) -> Result<WireValue, BoxError> {
        let mut buf = [0u8; 4];
        Ok(box_text(v.encode_utf8(&mut buf)))
    }

    fn serialize_str(self, v: &str) -> Result<WireValue, BoxError> {
        Ok(box_text(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<WireValue, BoxError> {
        Ok(box_bytes(v))
    }

    fn serialize_none(self) -> Result<WireValue, BoxError> {
        Ok(WireValue::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<WireValue, BoxError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<WireValue, BoxError> {
        Ok(WireValue::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<WireValue, BoxError> {
        Ok(WireValue::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<WireValue, BoxError> {
        Ok(box_text(variant))
    }

    fn serialize_newtype_struct<T>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<WireValue, BoxError>
    where
        T: Serialize + ?Sized,
    {
        match Marker::from_name(name) {
            Some(marker) => {
                let payload = value.serialize(WireSerializer::new(self.ctx.clone()))?;
                marker.rebox(&payload, &self.ctx)
            }
            None => value.serialize(self),
        }
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<WireValue, BoxError>
    where
        T: Serialize + ?Sized,
    {
        let inner = child(value, self.ctx.field(variant))?;
        Ok(WireValue::Map(vec![(box_text(variant), inner)]))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqSerializer<'a>, BoxError> {
        Ok(SeqSerializer::new(self.ctx, len))
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqSerializer<'a>, BoxError> {
        Ok(SeqSerializer::new(self.ctx, Some(len)))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<TupleStructSerializer<'a>, BoxError> {
        if name == TAGGED_MARKER {
            Ok(TupleStructSerializer::Tagged {
                ctx: self.ctx,
                tag: None,
                value: None,
            })
        } else {
            Ok(TupleStructSerializer::Plain(SeqSerializer::new(
                self.ctx,
                Some(len),
            )))
        }
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantSerializer<SeqSerializer<'a>>, BoxError> {
        Ok(VariantSerializer {
            variant,
            inner: SeqSerializer::new(self.ctx.field(variant), Some(len)),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapSerializer<'a>, BoxError> {
        Ok(MapSerializer {
            ctx: self.ctx,
            entries: Vec::with_capacity(len.unwrap_or(0)),
            pending: None,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<StructSerializer<'a>, BoxError> {
        Ok(StructSerializer {
            ctx: self.ctx,
            entries: Vec::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantSerializer<StructSerializer<'a>>, BoxError> {
        Ok(VariantSerializer {
            variant,
            inner: StructSerializer {
                ctx: self.ctx.field(variant),
                entries: Vec::with_capacity(len),
            },
        })
    }
}

/// Sequences and tuples
pub struct SeqSerializer<'a> {
    ctx: EncodeContext<'a>,
    items: Vec<WireValue>,
}

impl<'a> SeqSerializer<'a> {
    fn new(ctx: EncodeContext<'a>, len: Option<usize>) -> Self {
        Self {
            ctx,
            items: Vec::with_capacity(len.unwrap_or(0)),
        }
    }

    fn push<T>(&mut self, value: &T) -> Result<(), BoxError>
    where
        T: Serialize + ?Sized,
    {
        let boxed = child(value, self.ctx.index(self.items.len()))?;
        self.items.push(boxed);
        Ok(())
    }

    fn finish(self) -> WireValue {
        assemble_array(self.items)
    }
}

impl ser::SerializeSeq for SeqSerializer<'_> {
    type Ok = WireValue;
    type Error = BoxError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), BoxError>
    where
        T: Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> Result<WireValue, BoxError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SeqSerializer<'_> {
    type Ok = WireValue;
    type Error = BoxError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), BoxError>
    where
        T: Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> Result<WireValue, BoxError> {
        Ok(self.finish())
    }
}

/// Tuple structs, including the tag passthrough marker
pub enum TupleStructSerializer<'a> {
    /// Ordinary tuple struct, boxed as an array
    Plain(SeqSerializer<'a>),
    /// `(tag, value)` pair of a [`TAGGED_MARKER`] struct
    Tagged {
        /// Context of the tagged value
        ctx: EncodeContext<'a>,
        /// Tag number, once seen
        tag: Option<u64>,
        /// Content, once seen
        value: Option<WireValue>,
    },
}

impl ser::SerializeTupleStruct for TupleStructSerializer<'_> {
    type Ok = WireValue;
    type Error = BoxError;

    fn serialize_field<T>(&mut self, field: &T) -> Result<(), BoxError>
    where
        T: Serialize + ?Sized,
    {
        match self {
            TupleStructSerializer::Plain(seq) => seq.push(field),
            TupleStructSerializer::Tagged { ctx, tag, value } => {
                if tag.is_none() {
                    match child(field, ctx.clone())? {
                        WireValue::UnsignedInt(n) => {
                            *tag = Some(n);
                            Ok(())
                        }
                        other => Err(BoxError::mismatch(
                            "tag number",
                            other.type_name(),
                            ctx.path(),
                        )),
                    }
                } else if value.is_none() {
                    *value = Some(child(field, ctx.clone())?);
                    Ok(())
                } else {
                    Err(BoxError::Message {
                        message: format!("{} takes exactly two fields", TAGGED_MARKER),
                        path: ctx.path().clone(),
                    })
                }
            }
        }
    }

    fn end(self) -> Result<WireValue, BoxError> {
        match self {
            TupleStructSerializer::Plain(seq) => Ok(seq.finish()),
            TupleStructSerializer::Tagged {
                tag: Some(tag),
                value: Some(value),
                ..
            } => Ok(WireValue::tagged(tag, value)),
            TupleStructSerializer::Tagged { ctx, .. } => Err(BoxError::Message {
                message: format!("{} takes exactly two fields", TAGGED_MARKER),
                path: ctx.path().clone(),
            }),
        }
    }
}

/// Maps with arbitrary keys
pub struct MapSerializer<'a> {
    ctx: EncodeContext<'a>,
    entries: Vec<(WireValue, WireValue)>,
    pending: Option<MapKey>,
}

impl MapSerializer<'_> {
    fn entry_value<T>(&mut self, key: MapKey, value: &T) -> Result<(), BoxError>
    where
        T: Serialize + ?Sized,
    {
        let boxed = child(value, self.ctx.field(key.canonical_text()))?;
        self.entries.push((key.normalize(), boxed));
        Ok(())
    }
}

impl ser::SerializeMap for MapSerializer<'_> {
    type Ok = WireValue;
    type Error = BoxError;

    fn serialize_key<T>(&mut self, key: &T) -> Result<(), BoxError>
    where
        T: Serialize + ?Sized,
    {
        self.pending = Some(key.serialize(MapKeySerializer { ctx: &self.ctx })?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<(), BoxError>
    where
        T: Serialize + ?Sized,
    {
        let key = self.pending.take().ok_or_else(|| BoxError::Message {
            message: "map value without a key".to_string(),
            path: self.ctx.path().clone(),
        })?;
        self.entry_value(key, value)
    }

    fn serialize_entry<K, V>(&mut self, key: &K, value: &V) -> Result<(), BoxError>
    where
        K: Serialize + ?Sized,
        V: Serialize + ?Sized,
    {
        let key = key.serialize(MapKeySerializer { ctx: &self.ctx })?;
        self.entry_value(key, value)
    }

    fn end(self) -> Result<WireValue, BoxError> {
        Ok(WireValue::Map(self.entries))
    }
}

/// Structs; field names go through the key naming strategy
pub struct StructSerializer<'a> {
    ctx: EncodeContext<'a>,
    entries: Vec<(WireValue, WireValue)>,
}

impl StructSerializer<'_> {
    fn push<T>(&mut self, key: &'static str, value: &T) -> Result<(), BoxError>
    where
        T: Serialize + ?Sized,
    {
        let name = self.ctx.options().key_naming().apply(key);
        let boxed = child(value, self.ctx.field(name.as_str()))?;
        self.entries.push((WireValue::TextString(name), boxed));
        Ok(())
    }
}

impl ser::SerializeStruct for StructSerializer<'_> {
    type Ok = WireValue;
    type Error = BoxError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), BoxError>
    where
        T: Serialize + ?Sized,
    {
        self.push(key, value)
    }

    fn end(self) -> Result<WireValue, BoxError> {
        Ok(WireValue::Map(self.entries))
    }
}

/// Externally tagged variant payload
pub struct VariantSerializer<S> {
    variant: &'static str,
    inner: S,
}

impl ser::SerializeTupleVariant for VariantSerializer<SeqSerializer<'_>> {
    type Ok = WireValue;
    type Error = BoxError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), BoxError>
    where
        T: Serialize + ?Sized,
    {
        self.inner.push(value)
    }

    fn end(self) -> Result<WireValue, BoxError> {
        Ok(WireValue::Map(vec![(
            box_text(self.variant),
            self.inner.finish(),
        )]))
    }
}

impl ser::SerializeStructVariant for VariantSerializer<StructSerializer<'_>> {
    type Ok = WireValue;
    type Error = BoxError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), BoxError>
    where
        T: Serialize + ?Sized,
    {
        self.inner.push(key, value)
    }

    fn end(self) -> Result<WireValue, BoxError> {
        Ok(WireValue::Map(vec![(
            box_text(self.variant),
            WireValue::Map(self.inner.entries),
        )]))
    }
}

/// Map keys: scalars only
struct MapKeySerializer<'c, 'a> {
    ctx: &'c EncodeContext<'a>,
}

impl MapKeySerializer<'_, '_> {
    fn composite(&self) -> BoxError {
        BoxError::unsupported("map key", self.ctx.path())
    }
}

impl ser::Serializer for MapKeySerializer<'_, '_> {
    type Ok = MapKey;
    type Error = BoxError;

    type SerializeSeq = Impossible<MapKey, BoxError>;
    type SerializeTuple = Impossible<MapKey, BoxError>;
    type SerializeTupleStruct = Impossible<MapKey, BoxError>;
    type SerializeTupleVariant = Impossible<MapKey, BoxError>;
    type SerializeMap = Impossible<MapKey, BoxError>;
    type SerializeStruct = Impossible<MapKey, BoxError>;
    type SerializeStructVariant = Impossible<MapKey, BoxError>;

    // Keys end up as text or integers, so types with a compact binary form
    // (UUIDs, timestamps) must pick their text form here
    fn is_human_readable(&self) -> bool {
        true
    }

    fn serialize_bool(self, v: bool) -> Result<MapKey, BoxError> {
        Ok(MapKey::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<MapKey, BoxError> {
        Ok(MapKey::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<MapKey, BoxError> {
        Ok(MapKey::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<MapKey, BoxError> {
        Ok(MapKey::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<MapKey, BoxError> {
        Ok(MapKey::from(v))
    }

    fn serialize_i128(self, v: i128) -> Result<MapKey, BoxError> {
        if let Ok(small) = i64::try_from(v) {
            Ok(MapKey::Signed(small))
        } else if let Ok(big) = u64::try_from(v) {
            Ok(MapKey::Unsigned(big))
        } else {
            Err(BoxError::unsupported("i128 out of range", self.ctx.path()))
        }
    }

    fn serialize_u8(self, v: u8) -> Result<MapKey, BoxError> {
        Ok(MapKey::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<MapKey, BoxError> {
        Ok(MapKey::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<MapKey, BoxError> {
        Ok(MapKey::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<MapKey, BoxError> {
        Ok(MapKey::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<MapKey, BoxError> {
        u64::try_from(v)
            .map(MapKey::Unsigned)
            .map_err(|_| BoxError::unsupported("u128 out of range", self.ctx.path()))
    }

    fn serialize_f32(self, v: f32) -> Result<MapKey, BoxError> {
        Ok(MapKey::Text(v.to_string()))
    }

    fn serialize_f64(self, v: f64) -> Result<MapKey, BoxError> {
        Ok(MapKey::Text(v.to_string()))
    }

    fn serialize_char(self, v: char) -> Result<MapKey, BoxError> {
        Ok(MapKey::Char(v))
    }

    fn serialize_str(self, v: &str) -> Result<MapKey, BoxError> {
        Ok(MapKey::from(v))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<MapKey, BoxError> {
        Err(self.composite())
    }

    fn serialize_none(self) -> Result<MapKey, BoxError> {
        Err(self.composite())
    }

    fn serialize_some<T>(self, value: &T) -> Result<MapKey, BoxError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<MapKey, BoxError> {
        Err(self.composite())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<MapKey, BoxError> {
        Err(self.composite())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<MapKey, BoxError> {
        Ok(MapKey::from(variant))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<MapKey, BoxError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<MapKey, BoxError>
    where
        T: Serialize + ?Sized,
    {
        Err(self.composite())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, BoxError> {
        Err(self.composite())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, BoxError> {
        Err(self.composite())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, BoxError> {
        Err(self.composite())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, BoxError> {
        Err(self.composite())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, BoxError> {
        Err(self.composite())
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, BoxError> {
        Err(self.composite())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, BoxError> {
        Err(self.composite())
    }
}
