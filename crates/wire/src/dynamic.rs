//! Dynamic dispatch boxing
//!
//! Values whose static type is erased are represented by [`DynValue`], a
//! closed union built by the caller at the boundary. [`box_dynamic`] picks
//! the boxing rule with an explicit ordered match and wraps the result in
//! the caller's tag.
//!
//! ## Dispatch Order
//!
//! 1. boolean
//! 2. signed widths, then unsigned widths
//! 3. `f32`, `f64`
//! 4. decimal
//! 5. text
//! 6. byte buffer
//! 7. URL
//! 8. UUID
//! 9. timestamp, calendar date
//! 10. extension boxers, for opaque values
//! 11. nested structured values, through the serde bridge
//!
//! Boolean comes before every integer width. [`DynValue::erase`] probes a
//! type-erased value against the concrete types in exactly this order.
//!
//! ## Tag Layering
//!
//! The caller's tag always wraps the boxed result, even when the scalar
//! boxer already produced a tag. A timestamp boxed under tag 99 with the
//! ISO-8601 strategy is `99(0("..."))`.

use crate::context::EncodeContext;
use crate::scalar::*;
use crate::ser::to_wire_value;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::any::Any;
use std::fmt;
use tagbox_core::{BoxError, WireValue};
use tracing::trace;
use url::Url;
use uuid::Uuid;

/// A structured value the serde bridge can decompose
///
/// Implemented for every `Serialize` type.
pub trait NestedValue {
    /// Box through the serde bridge
    fn encode_nested(&self, ctx: &EncodeContext<'_>) -> Result<WireValue, BoxError>;

    /// Rust type name, for diagnostics
    fn nested_type_name(&self) -> &'static str;
}

impl<T: Serialize> NestedValue for T {
    fn encode_nested(&self, ctx: &EncodeContext<'_>) -> Result<WireValue, BoxError> {
        to_wire_value(self, ctx)
    }

    fn nested_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// A value no built-in kind claims
///
/// Only extension boxers can box it.
pub struct OpaqueValue {
    type_name: &'static str,
    value: Box<dyn Any + Send + Sync>,
}

impl OpaqueValue {
    /// Wrap a value, recording its type name
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            value: Box::new(value),
        }
    }

    /// Rust type name captured at construction
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The erased value
    pub fn value(&self) -> &(dyn Any + Send + Sync) {
        self.value.as_ref()
    }
}

impl fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OpaqueValue").field(&self.type_name).finish()
    }
}

/// Type-erased value handed to [`box_dynamic`]
pub enum DynValue {
    /// `bool`
    Bool(bool),
    /// `i8`
    I8(i8),
    /// `i16`
    I16(i16),
    /// `i32`
    I32(i32),
    /// `i64`
    I64(i64),
    /// `isize`
    Isize(isize),
    /// `u8`
    U8(u8),
    /// `u16`
    U16(u16),
    /// `u32`
    U32(u32),
    /// `u64`
    U64(u64),
    /// `usize`
    Usize(usize),
    /// `f32`
    F32(f32),
    /// `f64`
    F64(f64),
    /// Arbitrary-precision decimal
    Decimal(Decimal),
    /// Text
    Text(String),
    /// Byte buffer
    Bytes(Vec<u8>),
    /// URL
    Url(Url),
    /// UUID
    Uuid(Uuid),
    /// Timestamp
    Timestamp(DateTime<Utc>),
    /// Calendar date
    Date(NaiveDate),
    /// Value for the extension registry
    Opaque(OpaqueValue),
    /// Structured value for the serde bridge
    Nested(Box<dyn NestedValue>),
}

/// Kind of a [`DynValue`], in dispatch order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DynKind {
    /// `bool`
    Bool,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `isize`
    Isize,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `usize`
    Usize,
    /// `f32`
    F32,
    /// `f64`
    F64,
    /// Decimal
    Decimal,
    /// Text
    Text,
    /// Byte buffer
    Bytes,
    /// URL
    Url,
    /// UUID
    Uuid,
    /// Timestamp
    Timestamp,
    /// Calendar date
    Date,
    /// Extension registry
    Extension,
    /// serde bridge
    Nested,
}

/// Priority order of [`box_dynamic`] and [`DynValue::erase`]
pub const DISPATCH_ORDER: [DynKind; 22] = [
    DynKind::Bool,
    DynKind::I8,
    DynKind::I16,
    DynKind::I32,
    DynKind::I64,
    DynKind::Isize,
    DynKind::U8,
    DynKind::U16,
    DynKind::U32,
    DynKind::U64,
    DynKind::Usize,
    DynKind::F32,
    DynKind::F64,
    DynKind::Decimal,
    DynKind::Text,
    DynKind::Bytes,
    DynKind::Url,
    DynKind::Uuid,
    DynKind::Timestamp,
    DynKind::Date,
    DynKind::Extension,
    DynKind::Nested,
];

impl DynKind {
    /// Human-readable name for display
    pub fn name(&self) -> &'static str {
        match self {
            DynKind::Bool => "bool",
            DynKind::I8 => "i8",
            DynKind::I16 => "i16",
            DynKind::I32 => "i32",
            DynKind::I64 => "i64",
            DynKind::Isize => "isize",
            DynKind::U8 => "u8",
            DynKind::U16 => "u16",
            DynKind::U32 => "u32",
            DynKind::U64 => "u64",
            DynKind::Usize => "usize",
            DynKind::F32 => "f32",
            DynKind::F64 => "f64",
            DynKind::Decimal => "decimal",
            DynKind::Text => "text",
            DynKind::Bytes => "bytes",
            DynKind::Url => "url",
            DynKind::Uuid => "uuid",
            DynKind::Timestamp => "timestamp",
            DynKind::Date => "date",
            DynKind::Extension => "extension",
            DynKind::Nested => "nested",
        }
    }

    /// Position in [`DISPATCH_ORDER`]
    pub fn priority(&self) -> usize {
        DISPATCH_ORDER
            .iter()
            .position(|k| k == self)
            .unwrap_or(DISPATCH_ORDER.len())
    }
}

/// Try each concrete type in order; first successful downcast wins
macro_rules! probe {
    ($value:ident, $($t:ty => $variant:ident),* $(,)?) => {
        $(
            let $value = match $value.downcast::<$t>() {
                Ok(v) => return DynValue::$variant(*v),
                Err(other) => other,
            };
        )*
    };
}

impl DynValue {
    /// Structured value for the serde bridge
    pub fn nested<T: Serialize + 'static>(value: T) -> Self {
        DynValue::Nested(Box::new(value))
    }

    /// Value only extension boxers can handle
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        DynValue::Opaque(OpaqueValue::new(value))
    }

    /// Resolve a value's kind by runtime type identity
    ///
    /// Concrete types are probed in [`DISPATCH_ORDER`]. A type that matches
    /// none of them becomes [`DynValue::Opaque`].
    pub fn erase<T: Any + Send + Sync>(value: T) -> Self {
        let type_name = std::any::type_name::<T>();
        let erased: Box<dyn Any + Send + Sync> = Box::new(value);
        probe!(erased,
            bool => Bool,
            i8 => I8,
            i16 => I16,
            i32 => I32,
            i64 => I64,
            isize => Isize,
            u8 => U8,
            u16 => U16,
            u32 => U32,
            u64 => U64,
            usize => Usize,
            f32 => F32,
            f64 => F64,
            Decimal => Decimal,
            String => Text,
            Vec<u8> => Bytes,
            Url => Url,
            Uuid => Uuid,
            DateTime<Utc> => Timestamp,
            NaiveDate => Date,
        );
        if let Some(s) = erased.downcast_ref::<&'static str>() {
            return DynValue::Text((*s).to_string());
        }
        DynValue::Opaque(OpaqueValue {
            type_name,
            value: erased,
        })
    }

    /// Kind of this value
    pub fn kind(&self) -> DynKind {
        match self {
            DynValue::Bool(_) => DynKind::Bool,
            DynValue::I8(_) => DynKind::I8,
            DynValue::I16(_) => DynKind::I16,
            DynValue::I32(_) => DynKind::I32,
            DynValue::I64(_) => DynKind::I64,
            DynValue::Isize(_) => DynKind::Isize,
            DynValue::U8(_) => DynKind::U8,
            DynValue::U16(_) => DynKind::U16,
            DynValue::U32(_) => DynKind::U32,
            DynValue::U64(_) => DynKind::U64,
            DynValue::Usize(_) => DynKind::Usize,
            DynValue::F32(_) => DynKind::F32,
            DynValue::F64(_) => DynKind::F64,
            DynValue::Decimal(_) => DynKind::Decimal,
            DynValue::Text(_) => DynKind::Text,
            DynValue::Bytes(_) => DynKind::Bytes,
            DynValue::Url(_) => DynKind::Url,
            DynValue::Uuid(_) => DynKind::Uuid,
            DynValue::Timestamp(_) => DynKind::Timestamp,
            DynValue::Date(_) => DynKind::Date,
            DynValue::Opaque(_) => DynKind::Extension,
            DynValue::Nested(_) => DynKind::Nested,
        }
    }

    /// Type name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            DynValue::Opaque(opaque) => opaque.type_name(),
            DynValue::Nested(nested) => nested.nested_type_name(),
            other => other.kind().name(),
        }
    }
}

impl fmt::Debug for DynValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DynValue::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            DynValue::I8(v) => f.debug_tuple("I8").field(v).finish(),
            DynValue::I16(v) => f.debug_tuple("I16").field(v).finish(),
            DynValue::I32(v) => f.debug_tuple("I32").field(v).finish(),
            DynValue::I64(v) => f.debug_tuple("I64").field(v).finish(),
            DynValue::Isize(v) => f.debug_tuple("Isize").field(v).finish(),
            DynValue::U8(v) => f.debug_tuple("U8").field(v).finish(),
            DynValue::U16(v) => f.debug_tuple("U16").field(v).finish(),
            DynValue::U32(v) => f.debug_tuple("U32").field(v).finish(),
            DynValue::U64(v) => f.debug_tuple("U64").field(v).finish(),
            DynValue::Usize(v) => f.debug_tuple("Usize").field(v).finish(),
            DynValue::F32(v) => f.debug_tuple("F32").field(v).finish(),
            DynValue::F64(v) => f.debug_tuple("F64").field(v).finish(),
            DynValue::Decimal(v) => f.debug_tuple("Decimal").field(v).finish(),
            DynValue::Text(v) => f.debug_tuple("Text").field(v).finish(),
            DynValue::Bytes(v) => f.debug_tuple("Bytes").field(v).finish(),
            DynValue::Url(v) => f.debug_tuple("Url").field(&v.as_str()).finish(),
            DynValue::Uuid(v) => f.debug_tuple("Uuid").field(v).finish(),
            DynValue::Timestamp(v) => f.debug_tuple("Timestamp").field(v).finish(),
            DynValue::Date(v) => f.debug_tuple("Date").field(v).finish(),
            DynValue::Opaque(v) => fmt::Debug::fmt(v, f),
            DynValue::Nested(v) => f.debug_tuple("Nested").field(&v.nested_type_name()).finish(),
        }
    }
}

macro_rules! impl_from_scalar {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(impl From<$t> for DynValue {
            fn from(v: $t) -> Self {
                DynValue::$variant(v)
            }
        })*
    };
}

impl_from_scalar!(
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    String => Text,
    Vec<u8> => Bytes,
    Url => Url,
    Uuid => Uuid,
    DateTime<Utc> => Timestamp,
    NaiveDate => Date,
);

impl From<&str> for DynValue {
    fn from(v: &str) -> Self {
        DynValue::Text(v.to_string())
    }
}

impl From<&[u8]> for DynValue {
    fn from(v: &[u8]) -> Self {
        DynValue::Bytes(v.to_vec())
    }
}

/// Box a type-erased value and wrap it in `tag`
///
/// The caller's tag is layered outside any tag the scalar boxer produced.
///
/// # Errors
///
/// - `UnsupportedType` if the value is opaque and no extension claims it
/// - `TypeMismatch` if an extension claims it but cannot cast it
/// - any error of the serde bridge for nested values
pub fn box_dynamic(
    value: &DynValue,
    tag: u64,
    ctx: &EncodeContext<'_>,
) -> Result<WireValue, BoxError> {
    let inner = box_erased(value, ctx)?;
    trace!(kind = value.kind().name(), tag, path = %ctx.path(), "boxed dynamic value");
    Ok(WireValue::tagged(tag, inner))
}

/// Box a type-erased value without adding a tag
pub fn box_erased(value: &DynValue, ctx: &EncodeContext<'_>) -> Result<WireValue, BoxError> {
    let options = ctx.options();
    let boxed = match value {
        DynValue::Bool(v) => box_bool(*v),
        DynValue::I8(v) => box_i8(*v),
        DynValue::I16(v) => box_i16(*v),
        DynValue::I32(v) => box_i32(*v),
        DynValue::I64(v) => box_i64(*v),
        DynValue::Isize(v) => box_isize(*v),
        DynValue::U8(v) => box_u8(*v),
        DynValue::U16(v) => box_u16(*v),
        DynValue::U32(v) => box_u32(*v),
        DynValue::U64(v) => box_u64(*v),
        DynValue::Usize(v) => box_usize(*v),
        DynValue::F32(v) => box_f32(*v),
        DynValue::F64(v) => box_f64(*v),
        DynValue::Decimal(v) => box_decimal(v),
        DynValue::Text(v) => box_text(v),
        DynValue::Bytes(v) => box_bytes(v),
        DynValue::Url(v) => box_url(v),
        DynValue::Uuid(v) => box_uuid(v),
        DynValue::Timestamp(v) => box_timestamp(v, options),
        DynValue::Date(v) => box_date(v),
        DynValue::Opaque(v) => ctx.registry().box_opaque(v, options, ctx.path())?,
        DynValue::Nested(v) => v.encode_nested(ctx)?,
    };
    Ok(boxed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{DateStrategy, EncodingOptions};
    use crate::registry::BoxerRegistry;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    struct Socket;

    fn options(strategy: DateStrategy) -> EncodingOptions {
        EncodingOptions::new().with_date_strategy(strategy)
    }

    // === Dispatch order ===

    #[test]
    fn test_bool_before_every_integer() {
        let bool_rank = DynKind::Bool.priority();
        for kind in [DynKind::I8, DynKind::I64, DynKind::U8, DynKind::Usize] {
            assert!(bool_rank < kind.priority(), "{} ranked before bool", kind.name());
        }
    }

    #[test]
    fn test_dispatch_order_has_every_kind_once() {
        let unique: std::collections::HashSet<_> = DISPATCH_ORDER.iter().collect();
        assert_eq!(unique.len(), DISPATCH_ORDER.len());
        assert_eq!(DISPATCH_ORDER.first(), Some(&DynKind::Bool));
        assert_eq!(DISPATCH_ORDER.last(), Some(&DynKind::Nested));
    }

    #[test]
    fn test_erase_resolves_runtime_type() {
        assert_eq!(DynValue::erase(true).kind(), DynKind::Bool);
        assert_eq!(DynValue::erase(7u8).kind(), DynKind::U8);
        assert_eq!(DynValue::erase(-7i64).kind(), DynKind::I64);
        assert_eq!(DynValue::erase(2.5f32).kind(), DynKind::F32);
        assert_eq!(DynValue::erase("x".to_string()).kind(), DynKind::Text);
        assert_eq!(DynValue::erase("x").kind(), DynKind::Text);
        assert_eq!(DynValue::erase(vec![1u8]).kind(), DynKind::Bytes);
        assert_eq!(DynValue::erase(Uuid::nil()).kind(), DynKind::Uuid);
        assert_eq!(DynValue::erase(Socket).kind(), DynKind::Extension);
    }

    #[test]
    fn test_erase_keeps_opaque_type_name() {
        let value = DynValue::erase(Socket);
        assert!(value.type_name().ends_with("Socket"));
    }

    // === Boxing ===

    #[test]
    fn test_explicit_bool_boxes_as_bool() {
        let opts = EncodingOptions::new();
        let ctx = EncodeContext::with_options(&opts);
        let boxed = box_dynamic(&DynValue::erase(true), 5, &ctx).unwrap();
        assert_eq!(boxed, WireValue::tagged(5, WireValue::Bool(true)));
    }

    #[test]
    fn test_integer_widths_under_tag() {
        let opts = EncodingOptions::new();
        let ctx = EncodeContext::with_options(&opts);
        assert_eq!(
            box_dynamic(&DynValue::from(-3i16), 7, &ctx).unwrap(),
            WireValue::tagged(7, WireValue::SignedInt(-3))
        );
        assert_eq!(
            box_dynamic(&DynValue::from(3u16), 7, &ctx).unwrap(),
            WireValue::tagged(7, WireValue::UnsignedInt(3))
        );
    }

    #[test]
    fn test_timestamp_nests_two_tags() {
        let opts = options(DateStrategy::Iso8601Text);
        let ctx = EncodeContext::with_options(&opts);
        let ts = Utc.timestamp_millis_opt(1500).unwrap();
        let boxed = box_dynamic(&DynValue::from(ts), 99, &ctx).unwrap();
        assert_eq!(
            boxed,
            WireValue::tagged(
                99,
                WireValue::tagged(0, "1970-01-01T00:00:01.500+00:00".into())
            )
        );
    }

    #[test]
    fn test_url_under_tag_keeps_uri_tag() {
        let opts = EncodingOptions::new();
        let ctx = EncodeContext::with_options(&opts);
        let url = Url::parse("https://example.com/").unwrap();
        let boxed = box_dynamic(&DynValue::from(url), 32, &ctx).unwrap();
        assert_eq!(
            boxed,
            WireValue::tagged(32, WireValue::tagged(32, "https://example.com/".into()))
        );
    }

    #[test]
    fn test_nested_value_falls_through_to_bridge() {
        let opts = EncodingOptions::new();
        let ctx = EncodeContext::with_options(&opts);
        let mut map = BTreeMap::new();
        map.insert("a", 1u8);
        let boxed = box_dynamic(&DynValue::nested(map), 40, &ctx).unwrap();
        assert_eq!(
            boxed,
            WireValue::tagged(
                40,
                WireValue::Map(vec![(WireValue::from("a"), WireValue::UnsignedInt(1))])
            )
        );
    }

    #[test]
    fn test_unsupported_opaque_carries_path() {
        let opts = EncodingOptions::new();
        let ctx = EncodeContext::with_options(&opts).field("conn");
        let err = box_dynamic(&DynValue::opaque(Socket), 1, &ctx).unwrap_err();
        match err {
            BoxError::UnsupportedType { kind, path } => {
                assert!(kind.ends_with("Socket"));
                assert!(!path.is_root());
                assert_eq!(path.to_string(), "$.conn");
            }
            other => panic!("Expected UnsupportedType, got {:?}", other),
        }
    }

    #[test]
    fn test_opaque_with_extension() {
        let opts = EncodingOptions::new();
        let mut registry = BoxerRegistry::new();
        registry.register::<Socket, _>("socket", |_, _| WireValue::from("socket"));
        let ctx = EncodeContext::new(&opts, &registry);
        let boxed = box_dynamic(&DynValue::opaque(Socket), 6, &ctx).unwrap();
        assert_eq!(boxed, WireValue::tagged(6, "socket".into()));
    }

    #[test]
    fn test_box_erased_has_no_outer_tag() {
        let opts = EncodingOptions::new();
        let ctx = EncodeContext::with_options(&opts);
        assert_eq!(
            box_erased(&DynValue::from("hi"), &ctx).unwrap(),
            WireValue::from("hi")
        );
    }

    #[test]
    fn test_debug_output() {
        assert_eq!(format!("{:?}", DynValue::from(1u8)), "U8(1)");
        assert!(format!("{:?}", DynValue::opaque(Socket)).contains("Socket"));
    }
}
