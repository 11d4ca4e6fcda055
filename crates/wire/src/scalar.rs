//! Scalar boxing
//!
//! One total function per primitive or semantic type. None of them can
//! fail: every legally typed input has exactly one `WireValue`.
//!
//! - Unsigned widths box to `UnsignedInt`, signed widths to `SignedInt`.
//!   Narrow widths are widened, never narrowed.
//! - URLs box to `32(text)`, UUIDs to `37(16 bytes)`.
//! - Timestamps follow [`DateStrategy`].
//! - Decimals box to the nearest `f64`. This is a known lossy path.

use crate::options::{DateStrategy, EncodingOptions};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tagbox_core::{tags, WireValue};
use url::Url;
use uuid::Uuid;

/// chrono format for tag 0 text: UTC, millisecond precision, `+00:00` offset
///
/// Every field is fixed width for years 0000 through 9999. Outside that
/// range `%Y` writes the ISO 8601 expanded year, signed and at least four
/// digits (`+10000-01-01T...`, `-0001-12-31T...`).
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

/// chrono format for tag 1004 text; years outside 0000..=9999 as for
/// [`DATETIME_FORMAT`]
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Box a boolean
pub fn box_bool(value: bool) -> WireValue {
    WireValue::Bool(value)
}

/// Box an `i8`
pub fn box_i8(value: i8) -> WireValue {
    WireValue::SignedInt(i64::from(value))
}

/// Box an `i16`
pub fn box_i16(value: i16) -> WireValue {
    WireValue::SignedInt(i64::from(value))
}

/// Box an `i32`
pub fn box_i32(value: i32) -> WireValue {
    WireValue::SignedInt(i64::from(value))
}

/// Box an `i64`
pub fn box_i64(value: i64) -> WireValue {
    WireValue::SignedInt(value)
}

/// Box an `isize`
pub fn box_isize(value: isize) -> WireValue {
    // isize is at most 64 bits on every Rust target
    WireValue::SignedInt(value as i64)
}

/// Box a `u8`
pub fn box_u8(value: u8) -> WireValue {
    WireValue::UnsignedInt(u64::from(value))
}

/// Box a `u16`
pub fn box_u16(value: u16) -> WireValue {
    WireValue::UnsignedInt(u64::from(value))
}

/// Box a `u32`
pub fn box_u32(value: u32) -> WireValue {
    WireValue::UnsignedInt(u64::from(value))
}

/// Box a `u64`
pub fn box_u64(value: u64) -> WireValue {
    WireValue::UnsignedInt(value)
}

/// Box a `usize`
pub fn box_usize(value: usize) -> WireValue {
    WireValue::UnsignedInt(value as u64)
}

/// Box an `f32`, keeping single precision
pub fn box_f32(value: f32) -> WireValue {
    WireValue::Float32(value)
}

/// Box an `f64`
pub fn box_f64(value: f64) -> WireValue {
    WireValue::Float64(value)
}

/// Box text
pub fn box_text(value: &str) -> WireValue {
    WireValue::TextString(value.to_string())
}

/// Box a byte buffer
pub fn box_bytes(value: &[u8]) -> WireValue {
    WireValue::ByteString(value.to_vec())
}

/// Box a decimal as the nearest representable `f64`
///
/// Lossy: a decimal with more than ~15-17 significant digits does not
/// survive. Precision loss is not reported as an error.
pub fn box_decimal(value: &Decimal) -> WireValue {
    // Parsing the canonical text gives a correctly rounded f64
    let nearest = value
        .to_string()
        .parse::<f64>()
        .ok()
        .or_else(|| value.to_f64())
        .unwrap_or(f64::NAN);
    WireValue::Float64(nearest)
}

/// Box a URL as `32(text)`
pub fn box_url(value: &Url) -> WireValue {
    WireValue::tagged(tags::URI, WireValue::TextString(value.as_str().to_string()))
}

/// Box a UUID as `37(h'...')`, the 16 bytes in big-endian order
pub fn box_uuid(value: &Uuid) -> WireValue {
    WireValue::tagged(tags::UUID, WireValue::ByteString(value.as_bytes().to_vec()))
}

/// Box a timestamp according to `options.date_strategy()`
pub fn box_timestamp(value: &DateTime<Utc>, options: &EncodingOptions) -> WireValue {
    let strategy = options.date_strategy();
    let inner = match (strategy, strategy.text_format()) {
        (_, Some(format)) => WireValue::TextString(value.format(format).to_string()),
        (DateStrategy::EpochSecondsFloat, None) => WireValue::Float64(epoch_seconds(value)),
        (_, None) => WireValue::SignedInt(epoch_millis(value)),
    };
    WireValue::tagged(strategy.tag(), inner)
}

/// Box a calendar date as `1004("yyyy-MM-dd")`, whatever the strategy
pub fn box_date(value: &NaiveDate) -> WireValue {
    WireValue::tagged(
        tags::FULL_DATE,
        WireValue::TextString(value.format(DATE_FORMAT).to_string()),
    )
}

/// Fractional seconds since the epoch
fn epoch_seconds(value: &DateTime<Utc>) -> f64 {
    value.timestamp() as f64 + f64::from(value.timestamp_subsec_nanos()) / 1e9
}

/// Milliseconds since the epoch, truncated toward zero
fn epoch_millis(value: &DateTime<Utc>) -> i64 {
    let secs = value.timestamp();
    let nanos = i64::from(value.timestamp_subsec_nanos());
    let floor = secs * 1000 + nanos / 1_000_000;
    // timestamp() floors, so negative instants with a partial millisecond
    // are one below the truncated value
    if secs < 0 && nanos % 1_000_000 != 0 {
        floor + 1
    } else {
        floor
    }
}

/// A type with a scalar boxing rule
///
/// Implemented for every type that has a `box_*` function, so callers that
/// know the static type can write `value.box_value(&options)`.
pub trait Boxable {
    /// Box `self`; infallible
    fn box_value(&self, options: &EncodingOptions) -> WireValue;
}

macro_rules! impl_boxable_copy {
    ($($t:ty => $f:ident),* $(,)?) => {
        $(impl Boxable for $t {
            fn box_value(&self, _options: &EncodingOptions) -> WireValue {
                $f(*self)
            }
        })*
    };
}

impl_boxable_copy!(
    bool => box_bool,
    i8 => box_i8,
    i16 => box_i16,
    i32 => box_i32,
    i64 => box_i64,
    isize => box_isize,
    u8 => box_u8,
    u16 => box_u16,
    u32 => box_u32,
    u64 => box_u64,
    usize => box_usize,
    f32 => box_f32,
    f64 => box_f64,
);

impl Boxable for str {
    fn box_value(&self, _options: &EncodingOptions) -> WireValue {
        box_text(self)
    }
}

impl Boxable for String {
    fn box_value(&self, _options: &EncodingOptions) -> WireValue {
        box_text(self)
    }
}

impl Boxable for [u8] {
    fn box_value(&self, _options: &EncodingOptions) -> WireValue {
        box_bytes(self)
    }
}

impl Boxable for Vec<u8> {
    fn box_value(&self, _options: &EncodingOptions) -> WireValue {
        box_bytes(self)
    }
}

impl Boxable for Decimal {
    fn box_value(&self, _options: &EncodingOptions) -> WireValue {
        box_decimal(self)
    }
}

impl Boxable for Url {
    fn box_value(&self, _options: &EncodingOptions) -> WireValue {
        box_url(self)
    }
}

impl Boxable for Uuid {
    fn box_value(&self, _options: &EncodingOptions) -> WireValue {
        box_uuid(self)
    }
}

impl Boxable for DateTime<Utc> {
    fn box_value(&self, options: &EncodingOptions) -> WireValue {
        box_timestamp(self, options)
    }
}

impl Boxable for NaiveDate {
    fn box_value(&self, _options: &EncodingOptions) -> WireValue {
        box_date(self)
    }
}

impl<T: Boxable + ?Sized> Boxable for &T {
    fn box_value(&self, options: &EncodingOptions) -> WireValue {
        (**self).box_value(options)
    }
}
