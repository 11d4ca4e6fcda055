//! Unboxing
//!
//! The inverse of scalar boxing. Used to check that boxing is injective:
//! `unbox(box(x)) == x` for every primitive kind, with decimals compared
//! as 64-bit floats.
//!
//! ## Rules
//!
//! - Integers are range-checked. `UnsignedInt` unboxes into any width it
//!   fits; `SignedInt` only into signed widths.
//! - `f64` accepts both float widths; `f32` only `Float32`.
//! - Semantic types check their tag before looking at the content.
//! - Timestamps accept the output of every [`DateStrategy`]:
//!   - `0(text)` parsed as RFC 3339
//!   - `1(float)` seconds since the epoch
//!   - `1(int)` milliseconds, or whole seconds when the active strategy is
//!     [`DateStrategy::EpochSecondsFloat`]
//!   - `1004(text)` midnight UTC of that date
//!
//! Every failure is `TypeMismatch` with the path of the offending value.

use crate::options::{DateStrategy, EncodingOptions};
use crate::scalar::DATE_FORMAT;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use tagbox_core::{tags, BoxError, CodingPath, WireValue};
use url::Url;
use uuid::Uuid;

/// A type that can be rebuilt from its boxed form
pub trait FromWire: Sized {
    /// Rebuild from `value`, reporting failures at `path`
    fn from_wire(
        value: &WireValue,
        options: &EncodingOptions,
        path: &CodingPath,
    ) -> Result<Self, BoxError>;
}

/// Unbox a root value
pub fn unbox<T: FromWire>(value: &WireValue, options: &EncodingOptions) -> Result<T, BoxError> {
    T::from_wire(value, options, &CodingPath::root())
}

fn mismatch(expected: &str, value: &WireValue, path: &CodingPath) -> BoxError {
    BoxError::mismatch(expected, value.type_name(), path)
}

fn out_of_range(expected: &str, value: &WireValue, path: &CodingPath) -> BoxError {
    BoxError::mismatch(expected, format!("{} (out of range)", value), path)
}

/// Peel exactly one tag layer, which must be `tag`
fn expect_tag<'v>(
    value: &'v WireValue,
    tag: u64,
    expected: &str,
    path: &CodingPath,
) -> Result<&'v WireValue, BoxError> {
    match value.as_tagged() {
        Some((found, inner)) if found == tag => Ok(inner),
        Some((found, _)) => Err(BoxError::mismatch(
            expected,
            format!("tag {}", found),
            path,
        )),
        None => Err(mismatch(expected, value, path)),
    }
}

fn expect_text<'v>(value: &'v WireValue, expected: &str, path: &CodingPath) -> Result<&'v str, BoxError> {
    value.as_str().ok_or_else(|| mismatch(expected, value, path))
}

impl FromWire for bool {
    fn from_wire(value: &WireValue, _: &EncodingOptions, path: &CodingPath) -> Result<Self, BoxError> {
        value.as_bool().ok_or_else(|| mismatch("bool", value, path))
    }
}

macro_rules! impl_from_wire_unsigned {
    ($($t:ty),*) => {
        $(impl FromWire for $t {
            fn from_wire(value: &WireValue, _: &EncodingOptions, path: &CodingPath) -> Result<Self, BoxError> {
                match value {
                    WireValue::UnsignedInt(u) => <$t>::try_from(*u)
                        .map_err(|_| out_of_range(stringify!($t), value, path)),
                    other => Err(mismatch(stringify!($t), other, path)),
                }
            }
        })*
    };
}

macro_rules! impl_from_wire_signed {
    ($($t:ty),*) => {
        $(impl FromWire for $t {
            fn from_wire(value: &WireValue, _: &EncodingOptions, path: &CodingPath) -> Result<Self, BoxError> {
                let converted = match value {
                    WireValue::SignedInt(i) => <$t>::try_from(*i).ok(),
                    WireValue::UnsignedInt(u) => <$t>::try_from(*u).ok(),
                    other => return Err(mismatch(stringify!($t), other, path)),
                };
                converted.ok_or_else(|| out_of_range(stringify!($t), value, path))
            }
        })*
    };
}

impl_from_wire_unsigned!(u8, u16, u32, u64, usize);
impl_from_wire_signed!(i8, i16, i32, i64, isize);

impl FromWire for f32 {
    fn from_wire(value: &WireValue, _: &EncodingOptions, path: &CodingPath) -> Result<Self, BoxError> {
        match value {
            WireValue::Float32(f) => Ok(*f),
            other => Err(mismatch("f32", other, path)),
        }
    }
}

impl FromWire for f64 {
    fn from_wire(value: &WireValue, _: &EncodingOptions, path: &CodingPath) -> Result<Self, BoxError> {
        value.as_f64().ok_or_else(|| mismatch("f64", value, path))
    }
}

impl FromWire for String {
    fn from_wire(value: &WireValue, _: &EncodingOptions, path: &CodingPath) -> Result<Self, BoxError> {
        expect_text(value, "text", path).map(str::to_string)
    }
}

impl FromWire for Vec<u8> {
    fn from_wire(value: &WireValue, _: &EncodingOptions, path: &CodingPath) -> Result<Self, BoxError> {
        value
            .as_bytes()
            .map(<[u8]>::to_vec)
            .ok_or_else(|| mismatch("bytes", value, path))
    }
}

impl FromWire for Decimal {
    fn from_wire(value: &WireValue, _: &EncodingOptions, path: &CodingPath) -> Result<Self, BoxError> {
        let f = value.as_f64().ok_or_else(|| mismatch("decimal", value, path))?;
        Decimal::try_from(f).map_err(|_| out_of_range("decimal", value, path))
    }
}

impl FromWire for Url {
    fn from_wire(value: &WireValue, _: &EncodingOptions, path: &CodingPath) -> Result<Self, BoxError> {
        let inner = expect_tag(value, tags::URI, "url", path)?;
        let text = expect_text(inner, "url", path)?;
        Url::parse(text).map_err(|e| BoxError::mismatch("url", format!("invalid url: {}", e), path))
    }
}

impl FromWire for Uuid {
    fn from_wire(value: &WireValue, _: &EncodingOptions, path: &CodingPath) -> Result<Self, BoxError> {
        let inner = expect_tag(value, tags::UUID, "uuid", path)?;
        let bytes = inner.as_bytes().ok_or_else(|| mismatch("uuid", inner, path))?;
        Uuid::from_slice(bytes).map_err(|_| {
            BoxError::mismatch("uuid", format!("{} bytes", bytes.len()), path)
        })
    }
}

impl FromWire for NaiveDate {
    fn from_wire(value: &WireValue, _: &EncodingOptions, path: &CodingPath) -> Result<Self, BoxError> {
        let inner = expect_tag(value, tags::FULL_DATE, "date", path)?;
        parse_date(expect_text(inner, "date", path)?, path)
    }
}

fn parse_date(text: &str, path: &CodingPath) -> Result<NaiveDate, BoxError> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map_err(|e| BoxError::mismatch("date", format!("invalid date: {}", e), path))
}

impl FromWire for DateTime<Utc> {
    fn from_wire(
        value: &WireValue,
        options: &EncodingOptions,
        path: &CodingPath,
    ) -> Result<Self, BoxError> {
        let Some((tag, inner)) = value.as_tagged() else {
            return Err(mismatch("timestamp", value, path));
        };
        let parsed = match (tag, inner) {
            (tags::STANDARD_DATETIME, WireValue::TextString(text)) => {
                DateTime::parse_from_rfc3339(text)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| {
                        BoxError::mismatch("timestamp", format!("invalid RFC 3339: {}", e), path)
                    })?
            }
            (tags::EPOCH_DATETIME, WireValue::Float64(secs)) => from_epoch_seconds(*secs)
                .ok_or_else(|| out_of_range("timestamp", inner, path))?,
            (tags::EPOCH_DATETIME, WireValue::Float32(secs)) => from_epoch_seconds(f64::from(*secs))
                .ok_or_else(|| out_of_range("timestamp", inner, path))?,
            (tags::EPOCH_DATETIME, WireValue::SignedInt(_) | WireValue::UnsignedInt(_)) => {
                let n = i64::from_wire(inner, options, path)?;
                let dt = match options.date_strategy() {
                    DateStrategy::EpochSecondsFloat => DateTime::from_timestamp(n, 0),
                    _ => DateTime::from_timestamp_millis(n),
                };
                dt.ok_or_else(|| out_of_range("timestamp", inner, path))?
            }
            (tags::FULL_DATE, WireValue::TextString(text)) => {
                let date = parse_date(text, path)?;
                date.and_hms_opt(0, 0, 0)
                    .map(|midnight| Utc.from_utc_datetime(&midnight))
                    .ok_or_else(|| out_of_range("timestamp", inner, path))?
            }
            (tags::STANDARD_DATETIME | tags::EPOCH_DATETIME | tags::FULL_DATE, other) => {
                return Err(mismatch("timestamp", other, path));
            }
            (other, _) => {
                return Err(BoxError::mismatch("timestamp", format!("tag {}", other), path));
            }
        };
        Ok(parsed)
    }
}

/// Fractional epoch seconds to an instant, rounded to the nanosecond
fn from_epoch_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let mut nanos = ((secs - whole) * 1e9).round() as i64;
    let mut whole = whole as i64;
    if nanos >= 1_000_000_000 {
        whole = whole.checked_add(1)?;
        nanos -= 1_000_000_000;
    }
    DateTime::from_timestamp(whole, u32::try_from(nanos).ok()?)
}

impl<T: FromWire> FromWire for Option<T> {
    fn from_wire(
        value: &WireValue,
        options: &EncodingOptions,
        path: &CodingPath,
    ) -> Result<Self, BoxError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_wire(value, options, path).map(Some)
        }
    }
}

impl FromWire for WireValue {
    fn from_wire(value: &WireValue, _: &EncodingOptions, _: &CodingPath) -> Result<Self, BoxError> {
        Ok(value.clone())
    }
}
