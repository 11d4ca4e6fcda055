//! Semantic adapters for the serde bridge
//!
//! chrono, uuid and url serialize themselves as plain text or bytes, so a
//! timestamp field reaching [`WireSerializer`](crate::ser::WireSerializer)
//! looks like any other string. The adapters here serialize the field as a
//! newtype struct with a reserved name instead, and the bridge hands the
//! payload to the matching scalar boxer with the active [`EncodingOptions`].
//!
//! ```
//! use chrono::{DateTime, TimeZone, Utc};
//! use serde::Serialize;
//! use tagbox_core::WireValue;
//! use tagbox_wire::{to_wire_value, DateStrategy, EncodeContext, EncodingOptions};
//!
//! #[derive(Serialize)]
//! struct Event {
//!     #[serde(with = "tagbox_wire::semantic::timestamp")]
//!     at: DateTime<Utc>,
//! }
//!
//! let options = EncodingOptions::new().with_date_strategy(DateStrategy::EpochMillisecondsInt);
//! let event = Event { at: Utc.timestamp_millis_opt(1500).unwrap() };
//! let boxed = to_wire_value(&event, &EncodeContext::with_options(&options)).unwrap();
//! assert_eq!(
//!     boxed.map_get(&WireValue::from("at")),
//!     Some(&WireValue::tagged(1, WireValue::SignedInt(1500)))
//! );
//! ```
//!
//! Human-readable serializers see the type's usual form. Other serializers
//! see the reserved newtype around a compact payload:
//!
//! | Adapter | Newtype name | Payload |
//! |---------|--------------|---------|
//! | [`timestamp`] | [`TIMESTAMP_MARKER`] | `(seconds, nanoseconds)` since the epoch |
//! | [`date`] | [`DATE_MARKER`] | `i32` days from 0001-01-01 |
//! | [`uuid`] | [`UUID_MARKER`] | 16 bytes |
//! | [`url`] | [`URL_MARKER`] | text |

use crate::context::EncodeContext;
use crate::options::EncodingOptions;
use crate::scalar::{box_date, box_timestamp, box_url, box_uuid};
use crate::unbox::FromWire;
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Serialize, Serializer};
use tagbox_core::{BoxError, CodingPath, WireValue};

/// Reserved newtype name for timestamps
pub const TIMESTAMP_MARKER: &str = "@@TAGBOX_TIMESTAMP@@";

/// Reserved newtype name for calendar dates
pub const DATE_MARKER: &str = "@@TAGBOX_DATE@@";

/// Reserved newtype name for UUIDs
pub const UUID_MARKER: &str = "@@TAGBOX_UUID@@";

/// Reserved newtype name for URLs
pub const URL_MARKER: &str = "@@TAGBOX_URL@@";

/// A type the bridge boxes with a semantic tag
pub trait SemanticScalar {
    /// Serialize through the reserved newtype for this type
    fn serialize_semantic<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error>;
}

impl SemanticScalar for DateTime<Utc> {
    fn serialize_semantic<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            self.serialize(serializer)
        } else {
            serializer.serialize_newtype_struct(
                TIMESTAMP_MARKER,
                &(self.timestamp(), self.timestamp_subsec_nanos()),
            )
        }
    }
}

impl SemanticScalar for NaiveDate {
    fn serialize_semantic<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            self.serialize(serializer)
        } else {
            serializer.serialize_newtype_struct(DATE_MARKER, &self.num_days_from_ce())
        }
    }
}

impl SemanticScalar for ::uuid::Uuid {
    fn serialize_semantic<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            self.serialize(serializer)
        } else {
            serializer.serialize_newtype_struct(UUID_MARKER, self)
        }
    }
}

impl SemanticScalar for ::url::Url {
    fn serialize_semantic<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(self.as_str())
        } else {
            serializer.serialize_newtype_struct(URL_MARKER, self.as_str())
        }
    }
}

/// Wrapper that boxes its content with the semantic tag
///
/// For values that are not struct fields, e.g. `Vec<Semantic<Uuid>>` or
/// `Option<Semantic<DateTime<Utc>>>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Semantic<T>(pub T);

impl<T: SemanticScalar> Serialize for Semantic<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize_semantic(serializer)
    }
}

/// `#[serde(with = "tagbox_wire::semantic::timestamp")]` for `DateTime<Utc>`
///
/// Boxed according to the encode's `DateStrategy`.
pub mod timestamp {
    use super::SemanticScalar;
    use chrono::{DateTime, Utc};
    use serde::Serializer;

    /// Serialize `value` as a semantic timestamp
    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        value.serialize_semantic(serializer)
    }
}

/// `#[serde(with = "tagbox_wire::semantic::date")]` for `NaiveDate`, boxed as `1004(text)`
pub mod date {
    use super::SemanticScalar;
    use chrono::NaiveDate;
    use serde::Serializer;

    /// Serialize `value` as a semantic calendar date
    pub fn serialize<S: Serializer>(value: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        value.serialize_semantic(serializer)
    }
}

/// `#[serde(with = "tagbox_wire::semantic::uuid")]` for `Uuid`, boxed as `37(bytes)`
pub mod uuid {
    use super::SemanticScalar;
    use serde::Serializer;

    /// Serialize `value` as a semantic UUID
    pub fn serialize<S: Serializer>(value: &::uuid::Uuid, serializer: S) -> Result<S::Ok, S::Error> {
        value.serialize_semantic(serializer)
    }
}

/// `#[serde(with = "tagbox_wire::semantic::url")]` for `Url`, boxed as `32(text)`
pub mod url {
    use super::SemanticScalar;
    use serde::Serializer;

    /// Serialize `value` as a semantic URL
    pub fn serialize<S: Serializer>(value: &::url::Url, serializer: S) -> Result<S::Ok, S::Error> {
        value.serialize_semantic(serializer)
    }
}

/// Reserved newtype names the bridge boxes itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Marker {
    Timestamp,
    Date,
    Uuid,
    Url,
}

impl Marker {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            TIMESTAMP_MARKER => Some(Marker::Timestamp),
            DATE_MARKER => Some(Marker::Date),
            UUID_MARKER => Some(Marker::Uuid),
            URL_MARKER => Some(Marker::Url),
            _ => None,
        }
    }

    /// Rebuild the typed value from its payload and box it
    pub(crate) fn rebox(
        self,
        payload: &WireValue,
        ctx: &EncodeContext<'_>,
    ) -> Result<WireValue, BoxError> {
        let options = ctx.options();
        let path = ctx.path();
        match self {
            Marker::Timestamp => {
                let at = timestamp_from_payload(payload, options, path)?;
                Ok(box_timestamp(&at, options))
            }
            Marker::Date => {
                let days = i32::from_wire(payload, options, path)?;
                let date = NaiveDate::from_num_days_from_ce_opt(days)
                    .ok_or_else(|| invalid(format!("date out of range: {} days", days), path))?;
                Ok(box_date(&date))
            }
            Marker::Uuid => {
                let bytes = Vec::<u8>::from_wire(payload, options, path)?;
                let id = ::uuid::Uuid::from_slice(&bytes)
                    .map_err(|e| invalid(format!("invalid uuid: {}", e), path))?;
                Ok(box_uuid(&id))
            }
            Marker::Url => {
                let text = String::from_wire(payload, options, path)?;
                let url = ::url::Url::parse(&text)
                    .map_err(|e| invalid(format!("invalid url {:?}: {}", text, e), path))?;
                Ok(box_url(&url))
            }
        }
    }
}

fn timestamp_from_payload(
    payload: &WireValue,
    options: &EncodingOptions,
    path: &CodingPath,
) -> Result<DateTime<Utc>, BoxError> {
    match payload {
        WireValue::Array(parts) if parts.len() == 2 => {
            let secs = i64::from_wire(&parts[0], options, path)?;
            let nanos = u32::from_wire(&parts[1], options, path)?;
            Utc.timestamp_opt(secs, nanos).single().ok_or_else(|| {
                invalid(format!("timestamp out of range: {}s {}ns", secs, nanos), path)
            })
        }
        other => Err(BoxError::mismatch(
            "timestamp payload",
            other.type_name(),
            path,
        )),
    }
}

fn invalid(message: String, path: &CodingPath) -> BoxError {
    BoxError::Message {
        message,
        path: path.clone(),
    }
}
