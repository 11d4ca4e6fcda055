//! CBOR tag registry
//!
//! Tag numbers are part of the wire contract and must match the IANA CBOR
//! tag registry exactly for interoperability.
//!
//! | Tag | Meaning | Inner item |
//! |-----|---------|------------|
//! | 0 | Standard date/time string (RFC 3339) | text |
//! | 1 | Epoch-based date/time | integer or float |
//! | 32 | URI (RFC 3986) | text |
//! | 37 | Binary UUID (RFC 4122) | 16-byte byte string |
//! | 1004 | Full-date string (RFC 8943) | text `yyyy-MM-dd` |
//!
//! Tag 1004 is the stable choice for calendar-date-only values. It is
//! published and must not change.

/// Standard date/time string (RFC 3339)
pub const STANDARD_DATETIME: u64 = 0;

/// Epoch-based date/time, seconds or milliseconds as a number
pub const EPOCH_DATETIME: u64 = 1;

/// URI (RFC 3986)
pub const URI: u64 = 32;

/// Binary UUID (RFC 4122)
pub const UUID: u64 = 37;

/// Full-date string (RFC 8943)
pub const FULL_DATE: u64 = 1004;

/// Reserved tuple-struct name used to carry a tag through serde
///
/// A value serialized as `TAGGED_MARKER(tag, inner)` is turned back into
/// `WireValue::Tagged(tag, inner)` by the tagbox serializer.
pub const TAGGED_MARKER: &str = "@@TAGBOX_TAGGED@@";

/// Tags this crate assigns itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownTag {
    /// Tag 0
    StandardDateTime,
    /// Tag 1
    EpochDateTime,
    /// Tag 32
    Uri,
    /// Tag 37
    Uuid,
    /// Tag 1004
    FullDate,
}

impl KnownTag {
    /// All known tags, in ascending tag-number order
    pub const ALL: [KnownTag; 5] = [
        KnownTag::StandardDateTime,
        KnownTag::EpochDateTime,
        KnownTag::Uri,
        KnownTag::Uuid,
        KnownTag::FullDate,
    ];

    /// Tag number on the wire
    pub fn as_u64(&self) -> u64 {
        match self {
            KnownTag::StandardDateTime => STANDARD_DATETIME,
            KnownTag::EpochDateTime => EPOCH_DATETIME,
            KnownTag::Uri => URI,
            KnownTag::Uuid => UUID,
            KnownTag::FullDate => FULL_DATE,
        }
    }

    /// Look up a tag number
    pub fn from_u64(tag: u64) -> Option<Self> {
        match tag {
            STANDARD_DATETIME => Some(KnownTag::StandardDateTime),
            EPOCH_DATETIME => Some(KnownTag::EpochDateTime),
            URI => Some(KnownTag::Uri),
            UUID => Some(KnownTag::Uuid),
            FULL_DATE => Some(KnownTag::FullDate),
            _ => None,
        }
    }

    /// Human-readable name for display
    pub fn name(&self) -> &'static str {
        match self {
            KnownTag::StandardDateTime => "standard_datetime",
            KnownTag::EpochDateTime => "epoch_datetime",
            KnownTag::Uri => "uri",
            KnownTag::Uuid => "uuid",
            KnownTag::FullDate => "full_date",
        }
    }
}
