//! Scalar Boxing Tests
//!
//! Widths, semantic tags and the four date strategies.

use crate::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use url::Url;
use uuid::Uuid;

// =============================================================================
// INTEGERS AND FLOATS
// =============================================================================

#[test]
fn test_signedness_is_preserved() {
    let encoder = Encoder::new();
    assert_eq!(encoder.box_value(&5u8), WireValue::UnsignedInt(5));
    assert_eq!(encoder.box_value(&5i8), WireValue::SignedInt(5));
    assert_ne!(encoder.box_value(&5u8), encoder.box_value(&5i8));
}

#[test]
fn test_extreme_widths() {
    let encoder = Encoder::new();
    assert_eq!(encoder.box_value(&u64::MAX), WireValue::UnsignedInt(u64::MAX));
    assert_eq!(encoder.box_value(&i64::MIN), WireValue::SignedInt(i64::MIN));
    assert_eq!(encoder.box_value(&usize::MAX), WireValue::UnsignedInt(usize::MAX as u64));
}

#[test]
fn test_float_width_is_preserved() {
    let encoder = Encoder::new();
    assert_eq!(encoder.box_value(&1.25f32), WireValue::Float32(1.25));
    assert_eq!(encoder.box_value(&1.25f64), WireValue::Float64(1.25));
}

#[test]
fn test_decimal_is_nearest_f64() {
    let encoder = Encoder::new();
    let d = Decimal::from_str("0.1").unwrap();
    assert_eq!(encoder.box_value(&d), WireValue::Float64(0.1));
}

#[test]
fn test_text_and_bytes_are_distinct() {
    let encoder = Encoder::new();
    assert_eq!(encoder.box_value("ab"), text("ab"));
    assert_eq!(encoder.box_value(&b"ab"[..]), WireValue::ByteString(b"ab".to_vec()));
    assert_ne!(encoder.box_value("ab"), encoder.box_value(&b"ab"[..]));
}

// =============================================================================
// SEMANTIC TAGS
// =============================================================================

#[test]
fn test_url_is_tag_32() {
    let encoder = Encoder::new();
    let url = Url::parse("https://example.com/path?q=1").unwrap();
    let boxed = encoder.box_value(&url);
    assert_eq!(boxed.tag(), Some(tags::URI));
    assert_eq!(boxed.untagged(), &text("https://example.com/path?q=1"));
}

#[test]
fn test_uuid_is_tag_37_big_endian() {
    let encoder = Encoder::new();
    let id = Uuid::from_str("00112233-4455-6677-8899-aabbccddeeff").unwrap();
    let boxed = encoder.box_value(&id);
    assert_eq!(boxed.to_string(), "37(h'00112233445566778899aabbccddeeff')");
}

// =============================================================================
// DATE STRATEGIES
// =============================================================================

#[test]
fn test_iso_text() {
    let boxed = encoder_with(DateStrategy::Iso8601Text).box_value(&one_and_a_half_seconds());
    assert_eq!(boxed, WireValue::tagged(0, text("1970-01-01T00:00:01.500+00:00")));
}

#[test]
fn test_epoch_seconds_float() {
    let boxed = encoder_with(DateStrategy::EpochSecondsFloat).box_value(&one_and_a_half_seconds());
    assert_eq!(boxed, WireValue::tagged(1, WireValue::Float64(1.5)));
}

#[test]
fn test_epoch_millis_int() {
    let boxed =
        encoder_with(DateStrategy::EpochMillisecondsInt).box_value(&one_and_a_half_seconds());
    assert_eq!(boxed, WireValue::tagged(1, WireValue::SignedInt(1500)));
}

#[test]
fn test_calendar_date_text() {
    let boxed = encoder_with(DateStrategy::CalendarDateText).box_value(&one_and_a_half_seconds());
    assert_eq!(boxed, WireValue::tagged(1004, text("1970-01-01")));
}

#[test]
fn test_tag_depends_only_on_strategy() {
    let instants = [
        Utc.timestamp_millis_opt(0).unwrap(),
        Utc.timestamp_millis_opt(-86_400_001).unwrap(),
        Utc.with_ymd_and_hms(2099, 12, 31, 23, 59, 59).unwrap(),
    ];
    for strategy in DateStrategy::ALL {
        let encoder = encoder_with(strategy);
        for instant in &instants {
            assert_eq!(encoder.box_value(instant).tag(), Some(strategy.tag()));
        }
    }
}

#[test]
fn test_date_strategy_from_config_name() {
    let encoder = Encoder::builder()
        .date_strategy_named("epoch_milliseconds_int")
        .unwrap()
        .build();
    assert_eq!(encoder.options().date_strategy(), DateStrategy::EpochMillisecondsInt);

    let err = Encoder::builder().date_strategy_named("fortnights").err().unwrap();
    assert_eq!(err.error_code(), "InvalidConfig");
}

// =============================================================================
// UNBOXING
// =============================================================================

#[test]
fn test_unbox_through_encoder() {
    let encoder = encoder_with(DateStrategy::EpochMillisecondsInt);
    let boxed = encoder.box_value(&one_and_a_half_seconds());
    let back: DateTime<Utc> = encoder.unbox(&boxed).unwrap();
    assert_eq!(back, one_and_a_half_seconds());
}

#[test]
fn test_unbox_wrong_kind_is_mismatch() {
    let encoder = Encoder::new();
    let err = encoder.unbox::<Uuid>(&text("not a uuid")).unwrap_err();
    assert!(err.is_type_mismatch());
    assert_eq!(err.path().map(ToString::to_string), Some("$".to_string()));
}
