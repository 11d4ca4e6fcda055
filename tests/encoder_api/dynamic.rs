//! Dynamic Dispatch Tests
//!
//! Type-erased values boxed under a caller tag.

use crate::*;
use std::collections::BTreeMap;
use tagbox::{DynKind, DISPATCH_ORDER};
use url::Url;

struct Socket;

// =============================================================================
// PRIORITY
// =============================================================================

#[test]
fn test_explicit_bool_is_not_an_integer() {
    let encoder = Encoder::new();
    let boxed = encoder.encode_dynamic(&DynValue::erase(true), 9).unwrap();
    assert_eq!(boxed, WireValue::tagged(9, WireValue::Bool(true)));
}

#[test]
fn test_published_order_starts_with_bool() {
    assert_eq!(DISPATCH_ORDER[0], DynKind::Bool);
    assert!(DynKind::Bool.priority() < DynKind::U8.priority());
    assert!(DynKind::Date.priority() < DynKind::Extension.priority());
    assert!(DynKind::Extension.priority() < DynKind::Nested.priority());
}

#[test]
fn test_erase_matches_from() {
    let encoder = Encoder::new();
    for (erased, direct) in [
        (DynValue::erase(-3i32), DynValue::from(-3i32)),
        (DynValue::erase(3u64), DynValue::from(3u64)),
        (DynValue::erase("x".to_string()), DynValue::from("x")),
    ] {
        assert_eq!(
            encoder.encode_dynamic(&erased, 1).unwrap(),
            encoder.encode_dynamic(&direct, 1).unwrap()
        );
    }
}

// =============================================================================
// TAG LAYERING
// =============================================================================

#[test]
fn test_timestamp_under_explicit_tag_nests() {
    let encoder = encoder_with(DateStrategy::Iso8601Text);
    let boxed = encoder
        .encode_dynamic(&DynValue::from(one_and_a_half_seconds()), 99)
        .unwrap();
    assert_eq!(
        boxed,
        WireValue::tagged(99, WireValue::tagged(0, text("1970-01-01T00:00:01.500+00:00")))
    );
    assert_eq!(boxed.untagged(), &text("1970-01-01T00:00:01.500+00:00"));
}

#[test]
fn test_caller_tag_wins_over_url_tag() {
    let encoder = Encoder::new();
    let url = Url::parse("urn:isbn:0451450523").unwrap();
    let boxed = encoder.encode_dynamic(&DynValue::from(url), 266).unwrap();
    assert_eq!(boxed.tag(), Some(266));
    assert_eq!(boxed.as_tagged().unwrap().1.tag(), Some(tags::URI));
}

// =============================================================================
// NESTED AND UNSUPPORTED
// =============================================================================

#[test]
fn test_nested_value_through_bridge() {
    let encoder = Encoder::new();
    let mut scores = BTreeMap::new();
    scores.insert("ada", vec![9u8, 10]);
    let boxed = encoder.encode_dynamic(&DynValue::nested(scores), 55).unwrap();
    assert_eq!(boxed.to_string(), r#"55({"ada": [9, 10]})"#);
}

#[test]
fn test_unsupported_opaque_value() {
    init_tracing();
    let encoder = Encoder::new();
    let err = encoder.encode_dynamic(&DynValue::opaque(Socket), 1).unwrap_err();
    assert!(err.is_unsupported());
    match err {
        Error::Boxing(BoxError::UnsupportedType { kind, .. }) => assert!(kind.ends_with("Socket")),
        other => panic!("Expected UnsupportedType, got {:?}", other),
    }
}

#[test]
fn test_unsupported_inside_nested_value_has_path() {
    let encoder = Encoder::new();
    let mut grid = BTreeMap::new();
    grid.insert("cells", BTreeMap::from([((0u8, 0u8), 1u8)]));
    let err = encoder.encode_dynamic(&DynValue::nested(grid), 1).unwrap_err();
    assert!(err.is_unsupported());
    let path = err.path().unwrap();
    assert!(!path.is_root());
    assert_eq!(path.to_string(), "$.cells");
}
