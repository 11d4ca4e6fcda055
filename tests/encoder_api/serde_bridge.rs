//! serde Bridge Tests
//!
//! Structs, enums and maps boxed through `Encoder::encode`.

use crate::*;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Serialize)]
struct Invoice {
    #[serde(rename = "invoiceNumber")]
    invoice_number: u32,
    #[serde(rename = "lineItems")]
    line_items: Vec<LineItem>,
    status: Status,
    note: Option<String>,
}

#[derive(Serialize)]
struct LineItem {
    #[serde(rename = "SKU")]
    sku: String,
    quantity: i32,
}

#[derive(Serialize)]
enum Status {
    Draft,
    Paid { reference: String },
}

fn invoice() -> Invoice {
    Invoice {
        invoice_number: 17,
        line_items: vec![LineItem {
            sku: "K-9".into(),
            quantity: 2,
        }],
        status: Status::Draft,
        note: None,
    }
}

// =============================================================================
// STRUCTS
// =============================================================================

#[test]
fn test_struct_with_default_keys() {
    let boxed = Encoder::new().encode(&invoice()).unwrap();
    assert_eq!(
        boxed.to_string(),
        r#"{"invoiceNumber": 17, "lineItems": [{"SKU": "K-9", "quantity": 2}], "status": "Draft", "note": null}"#
    );
}

#[test]
fn test_struct_with_snake_case_keys() {
    let encoder = Encoder::builder()
        .key_naming(KeyNamingStrategy::ConvertToSnakeCase)
        .build();
    let boxed = encoder.encode(&invoice()).unwrap();
    assert!(boxed.map_get(&text("invoice_number")).is_some());
    let items = boxed.map_get(&text("line_items")).unwrap().as_array().unwrap();
    assert_eq!(items[0].map_get(&text("sku")), Some(&text("K-9")));
}

#[test]
fn test_custom_key_naming() {
    let encoder = Encoder::builder()
        .key_naming(KeyNamingStrategy::Custom(std::sync::Arc::new(|k: &str| {
            k.to_uppercase()
        })))
        .build();
    let boxed = encoder.encode(&invoice()).unwrap();
    assert!(boxed.map_get(&text("INVOICENUMBER")).is_some());
}

#[test]
fn test_map_key_order_does_not_matter_for_equality() {
    let encoder = Encoder::new();
    let boxed = encoder.encode(&invoice()).unwrap();
    let mut entries = boxed.as_map().unwrap().to_vec();
    entries.reverse();
    assert_eq!(WireValue::Map(entries), boxed);
}

// =============================================================================
// ENUMS
// =============================================================================

#[test]
fn test_struct_variant_is_single_entry_map() {
    let status = Status::Paid {
        reference: "r-1".into(),
    };
    let boxed = Encoder::new().encode(&status).unwrap();
    assert_eq!(boxed.to_string(), r#"{"Paid": {"reference": "r-1"}}"#);
}

// =============================================================================
// MAP KEYS
// =============================================================================

#[test]
fn test_int_and_text_keys_stay_apart() {
    let encoder = Encoder::new();
    let ints = encoder.encode(&BTreeMap::from([(5u32, "a")])).unwrap();
    let texts = encoder.encode(&BTreeMap::from([("5", "a")])).unwrap();
    assert_eq!(ints.as_map().unwrap()[0].0, WireValue::UnsignedInt(5));
    assert_eq!(texts.as_map().unwrap()[0].0, text("5"));
    assert_ne!(ints, texts);
}

#[test]
fn test_uuid_key_becomes_text() {
    let id = Uuid::nil();
    let boxed = Encoder::new().encode(&BTreeMap::from([(id, 1u8)])).unwrap();
    let key = &boxed.as_map().unwrap()[0].0;
    assert_eq!(key.as_str(), Some("00000000-0000-0000-0000-000000000000"));
}

// =============================================================================
// TAGS
// =============================================================================

#[test]
fn test_tagged_wrapper_inside_struct() {
    #[derive(Serialize)]
    struct Envelope {
        body: Tagged<Vec<u8>>,
    }
    let boxed = Encoder::new()
        .encode(&Envelope {
            body: Tagged::new(24, vec![1, 2]),
        })
        .unwrap();
    assert_eq!(boxed.to_string(), r#"{"body": 24([1, 2])}"#);
}

#[test]
fn test_boxed_tree_passes_through() {
    let encoder = encoder_with(DateStrategy::EpochMillisecondsInt);
    let tree = WireValue::Array(vec![
        encoder.box_value(&one_and_a_half_seconds()),
        encoder.box_value(&Uuid::nil()),
    ]);
    assert_eq!(encoder.encode(&tree).unwrap(), tree);
}

// =============================================================================
// SEMANTIC FIELDS
// =============================================================================

#[derive(Serialize)]
struct Event {
    #[serde(with = "tagbox::semantic::timestamp")]
    at: DateTime<Utc>,
    #[serde(with = "tagbox::semantic::uuid")]
    id: Uuid,
    #[serde(with = "tagbox::semantic::url")]
    feed: url::Url,
    #[serde(rename = "ackedAt")]
    acked_at: Option<Semantic<DateTime<Utc>>>,
}

fn event() -> Event {
    Event {
        at: one_and_a_half_seconds(),
        id: Uuid::nil(),
        feed: url::Url::parse("https://example.com/events").unwrap(),
        acked_at: Some(Semantic(one_and_a_half_seconds())),
    }
}

#[test]
fn test_timestamp_field_follows_date_strategy() {
    for strategy in DateStrategy::ALL {
        let encoder = encoder_with(strategy);
        let boxed = encoder.encode(&event()).unwrap();
        let expected = encoder.box_value(&one_and_a_half_seconds());
        assert_eq!(boxed.map_get(&text("at")), Some(&expected), "strategy {}", strategy);
        assert_eq!(boxed.map_get(&text("ackedAt")), Some(&expected), "strategy {}", strategy);
    }
}

#[test]
fn test_epoch_millis_field_is_tag_one() {
    let boxed = encoder_with(DateStrategy::EpochMillisecondsInt)
        .encode(&event())
        .unwrap();
    assert_eq!(
        boxed.map_get(&text("at")),
        Some(&WireValue::tagged(tags::EPOCH_DATETIME, WireValue::SignedInt(1500)))
    );
}

#[test]
fn test_uuid_and_url_fields_keep_tags() {
    let boxed = Encoder::new().encode(&event()).unwrap();
    assert_eq!(
        boxed.map_get(&text("id")),
        Some(&WireValue::tagged(tags::UUID, WireValue::ByteString(vec![0; 16])))
    );
    assert_eq!(
        boxed.map_get(&text("feed")),
        Some(&WireValue::tagged(tags::URI, text("https://example.com/events")))
    );
}

#[test]
fn test_semantic_fields_round_trip() {
    let encoder = encoder_with(DateStrategy::EpochSecondsFloat);
    let boxed = encoder.encode(&event()).unwrap();
    let at: DateTime<Utc> = encoder.unbox(boxed.map_get(&text("at")).unwrap()).unwrap();
    let id: Uuid = encoder.unbox(boxed.map_get(&text("id")).unwrap()).unwrap();
    assert_eq!(at, one_and_a_half_seconds());
    assert_eq!(id, Uuid::nil());
}
