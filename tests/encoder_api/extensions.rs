//! Extension Boxer Tests
//!
//! New semantic types registered on the builder, without touching dispatch.

use crate::*;
use std::any::Any;

struct Money {
    cents: i64,
    currency: &'static str,
}

struct Celsius(f64);

fn money_encoder() -> Encoder {
    Encoder::builder()
        .register::<Money, _>("money", |m, _| {
            WireValue::Array(vec![WireValue::SignedInt(m.cents), text(m.currency)])
        })
        .build()
}

// =============================================================================
// REGISTRATION
// =============================================================================

#[test]
fn test_registered_type_boxes_under_caller_tag() {
    let encoder = money_encoder();
    let value = DynValue::opaque(Money {
        cents: 1999,
        currency: "EUR",
    });
    let boxed = encoder.encode_dynamic(&value, 4).unwrap();
    assert_eq!(boxed.to_string(), r#"4([1999, "EUR"])"#);
}

#[test]
fn test_erased_unknown_type_reaches_registry() {
    let encoder = money_encoder();
    let value = DynValue::erase(Money {
        cents: -5,
        currency: "USD",
    });
    assert_eq!(value.kind(), tagbox::DynKind::Extension);
    assert!(encoder.encode_dynamic(&value, 4).is_ok());
}

#[test]
fn test_unregistered_type_still_unsupported() {
    let encoder = money_encoder();
    let err = encoder
        .encode_dynamic(&DynValue::opaque(Celsius(3.0)), 4)
        .unwrap_err();
    assert!(err.is_unsupported());
}

#[test]
fn test_registry_is_inspectable() {
    let encoder = Encoder::builder()
        .register::<Money, _>("money", |_, _| WireValue::Null)
        .register::<Celsius, _>("celsius", |c, _| WireValue::Float64(c.0))
        .build();
    assert_eq!(encoder.registry().len(), 2);
    assert_eq!(encoder.registry().kinds(), vec!["money", "celsius"]);
}

// =============================================================================
// PREDICATES
// =============================================================================

#[test]
fn test_lying_predicate_fails_loudly() {
    init_tracing();
    let encoder = Encoder::builder()
        .register_with_predicate::<Money, _, _>(
            "money",
            |_: &(dyn Any + Send + Sync)| true,
            |m, _| WireValue::SignedInt(m.cents),
        )
        .build();
    let err = encoder
        .encode_dynamic(&DynValue::opaque(Celsius(1.0)), 4)
        .unwrap_err();
    assert!(err.is_type_mismatch());
    match err {
        Error::Boxing(BoxError::TypeMismatch { expected, actual, .. }) => {
            assert!(expected.ends_with("Money"));
            assert!(actual.ends_with("Celsius"));
        }
        other => panic!("Expected TypeMismatch, got {:?}", other),
    }
}

#[test]
fn test_honest_custom_predicate() {
    let encoder = Encoder::builder()
        .register_with_predicate::<Celsius, _, _>(
            "celsius",
            |v: &(dyn Any + Send + Sync)| v.downcast_ref::<Celsius>().is_some_and(|c| c.0 >= -273.15),
            |c, _| WireValue::Float64(c.0),
        )
        .build();
    assert!(encoder.encode_dynamic(&DynValue::opaque(Celsius(20.0)), 80).is_ok());
    assert!(encoder
        .encode_dynamic(&DynValue::opaque(Celsius(-300.0)), 80)
        .unwrap_err()
        .is_unsupported());
}

// =============================================================================
// USER CONTEXT
// =============================================================================

#[test]
fn test_boxer_reads_user_context() {
    let encoder = Encoder::builder()
        .context_value("unit", "kelvin".to_string())
        .register::<Celsius, _>("celsius", |c, options| {
            match options.user_context().get::<String>("unit").map(String::as_str) {
                Some("kelvin") => WireValue::Float64(c.0 + 273.15),
                _ => WireValue::Float64(c.0),
            }
        })
        .build();
    let boxed = encoder
        .encode_dynamic(&DynValue::opaque(Celsius(0.0)), 80)
        .unwrap();
    assert_eq!(boxed, WireValue::tagged(80, WireValue::Float64(273.15)));
}

#[test]
fn test_engine_never_reads_user_context() {
    let plain = Encoder::new();
    let loaded = Encoder::builder()
        .user_context(UserContext::new().with("anything", 42u32))
        .build();
    let value = DynValue::from(7i8);
    assert_eq!(
        plain.encode_dynamic(&value, 2).unwrap(),
        loaded.encode_dynamic(&value, 2).unwrap()
    );
}
