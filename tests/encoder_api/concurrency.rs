//! Concurrency Tests
//!
//! One encoder shared across threads; encodes are independent.

use crate::*;
use std::sync::Arc;
use std::thread;

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_shared_types_are_send_sync() {
    assert_send_sync::<Encoder>();
    assert_send_sync::<EncodingOptions>();
    assert_send_sync::<tagbox::BoxerRegistry>();
    assert_send_sync::<WireValue>();
    assert_send_sync::<Error>();
}

#[test]
fn test_parallel_encodes_are_independent() {
    let encoder = Arc::new(encoder_with(DateStrategy::EpochMillisecondsInt));
    let handles: Vec<_> = (0..8i64)
        .map(|i| {
            let encoder = Arc::clone(&encoder);
            thread::spawn(move || {
                (0..200i64)
                    .map(|j| {
                        let ts = Utc.timestamp_millis_opt(i * 1_000_000 + j).unwrap();
                        encoder.box_value(&ts)
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let results = handle.join().unwrap();
        for (j, boxed) in results.iter().enumerate() {
            let expected = i as i64 * 1_000_000 + j as i64;
            assert_eq!(boxed, &WireValue::tagged(1, WireValue::SignedInt(expected)));
        }
    }
}

#[test]
fn test_cloned_encoders_share_registry() {
    let encoder = Encoder::builder()
        .register::<u128, _>("wide", |v, _| text(&v.to_string()))
        .build();
    let clone = encoder.clone();
    let handle = thread::spawn(move || clone.encode_dynamic(&DynValue::opaque(7u128), 3).unwrap());
    assert_eq!(handle.join().unwrap(), WireValue::tagged(3, text("7")));
    assert_eq!(encoder.registry().len(), 1);
}
