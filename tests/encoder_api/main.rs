//! Encoder API Test Suite
//!
//! Exercises the public surface of the `tagbox` crate end to end: scalar
//! boxing, dynamic dispatch under caller tags, the serde bridge, extension
//! boxers and concurrent use of one encoder.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all encoder tests
//! cargo test --test encoder_api
//!
//! # Run dynamic dispatch tests only
//! cargo test --test encoder_api dynamic::
//! ```

use chrono::{DateTime, TimeZone, Utc};
use tagbox::prelude::*;

// Test modules
pub mod concurrency;
pub mod dynamic;
pub mod extensions;
pub mod scalars;
pub mod serde_bridge;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

/// Encoder with the given date strategy and nothing else configured
pub fn encoder_with(strategy: DateStrategy) -> Encoder {
    Encoder::builder().date_strategy(strategy).build()
}

/// 1.5 seconds past the epoch
pub fn one_and_a_half_seconds() -> DateTime<Utc> {
    Utc.timestamp_millis_opt(1500).unwrap()
}

/// Shorthand for a text string
pub fn text(s: &str) -> WireValue {
    WireValue::TextString(s.to_string())
}

/// Install a fmt subscriber once so `RUST_LOG`-style output shows up with
/// `--nocapture`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}
