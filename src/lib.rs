//! # tagbox
//!
//! Typed-value boxing into CBOR-shaped trees.
//!
//! tagbox turns Rust values into [`WireValue`] trees: integers keep their
//! signedness, floats keep their width, and semantic types (URLs, UUIDs,
//! timestamps, calendar dates) get the standard CBOR tag for their kind.
//! A serde-based CBOR writer can then emit the tree as-is.
//!
//! ## Quick Start
//!
//! ```
//! use tagbox::prelude::*;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Reading {
//!     #[serde(rename = "sensorId")]
//!     sensor_id: u32,
//!     value: f64,
//! }
//!
//! let encoder = Encoder::builder()
//!     .key_naming(KeyNamingStrategy::ConvertToSnakeCase)
//!     .build();
//!
//! let boxed = encoder.encode(&Reading { sensor_id: 7, value: 0.5 })?;
//! assert_eq!(boxed.to_string(), r#"{"sensor_id": 7, "value": 0.5}"#);
//! # Ok::<(), tagbox::Error>(())
//! ```
//!
//! ## Layers
//!
//! - [`scalar`] - one infallible boxer per primitive or semantic type
//! - [`dynamic`] - type-erased values boxed under a caller tag
//! - [`container`] - arrays and maps, map key normalization
//! - [`registry`] - extension boxers for new semantic types
//! - [`ser`] - the serde bridge
//! - [`semantic`] - serde adapters that keep tags on chrono, uuid and url fields
//! - [`unbox`] - the inverse of scalar boxing

#![warn(missing_docs)]

mod encoder;
mod error;

pub mod prelude;

// Re-export main entry points
pub use encoder::{Encoder, EncoderBuilder};
pub use error::{Error, Result};

// Re-export the value model
pub use tagbox_core::{diagnostic, tags, to_diagnostic, BoxError, CodingPath, KnownTag, PathSegment, WireValue};

// Re-export the boxing layers
pub use tagbox_wire::{container, dynamic, options, registry, scalar, semantic, ser, unbox};
pub use tagbox_wire::{
    BoxerRegistry, Boxable, DateStrategy, DynKind, DynValue, EncodeContext, EncodingOptions,
    FromWire, KeyNamingStrategy, MapKey, Semantic, Tagged, UserContext, DISPATCH_ORDER,
};
