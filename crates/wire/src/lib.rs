//! Boxing engine for tagbox
//!
//! Turns typed Rust values into [`WireValue`] trees ready for a CBOR writer.
//!
//! ## Layers
//!
//! | Module | Role |
//! |--------|------|
//! | [`scalar`] | one infallible boxer per primitive or semantic type |
//! | [`dynamic`] | boxing of type-erased values under a caller tag |
//! | [`container`] | array and map assembly, map key normalization |
//! | [`registry`] | extension boxers for new semantic types |
//! | [`ser`] | serde bridge for any `Serialize` value |
//! | [`semantic`] | serde adapters that keep tags on chrono, uuid and url fields |
//! | [`unbox`] | the inverse of scalar boxing |
//!
//! Everything runs against one immutable [`EncodingOptions`] per encode.
//!
//! ## Examples
//!
//! ```
//! use tagbox_wire::{box_dynamic, DynValue, EncodeContext, EncodingOptions};
//! use tagbox_core::WireValue;
//!
//! let options = EncodingOptions::new();
//! let ctx = EncodeContext::with_options(&options);
//! let boxed = box_dynamic(&DynValue::from(true), 7, &ctx).unwrap();
//! assert_eq!(boxed, WireValue::tagged(7, WireValue::Bool(true)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod container;
pub mod context;
pub mod dynamic;
pub mod options;
pub mod registry;
pub mod scalar;
pub mod semantic;
pub mod ser;
pub mod unbox;

pub use container::{assemble_array, assemble_map, MapKey};
pub use context::EncodeContext;
pub use dynamic::{box_dynamic, box_erased, DynKind, DynValue, NestedValue, OpaqueValue, DISPATCH_ORDER};
pub use options::{DateStrategy, EncodingOptions, KeyNamingStrategy, UserContext};
pub use registry::BoxerRegistry;
pub use scalar::Boxable;
pub use semantic::{Semantic, SemanticScalar};
pub use ser::{to_wire_value, Tagged, WireSerializer};
pub use unbox::{unbox, FromWire};

pub use tagbox_core::{BoxError, CodingPath, WireValue};
