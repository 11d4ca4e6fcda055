//! Convenient imports for tagbox.
//!
//! This module re-exports the most commonly used types so you can get started
//! with a single import:
//!
//! ```
//! use tagbox::prelude::*;
//!
//! let encoder = Encoder::new();
//! let boxed = encoder.encode_dynamic(&DynValue::from(true), 5)?;
//! assert_eq!(boxed, WireValue::tagged(5, WireValue::Bool(true)));
//! # Ok::<(), tagbox::Error>(())
//! ```

// Main entry point
pub use crate::encoder::{Encoder, EncoderBuilder};

// Error handling
pub use crate::error::{Error, Result};

// Value model
pub use tagbox_core::{tags, BoxError, CodingPath, WireValue};

// Options
pub use tagbox_wire::{DateStrategy, EncodingOptions, KeyNamingStrategy, UserContext};

// Boxing surface
pub use tagbox_wire::{Boxable, DynValue, FromWire, Semantic, Tagged};
