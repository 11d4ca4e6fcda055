//! Core types for tagbox
//!
//! This crate defines the value model every boxing operation produces:
//!
//! - [`WireValue`]: one CBOR data item (integers, floats, strings, arrays,
//!   maps, tags)
//! - [`tags`]: the tag numbers the engine assigns
//! - [`CodingPath`]: where in the tree a value sits
//! - [`BoxError`]: the error taxonomy shared by all boxing layers
//!
//! ## Examples
//!
//! ```
//! use tagbox_core::{tags, WireValue};
//!
//! let uri = WireValue::tagged(tags::URI, WireValue::from("https://example.com/"));
//! assert_eq!(uri.tag(), Some(32));
//! assert_eq!(uri.to_string(), r#"32("https://example.com/")"#);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod diagnostic;
pub mod error;
pub mod path;
pub mod tags;
pub mod value;

pub use diagnostic::to_diagnostic;
pub use error::BoxError;
pub use path::{CodingPath, PathSegment};
pub use tags::KnownTag;
pub use value::WireValue;
