//! Unified error types for tagbox.
//!
//! This module provides a clean error type that wraps the boxing errors of
//! the lower crates and presents a consistent interface to users.

use tagbox_core::{BoxError, CodingPath};
use thiserror::Error;

/// All tagbox errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A value could not be boxed or unboxed
    #[error(transparent)]
    Boxing(#[from] BoxError),

    /// Encoder configuration rejected
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for tagbox operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if a value had no boxing rule.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::Boxing(BoxError::UnsupportedType { .. }))
    }

    /// Check if a kind check and a cast disagreed.
    ///
    /// Outside of unboxing this points at a broken extension registration.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Error::Boxing(BoxError::TypeMismatch { .. }))
    }

    /// Structural path of the failing value, if the error has one.
    pub fn path(&self) -> Option<&CodingPath> {
        match self {
            Error::Boxing(e) => Some(e.path()),
            Error::InvalidConfig(_) => None,
        }
    }

    /// Canonical error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Boxing(e) => e.error_code(),
            Error::InvalidConfig(_) => "InvalidConfig",
        }
    }
}
