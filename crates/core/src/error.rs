//! Boxing error types
//!
//! ## Error Codes (Canonical)
//!
//! These codes are frozen and must not change:
//!
//! | Code | Description |
//! |------|-------------|
//! | UnsupportedType | Runtime kind has no boxing rule and is not decomposable |
//! | TypeMismatch | Kind check and cast disagree, or unboxing found the wrong kind |
//! | Message | Free-form error raised by a `Serialize` implementation |
//!
//! Precision loss (decimal to 64-bit float) is NOT an error.

use crate::path::CodingPath;
use std::fmt;
use thiserror::Error;

/// Error raised by dynamic dispatch, the serde bridge, or unboxing
///
/// Every variant carries the structural path of the failing value.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BoxError {
    /// Value's runtime kind has no boxing rule
    #[error("unsupported type {kind} at {path}")]
    UnsupportedType {
        /// Name of the kind that was attempted
        kind: String,
        /// Where the value sits in the tree
        path: CodingPath,
    },

    /// A kind check claimed the value but the cast disagreed
    #[error("type mismatch at {path}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Kind the check claimed
        expected: String,
        /// Kind actually found
        actual: String,
        /// Where the value sits in the tree
        path: CodingPath,
    },

    /// Custom message from a `Serialize` implementation
    #[error("{message} at {path}")]
    Message {
        /// Error text
        message: String,
        /// Where the value sits in the tree
        path: CodingPath,
    },
}

impl BoxError {
    /// Create an unsupported-type error
    pub fn unsupported(kind: impl Into<String>, path: &CodingPath) -> Self {
        BoxError::UnsupportedType {
            kind: kind.into(),
            path: path.clone(),
        }
    }

    /// Create a type-mismatch error
    pub fn mismatch(
        expected: impl Into<String>,
        actual: impl Into<String>,
        path: &CodingPath,
    ) -> Self {
        BoxError::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
            path: path.clone(),
        }
    }

    /// Get the canonical error code
    pub fn error_code(&self) -> &'static str {
        match self {
            BoxError::UnsupportedType { .. } => "UnsupportedType",
            BoxError::TypeMismatch { .. } => "TypeMismatch",
            BoxError::Message { .. } => "Message",
        }
    }

    /// Structural path of the failing value
    pub fn path(&self) -> &CodingPath {
        match self {
            BoxError::UnsupportedType { path, .. }
            | BoxError::TypeMismatch { path, .. }
            | BoxError::Message { path, .. } => path,
        }
    }

    /// Attach `path` if the error does not carry one yet
    ///
    /// Errors raised deep in the tree keep their own, more precise path.
    pub fn at_path(mut self, at: &CodingPath) -> Self {
        let path = match &mut self {
            BoxError::UnsupportedType { path, .. }
            | BoxError::TypeMismatch { path, .. }
            | BoxError::Message { path, .. } => path,
        };
        if path.is_root() {
            *path = at.clone();
        }
        self
    }
}

impl serde::ser::Error for BoxError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        BoxError::Message {
            message: msg.to_string(),
            path: CodingPath::root(),
        }
    }
}
