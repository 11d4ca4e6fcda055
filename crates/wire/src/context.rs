//! Per-call encode context
//!
//! Bundles what every boxing call below the root needs: the options of the
//! current encode, the extension registry, and the path of the value being
//! boxed. Child contexts are derived with [`EncodeContext::field`] and
//! [`EncodeContext::index`]; the parent is never mutated.

use crate::options::EncodingOptions;
use crate::registry::BoxerRegistry;
use tagbox_core::CodingPath;

/// Options, registry and path for one boxing call
#[derive(Debug, Clone)]
pub struct EncodeContext<'a> {
    options: &'a EncodingOptions,
    registry: &'a BoxerRegistry,
    path: CodingPath,
}

impl<'a> EncodeContext<'a> {
    /// Root context
    pub fn new(options: &'a EncodingOptions, registry: &'a BoxerRegistry) -> Self {
        Self {
            options,
            registry,
            path: CodingPath::root(),
        }
    }

    /// Root context with no extension boxers
    pub fn with_options(options: &'a EncodingOptions) -> Self {
        Self::new(options, BoxerRegistry::empty())
    }

    /// Same options and registry, explicit path
    pub fn at(mut self, path: CodingPath) -> Self {
        self.path = path;
        self
    }

    /// Context for a struct field or map entry
    pub fn field(&self, name: impl Into<String>) -> Self {
        Self {
            options: self.options,
            registry: self.registry,
            path: self.path.field(name),
        }
    }

    /// Context for an array element
    pub fn index(&self, index: usize) -> Self {
        Self {
            options: self.options,
            registry: self.registry,
            path: self.path.index(index),
        }
    }

    /// Options of the current encode
    pub fn options(&self) -> &'a EncodingOptions {
        self.options
    }

    /// Extension boxers
    pub fn registry(&self) -> &'a BoxerRegistry {
        self.registry
    }

    /// Path of the value being boxed
    pub fn path(&self) -> &CodingPath {
        &self.path
    }
}
