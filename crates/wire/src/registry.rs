//! Extension boxers
//!
//! New semantic types are added by registering a `(kind, predicate, boxer)`
//! entry instead of touching the dispatch core. Opaque values that none of
//! the built-in kinds claim are offered to each entry in registration
//! order; the first predicate that accepts the value wins.
//!
//! A predicate that accepts a value its boxer cannot downcast is a broken
//! registration. Dispatch fails with `TypeMismatch` instead of guessing.

use crate::dynamic::OpaqueValue;
use crate::options::EncodingOptions;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tagbox_core::{BoxError, CodingPath, WireValue};
use tracing::{debug, warn};

type Predicate = Arc<dyn Fn(&(dyn Any + Send + Sync)) -> bool + Send + Sync>;
type BoxFn = Arc<dyn Fn(&(dyn Any + Send + Sync), &EncodingOptions) -> Option<WireValue> + Send + Sync>;

#[derive(Clone)]
struct Extension {
    kind: &'static str,
    target: &'static str,
    predicate: Predicate,
    boxer: BoxFn,
}

/// Ordered list of extension boxers
#[derive(Clone, Default)]
pub struct BoxerRegistry {
    extensions: Vec<Extension>,
}

static EMPTY: BoxerRegistry = BoxerRegistry {
    extensions: Vec::new(),
};

impl BoxerRegistry {
    /// Registry with no entries
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared empty registry
    pub fn empty() -> &'static BoxerRegistry {
        &EMPTY
    }

    /// Register a boxer for values of type `T`
    ///
    /// The predicate is an exact type check, so this entry can never
    /// produce a `TypeMismatch`.
    pub fn register<T, F>(&mut self, kind: &'static str, boxer: F) -> &mut Self
    where
        T: Any,
        F: Fn(&T, &EncodingOptions) -> WireValue + Send + Sync + 'static,
    {
        self.register_with_predicate::<T, _, _>(kind, |value| value.is::<T>(), boxer)
    }

    /// Register a boxer with a custom predicate
    ///
    /// If `predicate` accepts a value that is not a `T`, dispatch of that
    /// value fails with `TypeMismatch`.
    pub fn register_with_predicate<T, P, F>(
        &mut self,
        kind: &'static str,
        predicate: P,
        boxer: F,
    ) -> &mut Self
    where
        T: Any,
        P: Fn(&(dyn Any + Send + Sync)) -> bool + Send + Sync + 'static,
        F: Fn(&T, &EncodingOptions) -> WireValue + Send + Sync + 'static,
    {
        debug!(kind, type_name = std::any::type_name::<T>(), "registered extension boxer");
        self.extensions.push(Extension {
            kind,
            target: std::any::type_name::<T>(),
            predicate: Arc::new(predicate),
            boxer: Arc::new(
                move |value: &(dyn Any + Send + Sync), options: &EncodingOptions| {
                    value.downcast_ref::<T>().map(|v| boxer(v, options))
                },
            ),
        });
        self
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Kind names, in registration order
    pub fn kinds(&self) -> Vec<&'static str> {
        self.extensions.iter().map(|e| e.kind).collect()
    }

    /// Box an opaque value with the first entry that claims it
    pub(crate) fn box_opaque(
        &self,
        value: &OpaqueValue,
        options: &EncodingOptions,
        path: &CodingPath,
    ) -> Result<WireValue, BoxError> {
        let Some(extension) = self
            .extensions
            .iter()
            .find(|e| (e.predicate)(value.value()))
        else {
            debug!(kind = value.type_name(), %path, "no boxing rule for opaque value");
            return Err(BoxError::unsupported(value.type_name(), path));
        };

        match (extension.boxer)(value.value(), options) {
            Some(boxed) => Ok(boxed),
            None => {
                warn!(
                    kind = extension.kind,
                    expected = extension.target,
                    actual = value.type_name(),
                    %path,
                    "extension predicate accepted a value its boxer cannot cast"
                );
                Err(BoxError::mismatch(extension.target, value.type_name(), path))
            }
        }
    }
}

impl fmt::Debug for BoxerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxerRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
