//! Main encoding entry point for tagbox.
//!
//! This module provides the `Encoder` struct, which owns one immutable set of
//! options plus the extension boxers and runs every boxing layer against them.

use crate::error::{Error, Result};
use serde::Serialize;
use std::any::Any;
use std::sync::Arc;
use tagbox_core::WireValue;
use tagbox_wire::{
    box_dynamic, to_wire_value, unbox, Boxable, BoxerRegistry, DateStrategy, DynValue,
    EncodeContext, EncodingOptions, FromWire, KeyNamingStrategy, UserContext,
};
use tracing::debug;

/// The tagbox encoder.
///
/// Read-only after construction, so one encoder can serve any number of
/// threads. Cloning is cheap: the extension registry is shared.
///
/// # Example
///
/// ```
/// use tagbox::prelude::*;
///
/// let encoder = Encoder::builder()
///     .date_strategy(DateStrategy::EpochMillisecondsInt)
///     .build();
///
/// let boxed = encoder.encode(&vec![1u8, 2, 3])?;
/// assert_eq!(boxed.to_string(), "[1, 2, 3]");
/// # Ok::<(), tagbox::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Encoder {
    options: EncodingOptions,
    registry: Arc<BoxerRegistry>,
}

impl Encoder {
    /// Create an encoder with default options and no extension boxers.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a builder for encoder configuration.
    pub fn builder() -> EncoderBuilder {
        EncoderBuilder::new()
    }

    /// Box any `Serialize` value through the serde bridge.
    ///
    /// Structs become maps, sequences become arrays, and an explicit
    /// [`Tagged`](tagbox_wire::Tagged) wrapper becomes a tag.
    pub fn encode<T>(&self, value: &T) -> Result<WireValue>
    where
        T: Serialize + ?Sized,
    {
        to_wire_value(value, &self.context()).map_err(Error::from)
    }

    /// Box a type-erased value and wrap it in `tag`.
    ///
    /// The caller's tag is always the outermost layer.
    pub fn encode_dynamic(&self, value: &DynValue, tag: u64) -> Result<WireValue> {
        box_dynamic(value, tag, &self.context()).map_err(Error::from)
    }

    /// Box a value whose static type has a scalar boxing rule. Cannot fail.
    pub fn box_value<T>(&self, value: &T) -> WireValue
    where
        T: Boxable + ?Sized,
    {
        value.box_value(&self.options)
    }

    /// Rebuild a scalar from its boxed form under this encoder's options.
    pub fn unbox<T: FromWire>(&self, value: &WireValue) -> Result<T> {
        unbox(value, &self.options).map_err(Error::from)
    }

    /// Root context for direct calls into the boxing layers.
    pub fn context(&self) -> EncodeContext<'_> {
        EncodeContext::new(&self.options, &self.registry)
    }

    /// Options of every encode run by this encoder.
    pub fn options(&self) -> &EncodingOptions {
        &self.options
    }

    /// Extension boxers.
    pub fn registry(&self) -> &BoxerRegistry {
        &self.registry
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for encoder configuration.
///
/// # Example
///
/// ```
/// use tagbox::prelude::*;
///
/// struct Celsius(f64);
///
/// let encoder = Encoder::builder()
///     .key_naming(KeyNamingStrategy::ConvertToSnakeCase)
///     .register::<Celsius, _>("celsius", |c, _| WireValue::Float64(c.0))
///     .build();
///
/// let boxed = encoder.encode_dynamic(&DynValue::opaque(Celsius(21.5)), 80)?;
/// assert_eq!(boxed, WireValue::tagged(80, WireValue::Float64(21.5)));
/// # Ok::<(), tagbox::Error>(())
/// ```
pub struct EncoderBuilder {
    options: EncodingOptions,
    registry: BoxerRegistry,
}

impl EncoderBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            options: EncodingOptions::new(),
            registry: BoxerRegistry::new(),
        }
    }

    /// Set how timestamps are boxed.
    pub fn date_strategy(mut self, strategy: DateStrategy) -> Self {
        self.options = self.options.with_date_strategy(strategy);
        self
    }

    /// Set the date strategy by name, as read from a config file.
    ///
    /// Accepts the same names and aliases as [`DateStrategy::parse`].
    pub fn date_strategy_named(self, name: &str) -> Result<Self> {
        let strategy = DateStrategy::parse(name)
            .ok_or_else(|| Error::InvalidConfig(format!("unknown date strategy '{}'", name)))?;
        Ok(self.date_strategy(strategy))
    }

    /// Set how struct field names are rewritten.
    pub fn key_naming(mut self, strategy: KeyNamingStrategy) -> Self {
        self.options = self.options.with_key_naming(strategy);
        self
    }

    /// Replace the user context handed to extension boxers.
    pub fn user_context(mut self, context: UserContext) -> Self {
        self.options = self.options.with_user_context(context);
        self
    }

    /// Add one entry to the user context.
    pub fn context_value<T: Any + Send + Sync>(
        mut self,
        key: impl Into<String>,
        value: T,
    ) -> Self {
        let context = self.options.user_context().clone().with(key, value);
        self.options = self.options.with_user_context(context);
        self
    }

    /// Register an extension boxer for values of type `T`.
    pub fn register<T, F>(mut self, kind: &'static str, boxer: F) -> Self
    where
        T: Any,
        F: Fn(&T, &EncodingOptions) -> WireValue + Send + Sync + 'static,
    {
        self.registry.register::<T, F>(kind, boxer);
        self
    }

    /// Register an extension boxer with a custom type predicate.
    ///
    /// If the predicate accepts a value that is not a `T`, encoding that
    /// value fails with a type mismatch.
    pub fn register_with_predicate<T, P, F>(mut self, kind: &'static str, predicate: P, boxer: F) -> Self
    where
        T: Any,
        P: Fn(&(dyn Any + Send + Sync)) -> bool + Send + Sync + 'static,
        F: Fn(&T, &EncodingOptions) -> WireValue + Send + Sync + 'static,
    {
        self.registry.register_with_predicate::<T, P, F>(kind, predicate, boxer);
        self
    }

    /// Build the encoder.
    pub fn build(self) -> Encoder {
        debug!(
            date_strategy = self.options.date_strategy().name(),
            key_naming = self.options.key_naming().name(),
            extensions = self.registry.len(),
            "built encoder"
        );
        Encoder {
            options: self.options,
            registry: Arc::new(self.registry),
        }
    }
}

impl Default for EncoderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
