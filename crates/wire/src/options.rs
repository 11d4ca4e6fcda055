//! Encoding options
//!
//! `EncodingOptions` is built once per top-level encode and read-only from
//! then on. Every boxing call of that encode receives it by reference.
//!
//! Formatting is stateless: timestamp strings are produced from chrono
//! format strings on each call, so no formatter lives between encodes.

use crate::scalar::DATETIME_FORMAT;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tagbox_core::tags;

/// How timestamps are put on the wire
///
/// | Strategy | Result |
/// |----------|--------|
/// | `Iso8601Text` | `0("yyyy-MM-ddTHH:mm:ss.SSS+00:00")` |
/// | `EpochSecondsFloat` | `1(<f64 seconds>)` |
/// | `EpochMillisecondsInt` | `1(<i64 milliseconds, truncated toward zero>)` |
/// | `CalendarDateText` | `1004("yyyy-MM-dd")` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateStrategy {
    /// RFC 3339 text in UTC with millisecond precision, tag 0
    #[default]
    Iso8601Text,

    /// Fractional seconds since the epoch as a double, tag 1
    EpochSecondsFloat,

    /// Whole milliseconds since the epoch as an integer, tag 1
    EpochMillisecondsInt,

    /// Calendar date only, tag 1004
    /// The time of day is dropped.
    CalendarDateText,
}

impl DateStrategy {
    /// All strategies
    pub const ALL: [DateStrategy; 4] = [
        DateStrategy::Iso8601Text,
        DateStrategy::EpochSecondsFloat,
        DateStrategy::EpochMillisecondsInt,
        DateStrategy::CalendarDateText,
    ];

    /// Human-readable name for display
    pub fn name(&self) -> &'static str {
        match self {
            DateStrategy::Iso8601Text => "iso8601_text",
            DateStrategy::EpochSecondsFloat => "epoch_seconds_float",
            DateStrategy::EpochMillisecondsInt => "epoch_milliseconds_int",
            DateStrategy::CalendarDateText => "calendar_date_text",
        }
    }

    /// Parse from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "iso8601_text" | "iso8601" | "rfc3339" => Some(DateStrategy::Iso8601Text),
            "epoch_seconds_float" | "seconds" | "epoch_seconds" => {
                Some(DateStrategy::EpochSecondsFloat)
            }
            "epoch_milliseconds_int" | "millis" | "milliseconds" | "epoch_millis" => {
                Some(DateStrategy::EpochMillisecondsInt)
            }
            "calendar_date_text" | "date" | "full_date" => Some(DateStrategy::CalendarDateText),
            _ => None,
        }
    }

    /// Tag number the strategy produces
    ///
    /// The tag depends only on the strategy, never on the timestamp.
    pub fn tag(&self) -> u64 {
        match self {
            DateStrategy::Iso8601Text => tags::STANDARD_DATETIME,
            DateStrategy::EpochSecondsFloat | DateStrategy::EpochMillisecondsInt => {
                tags::EPOCH_DATETIME
            }
            DateStrategy::CalendarDateText => tags::FULL_DATE,
        }
    }

    /// chrono format string for the text strategies
    pub fn text_format(&self) -> Option<&'static str> {
        match self {
            DateStrategy::Iso8601Text => Some(DATETIME_FORMAT),
            DateStrategy::CalendarDateText => Some(crate::scalar::DATE_FORMAT),
            _ => None,
        }
    }
}

impl fmt::Display for DateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How struct field names become map keys
#[derive(Clone, Default)]
pub enum KeyNamingStrategy {
    /// Field names as declared
    #[default]
    UseDefaultKeys,

    /// `camelCase` / `PascalCase` names to `snake_case`
    ConvertToSnakeCase,

    /// Caller-supplied renaming
    Custom(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl KeyNamingStrategy {
    /// Apply the strategy to one field name
    pub fn apply(&self, key: &str) -> String {
        match self {
            KeyNamingStrategy::UseDefaultKeys => key.to_string(),
            KeyNamingStrategy::ConvertToSnakeCase => to_snake_case(key),
            KeyNamingStrategy::Custom(rename) => rename(key),
        }
    }

    /// Human-readable name for display
    pub fn name(&self) -> &'static str {
        match self {
            KeyNamingStrategy::UseDefaultKeys => "use_default_keys",
            KeyNamingStrategy::ConvertToSnakeCase => "convert_to_snake_case",
            KeyNamingStrategy::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for KeyNamingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Convert a camel-case identifier to snake case
///
/// Acronym runs stay together: `myURLValue` becomes `my_url_value`.
/// Leading and trailing underscores are kept.
pub fn to_snake_case(key: &str) -> String {
    let trimmed_start = key.trim_start_matches('_');
    let leading = &key[..key.len() - trimmed_start.len()];
    let core = trimmed_start.trim_end_matches('_');
    let trailing = &trimmed_start[core.len()..];

    let chars: Vec<char> = core.chars().collect();
    let mut out = String::with_capacity(core.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let starts_word = match prev {
                None | Some('_') => false,
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                // End of an acronym run: "URLValue" splits before "V"
                Some(p) if p.is_uppercase() => next.map_or(false, |n| n.is_lowercase()),
                Some(_) => false,
            };
            if starts_word {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    format!("{}{}{}", leading, out, trailing)
}

/// Caller-supplied context, never inspected by the engine
///
/// Extension boxers can read it through
/// [`EncodingOptions::user_context`].
#[derive(Clone, Default)]
pub struct UserContext {
    entries: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl UserContext {
    /// Empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under `key`, replacing any previous one
    pub fn insert<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.entries.insert(key.into(), Arc::new(value));
    }

    /// Builder form of [`UserContext::insert`]
    pub fn with<T: Any + Send + Sync>(mut self, key: impl Into<String>, value: T) -> Self {
        self.insert(key, value);
        self
    }

    /// Typed lookup; `None` if absent or of another type
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.entries.get(key)?.downcast_ref::<T>()
    }

    /// Check if a key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for UserContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.entries.keys().collect();
        keys.sort();
        f.debug_struct("UserContext").field("keys", &keys).finish()
    }
}

/// Per-encode configuration - immutable after construction
#[derive(Debug, Clone, Default)]
pub struct EncodingOptions {
    date_strategy: DateStrategy,
    key_naming: KeyNamingStrategy,
    user_context: UserContext,
}

impl EncodingOptions {
    /// Options with every default
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timestamp strategy
    pub fn with_date_strategy(mut self, strategy: DateStrategy) -> Self {
        self.date_strategy = strategy;
        self
    }

    /// Set the field naming strategy
    pub fn with_key_naming(mut self, strategy: KeyNamingStrategy) -> Self {
        self.key_naming = strategy;
        self
    }

    /// Set the caller-supplied context
    pub fn with_user_context(mut self, context: UserContext) -> Self {
        self.user_context = context;
        self
    }

    /// Timestamp strategy
    pub fn date_strategy(&self) -> DateStrategy {
        self.date_strategy
    }

    /// Field naming strategy
    pub fn key_naming(&self) -> &KeyNamingStrategy {
        &self.key_naming
    }

    /// Caller-supplied context
    pub fn user_context(&self) -> &UserContext {
        &self.user_context
    }
}
