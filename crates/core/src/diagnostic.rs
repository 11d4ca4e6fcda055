//! Diagnostic notation for WireValue
//!
//! Renders a value tree in the CBOR diagnostic notation of RFC 8949 §8,
//! which is what log lines and assertion messages show:
//!
//! | Kind | Notation |
//! |------|----------|
//! | Null | `null` |
//! | Bool | `true` / `false` |
//! | Integers | `42`, `-7` |
//! | Floats | `1.5`, `NaN`, `Infinity`, `-Infinity` |
//! | ByteString | `h'0102ff'` |
//! | TextString | `"..."` |
//! | Array | `[1, 2]` |
//! | Map | `{1: "a", "b": true}` |
//! | Tagged | `32("https://example.com/")` |

use crate::value::WireValue;
use std::fmt;

/// Render a value in diagnostic notation
pub fn to_diagnostic(value: &WireValue) -> String {
    match value {
        WireValue::Null => "null".to_string(),
        WireValue::Bool(b) => b.to_string(),
        WireValue::UnsignedInt(u) => u.to_string(),
        WireValue::SignedInt(i) => i.to_string(),
        WireValue::Float32(f) => format_float(f64::from(*f), f.to_string()),
        WireValue::Float64(f) => format_float(*f, f.to_string()),
        WireValue::ByteString(b) => format_bytes(b),
        WireValue::TextString(s) => format_text(s),
        WireValue::Array(arr) => {
            let elements: Vec<String> = arr.iter().map(to_diagnostic).collect();
            format!("[{}]", elements.join(", "))
        }
        WireValue::Map(entries) => {
            // Entry order as stored; duplicates shown as-is
            let pairs: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{}: {}", to_diagnostic(k), to_diagnostic(v)))
                .collect();
            format!("{{{}}}", pairs.join(", "))
        }
        WireValue::Tagged(tag, inner) => format!("{}({})", tag, to_diagnostic(inner)),
    }
}

/// `rendered` is the width-specific shortest form
fn format_float(f: f64, rendered: String) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f == f64::INFINITY {
        "Infinity".to_string()
    } else if f == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if rendered.contains('.') || rendered.contains('e') || rendered.contains('E') {
        rendered
    } else {
        format!("{}.0", rendered)
    }
}

fn format_bytes(bytes: &[u8]) -> String {
    let mut result = String::with_capacity(bytes.len() * 2 + 3);
    result.push_str("h'");
    for b in bytes {
        result.push_str(&format!("{:02x}", b));
    }
    result.push('\'');
    result
}

fn format_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push('"');
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result.push('"');
    result
}

impl fmt::Display for WireValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_diagnostic(self))
    }
}
