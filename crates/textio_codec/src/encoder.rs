//! Canonical text encoder.

use crate::error::{CodecError, CodecResult};
use crate::value::{Number, Value};
use crate::MAX_DEPTH;
use std::fmt::{self, Write};

/// Encode a value to its canonical text form.
///
/// The canonical form is deterministic:
/// - `", "` between items and `": "` between key and value
/// - Object keys in insertion order
/// - Non-ASCII characters escaped as `\uXXXX`
/// - Floats in shortest round-trip form, always with a `.` or exponent
///
/// ```
/// use textio_codec::{encode, Value};
///
/// let value: Value = [("one", 1), ("two", 2), ("three", 3)].into_iter().collect();
/// assert_eq!(encode(&value).unwrap(), r#"{"one": 1, "two": 2, "three": 3}"#);
/// ```
///
/// # Errors
///
/// Returns an error if the value contains a non-finite float or nests
/// deeper than [`MAX_DEPTH`].
pub fn encode(value: &Value) -> CodecResult<String> {
    encode_with(value, &EncodeOptions::default())
}

/// Encode a value with explicit formatting options.
///
/// # Errors
///
/// Same as [`encode`].
pub fn encode_with(value: &Value, options: &EncodeOptions) -> CodecResult<String> {
    let mut encoder = CanonicalEncoder::new(options.clone());
    encoder.encode(value)?;
    Ok(encoder.into_string())
}

/// Formatting options for the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Pretty-print with this many spaces per level; `None` is single-line.
    pub indent: Option<usize>,
    /// Emit object keys in sorted order instead of insertion order.
    pub sort_keys: bool,
    /// Escape every non-ASCII character.
    pub ensure_ascii: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            indent: None,
            sort_keys: false,
            ensure_ascii: true,
        }
    }
}

impl EncodeOptions {
    /// Creates the canonical options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the indent width.
    #[must_use]
    pub const fn indent(mut self, width: usize) -> Self {
        self.indent = Some(width);
        self
    }

    /// Sets whether keys are sorted.
    #[must_use]
    pub const fn sort_keys(mut self, value: bool) -> Self {
        self.sort_keys = value;
        self
    }

    /// Sets whether non-ASCII characters are escaped.
    #[must_use]
    pub const fn ensure_ascii(mut self, value: bool) -> Self {
        self.ensure_ascii = value;
        self
    }
}

/// A canonical text encoder.
pub struct CanonicalEncoder {
    buffer: String,
    options: EncodeOptions,
    depth: usize,
}

impl CanonicalEncoder {
    /// Create a new encoder.
    pub fn new(options: EncodeOptions) -> Self {
        Self {
            buffer: String::new(),
            options,
            depth: 0,
        }
    }

    /// Encode a value, appending to the internal buffer.
    pub fn encode(&mut self, value: &Value) -> CodecResult<()> {
        match value {
            Value::Null => self.buffer.push_str("null"),
            Value::Bool(b) => self.buffer.push_str(if *b { "true" } else { "false" }),
            Value::Number(n) => self.encode_number(*n)?,
            Value::String(s) => self.encode_string(s),
            Value::Array(items) => self.encode_array(items)?,
            Value::Object(map) => {
                let mut entries: Vec<(&String, &Value)> = map.iter().collect();
                if self.options.sort_keys {
                    entries.sort_by(|a, b| a.0.cmp(b.0));
                }
                self.encode_object(&entries)?;
            }
        }
        Ok(())
    }

    /// Consume this encoder and return the encoded text.
    pub fn into_string(self) -> String {
        self.buffer
    }

    /// Get a reference to the encoded text.
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    fn encode_number(&mut self, number: Number) -> CodecResult<()> {
        match number {
            Number::Int(n) => {
                let _ = write!(self.buffer, "{n}");
            }
            Number::Float(f) => {
                if !f.is_finite() {
                    return Err(CodecError::NonFiniteNumber);
                }
                // Debug keeps a trailing ".0" and switches to exponent
                // notation for very large or small magnitudes.
                let _ = write!(self.buffer, "{f:?}");
            }
        }
        Ok(())
    }

    fn encode_string(&mut self, s: &str) {
        self.buffer.push('"');
        for c in s.chars() {
            match c {
                '"' => self.buffer.push_str("\\\""),
                '\\' => self.buffer.push_str("\\\\"),
                '\n' => self.buffer.push_str("\\n"),
                '\r' => self.buffer.push_str("\\r"),
                '\t' => self.buffer.push_str("\\t"),
                '\u{8}' => self.buffer.push_str("\\b"),
                '\u{c}' => self.buffer.push_str("\\f"),
                c if (c as u32) < 0x20 => self.push_unit(c as u16),
                c if self.options.ensure_ascii && !(' '..='~').contains(&c) => {
                    let mut units = [0u16; 2];
                    for unit in c.encode_utf16(&mut units) {
                        self.push_unit(*unit);
                    }
                }
                c => self.buffer.push(c),
            }
        }
        self.buffer.push('"');
    }

    fn push_unit(&mut self, unit: u16) {
        let _ = write!(self.buffer, "\\u{unit:04x}");
    }

    fn enter(&mut self) -> CodecResult<()> {
        if self.depth >= MAX_DEPTH {
            return Err(CodecError::RecursionLimit { limit: MAX_DEPTH });
        }
        self.depth += 1;
        Ok(())
    }

    fn newline(&mut self) {
        if let Some(width) = self.options.indent {
            self.buffer.push('\n');
            for _ in 0..width * self.depth {
                self.buffer.push(' ');
            }
        }
    }

    fn item_separator(&mut self) {
        if self.options.indent.is_some() {
            self.buffer.push(',');
        } else {
            self.buffer.push_str(", ");
        }
    }

    fn encode_array(&mut self, items: &[Value]) -> CodecResult<()> {
        if items.is_empty() {
            self.buffer.push_str("[]");
            return Ok(());
        }

        self.enter()?;
        self.buffer.push('[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.item_separator();
            }
            self.newline();
            self.encode(item)?;
        }
        self.depth -= 1;
        self.newline();
        self.buffer.push(']');
        Ok(())
    }

    fn encode_object(&mut self, entries: &[(&String, &Value)]) -> CodecResult<()> {
        if entries.is_empty() {
            self.buffer.push_str("{}");
            return Ok(());
        }

        self.enter()?;
        self.buffer.push('{');
        for (i, (key, value)) in entries.iter().enumerate() {
            if i > 0 {
                self.item_separator();
            }
            self.newline();
            self.encode_string(key);
            self.buffer.push_str(": ");
            self.encode(value)?;
        }
        self.depth -= 1;
        self.newline();
        self.buffer.push('}');
        Ok(())
    }
}

impl Default for CanonicalEncoder {
    fn default() -> Self {
        Self::new(EncodeOptions::default())
    }
}

/// Formats the canonical encoding.
///
/// Values that cannot be encoded (non-finite floats, excessive nesting)
/// report `fmt::Error`; use [`encode`] to get the reason.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = encode(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Map;

    fn object(pairs: &[(&str, Value)]) -> Value {
        pairs.iter().cloned().collect()
    }

    #[test]
    fn encode_scalars() {
        assert_eq!(encode(&Value::Null).unwrap(), "null");
        assert_eq!(encode(&Value::Bool(true)).unwrap(), "true");
        assert_eq!(encode(&Value::Bool(false)).unwrap(), "false");
        assert_eq!(encode(&Value::from(-42)).unwrap(), "-42");
        assert_eq!(encode(&Value::from(i64::MIN)).unwrap(), "-9223372036854775808");
    }

    #[test]
    fn encode_canonical_mapping() {
        let value = object(&[
            ("one", Value::from(1)),
            ("two", Value::from(2)),
            ("three", Value::from(3)),
        ]);
        assert_eq!(encode(&value).unwrap(), r#"{"one": 1, "two": 2, "three": 3}"#);
    }

    #[test]
    fn encode_canonical_sequence() {
        assert_eq!(encode(&Value::from(vec![1, 2, 3])).unwrap(), "[1, 2, 3]");
        assert_eq!(encode(&Value::Array(vec![])).unwrap(), "[]");
        assert_eq!(encode(&Value::Object(Map::new())).unwrap(), "{}");
    }

    #[test]
    fn encode_floats_keep_their_kind() {
        assert_eq!(encode(&Value::from(1.0)).unwrap(), "1.0");
        assert_eq!(encode(&Value::from(0.1)).unwrap(), "0.1");
        assert_eq!(encode(&Value::from(-2.5)).unwrap(), "-2.5");
        assert_eq!(encode(&Value::from(1e20)).unwrap(), "1e20");
        assert_eq!(encode(&Value::from(1.5e-7)).unwrap(), "1.5e-7");
    }

    #[test]
    fn encode_rejects_non_finite() {
        assert_eq!(
            encode(&Value::from(f64::NAN)),
            Err(CodecError::NonFiniteNumber)
        );
        assert_eq!(
            encode(&Value::from(vec![f64::NEG_INFINITY])),
            Err(CodecError::NonFiniteNumber)
        );
    }

    #[test]
    fn encode_string_escapes() {
        assert_eq!(
            encode(&Value::from("a\"b\\c\nd\te")).unwrap(),
            r#""a\"b\\c\nd\te""#
        );
        assert_eq!(encode(&Value::from("\u{1}")).unwrap(), r#""\u0001""#);
        assert_eq!(encode(&Value::from("\u{7f}")).unwrap(), r#""\u007f""#);
    }

    #[test]
    fn encode_non_ascii_escaped_by_default() {
        assert_eq!(encode(&Value::from("你好")).unwrap(), r#""\u4f60\u597d""#);
        // Astral characters become surrogate pairs
        assert_eq!(encode(&Value::from("😀")).unwrap(), r#""\ud83d\ude00""#);
    }

    #[test]
    fn encode_non_ascii_verbatim_when_allowed() {
        let options = EncodeOptions::new().ensure_ascii(false);
        assert_eq!(
            encode_with(&Value::from("你好"), &options).unwrap(),
            "\"你好\""
        );
    }

    #[test]
    fn encode_sorted_keys() {
        let value = object(&[("b", Value::from(1)), ("a", Value::from(2))]);
        let options = EncodeOptions::new().sort_keys(true);
        assert_eq!(encode_with(&value, &options).unwrap(), r#"{"a": 2, "b": 1}"#);
        // Insertion order otherwise
        assert_eq!(encode(&value).unwrap(), r#"{"b": 1, "a": 2}"#);
    }

    #[test]
    fn encode_indented() {
        let value = object(&[
            ("a", Value::from(vec![1, 2])),
            ("b", Value::Object(Map::new())),
        ]);
        let options = EncodeOptions::new().indent(2);
        assert_eq!(
            encode_with(&value, &options).unwrap(),
            "{\n  \"a\": [\n    1,\n    2\n  ],\n  \"b\": {}\n}"
        );
    }

    #[test]
    fn display_is_canonical() {
        let value = object(&[("k", Value::from(vec![1, 2]))]);
        assert_eq!(value.to_string(), r#"{"k": [1, 2]}"#);
    }

    #[test]
    fn encode_depth_limit() {
        let mut value = Value::Null;
        for _ in 0..=MAX_DEPTH {
            value = Value::Array(vec![value]);
        }
        assert_eq!(
            encode(&value),
            Err(CodecError::RecursionLimit { limit: MAX_DEPTH })
        );
    }

    #[test]
    fn encode_matches_serde_json_key_order() {
        let value = object(&[("z", Value::from(1)), ("a", Value::from("x"))]);
        let ours = encode_with(&value, &EncodeOptions::new().indent(2)).unwrap();
        let theirs = serde_json::to_string_pretty(&serde_json::json!({"z": 1, "a": "x"})).unwrap();
        assert_eq!(ours, theirs);
    }
}
