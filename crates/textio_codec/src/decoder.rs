//! Strict text decoder.

use crate::error::{CodecError, CodecResult};
use crate::value::{Map, Number, Value};
use crate::MAX_DEPTH;

/// Decode a single value from text.
///
/// Parsing is strict: exactly one value, optionally surrounded by
/// whitespace. When an object repeats a key, the last occurrence wins and
/// the key keeps the position of its first occurrence.
///
/// ```
/// use textio_codec::{decode, Value};
///
/// let value = decode(r#"{"a": 1, "b": 2, "a": 3}"#).unwrap();
/// assert_eq!(value.get("a"), Some(&Value::from(3)));
/// ```
///
/// # Errors
///
/// Returns [`CodecError::MalformedInput`] with the failing position, or
/// [`CodecError::RecursionLimit`] for input nested deeper than
/// [`MAX_DEPTH`].
pub fn decode(text: &str) -> CodecResult<Value> {
    let mut decoder = StrictDecoder::new(text);
    let value = decoder.decode()?;
    decoder.skip_whitespace();
    if !decoder.is_empty() {
        return Err(decoder.error("extra data after value"));
    }
    Ok(value)
}

/// A strict text decoder.
pub struct StrictDecoder<'a> {
    text: &'a str,
    data: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> StrictDecoder<'a> {
    /// Create a new decoder over the given text.
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            data: text.as_bytes(),
            pos: 0,
            depth: 0,
        }
    }

    /// Decode the next value, skipping leading whitespace.
    pub fn decode(&mut self) -> CodecResult<Value> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(self.error("expecting value")),
            Some(b'n') => self.decode_literal("null", Value::Null),
            Some(b't') => self.decode_literal("true", Value::Bool(true)),
            Some(b'f') => self.decode_literal("false", Value::Bool(false)),
            Some(b'"') => self.decode_string().map(Value::String),
            Some(b'[') => self.decode_array(),
            Some(b'{') => self.decode_object(),
            Some(b'-' | b'0'..=b'9') => self.decode_number(),
            Some(_) => Err(self.error("expecting value")),
        }
    }

    /// Check if all input has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Get the unconsumed remainder of the input.
    pub fn remaining(&self) -> &'a str {
        &self.text[self.pos..]
    }

    /// Advance past spaces, tabs, carriage returns and newlines.
    pub fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    fn error(&self, message: &str) -> CodecError {
        self.error_at(self.pos, message)
    }

    fn error_at(&self, offset: usize, message: &str) -> CodecError {
        CodecError::malformed(self.text, offset, message)
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn expect(&mut self, byte: u8, message: &str) -> CodecResult<()> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(message))
        }
    }

    fn enter(&mut self) -> CodecResult<()> {
        if self.depth >= MAX_DEPTH {
            return Err(CodecError::RecursionLimit { limit: MAX_DEPTH });
        }
        self.depth += 1;
        Ok(())
    }

    fn decode_literal(&mut self, literal: &str, value: Value) -> CodecResult<Value> {
        if self.data[self.pos..].starts_with(literal.as_bytes()) {
            self.pos += literal.len();
            Ok(value)
        } else {
            Err(self.error("expecting value"))
        }
    }

    fn decode_number(&mut self) -> CodecResult<Value> {
        let start = self.pos;
        let mut is_float = false;

        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        match self.peek() {
            Some(b'0') => {
                self.pos += 1;
                if matches!(self.peek(), Some(b'0'..=b'9')) {
                    return Err(self.error("leading zeros are not allowed"));
                }
            }
            Some(b'1'..=b'9') => self.skip_digits(),
            _ => return Err(self.error_at(start, "expecting value")),
        }

        if self.peek() == Some(b'.') {
            is_float = true;
            self.pos += 1;
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.error("expecting digit after decimal point"));
            }
            self.skip_digits();
        }

        if let Some(b'e' | b'E') = self.peek() {
            is_float = true;
            self.pos += 1;
            if let Some(b'+' | b'-') = self.peek() {
                self.pos += 1;
            }
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.error("expecting digit in exponent"));
            }
            self.skip_digits();
        }

        let literal = &self.text[start..self.pos];
        if !is_float {
            if let Ok(n) = literal.parse::<i64>() {
                return Ok(Value::Number(Number::Int(n)));
            }
        }

        match literal.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Value::Number(Number::Float(f))),
            _ => Err(self.error_at(start, "number out of range")),
        }
    }

    fn skip_digits(&mut self) {
        while let Some(b'0'..=b'9') = self.peek() {
            self.pos += 1;
        }
    }

    fn decode_string(&mut self) -> CodecResult<String> {
        let start = self.pos;
        self.expect(b'"', "expecting string")?;
        let mut out = String::new();

        loop {
            let run_start = self.pos;
            while let Some(b) = self.peek() {
                if b == b'"' || b == b'\\' || b < 0x20 {
                    break;
                }
                self.pos += 1;
            }
            // Stops only on ASCII bytes, so the run is on char boundaries
            out.push_str(&self.text[run_start..self.pos]);

            match self.peek() {
                None => return Err(self.error_at(start, "unterminated string")),
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    self.pos += 1;
                    self.decode_escape(&mut out)?;
                }
                Some(_) => return Err(self.error("control character in string")),
            }
        }
    }

    fn decode_escape(&mut self, out: &mut String) -> CodecResult<()> {
        let escape_start = self.pos - 1;
        let byte = self
            .peek()
            .ok_or_else(|| self.error_at(escape_start, "unterminated escape"))?;
        self.pos += 1;

        let c = match byte {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{8}',
            b'f' => '\u{c}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => self.decode_unicode_escape(escape_start)?,
            _ => return Err(self.error_at(escape_start, "invalid escape")),
        };
        out.push(c);
        Ok(())
    }

    fn decode_unicode_escape(&mut self, escape_start: usize) -> CodecResult<char> {
        let unit = self.read_hex4(escape_start)?;

        let code = match unit {
            0xD800..=0xDBFF => {
                if !self.data[self.pos..].starts_with(b"\\u") {
                    return Err(self.error_at(escape_start, "lone surrogate"));
                }
                self.pos += 2;
                let low = self.read_hex4(escape_start)?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(self.error_at(escape_start, "lone surrogate"));
                }
                0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00)
            }
            0xDC00..=0xDFFF => return Err(self.error_at(escape_start, "lone surrogate")),
            _ => u32::from(unit),
        };

        char::from_u32(code).ok_or_else(|| self.error_at(escape_start, "invalid code point"))
    }

    fn read_hex4(&mut self, escape_start: usize) -> CodecResult<u16> {
        let digits = self
            .data
            .get(self.pos..self.pos + 4)
            .ok_or_else(|| self.error_at(escape_start, "invalid \\u escape"))?;
        let mut unit: u16 = 0;
        for &d in digits {
            let v = (d as char)
                .to_digit(16)
                .ok_or_else(|| self.error_at(escape_start, "invalid \\u escape"))?;
            unit = (unit << 4) | v as u16;
        }
        self.pos += 4;
        Ok(unit)
    }

    fn decode_array(&mut self) -> CodecResult<Value> {
        self.enter()?;
        self.expect(b'[', "expecting '['")?;
        let mut items = Vec::new();

        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.pos += 1;
            self.depth -= 1;
            return Ok(Value::Array(items));
        }

        loop {
            items.push(self.decode()?);
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.error("expecting ',' or ']'")),
            }
        }

        self.depth -= 1;
        Ok(Value::Array(items))
    }

    fn decode_object(&mut self) -> CodecResult<Value> {
        self.enter()?;
        self.expect(b'{', "expecting '{'")?;
        let mut map = Map::new();

        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            self.depth -= 1;
            return Ok(Value::Object(map));
        }

        loop {
            self.skip_whitespace();
            if self.peek() != Some(b'"') {
                return Err(self.error("expecting property name in double quotes"));
            }
            let key = self.decode_string()?;
            self.skip_whitespace();
            self.expect(b':', "expecting ':' delimiter")?;
            let value = self.decode()?;
            // Last occurrence wins; position of the first is kept
            map.insert(key, value);

            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.error("expecting ',' or '}'")),
            }
        }

        self.depth -= 1;
        Ok(Value::Object(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offset_of(result: CodecResult<Value>) -> usize {
        match result {
            Err(CodecError::MalformedInput { offset, .. }) => offset,
            other => panic!("expected MalformedInput, got {other:?}"),
        }
    }

    #[test]
    fn decode_scalars() {
        assert_eq!(decode("null").unwrap(), Value::Null);
        assert_eq!(decode("true").unwrap(), Value::Bool(true));
        assert_eq!(decode(" false ").unwrap(), Value::Bool(false));
        assert_eq!(decode("-12").unwrap(), Value::from(-12));
        assert_eq!(decode("0").unwrap(), Value::from(0));
        assert_eq!(decode("1.0").unwrap(), Value::from(1.0));
        assert_eq!(decode("2.5e3").unwrap(), Value::from(2500.0));
        assert_eq!(decode("1E-2").unwrap(), Value::from(0.01));
    }

    #[test]
    fn decode_canonical_forms() {
        let value = decode(r#"{"one": 1, "two": 2, "three": 3}"#).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["one", "two", "three"]);
        assert_eq!(value.get("two"), Some(&Value::from(2)));

        assert_eq!(decode("[1, 2, 3]").unwrap(), Value::from(vec![1, 2, 3]));
    }

    #[test]
    fn decode_nested_with_whitespace() {
        let value = decode("{\n  \"a\": [ true, null ],\r\n\t\"b\": {}\n}").unwrap();
        assert_eq!(
            value.get("a"),
            Some(&Value::Array(vec![Value::Bool(true), Value::Null]))
        );
        assert_eq!(value.get("b"), Some(&Value::Object(Map::new())));
    }

    #[test]
    fn decode_string_escapes() {
        assert_eq!(
            decode(r#""a\"b\\c\/d\n\t\b\f\r""#).unwrap(),
            Value::from("a\"b\\c/d\n\t\u{8}\u{c}\r")
        );
        assert_eq!(decode(r#""\u4f60\u597d""#).unwrap(), Value::from("你好"));
        assert_eq!(decode(r#""\ud83d\ude00""#).unwrap(), Value::from("😀"));
        assert_eq!(decode("\"你好\"").unwrap(), Value::from("你好"));
    }

    #[test]
    fn duplicate_keys_last_wins_first_position() {
        let value = decode(r#"{"a": 1, "b": 2, "a": 3}"#).unwrap();
        let pairs: Vec<(&String, &Value)> = value.as_object().unwrap().iter().collect();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], (&"a".to_string(), &Value::from(3)));
        assert_eq!(pairs[1], (&"b".to_string(), &Value::from(2)));
    }

    #[test]
    fn big_integers_become_floats() {
        assert_eq!(
            decode("9223372036854775807").unwrap(),
            Value::from(i64::MAX)
        );
        assert_eq!(
            decode("18446744073709551616").unwrap(),
            Value::from(18_446_744_073_709_551_616.0)
        );
    }

    #[test]
    fn reject_trailing_garbage() {
        assert_eq!(offset_of(decode("[1, 2] x")), 7);
        assert_eq!(offset_of(decode("1 2")), 2);
    }

    #[test]
    fn reject_malformed_numbers() {
        assert_eq!(offset_of(decode("01")), 1);
        assert_eq!(offset_of(decode("1.")), 2);
        assert_eq!(offset_of(decode("1e")), 2);
        assert_eq!(offset_of(decode("-")), 0);
        assert_eq!(offset_of(decode("1e400")), 0);
        assert_eq!(offset_of(decode("NaN")), 0);
        assert_eq!(offset_of(decode("Infinity")), 0);
    }

    #[test]
    fn reject_malformed_structures() {
        assert_eq!(offset_of(decode("")), 0);
        assert_eq!(offset_of(decode("[1, 2,]")), 6);
        assert_eq!(offset_of(decode(r#"{"a": 1,}"#)), 8);
        assert_eq!(offset_of(decode(r#"{'a': 1}"#)), 1);
        assert_eq!(offset_of(decode(r#"{"a" 1}"#)), 5);
        assert_eq!(offset_of(decode("[1 2]")), 3);
        assert_eq!(offset_of(decode("tru")), 0);
    }

    #[test]
    fn reject_malformed_strings() {
        assert_eq!(offset_of(decode(r#""abc"#)), 0);
        assert_eq!(offset_of(decode("\"a\nb\"")), 2);
        assert_eq!(offset_of(decode(r#""\x""#)), 1);
        assert_eq!(offset_of(decode(r#""\ud83d""#)), 1);
        assert_eq!(offset_of(decode(r#""\ude00""#)), 1);
        assert_eq!(offset_of(decode(r#""\u12g4""#)), 1);
    }

    #[test]
    fn error_reports_line_and_column() {
        let err = decode("{\n  \"a\": ?\n}").unwrap_err();
        match err {
            CodecError::MalformedInput { line, column, .. } => {
                assert_eq!(line, 2);
                assert_eq!(column, 8);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn reject_excessive_nesting() {
        let text = "[".repeat(MAX_DEPTH + 1) + &"]".repeat(MAX_DEPTH + 1);
        assert_eq!(
            decode(&text),
            Err(CodecError::RecursionLimit { limit: MAX_DEPTH })
        );

        let text = "[".repeat(MAX_DEPTH) + &"]".repeat(MAX_DEPTH);
        assert!(decode(&text).is_ok());
    }

    #[test]
    fn decoder_reports_remaining_input() {
        let mut decoder = StrictDecoder::new("[1] tail");
        assert_eq!(decoder.decode().unwrap(), Value::from(vec![1]));
        assert_eq!(decoder.remaining(), " tail");
        assert!(!decoder.is_empty());
    }

    #[test]
    fn agrees_with_serde_json_on_valid_input() {
        let text = r#"{"name": "Alice", "tags": ["x", "y"], "score": 9.5, "n": null}"#;
        let ours = decode(text).unwrap();
        let theirs: serde_json::Value = serde_json::from_str(text).unwrap();
        assert_eq!(serde_json::to_value(&ours).unwrap(), theirs);
    }
}
