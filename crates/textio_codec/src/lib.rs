//! # textio Codec
//!
//! Canonical JSON-style text encoding for textio.
//!
//! This crate turns a [`Value`] tree into deterministic text and parses
//! such text back:
//! - Identical inputs produce identical text
//! - Object keys keep their insertion order
//! - Integers and floats stay distinct across a round trip
//!
//! ## Canonical Text Rules
//!
//! - Items separated by `", "`, keys from values by `": "`
//! - Non-ASCII characters escaped as `\uXXXX` (surrogate pairs above U+FFFF)
//! - NaN and infinities are rejected
//! - Nesting is capped at [`MAX_DEPTH`]
//! - Decoding is strict: one value, optional surrounding whitespace
//!
//! ## Usage
//!
//! ```
//! use textio_codec::{decode, encode, Value};
//!
//! // Encode a value
//! let value = Value::from(vec![1, 2, 3]);
//! let text = encode(&value).unwrap();
//! assert_eq!(text, "[1, 2, 3]");
//!
//! // Decode back
//! let decoded = decode(&text).unwrap();
//! assert_eq!(value, decoded);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod ser;
mod value;

pub use decoder::{decode, StrictDecoder};
pub use encoder::{encode, encode_with, CanonicalEncoder, EncodeOptions};
pub use error::{CodecError, CodecResult};
pub use ser::{to_string, to_value};
pub use value::{Map, Number, Value};

/// Maximum nesting depth accepted by the encoder, decoder and serializer.
pub const MAX_DEPTH: usize = 128;

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: &Value) -> Value {
        let text = encode(value).unwrap();
        decode(&text).unwrap()
    }

    #[test]
    fn roundtrip_integer() {
        let value = Value::from(42);
        assert_eq!(roundtrip(&value), value);
    }

    #[test]
    fn roundtrip_negative_integer() {
        let value = Value::from(-100);
        assert_eq!(roundtrip(&value), value);
    }

    #[test]
    fn roundtrip_float_stays_float() {
        let value = Value::from(3.0);
        assert_eq!(encode(&value).unwrap(), "3.0");
        assert_eq!(roundtrip(&value), value);
    }

    #[test]
    fn roundtrip_string() {
        let value = Value::from("hello world");
        assert_eq!(roundtrip(&value), value);
    }

    #[test]
    fn roundtrip_unicode_string() {
        let value = Value::from("héllo 你好 😀");
        assert_eq!(roundtrip(&value), value);
    }

    #[test]
    fn roundtrip_array() {
        let value = Value::Array(vec![Value::from(1), Value::from("two"), Value::from(3)]);
        assert_eq!(roundtrip(&value), value);
    }

    #[test]
    fn roundtrip_map_preserves_order() {
        let value: Value = [("b", 1), ("a", 2)].into_iter().collect();
        let decoded = roundtrip(&value);
        assert_eq!(decoded, value);
        let keys: Vec<&String> = decoded.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["b", "a"]);
    }

    #[test]
    fn roundtrip_bool_and_null() {
        for value in [Value::Bool(true), Value::Bool(false), Value::Null] {
            assert_eq!(roundtrip(&value), value);
        }
    }

    #[test]
    fn roundtrip_nested() {
        let alice: Value = [("name", Value::from("Alice")), ("age", Value::from(30))]
            .into_iter()
            .collect();
        let bob: Value = [("name", Value::from("Bob")), ("age", Value::from(25))]
            .into_iter()
            .collect();
        let value: Value = [
            ("users", Value::Array(vec![alice, bob])),
            ("count", Value::from(2)),
        ]
        .into_iter()
        .collect();
        assert_eq!(roundtrip(&value), value);
    }

    #[test]
    fn roundtrip_pretty_printed() {
        let value: Value = [("list", Value::from(vec![1, 2])), ("x", Value::Null)]
            .into_iter()
            .collect();
        let text = encode_with(&value, &EncodeOptions::new().indent(4)).unwrap();
        assert_eq!(decode(&text).unwrap(), value);
    }
}
