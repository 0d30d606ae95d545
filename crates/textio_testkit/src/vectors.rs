//! Shared test vectors for the text format and mode strings.
//!
//! Other implementations of the format can load [`all_vectors_json`] and
//! check themselves against the same expectations.

use serde::{Deserialize, Serialize};

/// A test vector that can be shared across implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Input text.
    pub input: String,
    /// Expected canonical output (if this should succeed).
    pub expected: Option<String>,
    /// Fragment of the expected error message (if this should fail).
    pub expected_error: Option<String>,
}

impl TestVector {
    fn ok(id: &str, description: &str, input: &str, expected: &str) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            input: input.into(),
            expected: Some(expected.into()),
            expected_error: None,
        }
    }

    fn err(id: &str, description: &str, input: &str, error: &str) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            input: input.into(),
            expected: None,
            expected_error: Some(error.into()),
        }
    }
}

/// Decode-then-encode vectors for the canonical text format.
pub fn text_format_vectors() -> Vec<TestVector> {
    vec![
        TestVector::ok("null", "null literal", "null", "null"),
        TestVector::ok("true", "true literal", " true ", "true"),
        TestVector::ok("int_zero", "zero", "0", "0"),
        TestVector::ok("int_negative_zero", "negative zero integer", "-0", "0"),
        TestVector::ok("int_min", "smallest integer", "-9223372036854775808", "-9223372036854775808"),
        TestVector::ok("int_overflow", "integer beyond i64 becomes float", "9223372036854775808", "9.223372036854776e18"),
        TestVector::ok("float_simple", "plain fraction", "1.5", "1.5"),
        TestVector::ok("float_whole", "whole float keeps its point", "1E2", "100.0"),
        TestVector::ok("float_tiny", "small magnitude", "1e-7", "1e-7"),
        TestVector::ok("string_empty", "empty string", r#""""#, r#""""#),
        TestVector::ok("string_escapes", "short escapes", r#""a\/b\tc""#, r#""a/b\tc""#),
        TestVector::ok("string_control", "control character", r#""\u0001""#, r#""\u0001""#),
        TestVector::ok("string_latin", "non-ASCII is escaped", r#""café""#, r#""caf\u00e9""#),
        TestVector::ok("string_astral", "astral char as surrogate pair", r#""😀""#, r#""\ud83d\ude00""#),
        TestVector::ok("array_empty", "empty array", "[ ]", "[]"),
        TestVector::ok("array_nested", "separators normalized", "[1,[2 ,3],[]]", "[1, [2, 3], []]"),
        TestVector::ok("object_empty", "empty object", "{ }", "{}"),
        TestVector::ok("object_order", "insertion order kept", r#"{"b":1,"a":2}"#, r#"{"b": 1, "a": 2}"#),
        TestVector::ok("object_duplicate", "last duplicate wins in first position", r#"{"a":1,"b":2,"a":3}"#, r#"{"a": 3, "b": 2}"#),
        TestVector::err("empty", "no value", "", "expecting value"),
        TestVector::err("trailing", "trailing data", "[1] 2", "extra data"),
        TestVector::err("leading_zero", "leading zeros", "012", "leading zeros"),
        TestVector::err("bare_point", "missing fraction digits", "1.", "decimal point"),
        TestVector::err("unterminated", "unterminated string", r#""abc"#, "unterminated string"),
        TestVector::err("lone_surrogate", "low surrogate alone", r#""\udc00""#, "lone surrogate"),
        TestVector::err("bad_escape", "unknown escape", r#""\x""#, "invalid escape"),
        TestVector::err("trailing_comma", "trailing comma in array", "[1,]", "expecting value"),
        TestVector::err("nan", "NaN is not a literal", "NaN", "expecting value"),
        TestVector::err("huge_float", "float out of range", "1e999", "out of range"),
    ]
}

/// Mode string vectors: input mode and its canonical spelling.
pub fn mode_vectors() -> Vec<TestVector> {
    vec![
        TestVector::ok("mode_r", "read text", "r", "r"),
        TestVector::ok("mode_rt", "explicit text flag", "rt", "r"),
        TestVector::ok("mode_rb_plus", "flags in any order", "b+r", "r+b"),
        TestVector::ok("mode_w", "write truncate", "w", "w"),
        TestVector::ok("mode_a_plus", "append read", "+a", "a+"),
        TestVector::ok("mode_ab", "append binary", "ab", "ab"),
        TestVector::err("mode_empty", "empty mode", "", "empty"),
        TestVector::err("mode_two_bases", "two base modes", "rw", "more than one"),
        TestVector::err("mode_text_binary", "text and binary", "rbt", "mutually exclusive"),
        TestVector::err("mode_duplicate", "repeated flag", "r++", "duplicate"),
        TestVector::err("mode_unknown", "unknown flag", "rx", "unknown"),
        TestVector::err("mode_no_base", "plus alone", "+", "must contain"),
    ]
}

/// Exports all test vectors as JSON.
pub fn all_vectors_json() -> String {
    let vectors = AllTestVectors {
        text_format: text_format_vectors(),
        mode: mode_vectors(),
    };
    serde_json::to_string_pretty(&vectors).expect("Failed to serialize vectors")
}

#[derive(Debug, Serialize, Deserialize)]
struct AllTestVectors {
    text_format: Vec<TestVector>,
    mode: Vec<TestVector>,
}
