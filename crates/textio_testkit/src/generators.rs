//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random test data
//! that maintains required invariants.

use proptest::prelude::*;
use textio_core::{Map, Number, Value, Whence};

/// Strategy for arbitrary byte content.
pub fn bytes_strategy(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Strategy for text mixing ASCII with 2, 3 and 4 byte characters.
pub fn text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            4 => prop::char::range('a', 'z'),
            1 => Just('\n'),
            1 => prop::char::range('\u{e0}', '\u{ff}'),
            1 => prop::char::range('\u{4e00}', '\u{4eff}'),
            1 => prop::char::range('\u{1f600}', '\u{1f64f}'),
        ],
        0..64,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

/// Strategy for object keys.
pub fn key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z_][a-zA-Z0-9_ ]{0,11}").expect("Invalid regex")
}

/// Strategy for finite numbers of both kinds.
pub fn number_strategy() -> impl Strategy<Value = Number> {
    prop_oneof![
        any::<i64>().prop_map(Number::Int),
        any::<f64>()
            .prop_filter("Floats must be finite", |f| f.is_finite())
            .prop_map(Number::Float),
    ]
}

/// Strategy for scalar values.
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        number_strategy().prop_map(Value::Number),
        any::<String>().prop_map(Value::String),
    ]
}

/// Strategy for nested values within the serializable union.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    value_strategy_from(scalar_strategy())
}

/// Strategy for nested values without floats.
///
/// Useful when comparing against another parser whose float rounding may
/// differ in the last bit.
pub fn integral_value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<String>().prop_map(Value::String),
    ];
    value_strategy_from(leaf)
}

fn value_strategy_from(
    leaf: impl Strategy<Value = Value> + 'static,
) -> impl Strategy<Value = Value> {
    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
            prop::collection::vec((key_strategy(), inner), 0..8)
                .prop_map(|pairs| Value::Object(pairs.into_iter().collect::<Map>())),
        ]
    })
}

/// Strategy for valid mode strings, flags in any order.
pub fn mode_strategy() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!['r', 'w', 'a']),
        any::<bool>(),
        prop::sample::select(vec![None, Some('b'), Some('t')]),
    )
        .prop_flat_map(|(base, plus, flag)| {
            let mut chars = vec![base];
            if plus {
                chars.push('+');
            }
            chars.extend(flag);
            Just(chars).prop_shuffle()
        })
        .prop_map(|chars| chars.into_iter().collect())
}

/// Strategy for strings over the mode alphabet, mostly invalid.
pub fn mode_noise_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[rwabt+x ]{0,5}").expect("Invalid regex")
}

/// Strategy for seek origins.
pub fn whence_strategy() -> impl Strategy<Value = Whence> {
    prop_oneof![
        Just(Whence::Start),
        Just(Whence::Current),
        Just(Whence::End),
    ]
}

/// An operation applied to a byte stream.
#[derive(Debug, Clone)]
pub enum StreamOperation {
    /// Write bytes at the cursor (or the end, for append handles).
    Write(Vec<u8>),
    /// Move the cursor.
    Seek {
        /// Offset from the origin.
        offset: i64,
        /// Origin.
        whence: Whence,
    },
    /// Read up to this many bytes.
    Read(usize),
}

/// Strategy for generating stream operations.
pub fn stream_operation_strategy() -> impl Strategy<Value = StreamOperation> {
    prop_oneof![
        3 => bytes_strategy(32).prop_map(StreamOperation::Write),
        2 => (-64i64..64, whence_strategy())
            .prop_map(|(offset, whence)| StreamOperation::Seek { offset, whence }),
        1 => (0usize..48).prop_map(StreamOperation::Read),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<StreamOperation>> {
    prop::collection::vec(stream_operation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use textio_core::ModeSpec;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn generated_modes_parse(mode in mode_strategy()) {
            prop_assert!(ModeSpec::parse(&mode).is_ok(), "mode {:?}", mode);
        }

        #[test]
        fn noise_never_panics(mode in mode_noise_strategy()) {
            // Either valid or a clean error
            let _ = ModeSpec::parse(&mode);
        }

        #[test]
        fn text_is_multibyte_heavy(text in text_strategy()) {
            prop_assert!(text.len() >= text.chars().count());
        }

        #[test]
        fn generated_values_encode(value in value_strategy()) {
            prop_assert!(textio_codec::encode(&value).is_ok());
        }
    }
}
