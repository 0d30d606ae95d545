//! Error types for the codec crate.

use std::fmt;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The input text is not a single well-formed value.
    #[error("malformed input at line {line} column {column} (offset {offset}): {message}")]
    MalformedInput {
        /// Byte offset into the input where the problem was detected.
        offset: usize,
        /// 1-based line number.
        line: usize,
        /// 1-based column, counted in characters.
        column: usize,
        /// Description of the problem.
        message: String,
    },

    /// A value outside the serializable union was handed to the encoder.
    #[error("unsupported type: {type_name}")]
    UnsupportedType {
        /// Name of the unsupported type.
        type_name: String,
    },

    /// NaN and infinite floats have no textual form.
    #[error("non-finite numbers cannot be encoded")]
    NonFiniteNumber,

    /// Nesting exceeded the maximum depth (also how cycles surface).
    #[error("recursion limit of {limit} nested values exceeded")]
    RecursionLimit {
        /// The configured maximum depth.
        limit: usize,
    },

    /// A `Serialize` implementation reported its own failure.
    #[error("encoding failed: {message}")]
    EncodingFailed {
        /// Description of the encoding error.
        message: String,
    },
}

impl CodecError {
    /// Create a malformed-input error positioned at `offset` within `input`.
    pub fn malformed(input: &str, offset: usize, message: impl Into<String>) -> Self {
        let mut offset = offset.min(input.len());
        while !input.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &input[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        Self::MalformedInput {
            offset,
            line,
            column,
            message: message.into(),
        }
    }

    /// Create an unsupported type error.
    pub fn unsupported_type(type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
        }
    }
}

impl serde::ser::Error for CodecError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self::EncodingFailed {
            message: msg.to_string(),
        }
    }
}
