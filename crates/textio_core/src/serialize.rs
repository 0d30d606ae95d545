//! Structured values through text streams.

use crate::error::CoreResult;
use crate::text::TextStream;
use serde::Serialize;
use textio_codec::{decode, encode, encode_with, EncodeOptions, Value};

/// Writes the canonical encoding of `value` at the stream's cursor.
///
/// # Errors
///
/// Returns the codec's failure (nothing is written then) or the stream's
/// write failure.
pub fn dump_to(stream: &mut TextStream, value: &Value) -> CoreResult<()> {
    let text = encode(value)?;
    stream.write(&text)?;
    Ok(())
}

/// Writes `value` encoded with explicit formatting options.
///
/// # Errors
///
/// Same as [`dump_to`].
pub fn dump_with(
    stream: &mut TextStream,
    value: &Value,
    options: &EncodeOptions,
) -> CoreResult<()> {
    let text = encode_with(value, options)?;
    stream.write(&text)?;
    Ok(())
}

/// Writes any serializable value in canonical form.
///
/// # Errors
///
/// Returns `UnsupportedType` for shapes outside the value union, plus the
/// failures of [`dump_to`].
pub fn dump_serialize<T: Serialize + ?Sized>(
    stream: &mut TextStream,
    value: &T,
) -> CoreResult<()> {
    let text = textio_codec::to_string(value)?;
    stream.write(&text)?;
    Ok(())
}

/// Reads the rest of the stream and decodes it as one value.
///
/// # Errors
///
/// Returns the stream's read failure or `MalformedInput`.
pub fn load_from(stream: &mut TextStream) -> CoreResult<Value> {
    let text = stream.read_to_string()?;
    Ok(decode(&text)?)
}
