//! Fuzz testing harnesses for textio.
//!
//! This module provides fuzz targets that can be used with cargo-fuzz
//! or other fuzzing frameworks. Every target must return normally for
//! any input; a panic is a finding.

use textio_codec::{decode, encode};
use textio_core::{ModeSpec, StreamConfig, Whence};

use crate::fixtures::memory_handle;

/// Fuzz target for decoding.
///
/// Tests that arbitrary input either:
/// - Decodes successfully to a value that survives a round trip, or
/// - Returns a proper error (no panics)
pub fn fuzz_decode(data: &[u8]) {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(value) = decode(text) else {
        return;
    };
    // Anything decoded is finite and shallow enough to re-encode
    let encoded = encode(&value).expect("Decoded value must re-encode");
    let decoded = decode(&encoded).expect("Canonical text must decode");
    assert_eq!(value, decoded, "Roundtrip mismatch");
}

/// Fuzz target for mode parsing.
///
/// Tests that every accepted mode satisfies the capability invariants.
pub fn fuzz_mode_parse(data: &[u8]) {
    let text = String::from_utf8_lossy(data);
    if let Ok(mode) = ModeSpec::parse(&text) {
        assert!(mode.readable() || mode.writable());
        assert!(!(mode.append() && mode.truncate()));
        assert!(!mode.append() || mode.writable());
    }
}

/// Fuzz target for byte stream operations.
///
/// Interprets the input as a sequence of writes, seeks and reads on an
/// in-memory `w+b` handle with a tiny buffer, and checks every result
/// against a plain `Vec<u8>` model.
pub fn fuzz_stream_operations(data: &[u8]) {
    let config = StreamConfig::new().buffer_size(3);
    let Some(mut stream) = memory_handle("w+b", &[], &config).into_binary() else {
        return;
    };

    let mut model: Vec<u8> = Vec::new();
    let mut pos: usize = 0;
    let mut input = data.iter().copied();

    while let Some(op) = input.next() {
        let arg = input.next().unwrap_or(0);
        match op % 4 {
            0 => {
                let len = usize::from(arg % 8);
                let bytes: Vec<u8> = input.by_ref().take(len).collect();
                stream.write(&bytes).expect("Write must succeed");
                if bytes.is_empty() {
                    // No write, no zero-fill
                    continue;
                }
                let end = pos + bytes.len();
                if model.len() < end {
                    model.resize(end, 0);
                }
                model[pos..end].copy_from_slice(&bytes);
                pos = end;
            }
            1 => {
                let got = stream.read(usize::from(arg % 16)).expect("Read must succeed");
                let end = (pos + usize::from(arg % 16)).min(model.len()).max(pos);
                let expected = model.get(pos..end).unwrap_or(&[]);
                assert_eq!(got, expected, "Read mismatch at {pos}");
                pos += got.len();
            }
            2 => {
                let offset = i64::from(arg % 32);
                let new_pos = stream.seek(offset, Whence::Start).expect("Seek must succeed");
                pos = usize::try_from(new_pos).expect("Position fits usize");
            }
            _ => {
                let offset = -i64::from(arg % 8);
                match stream.seek(offset, Whence::End) {
                    Ok(new_pos) => {
                        pos = usize::try_from(new_pos).expect("Position fits usize");
                        assert_eq!(pos + (arg % 8) as usize, model.len());
                    }
                    Err(_) => assert!((arg % 8) as usize > model.len()),
                }
            }
        }
        assert_eq!(stream.tell().expect("Tell must succeed") as usize, pos);
    }

    stream.seek(0, Whence::Start).expect("Seek must succeed");
    assert_eq!(stream.read_to_end().expect("Read must succeed"), model);
}
