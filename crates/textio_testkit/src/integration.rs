//! Cross-crate integration test helpers.
//!
//! Provides utilities for testing interactions between the storage,
//! core and codec layers.

use crate::generators::StreamOperation;
use textio_core::{BufferedStream, ErrorKind, Whence};

/// Drives an append-mode handle and tracks what must end up in it.
///
/// Whatever seeks happen in between, the content must be the initial
/// bytes followed by every write in order.
pub struct AppendHarness {
    /// The append-mode handle under test.
    pub stream: BufferedStream,
    expected: Vec<u8>,
}

impl AppendHarness {
    /// Wraps an append-mode handle whose current content is `initial`.
    pub fn new(stream: BufferedStream, initial: &[u8]) -> Self {
        assert!(stream.mode().append(), "Handle must be in append mode");
        Self {
            stream,
            expected: initial.to_vec(),
        }
    }

    /// Applies one operation, ignoring reads' results and refused seeks.
    pub fn apply(&mut self, op: &StreamOperation) {
        match op {
            StreamOperation::Write(bytes) => {
                let n = self.stream.write(bytes).expect("Failed to write");
                assert_eq!(n, bytes.len());
                self.expected.extend_from_slice(bytes);
                assert_eq!(
                    self.stream.tell().expect("Failed to tell"),
                    self.expected.len() as u64,
                    "Append must leave the cursor at the end"
                );
            }
            StreamOperation::Seek { offset, whence } => {
                if let Err(e) = self.stream.seek(*offset, *whence) {
                    assert_eq!(e.kind(), ErrorKind::NegativeSeek);
                }
            }
            StreamOperation::Read(n) => {
                if self.stream.readable() {
                    self.stream.read(*n).expect("Failed to read");
                }
            }
        }
    }

    /// Verifies length and content against the writes made so far.
    pub fn verify(&mut self) {
        let len = self.stream.seek(0, Whence::End).expect("Failed to seek");
        assert_eq!(len, self.expected.len() as u64, "Length mismatch");

        if self.stream.readable() {
            self.stream.seek(0, Whence::Start).expect("Failed to seek");
            let content = self.stream.read_to_end().expect("Failed to read");
            assert_eq!(content, self.expected, "Content mismatch");
        }
    }

    /// Returns the number of bytes the stream must hold.
    pub fn expected_len(&self) -> usize {
        self.expected.len()
    }
}

/// Byte-level stream checks.
pub mod bytes {
    use textio_core::{BufferedStream, Whence};

    /// Writes `data` to a fresh read-write handle and reads it back.
    pub fn check_roundtrip(stream: &mut BufferedStream, data: &[u8]) {
        let n = stream.write(data).expect("Failed to write");
        assert_eq!(n, data.len());
        assert_eq!(stream.tell().expect("Failed to tell"), data.len() as u64);

        stream.seek(0, Whence::Start).expect("Failed to seek");
        assert_eq!(stream.read_to_end().expect("Failed to read"), data);

        // End of stream stays empty
        assert!(stream.read(1).expect("Failed to read").is_empty());
        assert!(stream.read(1).expect("Failed to read").is_empty());
    }
}

/// Text-level stream checks.
pub mod text {
    use textio_core::{TextCursor, TextStream};

    /// Writes `s` and checks the cursor advanced by its encoded length.
    pub fn check_tell_matches_encoded_len(stream: &mut TextStream, s: &str) {
        let before = stream.tell().expect("Failed to tell");
        let chars = stream.write(s).expect("Failed to write");
        let after = stream.tell().expect("Failed to tell");

        assert_eq!(chars, s.chars().count());
        assert_eq!(after.cookie() - before.cookie(), s.len() as u64);

        stream.seek(before).expect("Failed to seek");
        assert_eq!(stream.read(chars).expect("Failed to read"), s);
        assert_eq!(stream.tell().expect("Failed to tell"), after);
    }

    /// Writes `s` and checks line iteration reassembles it.
    pub fn check_lines_reassemble(stream: &mut TextStream, s: &str) {
        stream.write(s).expect("Failed to write");
        stream.seek(TextCursor::BEGINNING).expect("Failed to seek");

        let lines = stream.read_lines().expect("Failed to read lines");
        assert!(lines.iter().all(|l| !l.is_empty()));
        assert!(lines
            .iter()
            .rev()
            .skip(1)
            .all(|l| l.ends_with('\n')));
        assert_eq!(lines.concat(), s);
    }
}

/// Codec/stream integration.
pub mod codec_stream {
    use textio_codec::{decode, encode, Value};
    use textio_core::{dump_to, load_from, TextCursor, TextStream};

    /// Checks `decode(encode(v)) == v` directly and through a stream.
    pub fn check_value_roundtrip(stream: &mut TextStream, value: &Value) {
        let text = encode(value).expect("Failed to encode");
        assert!(text.is_ascii(), "Canonical text must be ASCII");
        assert_eq!(&decode(&text).expect("Failed to decode"), value);

        dump_to(stream, value).expect("Failed to dump");
        stream.seek(TextCursor::BEGINNING).expect("Failed to seek");
        assert_eq!(&load_from(stream).expect("Failed to load"), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{memory_binary, memory_text, TestFile};
    use crate::generators::*;
    use proptest::prelude::*;
    use textio_core::StreamConfig;

    #[test]
    fn test_append_harness() {
        let mut harness = AppendHarness::new(memory_binary("a+b", b"head"), b"head");
        harness.apply(&StreamOperation::Seek {
            offset: 0,
            whence: Whence::Start,
        });
        harness.apply(&StreamOperation::Write(b"-tail".to_vec()));
        harness.verify();
        assert_eq!(harness.expected_len(), 9);
    }

    #[test]
    fn test_file_roundtrip() {
        let file = TestFile::new("roundtrip.bin");
        let mut stream = file.binary("w+b");
        bytes::check_roundtrip(&mut stream, b"binary \x00\xff data");
    }

    #[test]
    fn test_write_only_append_file() {
        let file = TestFile::with_content("log.bin", b"one");
        let mut harness = AppendHarness::new(file.binary("ab"), b"one");
        harness.apply(&StreamOperation::Write(b"two".to_vec()));
        harness.apply(&StreamOperation::Seek {
            offset: -100,
            whence: Whence::Current,
        });
        harness.apply(&StreamOperation::Write(b"three".to_vec()));
        harness.verify();
        drop(harness);
        assert_eq!(file.contents(), b"onetwothree");
    }

    proptest! {
        #![proptest_config(PropTestConfig::default().to_proptest_config())]

        #[test]
        fn byte_roundtrip(data in bytes_strategy(4096), buffer_size in 1usize..64) {
            let config = StreamConfig::new().buffer_size(buffer_size);
            let mut stream = crate::fixtures::memory_handle("w+b", &[], &config)
                .into_binary()
                .unwrap();
            bytes::check_roundtrip(&mut stream, &data);
        }

        #[test]
        fn append_length_ignores_seeks(
            initial in bytes_strategy(16),
            ops in operation_sequence_strategy(1, 40),
        ) {
            let mut harness = AppendHarness::new(memory_binary("a+b", &initial), &initial);
            let mut written = 0;
            for op in &ops {
                if let StreamOperation::Write(bytes) = op {
                    written += bytes.len();
                }
                harness.apply(op);
            }
            prop_assert_eq!(harness.expected_len(), initial.len() + written);
            harness.verify();
        }

        #[test]
        fn text_tell_is_encoded_length(s in text_strategy()) {
            let mut stream = memory_text("w+", "");
            text::check_tell_matches_encoded_len(&mut stream, &s);
        }

        #[test]
        fn lines_reassemble(s in text_strategy()) {
            let mut stream = memory_text("w+", "");
            text::check_lines_reassemble(&mut stream, &s);
        }

        #[test]
        fn value_roundtrip(value in value_strategy()) {
            let mut stream = memory_text("w+", "");
            codec_stream::check_value_roundtrip(&mut stream, &value);
        }

        #[test]
        fn canonical_text_agrees_with_serde_json(value in integral_value_strategy()) {
            let ours = textio_codec::encode(&value).unwrap();
            let parsed: serde_json::Value = serde_json::from_str(&ours).unwrap();
            prop_assert_eq!(parsed, serde_json::to_value(&value).unwrap());
        }

        #[test]
        fn text_relative_seeks_always_fail(offset in -8i64..8, s in text_strategy()) {
            let mut stream = memory_text("w+", &s);
            for whence in [Whence::Current, Whence::End] {
                let err = stream.seek_from(offset, whence).unwrap_err();
                prop_assert_eq!(err.kind(), ErrorKind::UnsupportedSeek);
            }
            let mut bin = memory_binary("rb", s.as_bytes());
            prop_assert!(bin.seek(0, Whence::End).is_ok());
            prop_assert!(bin.seek(0, Whence::Current).is_ok());
        }
    }
}
