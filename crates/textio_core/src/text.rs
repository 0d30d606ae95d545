//! Character-oriented layer over a buffered stream.

use crate::buffered::{BufferedStream, Whence};
use crate::error::{CoreError, CoreResult};
use crate::lines::Lines;
use crate::mode::ModeSpec;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of per-handle identities carried by [`TextCursor`].
static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// Text codec of a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    /// Variable width, 1 to 4 bytes per character.
    #[default]
    Utf8,
    /// ISO-8859-1, one byte per character up to U+00FF.
    Latin1,
    /// 7-bit ASCII.
    Ascii,
}

impl Encoding {
    /// Canonical label, e.g. `utf-8`.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Latin1 => "latin-1",
            Encoding::Ascii => "ascii",
        }
    }

    /// Whether every character takes the same number of bytes.
    #[must_use]
    pub const fn is_fixed_width(&self) -> bool {
        !matches!(self, Encoding::Utf8)
    }

    /// Bytes in the sequence introduced by `lead`, or 0 if `lead` cannot
    /// start one.
    fn sequence_len(self, lead: u8) -> usize {
        match self {
            Encoding::Utf8 => match lead {
                0x00..=0x7f => 1,
                0xc2..=0xdf => 2,
                0xe0..=0xef => 3,
                0xf0..=0xf4 => 4,
                _ => 0,
            },
            Encoding::Latin1 | Encoding::Ascii => 1,
        }
    }

    /// Encodes `text`; `position` is the stream offset it will land at.
    fn encode(self, text: &str, position: u64) -> CoreResult<Cow<'_, [u8]>> {
        let limit = match self {
            Encoding::Utf8 => return Ok(Cow::Borrowed(text.as_bytes())),
            Encoding::Latin1 => 0xff,
            Encoding::Ascii => 0x7f,
        };

        let mut out = Vec::with_capacity(text.len());
        for c in text.chars() {
            let code = u32::from(c);
            if code > limit {
                return Err(CoreError::encoding(
                    self,
                    position.saturating_add(out.len() as u64),
                    format!("character {c:?} cannot be encoded"),
                ));
            }
            out.push(code as u8);
        }
        Ok(Cow::Owned(out))
    }

    /// Decodes `bytes` read from stream offset `position`.
    fn decode(self, bytes: &[u8], position: u64) -> CoreResult<String> {
        match self {
            Encoding::Utf8 => match std::str::from_utf8(bytes) {
                Ok(s) => Ok(s.to_string()),
                Err(e) => {
                    let at = e.valid_up_to();
                    let reason = match e.error_len() {
                        Some(_) => format!("invalid byte 0x{:02x}", bytes[at]),
                        None => "incomplete multi-byte sequence at end of stream".to_string(),
                    };
                    Err(CoreError::encoding(self, position + at as u64, reason))
                }
            },
            Encoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            Encoding::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(at) => Err(CoreError::encoding(
                    self,
                    position + at as u64,
                    format!("byte 0x{:02x} is not ascii", bytes[at]),
                )),
                None => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            },
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Encoding {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(Encoding::Latin1),
            "ascii" | "us-ascii" => Ok(Encoding::Ascii),
            _ => Err(CoreError::UnknownEncoding {
                label: s.to_string(),
            }),
        }
    }
}

/// Opaque position in a text stream.
///
/// Either [`TextCursor::BEGINNING`] or a value returned by
/// [`TextStream::tell`]. Pass it back to [`TextStream::seek`] on the same
/// handle; cursors from other handles are refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextCursor {
    position: u64,
    handle: Option<u64>,
}

impl TextCursor {
    /// The start of any stream.
    pub const BEGINNING: TextCursor = TextCursor {
        position: 0,
        handle: None,
    };

    /// The opaque token value.
    ///
    /// Meaningful only for diagnostics and for comparing how far one
    /// handle advanced.
    #[must_use]
    pub const fn cookie(&self) -> u64 {
        self.position
    }

    /// Whether this is the start of the stream.
    #[must_use]
    pub const fn is_beginning(&self) -> bool {
        self.position == 0
    }
}

impl Default for TextCursor {
    fn default() -> Self {
        Self::BEGINNING
    }
}

/// A text handle: encode on write, decode on read.
///
/// Reads never split a character: the byte cursor always sits on a
/// character boundary after a successful call. Bytes that do not decode
/// fail with `EncodingError` and are left consumed.
///
/// # Positions
///
/// [`tell`](Self::tell) returns an opaque [`TextCursor`] rather than a
/// character index. Seeking relative to the current position or the end
/// is refused with `UnsupportedSeek`, since a byte offset from there
/// could land inside a character.
///
/// ```
/// use textio_core::StreamHandle;
///
/// let mut text = StreamHandle::open_in_memory("w+").unwrap().into_text().unwrap();
/// text.write("你好").unwrap();
/// assert_eq!(text.tell().unwrap().cookie(), 6);
/// ```
#[derive(Debug)]
pub struct TextStream {
    inner: BufferedStream,
    encoding: Encoding,
    id: u64,
}

impl TextStream {
    /// Wraps a buffered stream with the given codec.
    #[must_use]
    pub fn new(inner: BufferedStream, encoding: Encoding) -> Self {
        Self {
            inner,
            encoding,
            id: NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Returns the handle's codec.
    #[must_use]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Returns the handle's mode.
    #[must_use]
    pub fn mode(&self) -> ModeSpec {
        self.inner.mode()
    }

    /// Whether reads are permitted.
    #[must_use]
    pub fn readable(&self) -> bool {
        self.inner.readable()
    }

    /// Whether writes are permitted.
    #[must_use]
    pub fn writable(&self) -> bool {
        self.inner.writable()
    }

    /// Whether the underlying stream supports random access.
    #[must_use]
    pub fn seekable(&self) -> bool {
        self.inner.seekable()
    }

    /// Whether the handle is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// Reads up to `max_chars` characters.
    ///
    /// Empty at end of stream.
    ///
    /// # Errors
    ///
    /// Returns `NotReadable`, `Closed`, `EncodingError`, or a raw stream
    /// failure.
    pub fn read(&mut self, max_chars: usize) -> CoreResult<String> {
        self.inner.ensure_readable()?;
        let mut out = String::new();
        for _ in 0..max_chars {
            if !self.read_char(&mut out)? {
                break;
            }
        }
        Ok(out)
    }

    /// Reads the rest of the stream.
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read).
    pub fn read_to_string(&mut self) -> CoreResult<String> {
        let start = self.inner.position();
        let bytes = self.inner.read_to_end()?;
        self.encoding.decode(&bytes, start)
    }

    /// Reads through the next `\n`, which is kept.
    ///
    /// Empty at end of stream.
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read).
    pub fn read_line(&mut self) -> CoreResult<String> {
        // A 0x0a byte is always a newline in every supported codec.
        let start = self.inner.position();
        let bytes = self.inner.read_line()?;
        self.encoding.decode(&bytes, start)
    }

    /// Reads all remaining lines.
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read).
    pub fn read_lines(&mut self) -> CoreResult<Vec<String>> {
        self.lines().collect()
    }

    /// Iterates over the remaining lines.
    pub fn lines(&mut self) -> Lines<'_> {
        Lines::new(self)
    }

    /// Writes `text` and returns the number of characters written.
    ///
    /// # Errors
    ///
    /// Returns `NotWritable`, `Closed`, `EncodingError` for characters the
    /// codec cannot represent (nothing is written then), or a raw stream
    /// failure.
    pub fn write(&mut self, text: &str) -> CoreResult<usize> {
        self.inner.ensure_writable()?;
        let bytes = self.encoding.encode(text, self.inner.write_position()?)?;
        self.inner.write(&bytes)?;
        Ok(text.chars().count())
    }

    /// Writes each string in turn, with no separator.
    ///
    /// Returns the total number of characters written.
    ///
    /// # Errors
    ///
    /// Same as [`write`](Self::write).
    pub fn write_lines<I, S>(&mut self, lines: I) -> CoreResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut total = 0;
        for line in lines {
            total += self.write(line.as_ref())?;
        }
        Ok(total)
    }

    /// Returns a cursor for the current position.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedSeek` on streams without random access, or
    /// `Closed`.
    pub fn tell(&self) -> CoreResult<TextCursor> {
        Ok(TextCursor {
            position: self.inner.tell()?,
            handle: Some(self.id),
        })
    }

    /// Restores a position previously returned by [`tell`](Self::tell).
    ///
    /// # Errors
    ///
    /// Returns `ForeignCursor` for a cursor from another handle,
    /// `UnsupportedSeek` on streams without random access, or `Closed`.
    pub fn seek(&mut self, cursor: TextCursor) -> CoreResult<TextCursor> {
        self.inner.ensure_seekable()?;
        self.check_cursor(cursor)?;
        let offset = i64::try_from(cursor.position)
            .map_err(|_| CoreError::unsupported_seek("cursor out of range"))?;
        self.inner.seek(offset, Whence::Start)?;
        self.tell()
    }

    /// Seeks by origin and offset.
    ///
    /// Only [`Whence::Start`] is accepted; `offset` is then taken as a
    /// cursor cookie.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedSeek` for any other origin, even with a zero
    /// offset, and otherwise fails like [`seek`](Self::seek).
    pub fn seek_from(&mut self, offset: i64, whence: Whence) -> CoreResult<TextCursor> {
        self.inner.ensure_open()?;
        if whence != Whence::Start {
            return Err(CoreError::unsupported_seek(
                "text streams only seek from the start",
            ));
        }
        self.inner.ensure_seekable()?;
        self.inner.seek(offset, Whence::Start)?;
        self.tell()
    }

    /// Resizes the stream; see [`BufferedStream::truncate`].
    ///
    /// # Errors
    ///
    /// Returns `ForeignCursor` for a cursor from another handle, and
    /// otherwise the same as [`BufferedStream::truncate`].
    pub fn truncate(&mut self, new_len: Option<TextCursor>) -> CoreResult<TextCursor> {
        if let Some(cursor) = new_len {
            self.check_cursor(cursor)?;
        }
        let len = self.inner.truncate(new_len.map(|c| c.position))?;
        Ok(TextCursor {
            position: len,
            handle: Some(self.id),
        })
    }

    /// Flushes pending writes.
    ///
    /// # Errors
    ///
    /// Same as [`BufferedStream::flush`].
    pub fn flush(&mut self) -> CoreResult<()> {
        self.inner.flush()
    }

    /// Flushes and closes the handle.
    ///
    /// # Errors
    ///
    /// Same as [`BufferedStream::close`].
    pub fn close(&mut self) -> CoreResult<()> {
        self.inner.close()
    }

    /// Returns the underlying byte stream.
    #[must_use]
    pub fn into_inner(self) -> BufferedStream {
        self.inner
    }

    fn check_cursor(&self, cursor: TextCursor) -> CoreResult<()> {
        if cursor.handle.is_some_and(|id| id != self.id) {
            Err(CoreError::ForeignCursor)
        } else {
            Ok(())
        }
    }

    /// Decodes one character into `out`. Returns false at end of stream.
    fn read_char(&mut self, out: &mut String) -> CoreResult<bool> {
        let start = self.inner.position();
        let buf = self.inner.fill_buf()?;
        let Some(&lead) = buf.first() else {
            return Ok(false);
        };

        let width = self.encoding.sequence_len(lead);
        if width == 0 {
            self.inner.consume(1);
            return Err(CoreError::encoding(
                self.encoding,
                start,
                format!("invalid start byte 0x{lead:02x}"),
            ));
        }

        let decoded = if buf.len() >= width {
            let decoded = self.encoding.decode(&buf[..width], start);
            self.inner.consume(width);
            decoded?
        } else {
            // The sequence straddles the read buffer.
            let bytes = self.inner.read(width)?;
            self.encoding.decode(&bytes, start)?
        };
        out.push_str(&decoded);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StreamConfig;
    use crate::error::ErrorKind;
    use textio_storage::InMemoryStream;

    fn text(mode: &str, data: &[u8]) -> TextStream {
        text_with(mode, data, &StreamConfig::default())
    }

    fn text_with(mode: &str, data: &[u8], config: &StreamConfig) -> TextStream {
        let raw = InMemoryStream::with_data(data.to_vec());
        let inner =
            BufferedStream::new(Box::new(raw), ModeSpec::parse(mode).unwrap(), config).unwrap();
        TextStream::new(inner, config.encoding)
    }

    #[test]
    fn tell_counts_encoded_bytes() {
        let mut t = text("w+", b"");
        assert_eq!(t.write("你好").unwrap(), 2);
        assert_eq!(t.tell().unwrap().cookie(), 6);
    }

    #[test]
    fn overwrite_multibyte_at_beginning() {
        let mut t = text("w+", b"");
        t.write("你好").unwrap();
        t.seek(TextCursor::BEGINNING).unwrap();
        t.write("世界").unwrap();
        t.seek(TextCursor::BEGINNING).unwrap();
        assert_eq!(t.read_to_string().unwrap(), "世界");
    }

    #[test]
    fn read_counts_characters() {
        let mut t = text("r", "héllo wörld".as_bytes());
        assert_eq!(t.read(4).unwrap(), "héll");
        assert_eq!(t.tell().unwrap().cookie(), 5);
        assert_eq!(t.read(100).unwrap(), "o wörld");
        assert_eq!(t.read(1).unwrap(), "");
    }

    #[test]
    fn characters_straddling_the_buffer() {
        let config = StreamConfig::new().buffer_size(2);
        let mut t = text_with("r", "a世b界".as_bytes(), &config);
        assert_eq!(t.read(2).unwrap(), "a世");
        assert_eq!(t.read(10).unwrap(), "b界");
    }

    #[test]
    fn tell_and_seek_roundtrip() {
        let mut t = text("r", "alpha\nβeta\ngamma".as_bytes());
        t.read_line().unwrap();
        let mark = t.tell().unwrap();
        assert_eq!(t.read_line().unwrap(), "βeta\n");
        t.seek(mark).unwrap();
        assert_eq!(t.read_line().unwrap(), "βeta\n");
    }

    #[test]
    fn relative_seeks_are_refused() {
        let mut t = text("r", b"abc");
        for whence in [Whence::Current, Whence::End] {
            let err = t.seek_from(0, whence).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnsupportedSeek);
        }
        assert_eq!(t.seek_from(1, Whence::Start).unwrap().cookie(), 1);
        assert_eq!(t.read(2).unwrap(), "bc");
    }

    #[test]
    fn foreign_cursor_is_refused() {
        let mut a = text("r", b"abc");
        let mut b = text("r", b"abc");
        a.read(1).unwrap();
        let cursor = a.tell().unwrap();
        assert_eq!(b.seek(cursor).unwrap_err().kind(), ErrorKind::ForeignCursor);
        // BEGINNING is valid everywhere
        b.seek(TextCursor::BEGINNING).unwrap();
    }

    #[test]
    fn truncate_refuses_foreign_cursor() {
        let mut a = text("r+", b"hello");
        let mut b = text("r+", b"hello");
        a.read(2).unwrap();
        let cursor = a.tell().unwrap();

        assert_eq!(
            b.truncate(Some(cursor)).unwrap_err().kind(),
            ErrorKind::ForeignCursor
        );
        assert_eq!(b.read_to_string().unwrap(), "hello");

        assert_eq!(a.truncate(Some(cursor)).unwrap().cookie(), 2);
        assert_eq!(b.truncate(Some(TextCursor::BEGINNING)).unwrap().cookie(), 0);
    }

    #[test]
    fn append_encoding_error_reports_end_position() {
        let config = StreamConfig::new().encoding(Encoding::Ascii);
        let mut t = text_with("a+", b"abc", &config);
        t.seek(TextCursor::BEGINNING).unwrap();
        match t.write("x\u{e9}").unwrap_err() {
            CoreError::EncodingError { position, .. } => assert_eq!(position, 4),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_utf8_reports_position() {
        let mut t = text("r", b"ok\xffno");
        let err = t.read_to_string().unwrap_err();
        match err {
            CoreError::EncodingError {
                encoding, position, ..
            } => {
                assert_eq!(encoding, Encoding::Utf8);
                assert_eq!(position, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn truncated_sequence_at_end_is_an_error() {
        let mut t = text("r", b"ab\xe4\xbd");
        assert_eq!(t.read(2).unwrap(), "ab");
        assert_eq!(t.read(1).unwrap_err().kind(), ErrorKind::Encoding);

        let mut t = text("r", b"ab\xe4\xbd");
        assert_eq!(t.read_line().unwrap_err().kind(), ErrorKind::Encoding);
    }

    #[test]
    fn latin1_is_single_byte() {
        let config = StreamConfig::new().encoding(Encoding::Latin1);
        let mut t = text_with("w+", b"", &config);
        t.write("café").unwrap();
        assert_eq!(t.tell().unwrap().cookie(), 4);
        t.seek(TextCursor::BEGINNING).unwrap();
        assert_eq!(t.read_to_string().unwrap(), "café");

        let err = t.write("世").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encoding);
    }

    #[test]
    fn ascii_rejects_high_bytes() {
        let config = StreamConfig::new().encoding(Encoding::Ascii);
        let mut t = text_with("r", b"abc\xe9", &config);
        assert_eq!(t.read(3).unwrap(), "abc");
        assert_eq!(t.read(1).unwrap_err().kind(), ErrorKind::Encoding);
    }

    #[test]
    fn encoding_labels() {
        assert_eq!("UTF-8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("iso-8859-1".parse::<Encoding>().unwrap(), Encoding::Latin1);
        assert_eq!("us-ascii".parse::<Encoding>().unwrap(), Encoding::Ascii);
        let err = "utf-16".parse::<Encoding>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownEncoding);
        assert!(Encoding::Latin1.is_fixed_width());
        assert!(!Encoding::Utf8.is_fixed_width());
    }

    #[test]
    fn write_lines_and_read_lines() {
        let mut t = text("w+", b"");
        assert_eq!(t.write_lines(["hello\n", "world"]).unwrap(), 11);
        t.seek(TextCursor::BEGINNING).unwrap();
        assert_eq!(t.read_lines().unwrap(), ["hello\n", "world"]);
    }

    #[test]
    fn text_truncate_at_cursor() {
        let mut t = text("r+", "one two".as_bytes());
        t.read(3).unwrap();
        let len = t.truncate(None).unwrap();
        assert_eq!(len.cookie(), 3);
        t.seek(TextCursor::BEGINNING).unwrap();
        assert_eq!(t.read_to_string().unwrap(), "one");
    }
}
