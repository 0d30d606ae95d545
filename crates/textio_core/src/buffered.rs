//! Buffered byte stream over a raw stream.

use crate::config::StreamConfig;
use crate::error::{CoreError, CoreResult};
use crate::mode::ModeSpec;
use std::io;
use textio_storage::RawStream;
use tracing::{debug, trace, warn};

/// Reference point of a seek offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Whence {
    /// From the start of the stream.
    Start,
    /// From the current cursor.
    Current,
    /// From the end of the stream.
    End,
}

/// Bytes read ahead of the cursor.
#[derive(Debug, Default)]
struct ReadBuffer {
    start: u64,
    data: Vec<u8>,
}

impl ReadBuffer {
    /// The buffered bytes at and after `pos`, if `pos` falls inside.
    fn slice_from(&self, pos: u64) -> &[u8] {
        match pos.checked_sub(self.start) {
            Some(skip) if skip < self.data.len() as u64 => &self.data[skip as usize..],
            _ => &[],
        }
    }

    fn clear(&mut self) {
        self.data.clear();
    }
}

/// Contiguous bytes written but not yet handed to the raw stream.
#[derive(Debug)]
struct PendingWrite {
    offset: u64,
    data: Vec<u8>,
}

impl PendingWrite {
    /// Staged runs never pass `u64::MAX`; `write` checks each end first.
    fn end(&self) -> u64 {
        self.offset.saturating_add(self.data.len() as u64)
    }
}

/// A buffered, mode-checked byte stream.
///
/// `BufferedStream` owns one [`RawStream`] and one [`ModeSpec`] and tracks
/// a byte cursor. Every call checks the mode's capabilities first:
/// reading a write-only handle fails with `NotReadable`, writing a
/// read-only handle with `NotWritable`, and any call after
/// [`close`](Self::close) with `Closed`.
///
/// # Buffering
///
/// - Reads fill a read-ahead buffer of `buffer_size` bytes
/// - Writes collect into one contiguous pending run, handed to the raw
///   stream when it reaches `buffer_size`, when a write is not contiguous,
///   and before any read, seek, truncate or close
/// - [`tell`](Self::tell) reports the position as if unbuffered
///
/// # Append Mode
///
/// Handles opened with `a` or `a+` place every write at the current end
/// of the stream, whatever the cursor says, and then move the cursor to
/// the new end.
///
/// # Non-seekable Streams
///
/// On raw streams without random access, `seek`, `tell` and `truncate`
/// fail with `UnsupportedSeek`; reads consume from the front and writes
/// go to the back.
///
/// Dropping a handle flushes pending writes; a failure is logged since
/// it cannot be returned.
pub struct BufferedStream {
    raw: Box<dyn RawStream>,
    mode: ModeSpec,
    buffer_size: usize,
    seekable: bool,
    /// Logical cursor. On non-seekable streams, the read position.
    pos: u64,
    read_buf: ReadBuffer,
    pending: Option<PendingWrite>,
    closed: bool,
}

impl BufferedStream {
    /// Wraps a raw stream with the given mode.
    ///
    /// Truncating modes discard existing content here, before the handle
    /// is returned. Append modes start with the cursor at the end.
    ///
    /// # Errors
    ///
    /// Returns an error if the raw stream cannot be sized or truncated.
    pub fn new(
        mut raw: Box<dyn RawStream>,
        mode: ModeSpec,
        config: &StreamConfig,
    ) -> CoreResult<Self> {
        let seekable = raw.is_seekable();

        let mut pos = 0;
        if seekable {
            if mode.truncate() && raw.size()? > 0 {
                raw.truncate(0)?;
            }
            if mode.append() {
                pos = raw.size()?;
            }
        }

        Ok(Self {
            raw,
            mode,
            buffer_size: config.buffer_size.max(1),
            seekable,
            pos,
            read_buf: ReadBuffer::default(),
            pending: None,
            closed: false,
        })
    }

    /// Returns the handle's mode.
    #[must_use]
    pub fn mode(&self) -> ModeSpec {
        self.mode
    }

    /// Whether reads are permitted.
    #[must_use]
    pub fn readable(&self) -> bool {
        self.mode.readable()
    }

    /// Whether writes are permitted.
    #[must_use]
    pub fn writable(&self) -> bool {
        self.mode.writable()
    }

    /// Whether the raw stream supports random access.
    #[must_use]
    pub fn seekable(&self) -> bool {
        self.seekable
    }

    /// Whether [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Reads up to `max_bytes` from the cursor.
    ///
    /// Returns fewer bytes only at end of stream; at end of stream the
    /// result is empty, every time, until a write or seek changes that.
    ///
    /// # Errors
    ///
    /// Returns `NotReadable`, `Closed`, or a raw stream failure.
    pub fn read(&mut self, max_bytes: usize) -> CoreResult<Vec<u8>> {
        self.ensure_readable()?;
        self.flush_pending()?;

        let mut out = Vec::with_capacity(max_bytes.min(self.buffer_size));
        while out.len() < max_bytes {
            let want = max_bytes - out.len();
            if self.buffered().is_empty() && !self.refill(want)? {
                break;
            }
            let chunk = self.buffered();
            let n = chunk.len().min(want);
            out.extend_from_slice(&chunk[..n]);
            self.pos += n as u64;
        }
        Ok(out)
    }

    /// Reads everything from the cursor to the end of the stream.
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read).
    pub fn read_to_end(&mut self) -> CoreResult<Vec<u8>> {
        self.ensure_readable()?;
        self.flush_pending()?;

        let mut out = Vec::new();
        loop {
            if self.buffered().is_empty() && !self.refill(self.buffer_size)? {
                break;
            }
            let chunk = self.buffered();
            let n = chunk.len();
            out.extend_from_slice(chunk);
            self.pos += n as u64;
        }
        Ok(out)
    }

    /// Reads through the next `\n`, which is kept.
    ///
    /// The last line of a stream without a trailing newline is returned
    /// as is; after that the result is empty.
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read).
    pub fn read_line(&mut self) -> CoreResult<Vec<u8>> {
        self.ensure_readable()?;
        self.flush_pending()?;

        let mut line = Vec::new();
        loop {
            if self.buffered().is_empty() && !self.refill(self.buffer_size)? {
                break;
            }
            let chunk = self.buffered();
            match chunk.iter().position(|&b| b == b'\n') {
                Some(i) => {
                    line.extend_from_slice(&chunk[..=i]);
                    self.pos += i as u64 + 1;
                    break;
                }
                None => {
                    let n = chunk.len();
                    line.extend_from_slice(chunk);
                    self.pos += n as u64;
                }
            }
        }
        Ok(line)
    }

    /// Writes `data` and returns the number of bytes written.
    ///
    /// Non-append handles overwrite at the cursor and advance it. Append
    /// handles write at the end of the stream regardless of prior seeks,
    /// and move the cursor to the new end, even for an empty write.
    ///
    /// # Errors
    ///
    /// Returns `NotWritable`, `Closed`, or a raw stream failure.
    pub fn write(&mut self, data: &[u8]) -> CoreResult<usize> {
        self.ensure_writable()?;

        if !self.seekable {
            // Sequential: every write goes to the back, cursor untouched.
            if !data.is_empty() {
                self.stage(None, data)?;
            }
            return Ok(data.len());
        }

        let offset = self.write_position()?;
        let end = offset
            .checked_add(data.len() as u64)
            .ok_or_else(CoreError::position_overflow)?;

        // Even an empty append write leaves the cursor at the end
        if !data.is_empty() {
            self.read_buf.clear();
            self.stage(Some(offset), data)?;
        }
        self.pos = end;
        Ok(data.len())
    }

    /// Writes each buffer in turn, with no separator.
    ///
    /// Returns the total number of bytes written.
    ///
    /// # Errors
    ///
    /// Same as [`write`](Self::write).
    pub fn write_all_lines<I, B>(&mut self, lines: I) -> CoreResult<usize>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut total = 0;
        for line in lines {
            total += self.write(line.as_ref())?;
        }
        Ok(total)
    }

    /// Moves the cursor and returns the new position.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedSeek` if the raw stream is not seekable,
    /// `NegativeSeek` if the target lies before the start, or `Closed`.
    pub fn seek(&mut self, offset: i64, whence: Whence) -> CoreResult<u64> {
        self.ensure_seekable()?;
        self.flush_pending()?;

        let base = match whence {
            Whence::Start => 0,
            Whence::Current => self.pos,
            Whence::End => self.raw.size()?,
        };
        let target = i128::from(base) + i128::from(offset);
        self.pos = u64::try_from(target).map_err(|_| {
            if target < 0 {
                CoreError::NegativeSeek { position: target }
            } else {
                CoreError::position_overflow()
            }
        })?;
        Ok(self.pos)
    }

    /// Returns the cursor position.
    ///
    /// Pending writes are counted, so the result matches an unbuffered
    /// stream.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedSeek` if the raw stream is not seekable, or
    /// `Closed`.
    pub fn tell(&self) -> CoreResult<u64> {
        self.ensure_seekable()?;
        Ok(self.pos)
    }

    /// Resizes the stream to `new_len`, or to the cursor when `None`.
    ///
    /// The cursor does not move. Returns the new length.
    ///
    /// # Errors
    ///
    /// Returns `NotWritable`, `UnsupportedSeek` if the raw stream is not
    /// seekable, or `Closed`.
    pub fn truncate(&mut self, new_len: Option<u64>) -> CoreResult<u64> {
        self.ensure_writable()?;
        self.ensure_seekable()?;
        self.flush_pending()?;

        let len = new_len.unwrap_or(self.pos);
        self.raw.truncate(len)?;
        self.read_buf.clear();
        Ok(len)
    }

    /// Hands pending writes to the raw stream and flushes it.
    ///
    /// # Errors
    ///
    /// Returns `Closed` or a raw stream failure.
    pub fn flush(&mut self) -> CoreResult<()> {
        self.ensure_open()?;
        self.flush_pending()?;
        self.raw.flush()?;
        Ok(())
    }

    /// Flushes and releases the raw stream.
    ///
    /// Closing twice is a no-op. The handle is closed even if the final
    /// flush fails; that failure is returned.
    ///
    /// # Errors
    ///
    /// Returns the first failure of the final flush or the release.
    pub fn close(&mut self) -> CoreResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let flushed = self
            .flush_pending()
            .and_then(|()| self.raw.flush().map_err(CoreError::from));
        let released = self.raw.close().map_err(CoreError::from);
        self.read_buf.clear();

        debug!("closed {} stream", self.mode);
        flushed.and(released)
    }

    /// Buffered bytes at the cursor, refilling from the raw stream when
    /// empty. Empty at end of stream.
    pub(crate) fn fill_buf(&mut self) -> CoreResult<&[u8]> {
        self.ensure_readable()?;
        self.flush_pending()?;
        if self.buffered().is_empty() {
            self.refill(self.buffer_size)?;
        }
        Ok(self.buffered())
    }

    /// Advances the cursor past `n` bytes returned by [`fill_buf`](Self::fill_buf).
    pub(crate) fn consume(&mut self, n: usize) {
        let n = n.min(self.buffered().len());
        self.pos += n as u64;
    }

    /// Where the next write lands: the end of the stream for append
    /// handles, the cursor otherwise.
    pub(crate) fn write_position(&self) -> CoreResult<u64> {
        if self.mode.append() && self.seekable {
            match &self.pending {
                Some(pending) => Ok(pending.end()),
                None => Ok(self.raw.size()?),
            }
        } else {
            Ok(self.pos)
        }
    }

    /// Cursor position without capability checks, for diagnostics.
    pub(crate) fn position(&self) -> u64 {
        self.pos
    }

    pub(crate) fn ensure_open(&self) -> CoreResult<()> {
        if self.closed {
            Err(CoreError::Closed)
        } else {
            Ok(())
        }
    }

    pub(crate) fn ensure_readable(&self) -> CoreResult<()> {
        self.ensure_open()?;
        if self.mode.readable() {
            Ok(())
        } else {
            Err(CoreError::NotReadable)
        }
    }

    pub(crate) fn ensure_writable(&self) -> CoreResult<()> {
        self.ensure_open()?;
        if self.mode.writable() {
            Ok(())
        } else {
            Err(CoreError::NotWritable)
        }
    }

    pub(crate) fn ensure_seekable(&self) -> CoreResult<()> {
        self.ensure_open()?;
        if self.seekable {
            Ok(())
        } else {
            Err(CoreError::unsupported_seek(
                "stream does not support random access",
            ))
        }
    }

    fn buffered(&self) -> &[u8] {
        self.read_buf.slice_from(self.pos)
    }

    /// Reads at least `want` bytes (or `buffer_size`) at the cursor into
    /// the read buffer. Returns false at end of stream.
    fn refill(&mut self, want: usize) -> CoreResult<bool> {
        let len = want.max(self.buffer_size);
        let data = self.raw.read_at(self.pos, len)?;
        trace!("refilled {} of {} bytes at offset {}", data.len(), len, self.pos);

        if data.is_empty() {
            self.read_buf.clear();
            return Ok(false);
        }
        self.read_buf = ReadBuffer {
            start: self.pos,
            data,
        };
        Ok(true)
    }

    /// Adds `data` to the pending run, starting a new run when `offset`
    /// does not continue the current one. `None` means "at the back" for
    /// sequential streams.
    fn stage(&mut self, offset: Option<u64>, data: &[u8]) -> CoreResult<()> {
        let contiguous = match (&self.pending, offset) {
            (Some(pending), Some(offset)) => pending.end() == offset,
            (Some(_), None) => true,
            (None, _) => false,
        };

        if contiguous {
            if let Some(pending) = self.pending.as_mut() {
                pending.data.extend_from_slice(data);
            }
        } else {
            self.flush_pending()?;
            self.pending = Some(PendingWrite {
                offset: offset.unwrap_or(0),
                data: data.to_vec(),
            });
        }

        if self
            .pending
            .as_ref()
            .is_some_and(|p| p.data.len() >= self.buffer_size)
        {
            self.flush_pending()?;
        }
        Ok(())
    }

    fn flush_pending(&mut self) -> CoreResult<()> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };
        trace!(
            "flushing {} bytes at offset {}",
            pending.data.len(),
            pending.offset
        );

        if self.mode.append() || !self.seekable {
            self.raw.append(&pending.data)?;
        } else {
            self.raw.write_at(pending.offset, &pending.data)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for BufferedStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferedStream")
            .field("mode", &self.mode)
            .field("pos", &self.pos)
            .field("seekable", &self.seekable)
            .field("pending", &self.pending.as_ref().map_or(0, |p| p.data.len()))
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl Drop for BufferedStream {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("failed to flush stream on drop: {}", e);
        }
    }
}

impl io::Read for BufferedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let chunk = self.fill_buf()?;
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl io::Write for BufferedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(BufferedStream::write(self, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(BufferedStream::flush(self)?)
    }
}

impl io::Seek for BufferedStream {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let (offset, whence) = match pos {
            io::SeekFrom::Start(n) => {
                let n = i64::try_from(n).map_err(|_| {
                    io::Error::new(io::ErrorKind::InvalidInput, "seek offset exceeds i64")
                })?;
                (n, Whence::Start)
            }
            io::SeekFrom::Current(n) => (n, Whence::Current),
            io::SeekFrom::End(n) => (n, Whence::End),
        };
        Ok(BufferedStream::seek(self, offset, whence)?)
    }
}
