//! Raw stream trait definition.

use crate::error::StorageResult;

/// An unbuffered, position-addressable byte sequence.
///
/// Raw streams are **opaque byte stores**. Cursors, open modes and
/// buffering are layered on top by `textio_core`; a raw stream only moves
/// bytes to and from absolute offsets.
///
/// # Invariants
///
/// - `read_at` returns at most `len` bytes and returns fewer only when the
///   end of the stream is reached; reading at or past the end yields an
///   empty vector
/// - `write_at` overwrites in place and zero-fills any gap past the end
/// - `append` always writes at the current end and returns that offset
/// - Non-seekable streams accept only the offset they are positioned at
///   and fail every other positional request with `NotSeekable`
///
/// # Implementors
///
/// - [`super::InMemoryStream`] - For testing
/// - [`super::FileStream`] - For OS files
/// - [`super::PipeStream`] - Sequential FIFO
pub trait RawStream: Send + Sync {
    /// Reads up to `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs, the stream is closed, or a
    /// non-seekable stream is asked for an offset other than its read
    /// position.
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>>;

    /// Writes `data` at `offset`, overwriting existing bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs, the stream is closed, or a
    /// non-seekable stream is asked for an offset other than its end.
    fn write_at(&mut self, offset: u64, data: &[u8]) -> StorageResult<()>;

    /// Appends data to the end of the stream.
    ///
    /// Returns the offset where the data was written.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs or the stream is closed.
    fn append(&mut self, data: &[u8]) -> StorageResult<u64>;

    /// Returns the current length of the stream in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined, including
    /// `NotSeekable` for sequential streams.
    fn size(&self) -> StorageResult<u64>;

    /// Resizes the stream to `new_len` bytes.
    ///
    /// Shrinking discards the tail; growing zero-fills.
    ///
    /// # Errors
    ///
    /// Returns an error if the resize fails or the stream is not seekable.
    fn truncate(&mut self, new_len: u64) -> StorageResult<()>;

    /// Pushes written data to the OS.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush operation fails.
    fn flush(&mut self) -> StorageResult<()>;

    /// Syncs data and metadata to durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    fn sync(&mut self) -> StorageResult<()>;

    /// Returns whether this stream supports random access.
    fn is_seekable(&self) -> bool {
        true
    }

    /// Releases the underlying resource.
    ///
    /// Further calls fail with `Closed`. Closing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if releasing the resource fails.
    fn close(&mut self) -> StorageResult<()> {
        Ok(())
    }
}
