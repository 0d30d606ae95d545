//! In-memory raw stream for testing.

use crate::backend::RawStream;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::io;

/// A random-access byte stream held in memory.
///
/// Suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral handles that don't need persistence
///
/// # Example
///
/// ```rust
/// use textio_storage::{InMemoryStream, RawStream};
///
/// let mut stream = InMemoryStream::new();
/// let offset = stream.append(b"test data").unwrap();
/// assert_eq!(offset, 0);
/// assert_eq!(stream.size().unwrap(), 9);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStream {
    data: RwLock<Vec<u8>>,
    closed: bool,
}

impl InMemoryStream {
    /// Creates a new empty in-memory stream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory stream with pre-existing content.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data: RwLock::new(data),
            closed: false,
        }
    }

    /// Returns a copy of all bytes in the stream.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        self.data.read().clone()
    }

    /// Converts `offset..offset + len` to in-memory indices.
    fn span(offset: u64, len: usize) -> StorageResult<(usize, usize)> {
        let start =
            usize::try_from(offset).map_err(|_| StorageError::offset_out_of_range(offset))?;
        let end = start
            .checked_add(len)
            .ok_or_else(|| StorageError::offset_out_of_range(offset))?;
        Ok((start, end))
    }

    /// Zero-extends `data` to `len` bytes, failing instead of aborting
    /// when the allocation is impossible.
    fn grow(data: &mut Vec<u8>, len: usize) -> StorageResult<()> {
        if data.len() < len {
            data.try_reserve(len - data.len())
                .map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e))?;
            data.resize(len, 0);
        }
        Ok(())
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.closed {
            return Err(StorageError::Closed);
        }
        Ok(())
    }
}

impl RawStream for InMemoryStream {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        self.ensure_open()?;
        let data = self.data.read();
        let size = data.len() as u64;
        if offset >= size {
            return Ok(Vec::new());
        }
        let start = offset as usize;
        let end = start.saturating_add(len).min(data.len());
        Ok(data[start..end].to_vec())
    }

    fn write_at(&mut self, offset: u64, new_data: &[u8]) -> StorageResult<()> {
        self.ensure_open()?;
        let mut data = self.data.write();
        let (start, end) = Self::span(offset, new_data.len())?;
        Self::grow(&mut data, end)?;
        data[start..end].copy_from_slice(new_data);
        Ok(())
    }

    fn append(&mut self, new_data: &[u8]) -> StorageResult<u64> {
        self.ensure_open()?;
        let mut data = self.data.write();
        let offset = data.len() as u64;
        data.extend_from_slice(new_data);
        Ok(offset)
    }

    fn size(&self) -> StorageResult<u64> {
        self.ensure_open()?;
        Ok(self.data.read().len() as u64)
    }

    fn truncate(&mut self, new_len: u64) -> StorageResult<()> {
        self.ensure_open()?;
        let (len, _) = Self::span(new_len, 0)?;
        let mut data = self.data.write();
        if len <= data.len() {
            data.truncate(len);
            Ok(())
        } else {
            Self::grow(&mut data, len)
        }
    }

    fn flush(&mut self) -> StorageResult<()> {
        // Nothing is pending in memory
        self.ensure_open()
    }

    fn sync(&mut self) -> StorageResult<()> {
        self.ensure_open()
    }

    fn close(&mut self) -> StorageResult<()> {
        self.closed = true;
        Ok(())
    }
}
