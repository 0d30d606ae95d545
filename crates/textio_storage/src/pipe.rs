//! In-memory FIFO stream without random access.

use crate::backend::RawStream;
use crate::error::{StorageError, StorageResult};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug, Default)]
struct PipeState {
    queue: VecDeque<u8>,
    consumed: u64,
    produced: u64,
    closed: bool,
}

/// A sequential, pipe-like byte stream.
///
/// Reads consume bytes from the front, writes go to the back. The stream
/// is not seekable: it only accepts the offset it is currently positioned
/// at (bytes consumed so far for reads, bytes produced so far for writes),
/// and `size`/`truncate` fail with [`StorageError::NotSeekable`].
///
/// Clones share the same queue, so one clone can act as the far end of a
/// pipe handed to a handle.
///
/// # Example
///
/// ```rust
/// use textio_storage::{PipeStream, RawStream};
///
/// let mut writer = PipeStream::new();
/// let reader = writer.clone();
/// writer.append(b"ping").unwrap();
/// assert_eq!(reader.read_at(0, 16).unwrap(), b"ping");
/// assert!(!reader.is_seekable());
/// ```
#[derive(Debug, Default, Clone)]
pub struct PipeStream {
    state: Arc<Mutex<PipeState>>,
}

impl PipeStream {
    /// Creates an empty pipe.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pipe with bytes already waiting to be read.
    #[must_use]
    pub fn with_data(data: &[u8]) -> Self {
        let pipe = Self::new();
        {
            let mut state = pipe.state.lock();
            state.queue.extend(data);
            state.produced = data.len() as u64;
        }
        pipe
    }

    /// Removes and returns every byte currently waiting in the pipe.
    pub fn drain(&self) -> Vec<u8> {
        let mut state = self.state.lock();
        let bytes: Vec<u8> = state.queue.drain(..).collect();
        state.consumed += bytes.len() as u64;
        bytes
    }
}

impl RawStream for PipeStream {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(StorageError::Closed);
        }
        if offset != state.consumed {
            return Err(StorageError::not_seekable("read_at"));
        }
        let take = len.min(state.queue.len());
        let bytes: Vec<u8> = state.queue.drain(..take).collect();
        state.consumed += bytes.len() as u64;
        Ok(bytes)
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> StorageResult<()> {
        {
            let state = self.state.lock();
            if !state.closed && offset != state.produced {
                return Err(StorageError::not_seekable("write_at"));
            }
        }
        self.append(data).map(|_| ())
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(StorageError::Closed);
        }
        let offset = state.produced;
        state.queue.extend(data);
        state.produced += data.len() as u64;
        Ok(offset)
    }

    fn size(&self) -> StorageResult<u64> {
        Err(StorageError::not_seekable("size"))
    }

    fn truncate(&mut self, _new_len: u64) -> StorageResult<()> {
        Err(StorageError::not_seekable("truncate"))
    }

    fn flush(&mut self) -> StorageResult<()> {
        Ok(())
    }

    fn sync(&mut self) -> StorageResult<()> {
        Ok(())
    }

    fn is_seekable(&self) -> bool {
        false
    }

    fn close(&mut self) -> StorageResult<()> {
        self.state.lock().closed = true;
        Ok(())
    }
}
