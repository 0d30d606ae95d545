//! File-backed raw stream.

use crate::backend::RawStream;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Positions of a sequential (non-seekable) file such as a FIFO.
#[derive(Debug, Default, Clone, Copy)]
struct SequentialPositions {
    read: u64,
    written: u64,
}

/// A raw stream over an OS file.
///
/// Regular files are random access. Descriptors that refuse to seek
/// (FIFOs, character devices) are detected at open time and served
/// sequentially; see [`RawStream::is_seekable`].
///
/// # Durability
///
/// - `flush()` calls `File::flush()` to push data to the OS
/// - `sync()` calls `File::sync_all()` to ensure data is on disk
///
/// # Example
///
/// ```no_run
/// use textio_storage::{FileStream, RawStream};
/// use std::path::Path;
///
/// let mut stream = FileStream::open(Path::new("data.bin")).unwrap();
/// stream.append(b"persistent data").unwrap();
/// stream.sync().unwrap();
/// ```
#[derive(Debug)]
pub struct FileStream {
    path: PathBuf,
    file: RwLock<Option<File>>,
    size: RwLock<u64>,
    seekable: bool,
    sequential: RwLock<SequentialPositions>,
}

impl FileStream {
    /// Opens or creates a read/write file stream at the given path.
    ///
    /// Existing content is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or created.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true).truncate(false);
        Self::open_with(path, &options)
    }

    /// Opens a file stream with caller-chosen open options.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened; the underlying
    /// `io::Error` is preserved so callers can inspect its kind.
    pub fn open_with(path: &Path, options: &OpenOptions) -> StorageResult<Self> {
        let file = options.open(path)?;
        Self::from_file(path, file)
    }

    /// Opens or creates a file stream, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or file cannot be opened.
    pub fn open_with_create_dirs(path: &Path, options: &OpenOptions) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::open_with(path, options)
    }

    /// Wraps an already opened file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file metadata cannot be read.
    pub fn from_file(path: &Path, file: File) -> StorageResult<Self> {
        let seekable = (&file).stream_position().is_ok();
        let size = if seekable { file.metadata()?.len() } else { 0 };

        Ok(Self {
            path: path.to_path_buf(),
            file: RwLock::new(Some(file)),
            size: RwLock::new(size),
            seekable,
            sequential: RwLock::new(SequentialPositions::default()),
        })
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_sequential(&self, file: &mut File, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let mut positions = self.sequential.write();
        if offset != positions.read {
            return Err(StorageError::not_seekable("read_at"));
        }
        let mut buffer = Vec::with_capacity(len.min(64 * 1024));
        Read::by_ref(file).take(len as u64).read_to_end(&mut buffer)?;
        positions.read += buffer.len() as u64;
        Ok(buffer)
    }

    fn write_sequential(&self, file: &mut File, offset: Option<u64>, data: &[u8]) -> StorageResult<u64> {
        let mut positions = self.sequential.write();
        if offset.is_some_and(|offset| offset != positions.written) {
            return Err(StorageError::not_seekable("write_at"));
        }
        let at = positions.written;
        file.write_all(data)?;
        positions.written += data.len() as u64;
        Ok(at)
    }
}

impl RawStream for FileStream {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let mut guard = self.file.write();
        let file = guard.as_mut().ok_or(StorageError::Closed)?;

        if !self.seekable {
            return self.read_sequential(file, offset, len);
        }

        let size = *self.size.read();
        if len == 0 || offset >= size {
            return Ok(Vec::new());
        }

        let wanted = (size - offset).min(len as u64);
        file.seek(SeekFrom::Start(offset))?;
        let mut buffer = Vec::with_capacity(wanted as usize);
        Read::by_ref(file).take(wanted).read_to_end(&mut buffer)?;

        Ok(buffer)
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> StorageResult<()> {
        let mut guard = self.file.write();
        let file = guard.as_mut().ok_or(StorageError::Closed)?;

        if !self.seekable {
            self.write_sequential(file, Some(offset), data)?;
            return Ok(());
        }

        if data.is_empty() {
            return Ok(());
        }

        let end = offset
            .checked_add(data.len() as u64)
            .ok_or_else(|| StorageError::offset_out_of_range(offset))?;
        let mut size = self.size.write();
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(data)?;
        *size = (*size).max(end);

        Ok(())
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        let mut guard = self.file.write();
        let file = guard.as_mut().ok_or(StorageError::Closed)?;

        if !self.seekable {
            return self.write_sequential(file, None, data);
        }

        let mut size = self.size.write();
        if data.is_empty() {
            return Ok(*size);
        }

        let offset = file.seek(SeekFrom::End(0))?;
        file.write_all(data)?;
        *size = offset + data.len() as u64;

        Ok(offset)
    }

    fn size(&self) -> StorageResult<u64> {
        if self.file.read().is_none() {
            return Err(StorageError::Closed);
        }
        if !self.seekable {
            return Err(StorageError::not_seekable("size"));
        }
        Ok(*self.size.read())
    }

    fn truncate(&mut self, new_len: u64) -> StorageResult<()> {
        let mut guard = self.file.write();
        let file = guard.as_mut().ok_or(StorageError::Closed)?;

        if !self.seekable {
            return Err(StorageError::not_seekable("truncate"));
        }

        let mut size = self.size.write();
        file.set_len(new_len)?;
        *size = new_len;

        Ok(())
    }

    fn flush(&mut self) -> StorageResult<()> {
        let mut guard = self.file.write();
        let file = guard.as_mut().ok_or(StorageError::Closed)?;
        file.flush()?;
        Ok(())
    }

    fn sync(&mut self) -> StorageResult<()> {
        let guard = self.file.write();
        let file = guard.as_ref().ok_or(StorageError::Closed)?;
        file.sync_all()?;
        Ok(())
    }

    fn is_seekable(&self) -> bool {
        self.seekable
    }

    fn close(&mut self) -> StorageResult<()> {
        if let Some(mut file) = self.file.write().take() {
            file.flush()?;
        }
        Ok(())
    }
}
