//! Test fixtures and stream helpers.
//!
//! Provides convenience functions for setting up temporary files and
//! in-memory handles for common test scenarios.

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use textio_core::{
    open, open_with, BufferedStream, ModeSpec, StreamConfig, StreamHandle, TextStream,
};
use textio_storage::{InMemoryStream, PipeStream};

/// A file in its own temporary directory, removed on drop.
pub struct TestFile {
    path: PathBuf,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: TempDir,
}

impl TestFile {
    /// Creates a path for a file that does not exist yet.
    pub fn new(name: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        Self {
            path: temp_dir.path().join(name),
            _temp_dir: temp_dir,
        }
    }

    /// Creates a file holding `content`.
    pub fn with_content(name: &str, content: impl AsRef<[u8]>) -> Self {
        let file = Self::new(name);
        std::fs::write(&file.path, content).expect("Failed to write fixture file");
        file
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the file with a mode string.
    pub fn open(&self, mode: &str) -> StreamHandle {
        open(&self.path, mode).expect("Failed to open fixture file")
    }

    /// Opens the file with a mode string and configuration.
    pub fn open_with(&self, mode: &str, config: &StreamConfig) -> StreamHandle {
        open_with(&self.path, mode, config).expect("Failed to open fixture file")
    }

    /// Opens the file as a text handle.
    pub fn text(&self, mode: &str) -> TextStream {
        self.open(mode).into_text().expect("Mode is not a text mode")
    }

    /// Opens the file as a binary handle.
    pub fn binary(&self, mode: &str) -> BufferedStream {
        self.open(mode).into_binary().expect("Mode is not a binary mode")
    }

    /// Reads the file's bytes straight from disk.
    pub fn contents(&self) -> Vec<u8> {
        std::fs::read(&self.path).expect("Failed to read fixture file")
    }

    /// Returns true if the file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

/// Opens an in-memory handle holding `data`.
pub fn memory_handle(mode: &str, data: &[u8], config: &StreamConfig) -> StreamHandle {
    let mode = ModeSpec::parse(mode).expect("Invalid mode");
    let raw = InMemoryStream::with_data(data.to_vec());
    StreamHandle::from_raw(Box::new(raw), mode, config).expect("Failed to open memory stream")
}

/// Opens an in-memory text handle holding `data`.
pub fn memory_text(mode: &str, data: &str) -> TextStream {
    memory_handle(mode, data.as_bytes(), &StreamConfig::default())
        .into_text()
        .expect("Mode is not a text mode")
}

/// Opens an in-memory binary handle holding `data`.
pub fn memory_binary(mode: &str, data: &[u8]) -> BufferedStream {
    memory_handle(mode, data, &StreamConfig::default())
        .into_binary()
        .expect("Mode is not a binary mode")
}

/// Opens a handle over a fresh pipe holding `data`.
///
/// Returns the handle and the far end of the pipe, so tests can see what
/// the handle flushed and feed it more input.
pub fn pipe_handle(mode: &str, data: &[u8]) -> (StreamHandle, PipeStream) {
    let mode = ModeSpec::parse(mode).expect("Invalid mode");
    let pipe = PipeStream::with_data(data);
    let handle = StreamHandle::from_raw(Box::new(pipe.clone()), mode, &StreamConfig::default())
        .expect("Failed to open pipe stream");
    (handle, pipe)
}

/// Runs a test with a path inside a temporary directory.
///
/// # Example
///
/// ```rust
/// use textio_testkit::with_temp_file;
///
/// with_temp_file("note.txt", |path| {
///     let mut text = textio_core::open(path, "w+").unwrap().into_text().unwrap();
///     text.write("hello").unwrap();
/// });
/// ```
pub fn with_temp_file<F, R>(name: &str, f: F) -> R
where
    F: FnOnce(&Path) -> R,
{
    let file = TestFile::new(name);
    f(file.path())
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use textio_core::CoreResult;

    /// The two-line note used across scenarios.
    pub const NOTE: &str = "hello\nworld";

    /// Writes [`NOTE`] through a `w+` text handle and returns it,
    /// positioned at the end.
    pub fn written_note(file: &TestFile) -> CoreResult<TextStream> {
        let mut text = file.text("w+");
        text.write(NOTE)?;
        Ok(text)
    }

    /// A file whose content is a numbered line per entry.
    pub fn numbered_lines(name: &str, count: usize) -> TestFile {
        let content: String = (0..count).map(|i| format!("line {i}\n")).collect();
        TestFile::with_content(name, content)
    }
}
