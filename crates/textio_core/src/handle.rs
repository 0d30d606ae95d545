//! Opening streams.

use crate::buffered::BufferedStream;
use crate::config::StreamConfig;
use crate::error::{CoreError, CoreResult};
use crate::mode::ModeSpec;
use crate::text::TextStream;
use std::path::Path;
use textio_storage::{FileStream, InMemoryStream, RawStream};
use tracing::debug;

/// Opens the file at `path` with a mode string such as `"r"` or `"ab+"`.
///
/// The mode is validated before the file system is touched. Truncating
/// modes have discarded existing content by the time this returns.
///
/// # Errors
///
/// Returns `InvalidMode` for a bad mode string, `NotFound` when a mode
/// that does not create (`r`, `r+`) names a missing file,
/// `PermissionDenied` when the OS refuses access, or a storage error.
///
/// # Example
///
/// ```no_run
/// use textio_core::open;
///
/// let mut text = open("note.txt", "w+")?.into_text().unwrap();
/// text.write("hello\nworld")?;
/// # Ok::<(), textio_core::CoreError>(())
/// ```
pub fn open(path: impl AsRef<Path>, mode: &str) -> CoreResult<StreamHandle> {
    open_with(path, mode, &StreamConfig::default())
}

/// Opens the file at `path` with explicit configuration.
///
/// # Errors
///
/// Same as [`open`].
pub fn open_with(
    path: impl AsRef<Path>,
    mode: &str,
    config: &StreamConfig,
) -> CoreResult<StreamHandle> {
    let path = path.as_ref();
    let spec = ModeSpec::parse(mode)?;

    let options = spec.open_options();
    let file = if config.create_parent_dirs && spec.create() {
        FileStream::open_with_create_dirs(path, &options)
    } else {
        FileStream::open_with(path, &options)
    }
    .map_err(|e| CoreError::from_open(e, path))?;

    debug!("opened {:?} with mode {}", path, spec);
    StreamHandle::from_raw(Box::new(file), spec, config)
}

/// An open stream: byte-oriented or character-oriented per its mode.
#[derive(Debug)]
pub enum StreamHandle {
    /// Opened with `b`.
    Binary(BufferedStream),
    /// Opened without `b`.
    Text(TextStream),
}

impl StreamHandle {
    /// Wraps an arbitrary raw stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the raw stream cannot be prepared for the mode
    /// (sizing for append, truncation).
    pub fn from_raw(
        raw: Box<dyn RawStream>,
        mode: ModeSpec,
        config: &StreamConfig,
    ) -> CoreResult<Self> {
        let inner = BufferedStream::new(raw, mode, config)?;
        Ok(if mode.binary() {
            StreamHandle::Binary(inner)
        } else {
            StreamHandle::Text(TextStream::new(inner, config.encoding))
        })
    }

    /// Opens an empty in-memory stream.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMode` for a bad mode string.
    pub fn open_in_memory(mode: &str) -> CoreResult<Self> {
        let spec = ModeSpec::parse(mode)?;
        Self::from_raw(
            Box::new(InMemoryStream::new()),
            spec,
            &StreamConfig::default(),
        )
    }

    /// Returns the handle's mode.
    #[must_use]
    pub fn mode(&self) -> ModeSpec {
        match self {
            StreamHandle::Binary(s) => s.mode(),
            StreamHandle::Text(s) => s.mode(),
        }
    }

    /// Whether this is a byte-oriented handle.
    #[must_use]
    pub fn is_binary(&self) -> bool {
        matches!(self, StreamHandle::Binary(_))
    }

    /// Whether this is a character-oriented handle.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, StreamHandle::Text(_))
    }

    /// Returns the byte stream of a binary handle.
    #[must_use]
    pub fn into_binary(self) -> Option<BufferedStream> {
        match self {
            StreamHandle::Binary(s) => Some(s),
            StreamHandle::Text(_) => None,
        }
    }

    /// Returns the text stream of a text handle.
    #[must_use]
    pub fn into_text(self) -> Option<TextStream> {
        match self {
            StreamHandle::Text(s) => Some(s),
            StreamHandle::Binary(_) => None,
        }
    }

    /// Borrows the byte stream of a binary handle.
    pub fn as_binary_mut(&mut self) -> Option<&mut BufferedStream> {
        match self {
            StreamHandle::Binary(s) => Some(s),
            StreamHandle::Text(_) => None,
        }
    }

    /// Borrows the text stream of a text handle.
    pub fn as_text_mut(&mut self) -> Option<&mut TextStream> {
        match self {
            StreamHandle::Text(s) => Some(s),
            StreamHandle::Binary(_) => None,
        }
    }

    /// Flushes and closes the handle.
    ///
    /// # Errors
    ///
    /// Returns the failure of the final flush or release.
    pub fn close(&mut self) -> CoreResult<()> {
        match self {
            StreamHandle::Binary(s) => s.close(),
            StreamHandle::Text(s) => s.close(),
        }
    }
}
