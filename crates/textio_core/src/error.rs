//! Error types for textio core.

use crate::text::Encoding;
use std::io;
use std::path::{Path, PathBuf};
use textio_codec::CodecError;
use textio_storage::StorageError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in textio core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The file to open does not exist.
    #[error("not found: {}", path.display())]
    NotFound {
        /// Path that was opened.
        path: PathBuf,
    },

    /// The OS refused the requested access.
    #[error("permission denied: {}", path.display())]
    PermissionDenied {
        /// Path that was opened.
        path: PathBuf,
    },

    /// The mode string is not a valid combination.
    #[error("invalid mode {mode:?}: {reason}")]
    InvalidMode {
        /// The rejected mode string.
        mode: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Read attempted on a handle opened without read access.
    #[error("stream is not readable")]
    NotReadable,

    /// Write attempted on a handle opened without write access.
    #[error("stream is not writable")]
    NotWritable,

    /// The seek cannot be performed on this handle.
    #[error("unsupported seek: {reason}")]
    UnsupportedSeek {
        /// Why the seek was refused.
        reason: &'static str,
    },

    /// The seek would move the cursor before the start of the stream.
    #[error("seek to negative position {position}")]
    NegativeSeek {
        /// The resulting position.
        position: i128,
    },

    /// Text could not be encoded or bytes could not be decoded.
    #[error("{encoding} codec error at byte {position}: {reason}")]
    EncodingError {
        /// The handle's encoding.
        encoding: Encoding,
        /// Byte offset in the stream where the problem starts.
        position: u64,
        /// Description of the problem.
        reason: String,
    },

    /// The encoding label is not recognized.
    #[error("unknown encoding: {label:?}")]
    UnknownEncoding {
        /// The rejected label.
        label: String,
    },

    /// A text cursor issued by another handle was passed to `seek`.
    #[error("text cursor belongs to a different stream")]
    ForeignCursor,

    /// The handle has been closed.
    #[error("stream is closed")]
    Closed,

    /// Raw stream error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Serialization error.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Flat classification of [`CoreError`] for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`CoreError::NotFound`].
    NotFound,
    /// See [`CoreError::PermissionDenied`].
    PermissionDenied,
    /// See [`CoreError::InvalidMode`].
    InvalidMode,
    /// See [`CoreError::NotReadable`].
    NotReadable,
    /// See [`CoreError::NotWritable`].
    NotWritable,
    /// Seek refused, including raw streams without random access.
    UnsupportedSeek,
    /// See [`CoreError::NegativeSeek`].
    NegativeSeek,
    /// See [`CoreError::EncodingError`].
    Encoding,
    /// See [`CoreError::UnknownEncoding`].
    UnknownEncoding,
    /// See [`CoreError::ForeignCursor`].
    ForeignCursor,
    /// The handle or its raw stream is closed.
    Closed,
    /// A value outside the serializable union.
    UnsupportedType,
    /// Text that does not decode to a single value.
    MalformedInput,
    /// Any other serialization failure.
    Codec,
    /// Any other I/O failure.
    Io,
}

impl CoreError {
    /// Creates an invalid mode error.
    pub fn invalid_mode(mode: &str, reason: impl Into<String>) -> Self {
        Self::InvalidMode {
            mode: mode.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates an unsupported seek error.
    pub fn unsupported_seek(reason: &'static str) -> Self {
        Self::UnsupportedSeek { reason }
    }

    /// Creates the error for a byte position past `u64::MAX`.
    pub fn position_overflow() -> Self {
        Self::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            "stream position overflows u64",
        ))
    }

    /// Creates an encoding error.
    pub fn encoding(encoding: Encoding, position: u64, reason: impl Into<String>) -> Self {
        Self::EncodingError {
            encoding,
            position,
            reason: reason.into(),
        }
    }

    /// Maps a failure to open `path` onto the open contract's errors.
    pub(crate) fn from_open(err: StorageError, path: &Path) -> Self {
        match err {
            StorageError::Io(e) if e.kind() == io::ErrorKind::NotFound => Self::NotFound {
                path: path.to_path_buf(),
            },
            StorageError::Io(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                Self::PermissionDenied {
                    path: path.to_path_buf(),
                }
            }
            other => Self::Storage(other),
        }
    }

    /// Returns the flat kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::InvalidMode { .. } => ErrorKind::InvalidMode,
            Self::NotReadable => ErrorKind::NotReadable,
            Self::NotWritable => ErrorKind::NotWritable,
            Self::UnsupportedSeek { .. } => ErrorKind::UnsupportedSeek,
            Self::NegativeSeek { .. } => ErrorKind::NegativeSeek,
            Self::EncodingError { .. } => ErrorKind::Encoding,
            Self::UnknownEncoding { .. } => ErrorKind::UnknownEncoding,
            Self::ForeignCursor => ErrorKind::ForeignCursor,
            Self::Closed | Self::Storage(StorageError::Closed) => ErrorKind::Closed,
            Self::Storage(StorageError::NotSeekable { .. }) => ErrorKind::UnsupportedSeek,
            Self::Storage(StorageError::Io(_)) | Self::Io(_) => ErrorKind::Io,
            Self::Codec(CodecError::UnsupportedType { .. }) => ErrorKind::UnsupportedType,
            Self::Codec(CodecError::MalformedInput { .. }) => ErrorKind::MalformedInput,
            Self::Codec(_) => ErrorKind::Codec,
        }
    }
}

impl From<CoreError> for io::Error {
    fn from(err: CoreError) -> Self {
        let kind = match err.kind() {
            ErrorKind::NotFound => io::ErrorKind::NotFound,
            ErrorKind::PermissionDenied => io::ErrorKind::PermissionDenied,
            ErrorKind::InvalidMode | ErrorKind::NegativeSeek | ErrorKind::ForeignCursor => {
                io::ErrorKind::InvalidInput
            }
            ErrorKind::Encoding | ErrorKind::MalformedInput => io::ErrorKind::InvalidData,
            ErrorKind::NotReadable | ErrorKind::NotWritable | ErrorKind::UnsupportedSeek => {
                io::ErrorKind::Unsupported
            }
            _ => io::ErrorKind::Other,
        };
        match err {
            CoreError::Io(e) | CoreError::Storage(StorageError::Io(e)) => e,
            other => io::Error::new(kind, other),
        }
    }
}
