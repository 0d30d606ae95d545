//! Error types for raw stream operations.

use std::io;
use thiserror::Error;

/// Result type for raw stream operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during raw stream operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stream does not support random access.
    #[error("stream is not seekable: {operation}")]
    NotSeekable {
        /// The operation that required random access.
        operation: &'static str,
    },

    /// The stream is closed.
    #[error("stream is closed")]
    Closed,
}

impl StorageError {
    /// Creates a not-seekable error for the given operation.
    pub fn not_seekable(operation: &'static str) -> Self {
        Self::NotSeekable { operation }
    }

    /// Creates an error for an offset past what the stream can address.
    pub fn offset_out_of_range(offset: u64) -> Self {
        Self::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("offset {offset} is out of range"),
        ))
    }
}
