//! # textio Storage
//!
//! Raw byte streams underneath textio handles.
//!
//! A raw stream is an **unbuffered, position-addressable byte sequence**.
//! It knows nothing about open modes, cursors, buffering or text encodings;
//! those live in `textio_core`.
//!
//! ## Design Principles
//!
//! - Byte-exact `read_at`, `write_at`, `append`, `truncate`, `size`
//! - Reading at or past the end is a short (possibly empty) read, not an error
//! - Streams that cannot seek report it through [`RawStream::is_seekable`]
//!   and fail positional calls with [`StorageError::NotSeekable`]
//! - Must be `Send + Sync`; implementations use interior locking
//!
//! ## Available Streams
//!
//! - [`InMemoryStream`] - For testing and ephemeral data
//! - [`FileStream`] - For OS files
//! - [`PipeStream`] - In-memory FIFO without random access
//!
//! ## Example
//!
//! ```rust
//! use textio_storage::{InMemoryStream, RawStream};
//!
//! let mut stream = InMemoryStream::new();
//! stream.write_at(0, b"hello world").unwrap();
//! assert_eq!(stream.read_at(6, 64).unwrap(), b"world");
//! assert!(stream.read_at(11, 64).unwrap().is_empty());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;
mod pipe;

pub use backend::RawStream;
pub use error::{StorageError, StorageResult};
pub use file::FileStream;
pub use memory::InMemoryStream;
pub use pipe::PipeStream;
