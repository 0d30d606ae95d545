//! # textio Core
//!
//! Buffered, mode-aware streams for textio.
//!
//! This crate provides:
//! - Mode parsing into a validated capability set ([`ModeSpec`])
//! - Buffered byte streams with capability checks ([`BufferedStream`])
//! - Text streams with opaque, encoding-safe cursors ([`TextStream`])
//! - Lazy line iteration ([`Lines`])
//! - Structured values through text streams ([`dump_to`], [`load_from`])
//!
//! ## Layers
//!
//! Data flows strictly upward: serialization, text codec, buffered
//! stream, raw stream. Raw streams live in `textio_storage`; the value
//! encoding lives in `textio_codec`.
//!
//! ## Usage
//!
//! ```
//! use textio_core::{StreamHandle, TextCursor};
//!
//! let mut text = StreamHandle::open_in_memory("w+")?.into_text().unwrap();
//! text.write("hello\nworld")?;
//! assert_eq!(text.tell()?.cookie(), 11);
//!
//! text.seek(TextCursor::BEGINNING)?;
//! assert_eq!(text.read_lines()?, ["hello\n", "world"]);
//! # Ok::<(), textio_core::CoreError>(())
//! ```
//!
//! ## Logging
//!
//! Opens and closes are reported at `debug`, buffer traffic at `trace`,
//! and failed flushes on drop at `warn`, through `tracing`. No subscriber
//! is installed.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod buffered;
mod config;
mod error;
mod handle;
mod lines;
mod mode;
mod serialize;
mod text;

pub use buffered::{BufferedStream, Whence};
pub use config::{StreamConfig, DEFAULT_BUFFER_SIZE};
pub use error::{CoreError, CoreResult, ErrorKind};
pub use handle::{open, open_with, StreamHandle};
pub use lines::Lines;
pub use mode::ModeSpec;
pub use serialize::{dump_serialize, dump_to, dump_with, load_from};
pub use text::{Encoding, TextCursor, TextStream};

// Re-export the layers below for convenience
pub use textio_codec::{EncodeOptions, Map, Number, Value};
pub use textio_storage::{FileStream, InMemoryStream, PipeStream, RawStream};
