//! # Textio Testkit
//!
//! Test utilities for textio.
//!
//! This crate provides:
//! - Temporary file fixtures and in-memory handle helpers
//! - Property-based test generators using proptest
//! - Cross-crate integration test helpers
//! - Fuzz testing harnesses
//! - Shared test vectors for the text format and mode strings
//!
//! ## Usage
//!
//! ```rust,ignore
//! use textio_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_file() {
//!     let file = TestFile::new("note.txt");
//!     let mut text = scenarios::written_note(&file).unwrap();
//!     // ... test operations
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod fuzz;
pub mod generators;
pub mod integration;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::fuzz::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
    pub use crate::vectors::*;
}

pub use fixtures::*;
pub use fuzz::*;
pub use generators::*;
pub use integration::*;
pub use vectors::*;
