//! Line iteration over a text stream.

use crate::error::CoreResult;
use crate::text::TextStream;
use std::iter::FusedIterator;

/// Lazy iterator over the lines of a [`TextStream`].
///
/// Each line keeps its trailing `\n`; a last line without one is yielded
/// as is. The stream, not the iterator, owns the position: every step
/// advances the stream's cursor, and the mutable borrow keeps a second
/// iterator from running at the same time. To start over, seek the stream
/// back and call [`TextStream::lines`] again.
///
/// After an error the iterator is finished.
///
/// ```
/// use textio_core::{StreamHandle, TextCursor};
///
/// let mut text = StreamHandle::open_in_memory("w+").unwrap().into_text().unwrap();
/// text.write("hello\nworld").unwrap();
/// text.seek(TextCursor::BEGINNING).unwrap();
///
/// let lines: Vec<String> = text.lines().map(Result::unwrap).collect();
/// assert_eq!(lines, ["hello\n", "world"]);
/// ```
#[derive(Debug)]
pub struct Lines<'a> {
    stream: &'a mut TextStream,
    done: bool,
}

impl<'a> Lines<'a> {
    pub(crate) fn new(stream: &'a mut TextStream) -> Self {
        Self {
            stream,
            done: false,
        }
    }

    /// Reads the next line, or `None` at end of stream.
    ///
    /// # Errors
    ///
    /// Returns the stream's read failure.
    pub fn next_line(&mut self) -> CoreResult<Option<String>> {
        if self.done {
            return Ok(None);
        }
        match self.stream.read_line() {
            Ok(line) if line.is_empty() => {
                self.done = true;
                Ok(None)
            }
            Ok(line) => Ok(Some(line)),
            Err(e) => {
                self.done = true;
                Err(e)
            }
        }
    }
}

impl Iterator for Lines<'_> {
    type Item = CoreResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}

impl FusedIterator for Lines<'_> {}
