//! Stream configuration.

use crate::text::Encoding;

/// Default size of the read and pending-write buffers.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Configuration for opening a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// Size of the read buffer and the pending-write threshold.
    pub buffer_size: usize,

    /// Text codec used by text-mode handles.
    pub encoding: Encoding,

    /// Whether to create missing parent directories for modes that create.
    pub create_parent_dirs: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            encoding: Encoding::Utf8,
            create_parent_dirs: false,
        }
    }
}

impl StreamConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the buffer size (at least 1 byte).
    #[must_use]
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Sets the text codec.
    #[must_use]
    pub const fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets whether to create missing parent directories.
    #[must_use]
    pub const fn create_parent_dirs(mut self, value: bool) -> Self {
        self.create_parent_dirs = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = StreamConfig::default();
        assert_eq!(config.buffer_size, 8192);
        assert_eq!(config.encoding, Encoding::Utf8);
        assert!(!config.create_parent_dirs);
    }

    #[test]
    fn builder_pattern() {
        let config = StreamConfig::new()
            .buffer_size(16)
            .encoding(Encoding::Latin1)
            .create_parent_dirs(true);

        assert_eq!(config.buffer_size, 16);
        assert_eq!(config.encoding, Encoding::Latin1);
        assert!(config.create_parent_dirs);
    }

    #[test]
    fn buffer_size_has_a_floor() {
        assert_eq!(StreamConfig::new().buffer_size(0).buffer_size, 1);
    }
}
