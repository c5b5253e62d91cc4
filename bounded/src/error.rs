//! Error types for bounded buffers.

use std::io;
use std::sync::Arc;

/// Result type alias for giztoy-bounded.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for ring buffer and line reader operations.
///
/// Construction errors (`InvalidCapacity`, `InvalidBlockSize`) are returned
/// before any object exists. `Eof` and `Source` come from the byte source
/// behind a [`LineReader`](crate::LineReader) and are sticky: once observed
/// they are returned again by every later call. The source error is kept
/// behind an `Arc` so the same error can be handed out more than once.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// A ring buffer was built over zero slots.
    #[error("ring buffer: capacity must be greater than 0")]
    InvalidCapacity,

    /// A line reader was built with a zero block size.
    #[error("line reader: block size must be greater than 0")]
    InvalidBlockSize,

    /// The byte source has no more input.
    #[error("line reader: end of input")]
    Eof,

    /// The byte source failed.
    #[error("line reader: source error: {0}")]
    Source(#[source] Arc<io::Error>),

    /// The line did not fit in the destination buffer.
    #[error("line reader: line too long (discarded {discarded} bytes)")]
    LineTooLong { discarded: usize },
}

impl Error {
    /// Returns true if this is the end-of-input signal.
    pub fn is_eof(&self) -> bool {
        matches!(self, Error::Eof)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Source(Arc::new(e))
    }
}
