//! Block-wise line reader over any `std::io::Read`.

use std::fmt;
use std::io::{self, Read};
use std::num::NonZeroUsize;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{Error, Result};

/// Default number of bytes requested from the source per read.
pub const DEFAULT_BLOCK_SIZE: NonZeroUsize = NonZeroUsize::new(4096).unwrap();

/// Outcome of a successful [`LineReader::read_line`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Line {
    /// Bytes written to the front of the destination buffer.
    pub len: usize,
    /// Bytes of this line that did not fit and were dropped.
    pub discarded: usize,
}

impl Line {
    fn complete(len: usize) -> Self {
        Line { len, discarded: 0 }
    }

    /// Returns true if part of the line was dropped.
    pub fn is_truncated(&self) -> bool {
        self.discarded > 0
    }
}

/// Where the source stands.
///
/// Anything other than `Open` is terminal: the source is never read again
/// and the state is reported once the carry runs dry.
#[derive(Debug, Clone)]
enum State {
    Open,
    Eof,
    Failed(Arc<io::Error>),
}

impl State {
    fn error(&self) -> Option<Error> {
        match self {
            State::Open => None,
            State::Eof => Some(Error::Eof),
            State::Failed(e) => Some(Error::Source(Arc::clone(e))),
        }
    }
}

/// Splits a byte source into newline-terminated lines.
///
/// `LineReader` reads the source at most `block_size` bytes at a time and
/// hands out one line per call into a buffer supplied by the caller. The
/// buffer can be smaller or larger than a block or a line:
///
/// - Bytes read past the end of a line are kept and served first on the
///   next call.
/// - A line longer than the buffer is cut to fit. The rest of it is read and
///   dropped, and the number of dropped bytes is reported.
/// - The trailing newline is consumed and never copied out.
/// - Input that ends without a newline yields its last bytes as a line.
///
/// End of input and source errors are sticky. Once seen, they are returned
/// by every call after the buffered bytes are gone, without touching the
/// source again.
///
/// # Example
///
/// ```
/// use giztoy_bounded::{Error, LineReader};
///
/// let input: &[u8] = b"alpha\nbeta\ngamma";
/// let mut reader = LineReader::new(input, 4).unwrap();
/// let mut buf = [0u8; 16];
///
/// let line = reader.read_line(&mut buf).unwrap();
/// assert_eq!(&buf[..line.len], b"alpha");
///
/// let line = reader.read_line(&mut buf).unwrap();
/// assert_eq!(&buf[..line.len], b"beta");
///
/// let line = reader.read_line(&mut buf).unwrap();
/// assert_eq!(&buf[..line.len], b"gamma");
///
/// assert!(matches!(reader.read_line(&mut buf), Err(Error::Eof)));
/// ```
pub struct LineReader<R> {
    reader: R,
    // Carry region is block[pos..filled].
    block: Box<[u8]>,
    pos: usize,
    filled: usize,
    state: State,
}

impl<R: Read> LineReader<R> {
    /// Creates a line reader that requests at most `block_size` bytes per
    /// read from `reader`.
    pub fn new(reader: R, block_size: usize) -> Result<Self> {
        let block_size = NonZeroUsize::new(block_size).ok_or(Error::InvalidBlockSize)?;
        Ok(Self::with_block_size(reader, block_size))
    }

    /// Creates a line reader with a block size that is known to be non-zero.
    pub fn with_block_size(reader: R, block_size: NonZeroUsize) -> Self {
        LineReader {
            reader,
            block: vec![0; block_size.get()].into_boxed_slice(),
            pos: 0,
            filled: 0,
            state: State::Open,
        }
    }

    /// Creates a line reader with [`DEFAULT_BLOCK_SIZE`].
    pub fn with_default_block_size(reader: R) -> Self {
        Self::with_block_size(reader, DEFAULT_BLOCK_SIZE)
    }

    /// Reads the next line into `dst`.
    ///
    /// On success, `dst[..line.len]` holds the line without its newline and
    /// `line.discarded` counts the bytes that did not fit. A line exactly as
    /// long as `dst` is not truncated.
    ///
    /// Returns [`Error::Eof`] or [`Error::Source`] when the source has
    /// ended or failed and no bytes are left for this call. Bytes read before
    /// the source ended are returned as a line first; the error follows on
    /// the next call.
    pub fn read_line(&mut self, dst: &mut [u8]) -> Result<Line> {
        let mut len = 0;

        if self.pos < self.filled {
            let carry = &self.block[self.pos..self.filled];
            let window = dst.len().min(carry.len());
            if let Some(eol) = find_newline(&carry[..window]) {
                dst[..eol].copy_from_slice(&carry[..eol]);
                self.pos += eol + 1;
                return Ok(Line::complete(eol));
            }

            dst[..window].copy_from_slice(&carry[..window]);
            self.consume(window);
            len = window;
        }

        loop {
            if len == dst.len() {
                let (discarded, found_eol) = self.discard_rest_of_line();
                if len == 0 && discarded == 0 && !found_eol {
                    // Nothing left at all; only reachable with an empty dst.
                    if let Some(err) = self.state.error() {
                        return Err(err);
                    }
                }
                if discarded > 0 {
                    trace!(len, discarded, "line reader: line truncated");
                }
                return Ok(Line { len, discarded });
            }

            if let Some(err) = self.state.error() {
                // Bytes already gathered end the line implicitly.
                return if len > 0 {
                    Ok(Line::complete(len))
                } else {
                    Err(err)
                };
            }

            let limit = dst.len().min(len + self.block.len());
            let chunk = &mut dst[len..limit];
            match self.reader.read(chunk) {
                Ok(0) => self.set_eof(),
                Ok(n) => {
                    if let Some(eol) = find_newline(&chunk[..n]) {
                        self.stash(&chunk[eol + 1..n]);
                        return Ok(Line::complete(len + eol));
                    }
                    len += n;
                }
                Err(e) => self.set_failed(e),
            }
        }
    }

    /// Reads the next line into `dst`, treating truncation as an error.
    ///
    /// Returns the line length, or [`Error::LineTooLong`] with the number of
    /// dropped bytes. In that case `dst` still holds the first `dst.len()`
    /// bytes of the line.
    pub fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        let line = self.read_line(dst)?;
        if line.is_truncated() {
            return Err(Error::LineTooLong {
                discarded: line.discarded,
            });
        }
        Ok(line.len)
    }

    /// Returns an iterator that reads one line per step into an internal
    /// buffer of `max_line` bytes.
    ///
    /// Lines longer than `max_line` are yielded as [`Error::LineTooLong`]
    /// and iteration moves on to the next line. Iteration ends at end of
    /// input, or after yielding a source error.
    pub fn lines(&mut self, max_line: usize) -> Lines<'_, R> {
        Lines {
            reader: self,
            scratch: vec![0; max_line],
            done: false,
        }
    }

    /// Returns the bytes read from the source but not yet handed out.
    pub fn buffered(&self) -> &[u8] {
        &self.block[self.pos..self.filled]
    }

    /// Returns the number of bytes requested per read.
    pub fn block_size(&self) -> usize {
        self.block.len()
    }

    /// Returns a reference to the underlying source.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Returns a mutable reference to the underlying source.
    ///
    /// Reading from it directly skips the bytes already buffered here.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Consumes the reader, returning the underlying source.
    ///
    /// Buffered bytes are lost.
    pub fn into_inner(self) -> R {
        self.reader
    }

    // Drops bytes up to and including the next newline, from the carry
    // first and then from the source. Returns how many were dropped, not
    // counting the newline, and whether a newline ended them.
    fn discard_rest_of_line(&mut self) -> (usize, bool) {
        let mut discarded = 0;

        if self.pos < self.filled {
            let carry = &self.block[self.pos..self.filled];
            if let Some(eol) = find_newline(carry) {
                self.pos += eol + 1;
                return (eol, true);
            }
            discarded += carry.len();
            self.clear();
        }

        while matches!(self.state, State::Open) {
            match self.reader.read(&mut self.block) {
                Ok(0) => self.set_eof(),
                Ok(n) => {
                    if let Some(eol) = find_newline(&self.block[..n]) {
                        self.pos = eol + 1;
                        self.filled = n;
                        return (discarded + eol, true);
                    }
                    discarded += n;
                }
                Err(e) => self.set_failed(e),
            }
        }
        (discarded, false)
    }

    fn stash(&mut self, rest: &[u8]) {
        self.block[..rest.len()].copy_from_slice(rest);
        self.pos = 0;
        self.filled = rest.len();
    }

    fn consume(&mut self, n: usize) {
        self.pos += n;
        if self.pos == self.filled {
            self.clear();
        }
    }

    fn clear(&mut self) {
        self.pos = 0;
        self.filled = 0;
    }

    fn set_eof(&mut self) {
        trace!("line reader: end of input");
        self.state = State::Eof;
    }

    fn set_failed(&mut self, e: io::Error) {
        debug!(error = %e, "line reader: source failed");
        self.state = State::Failed(Arc::new(e));
    }
}

impl<R> fmt::Debug for LineReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineReader")
            .field("block_size", &self.block.len())
            .field("buffered", &(self.filled - self.pos))
            .field("state", &self.state)
            .finish()
    }
}

/// Iterator returned by [`LineReader::lines`].
pub struct Lines<'a, R> {
    reader: &'a mut LineReader<R>,
    scratch: Vec<u8>,
    done: bool,
}

impl<R: Read> Iterator for Lines<'_, R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read(&mut self.scratch) {
            Ok(n) => Some(Ok(self.scratch[..n].to_vec())),
            Err(Error::Eof) => {
                self.done = true;
                None
            }
            Err(e @ Error::LineTooLong { .. }) => Some(Err(e)),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

fn find_newline(buf: &[u8]) -> Option<usize> {
    buf.iter().position(|&b| b == b'\n')
}
