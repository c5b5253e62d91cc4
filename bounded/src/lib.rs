//! Fixed-footprint buffers for staging data between producers and consumers.
//!
//! This crate provides two independent primitives:
//!
//! - [`RingBuffer<T, S>`] / [`SharedRingBuffer<T>`]: fixed-capacity buffers
//!   that keep only the most recent items and replay them in order
//! - [`LineReader<R>`]: splits any [`std::io::Read`] into newline-terminated
//!   lines, read in bounded blocks and delivered into caller buffers
//!
//! # Ring Buffers
//!
//! ## RingBuffer (Single Writer)
//!
//! [`RingBuffer`] works over storage it allocates or over storage the caller
//! hands it, such as a stack array. Pushing past the capacity overwrites the
//! oldest item.
//!
//! ```
//! use giztoy_bounded::{Order, RingBuffer};
//!
//! let mut slots = [0i32; 3];
//! let mut ring = RingBuffer::<i32, _>::with_storage(&mut slots[..]).unwrap();
//! for i in 1..=5 {
//!     ring.push(i);
//! }
//!
//! assert_eq!(ring.to_vec(), vec![3, 4, 5]);
//!
//! let mut recent = [0; 2];
//! let n = ring.last(&mut recent);
//! assert_eq!(&recent[..n], &[4, 5]);
//!
//! for (i, v) in ring.iter(Order::Filo) {
//!     assert_eq!(*v, 5 - i as i32);
//! }
//! ```
//!
//! ## SharedRingBuffer (Concurrent Producers)
//!
//! [`SharedRingBuffer`] reserves slots with an atomic counter so any number
//! of threads can push through a shared reference.
//!
//! ```
//! use giztoy_bounded::SharedRingBuffer;
//!
//! let ring = SharedRingBuffer::<u8>::new(4).unwrap();
//! let producer = ring.clone();
//! std::thread::spawn(move || producer.push(42)).join().unwrap();
//! assert_eq!(ring.to_vec(), vec![42]);
//! ```
//!
//! # Line Reader
//!
//! [`LineReader`] hands out one line per call. A line that does not fit the
//! caller's buffer is cut, and the dropped byte count is reported.
//!
//! ```
//! use giztoy_bounded::LineReader;
//!
//! let mut reader = LineReader::new(&b"GET / HTTP/1.1\nHost: example\n"[..], 8).unwrap();
//! let mut buf = [0u8; 8];
//!
//! let line = reader.read_line(&mut buf).unwrap();
//! assert_eq!(&buf[..line.len], b"GET / HT");
//! assert_eq!(line.discarded, 6);
//!
//! let line = reader.read_line(&mut buf).unwrap();
//! assert_eq!(&buf[..line.len], b"Host: ex");
//! ```
//!
//! # Errors
//!
//! Constructors fail with [`Error::InvalidCapacity`] or
//! [`Error::InvalidBlockSize`] when given zero. Ring operations never fail
//! afterwards. Line reader errors from the source, including end of input,
//! are sticky.
//!
//! # Convenience Functions
//!
//! Pre-sized constructors cover common byte sizes:
//!
//! ```
//! use giztoy_bounded::{line_reader_4kb, ring_bytes_4kb};
//!
//! let ring = ring_bytes_4kb();
//! let reader = line_reader_4kb(std::io::empty());
//! ```

mod bytes;
mod error;
mod line_reader;
mod ring_buffer;
mod shared_ring;
mod window;

pub use bytes::*;
pub use error::{Error, Result};
pub use line_reader::{DEFAULT_BLOCK_SIZE, Line, LineReader, Lines};
pub use ring_buffer::{Iter, Order, RingBuffer};
pub use shared_ring::{SharedIter, SharedRingBuffer};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_ring_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedRingBuffer<i32>>();
        assert_send_sync::<SharedRingBuffer<String>>();
    }

    #[test]
    fn test_ring_and_reader_are_send() {
        fn assert_send<T: Send>() {}
        assert_send::<RingBuffer<i32>>();
        assert_send::<LineReader<std::fs::File>>();
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<Error>();
    }
}
