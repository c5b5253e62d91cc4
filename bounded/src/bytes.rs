//! Convenience functions for creating byte buffers.
//!
//! This module provides pre-configured constructors for common byte ring
//! sizes and line reader block sizes.

use std::io::Read;
use std::num::NonZeroUsize;

use crate::error::Result;
use crate::{LineReader, RingBuffer, SharedRingBuffer};

const B256: NonZeroUsize = NonZeroUsize::new(256).unwrap();
const KB1: NonZeroUsize = NonZeroUsize::new(1024).unwrap();
const KB4: NonZeroUsize = NonZeroUsize::new(4096).unwrap();
const KB16: NonZeroUsize = NonZeroUsize::new(16384).unwrap();
const KB64: NonZeroUsize = NonZeroUsize::new(65536).unwrap();

// ============================================================================
// RingBuffer convenience functions
// ============================================================================

/// Creates a 256B ring buffer for bytes.
pub fn ring_bytes_256b() -> RingBuffer<u8> {
    RingBuffer::with_capacity(B256)
}

/// Creates a 1KB ring buffer for bytes.
pub fn ring_bytes_1kb() -> RingBuffer<u8> {
    RingBuffer::with_capacity(KB1)
}

/// Creates a 4KB ring buffer for bytes.
pub fn ring_bytes_4kb() -> RingBuffer<u8> {
    RingBuffer::with_capacity(KB4)
}

/// Creates a 16KB ring buffer for bytes.
pub fn ring_bytes_16kb() -> RingBuffer<u8> {
    RingBuffer::with_capacity(KB16)
}

/// Creates a 64KB ring buffer for bytes.
pub fn ring_bytes_64kb() -> RingBuffer<u8> {
    RingBuffer::with_capacity(KB64)
}

/// Creates a ring buffer for bytes with the specified capacity.
pub fn ring_bytes(capacity: usize) -> Result<RingBuffer<u8>> {
    RingBuffer::new(capacity)
}

// ============================================================================
// SharedRingBuffer convenience functions
// ============================================================================

/// Creates a 4KB shared ring buffer for bytes.
pub fn shared_ring_bytes_4kb() -> SharedRingBuffer<u8> {
    SharedRingBuffer::with_capacity(KB4)
}

/// Creates a shared ring buffer for bytes with the specified capacity.
pub fn shared_ring_bytes(capacity: usize) -> Result<SharedRingBuffer<u8>> {
    SharedRingBuffer::new(capacity)
}

// ============================================================================
// LineReader convenience functions
// ============================================================================

/// Creates a line reader that reads 1KB blocks.
pub fn line_reader_1kb<R: Read>(reader: R) -> LineReader<R> {
    LineReader::with_block_size(reader, KB1)
}

/// Creates a line reader that reads 4KB blocks.
pub fn line_reader_4kb<R: Read>(reader: R) -> LineReader<R> {
    LineReader::with_block_size(reader, KB4)
}

/// Creates a line reader that reads 64KB blocks.
pub fn line_reader_64kb<R: Read>(reader: R) -> LineReader<R> {
    LineReader::with_block_size(reader, KB64)
}
