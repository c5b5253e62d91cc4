//! Index arithmetic for the occupied window of a ring.
//!
//! A ring of `capacity` slots that has seen `written` pushes keeps its newest
//! item at slot `(written - 1) % capacity`. Any suffix of the logical history
//! maps onto at most two contiguous physical ranges:
//!
//! ```text
//!  slot:   0   1   2   3   4        capacity 5, written 7, want 4
//!        [ 5 | 6 | 2 | 3 | 4 ]      head = 7 % 5 = 2
//!          ^^^^^^^       ^^^^^^
//!          newer         older      older = 3..5, newer = 0..2
//! ```
//!
//! Every subtraction below is ordered so that it cannot underflow; nothing
//! takes the modulo of a negative quantity.

use std::ops::Range;

/// The physical ranges covering the most recent items of a ring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Window {
    /// Older part, ending at the array end. Empty unless the window wraps.
    pub(crate) older: Range<usize>,
    /// Newer part, ending just past the newest item.
    pub(crate) newer: Range<usize>,
}

impl Window {
    /// Computes the window of the `want` most recent items, clamped to what
    /// the ring actually holds.
    ///
    /// `capacity` must be non-zero.
    pub(crate) fn last(written: u64, capacity: usize, want: usize) -> Self {
        debug_assert!(capacity > 0);

        let n = want.min(occupied(written, capacity));
        // One past the newest item.
        let head = slot_of(written, capacity);

        if n <= head {
            Window {
                older: 0..0,
                newer: head - n..head,
            }
        } else {
            // n > head only once the ring has wrapped, so n <= capacity.
            Window {
                older: capacity - (n - head)..capacity,
                newer: 0..head,
            }
        }
    }

    /// Number of slots covered by both ranges.
    pub(crate) fn len(&self) -> usize {
        self.older.len() + self.newer.len()
    }

    /// Maps a relative index (0 = oldest in the window) to its slot.
    pub(crate) fn slot(&self, rel: usize) -> usize {
        if rel < self.older.len() {
            self.older.start + rel
        } else {
            self.newer.start + (rel - self.older.len())
        }
    }
}

/// Number of retrievable items: `min(written, capacity)`.
pub(crate) fn occupied(written: u64, capacity: usize) -> usize {
    if written < capacity as u64 {
        written as usize
    } else {
        capacity
    }
}

/// Slot that push number `written` lands in.
pub(crate) fn slot_of(written: u64, capacity: usize) -> usize {
    (written % capacity as u64) as usize
}
