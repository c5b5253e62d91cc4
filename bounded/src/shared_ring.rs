//! Ring buffer with lock-free slot reservation for concurrent producers.

use std::fmt;
use std::iter::FusedIterator;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::ring_buffer::Order;
use crate::window::{Window, occupied, slot_of};

/// A fixed-capacity overwriting ring buffer shared between producers.
///
/// `SharedRingBuffer<T>` has the same retention rules as
/// [`RingBuffer`](crate::RingBuffer) but [`push`](Self::push) takes `&self`.
/// Each push reserves its slot with an atomic fetch-and-add on the write
/// counter, so concurrent producers receive distinct, strictly increasing
/// positions. There is no buffer-wide lock; every slot carries its own.
///
/// # Semantics
///
/// - **Push**: never blocks on other slots. Two pushes only contend when
///   their positions differ by a multiple of the capacity, which requires at
///   least `capacity` pushes in flight at once. In that case the later lock
///   holder wins the slot.
/// - **Read** (`last`, `iter`): loads the write counter once, then clones
///   slot by slot. A push that lands during the read can replace a slot that
///   has not been visited yet. Use external synchronization when a consistent
///   snapshot is required.
///
/// Cloning shares the underlying buffer.
///
/// # Example
///
/// ```
/// use giztoy_bounded::{Order, SharedRingBuffer};
/// use std::thread;
///
/// let ring = SharedRingBuffer::<u64>::new(64).unwrap();
///
/// let handles: Vec<_> = (0..4)
///     .map(|t| {
///         let ring = ring.clone();
///         thread::spawn(move || {
///             for i in 0..8 {
///                 ring.push(t * 100 + i);
///             }
///         })
///     })
///     .collect();
/// for h in handles {
///     h.join().unwrap();
/// }
///
/// assert_eq!(ring.len(), 32);
/// assert_eq!(ring.iter(Order::Fifo).count(), 32);
/// ```
pub struct SharedRingBuffer<T> {
    inner: Arc<SharedInner<T>>,
}

struct SharedInner<T> {
    slots: Box<[Mutex<T>]>,
    written: AtomicU64,
}

impl<T> Clone for SharedRingBuffer<T> {
    fn clone(&self) -> Self {
        SharedRingBuffer {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Default> SharedRingBuffer<T> {
    /// Creates a shared ring buffer with `capacity` default-initialized slots.
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or(Error::InvalidCapacity)?;
        Ok(Self::with_capacity(capacity))
    }

    /// Creates a shared ring buffer with a capacity that is known to be
    /// non-zero.
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        let slots = (0..capacity.get()).map(|_| Mutex::new(T::default())).collect();
        Self::from_slots(slots)
    }
}

impl<T> SharedRingBuffer<T> {
    /// Creates a shared ring buffer from the values in `storage`.
    ///
    /// Each value is moved into a newly allocated locked slot, so unlike
    /// [`RingBuffer::with_storage`](crate::RingBuffer::with_storage) the
    /// storage is not used in place. The buffer starts empty; the existing
    /// values are only placeholders.
    pub fn from_vec(storage: Vec<T>) -> Result<Self> {
        if storage.is_empty() {
            return Err(Error::InvalidCapacity);
        }
        Ok(Self::from_slots(storage.into_iter().map(Mutex::new).collect()))
    }

    fn from_slots(slots: Box<[Mutex<T>]>) -> Self {
        SharedRingBuffer {
            inner: Arc::new(SharedInner {
                slots,
                written: AtomicU64::new(0),
            }),
        }
    }

    /// Returns the number of slots.
    pub fn capacity(&self) -> usize {
        self.inner.slots.len()
    }

    /// Returns the number of retrievable items, `min(written, capacity)`.
    pub fn len(&self) -> usize {
        occupied(self.written(), self.capacity())
    }

    /// Returns true if nothing has been pushed yet.
    pub fn is_empty(&self) -> bool {
        self.written() == 0
    }

    /// Returns true once every slot holds a pushed item.
    pub fn is_full(&self) -> bool {
        self.written() >= self.capacity() as u64
    }

    /// Returns the total number of slot reservations made so far.
    pub fn written(&self) -> u64 {
        self.inner.written.load(Ordering::Acquire)
    }

    /// Pushes an item, overwriting the oldest one when full.
    pub fn push(&self, item: T) {
        let pos = self.inner.written.fetch_add(1, Ordering::AcqRel);
        let slot = slot_of(pos, self.capacity());
        *self.inner.slots[slot].lock() = item;
    }
}

impl<T: Clone> SharedRingBuffer<T> {
    /// Copies the most recent items into the front of `dst`, oldest first.
    ///
    /// Copies `min(dst.len(), self.len())` items and returns that count. The
    /// copy walks the same two ranges as [`RingBuffer::last`]: the segment
    /// ending at the newest item first, then the segment at the end of the
    /// storage that precedes it.
    ///
    /// [`RingBuffer::last`]: crate::RingBuffer::last
    pub fn last(&self, dst: &mut [T]) -> usize {
        let window = Window::last(self.written(), self.capacity(), dst.len());
        let n = window.len();
        let split = n - window.newer.len();

        for (d, slot) in dst[split..n].iter_mut().zip(window.newer) {
            d.clone_from(&self.inner.slots[slot].lock());
        }
        for (d, slot) in dst[..split].iter_mut().zip(window.older) {
            d.clone_from(&self.inner.slots[slot].lock());
        }
        n
    }

    /// Returns a lazy iterator over `(relative_index, item)` pairs.
    ///
    /// The window is fixed when the iterator is created. Each call to `next`
    /// clones exactly one slot.
    pub fn iter(&self, order: Order) -> SharedIter<'_, T> {
        let window = Window::last(self.written(), self.capacity(), usize::MAX);
        SharedIter {
            slots: &self.inner.slots,
            window,
            order,
            pos: 0,
        }
    }

    /// Returns a copy of all occupied items, oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter(Order::Fifo).map(|(_, item)| item).collect()
    }
}

impl<T> fmt::Debug for SharedRingBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedRingBuffer")
            .field("capacity", &self.capacity())
            .field("written", &self.written())
            .finish()
    }
}

/// Iterator returned by [`SharedRingBuffer::iter`].
pub struct SharedIter<'a, T> {
    slots: &'a [Mutex<T>],
    window: Window,
    order: Order,
    pos: usize,
}

impl<T: Clone> Iterator for SharedIter<'_, T> {
    type Item = (usize, T);

    fn next(&mut self) -> Option<Self::Item> {
        let total = self.window.len();
        if self.pos >= total {
            return None;
        }
        let rel = self.pos;
        self.pos += 1;
        let logical = match self.order {
            Order::Fifo => rel,
            Order::Filo => total - 1 - rel,
        };
        let item = self.slots[self.window.slot(logical)].lock().clone();
        Some((rel, item))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.window.len() - self.pos;
        (remaining, Some(remaining))
    }
}

impl<T: Clone> ExactSizeIterator for SharedIter<'_, T> {}

impl<T: Clone> FusedIterator for SharedIter<'_, T> {}
