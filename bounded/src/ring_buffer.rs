//! Overwriting ring buffer implementation.

use std::fmt;
use std::iter::{Chain, FusedIterator};
use std::marker::PhantomData;
use std::num::NonZeroUsize;
use std::slice;

use crate::error::{Error, Result};
use crate::window::{Window, occupied, slot_of};

/// Traversal order for [`RingBuffer::iter`] and
/// [`SharedRingBuffer::iter`](crate::SharedRingBuffer::iter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Order {
    /// Oldest first, ending with the newest.
    #[default]
    Fifo,
    /// Newest first, ending with the oldest.
    Filo,
}

/// A fixed-capacity overwriting ring buffer.
///
/// `RingBuffer<T, S>` keeps the most recent `capacity` items pushed into it.
/// When full, each push overwrites the oldest item. The backing storage `S`
/// is any contiguous slice owner (`Vec<T>`, `Box<[T]>`, `&mut [T]`, an array)
/// and its length is the capacity; it is used in place, never copied or
/// resized.
///
/// This is the single-writer variant: [`push`](Self::push) takes `&mut self`.
/// See [`SharedRingBuffer`](crate::SharedRingBuffer) for concurrent
/// producers.
///
/// # Example
///
/// ```
/// use giztoy_bounded::{Order, RingBuffer};
///
/// let mut ring = RingBuffer::<u32>::new(3).unwrap();
/// for i in 0..5 {
///     ring.push(i);
/// }
///
/// assert_eq!(ring.len(), 3);
/// assert_eq!(ring.to_vec(), vec![2, 3, 4]);
///
/// let newest_first: Vec<u32> = ring.iter(Order::Filo).map(|(_, v)| *v).collect();
/// assert_eq!(newest_first, vec![4, 3, 2]);
///
/// let mut last = [0; 2];
/// assert_eq!(ring.last(&mut last), 2);
/// assert_eq!(last, [3, 4]);
/// ```
pub struct RingBuffer<T, S = Vec<T>> {
    storage: S,
    // Total number of pushes. The next free slot is `written % capacity`.
    written: u64,
    _item: PhantomData<T>,
}

impl<T: Default> RingBuffer<T> {
    /// Creates a ring buffer that owns `capacity` default-initialized slots.
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or(Error::InvalidCapacity)?;
        Ok(Self::with_capacity(capacity))
    }

    /// Creates a ring buffer with a capacity that is known to be non-zero.
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        let mut storage = Vec::with_capacity(capacity.get());
        storage.resize_with(capacity.get(), T::default);
        RingBuffer {
            storage,
            written: 0,
            _item: PhantomData,
        }
    }
}

impl<T, S> RingBuffer<T, S>
where
    S: AsRef<[T]> + AsMut<[T]>,
{
    /// Creates a ring buffer over caller-supplied storage.
    ///
    /// The existing contents of `storage` are not considered pushed: the
    /// buffer starts empty and overwrites slots as items arrive.
    pub fn with_storage(storage: S) -> Result<Self> {
        if storage.as_ref().is_empty() {
            return Err(Error::InvalidCapacity);
        }
        Ok(RingBuffer {
            storage,
            written: 0,
            _item: PhantomData,
        })
    }

    /// Returns the number of slots.
    pub fn capacity(&self) -> usize {
        self.storage.as_ref().len()
    }

    /// Returns the number of retrievable items, `min(written, capacity)`.
    pub fn len(&self) -> usize {
        occupied(self.written, self.capacity())
    }

    /// Returns true if nothing has been pushed yet.
    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    /// Returns true once every slot holds a pushed item.
    pub fn is_full(&self) -> bool {
        self.written >= self.capacity() as u64
    }

    /// Returns the total number of items ever pushed.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Pushes an item, overwriting the oldest one when full.
    pub fn push(&mut self, item: T) {
        let slot = slot_of(self.written, self.capacity());
        self.storage.as_mut()[slot] = item;
        self.written += 1;
    }

    /// Returns the occupied items as two contiguous slices, older part first.
    ///
    /// The second slice is empty unless the window wraps around the end of
    /// the storage.
    pub fn as_slices(&self) -> (&[T], &[T]) {
        let window = Window::last(self.written, self.capacity(), usize::MAX);
        let slots = self.storage.as_ref();
        if window.older.is_empty() {
            (&slots[window.newer], &slots[..0])
        } else {
            (&slots[window.older], &slots[window.newer])
        }
    }

    /// Returns a lazy iterator over `(relative_index, item)` pairs.
    ///
    /// The relative index counts from 0 in traversal order. The iterator
    /// borrows the buffer and can be recreated at any time to replay.
    pub fn iter(&self, order: Order) -> Iter<'_, T> {
        let (older, newer) = self.as_slices();
        Iter {
            older,
            newer,
            order,
            pos: 0,
        }
    }

    /// Consumes the buffer and returns its storage.
    pub fn into_storage(self) -> S {
        self.storage
    }
}

impl<T, S> RingBuffer<T, S>
where
    T: Clone,
    S: AsRef<[T]> + AsMut<[T]>,
{
    /// Copies the most recent items into the front of `dst`, oldest first.
    ///
    /// Copies `min(dst.len(), self.len())` items and returns that count. When
    /// `dst` is longer than the buffer, the slots past the returned count are
    /// left untouched.
    pub fn last(&self, dst: &mut [T]) -> usize {
        let window = Window::last(self.written, self.capacity(), dst.len());
        let n = window.len();
        let slots = self.storage.as_ref();

        // Segment ending at the newest item goes to the end of dst[..n].
        let split = n - window.newer.len();
        dst[split..n].clone_from_slice(&slots[window.newer]);
        // Whatever is left comes from the end of the storage.
        dst[..split].clone_from_slice(&slots[window.older]);
        n
    }

    /// Returns a copy of all occupied items, oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        let (older, newer) = self.as_slices();
        let mut result = Vec::with_capacity(older.len() + newer.len());
        result.extend_from_slice(older);
        result.extend_from_slice(newer);
        result
    }
}

impl<T, S> fmt::Debug for RingBuffer<T, S>
where
    S: AsRef<[T]> + AsMut<[T]>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("written", &self.written)
            .finish()
    }
}

impl<'a, T, S> IntoIterator for &'a RingBuffer<T, S>
where
    S: AsRef<[T]> + AsMut<[T]>,
{
    type Item = &'a T;
    type IntoIter = Chain<slice::Iter<'a, T>, slice::Iter<'a, T>>;

    /// Iterates items oldest first.
    fn into_iter(self) -> Self::IntoIter {
        let (older, newer) = self.as_slices();
        older.iter().chain(newer.iter())
    }
}

/// Iterator returned by [`RingBuffer::iter`].
#[derive(Debug, Clone)]
pub struct Iter<'a, T> {
    older: &'a [T],
    newer: &'a [T],
    order: Order,
    pos: usize,
}

impl<'a, T> Iter<'a, T> {
    fn total(&self) -> usize {
        self.older.len() + self.newer.len()
    }

    // Logical index 0 is the oldest item.
    fn get(&self, logical: usize) -> &'a T {
        let (older, newer) = (self.older, self.newer);
        if logical < older.len() {
            &older[logical]
        } else {
            &newer[logical - older.len()]
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let total = self.total();
        if self.pos >= total {
            return None;
        }
        let rel = self.pos;
        self.pos += 1;
        let logical = match self.order {
            Order::Fifo => rel,
            Order::Filo => total - 1 - rel,
        };
        Some((rel, self.get(logical)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total() - self.pos;
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}
