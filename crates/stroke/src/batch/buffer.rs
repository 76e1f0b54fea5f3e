//! Grow-only arena buffer backing merged batches.

use bytemuck::Pod;

const MIN_CAPACITY: usize = 64;

/// Contiguous storage with an explicit length and a doubling capacity.
///
/// The only mutations are [`append`](Self::append) and
/// [`truncate_to`](Self::truncate_to); call sites never index into the
/// backing storage directly.
#[derive(Debug, Clone)]
pub struct GrowBuffer<T: Pod> {
    data: Box<[T]>,
    len: usize,
}

impl<T: Pod> Default for GrowBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Pod> GrowBuffer<T> {
    pub fn new() -> Self {
        Self {
            data: Box::default(),
            len: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![T::zeroed(); capacity].into_boxed_slice(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Append `items`, doubling capacity as needed
    pub fn append(&mut self, items: &[T]) {
        let needed = self.len + items.len();
        if needed > self.capacity() {
            self.grow(needed);
        }
        self.data[self.len..needed].copy_from_slice(items);
        self.len = needed;
    }

    /// Append `items` with `f` applied to each element
    pub fn append_mapped(&mut self, items: &[T], f: impl Fn(T) -> T) {
        let needed = self.len + items.len();
        if needed > self.capacity() {
            self.grow(needed);
        }
        for (slot, &item) in self.data[self.len..needed].iter_mut().zip(items) {
            *slot = f(item);
        }
        self.len = needed;
    }

    /// Shrink the logical length to `len`. Capacity is kept.
    ///
    /// Returns false (and changes nothing) if `len` exceeds the current
    /// length.
    pub fn truncate_to(&mut self, len: usize) -> bool {
        if len > self.len {
            return false;
        }
        self.len = len;
        true
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data[..self.len]
    }

    /// Byte view for GPU upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.as_slice())
    }

    fn grow(&mut self, needed: usize) {
        let mut capacity = self.capacity().max(MIN_CAPACITY);
        while capacity < needed {
            capacity *= 2;
        }
        let mut data = vec![T::zeroed(); capacity].into_boxed_slice();
        data[..self.len].copy_from_slice(self.as_slice());
        self.data = data;
    }
}
