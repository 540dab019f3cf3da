//! Buffer: owned, fixed-capacity slot storage with a caller-managed size.
//!
//! The buffer allocates all `capacity` elements up front and never grows.
//! `size` is bookkeeping owned by the caller (the hash table stores its live
//! entry count there); it is not derived from the contents.

use crate::error::TableError;
use core::ops::{Index, IndexMut};

/// Owned contiguous storage of exactly `capacity` elements.
///
/// `Clone` copies every element, including the ones beyond `size`.
/// Equality only looks at the first `size` elements.
#[derive(Clone, Debug)]
pub struct Buffer<T> {
    data: Box<[T]>,
    size: usize,
}

impl<T: Default> Buffer<T> {
    /// Allocate `capacity` default elements with `size == 0`.
    ///
    /// Aborts on allocation failure, like `Vec::with_capacity`. Use
    /// [`Buffer::try_new`] to observe the failure instead.
    pub fn new(capacity: usize) -> Self {
        Self::with_size(capacity, 0)
    }

    /// Allocate `capacity` default elements and start at `size`.
    ///
    /// # Panics
    ///
    /// Panics if `size > capacity`.
    pub fn with_size(capacity: usize, size: usize) -> Self {
        assert!(size <= capacity, "buffer size exceeds capacity");
        let data = (0..capacity).map(|_| T::default()).collect();
        Self { data, size }
    }

    /// Fallible counterpart of [`Buffer::new`].
    pub fn try_new(capacity: usize) -> Result<Self, TableError> {
        let mut v = Vec::new();
        v.try_reserve_exact(capacity)?;
        v.resize_with(capacity, T::default);
        Ok(Self {
            data: v.into_boxed_slice(),
            size: 0,
        })
    }
}

impl<T> Buffer<T> {
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// # Panics
    ///
    /// Panics if `size > capacity`.
    #[inline]
    pub fn set_size(&mut self, size: usize) {
        assert!(size <= self.capacity(), "buffer size exceeds capacity");
        self.size = size;
    }

    /// All `capacity` elements, not just the first `size`.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Move the storage out, leaving `self` as the empty buffer
    /// (no allocation, zero capacity, zero size).
    pub fn take(&mut self) -> Self {
        Self {
            data: core::mem::take(&mut self.data),
            size: core::mem::replace(&mut self.size, 0),
        }
    }

    /// Exchange storage, capacity and size with `other` without copying.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }
}

impl<T> Default for Buffer<T> {
    fn default() -> Self {
        Self {
            data: Box::default(),
            size: 0,
        }
    }
}

impl<T: PartialEq> PartialEq for Buffer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.data[..self.size] == other.data[..other.size]
    }
}

impl<T: Eq> Eq for Buffer<T> {}

impl<T> Index<usize> for Buffer<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.data[index]
    }
}

impl<T> IndexMut<usize> for Buffer<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.data[index]
    }
}

impl<T> IntoIterator for Buffer<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_vec().into_iter()
    }
}
