use std::slice;

pub use self::map::*;
pub use self::set::*;

mod map;
mod set;

/// Trait for types that can provide a `usize` index for a sparse type.
///
/// Entities index by their id and component ids by their value, which is
/// what lets pools, signatures and system membership share one layout.
pub trait SparseIndex {
    /// The index into a sparse datatype that this value represents.
    fn sparse_index(&self) -> usize;
}

/// Iterator over values in a sparse datatype.
pub struct SparseIter<'a, T> {
    inner: slice::Iter<'a, Option<T>>,
    /// The amount of filled slots left.
    len: usize,
}

/// Iterator over values in a sparse datatype.
pub struct SparseIterMut<'a, T> {
    inner: slice::IterMut<'a, Option<T>>,
    /// The amount of filled slots left.
    len: usize,
}

impl SparseIndex for usize {
    fn sparse_index(&self) -> usize {
        *self
    }
}

impl<T> Clone for SparseIter<'_, T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone(), len: self.len }
    }
}

impl<'a, T> Iterator for SparseIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.inner.by_ref() {
            if let Some(value) = slot {
                self.len -= 1;

                return Some(value);
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<T> ExactSizeIterator for SparseIter<'_, T> {}

impl<'a, T> Iterator for SparseIterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.inner.by_ref() {
            if let Some(value) = slot {
                self.len -= 1;

                return Some(value);
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<T> ExactSizeIterator for SparseIterMut<'_, T> {}
