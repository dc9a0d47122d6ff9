use std::fmt;
use std::marker::PhantomData;

use super::{SparseIndex, SparseIter, SparseIterMut};

/// A list of sparse values accessed by a sparse index.
///
/// Doesn't store indices.
#[derive(Clone)]
pub struct SparseMap<K: SparseIndex, V> {
    inner: Vec<Option<V>>,
    /// The amount of filled slots.
    len: usize,
    _key: PhantomData<fn(&K)>,
}

impl<K: SparseIndex, V> SparseMap<K, V> {
    /// Creates a new empty sparse map.
    pub const fn new() -> Self {
        let inner = Vec::new();
        let len = 0;

        Self { inner, len, _key: PhantomData }
    }

    /// Creates a new empty sparse map with room for `slots` indices.
    pub fn with_capacity(slots: usize) -> Self {
        let inner = Vec::with_capacity(slots);
        let len = 0;

        Self { inner, len, _key: PhantomData }
    }

    /// Returns the amount of values in the sparse map.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the map is empty.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the amount of addressable slots, filled or not.
    pub fn slot_count(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over the values in this map.
    pub fn iter(&self) -> SparseIter<'_, V> {
        SparseIter { inner: self.inner.iter(), len: self.len }
    }

    /// Returns an iterator over the values in this map.
    pub fn iter_mut(&mut self) -> SparseIterMut<'_, V> {
        SparseIterMut { inner: self.inner.iter_mut(), len: self.len }
    }

    /// Returns `true` if the map contains a value corresponding to the index.
    pub fn contains(&self, index: &K) -> bool {
        self.inner.get(index.sparse_index()).is_some_and(Option::is_some)
    }

    /// Returns a reference to the value assosciated with the index.
    pub fn get(&self, index: &K) -> Option<&V> {
        self.inner.get(index.sparse_index()).and_then(Option::as_ref)
    }

    /// Returns a mutable reference to the value assosciated with the index.
    pub fn get_mut(&mut self, index: &K) -> Option<&mut V> {
        self.inner.get_mut(index.sparse_index()).and_then(Option::as_mut)
    }

    /// Returns a mutable reference to the value, inserting a value if it
    /// doesn't exist.
    pub fn get_or_insert_with(
        &mut self,
        index: K,
        f: impl FnOnce() -> V,
    ) -> &mut V {
        let sparse = index.sparse_index();

        if sparse >= self.inner.len() {
            self.inner.resize_with(sparse + 1, || None);
        }

        let slot = &mut self.inner[sparse];

        if slot.is_none() {
            self.len += 1;
        }

        slot.get_or_insert_with(f)
    }

    /// Inserts a value at an index.
    ///
    /// Returns the previous value if it exists.
    pub fn insert(&mut self, index: K, value: V) -> Option<V> {
        let sparse = index.sparse_index();

        if sparse >= self.inner.len() {
            self.inner.resize_with(sparse + 1, || None);
        }

        let result = self.inner[sparse].replace(value);

        if result.is_none() {
            self.len += 1;
        }

        result
    }

    /// Removes the value at the index.
    pub fn remove(&mut self, index: &K) -> Option<V> {
        self.inner
            .get_mut(index.sparse_index())
            .and_then(Option::take)
            .inspect(|_| self.len -= 1)
    }

    /// Sets the amount of addressable slots.
    ///
    /// Never drops a filled slot: shrinking stops right after the last filled
    /// one.
    pub fn resize(&mut self, slots: usize) {
        let floor = self
            .inner
            .iter()
            .rposition(Option::is_some)
            .map_or(0, |last| last + 1);

        debug_assert!(
            slots >= floor,
            "attempted to shrink a sparse map to {slots} slots while index {} \
             is still filled",
            floor - 1,
        );

        self.inner.resize_with(slots.max(floor), || None);
    }

    /// Removes all values from the map.
    pub fn clear(&mut self) {
        self.inner.clear();
        self.len = 0;
    }
}

impl<K: SparseIndex, V: fmt::Debug> fmt::Debug for SparseMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<K: SparseIndex, V> Default for SparseMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, K: SparseIndex, V> IntoIterator for &'a SparseMap<K, V> {
    type IntoIter = SparseIter<'a, V>;
    type Item = &'a V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K: SparseIndex, V> IntoIterator for &'a mut SparseMap<K, V> {
    type IntoIter = SparseIterMut<'a, V>;
    type Item = &'a mut V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
