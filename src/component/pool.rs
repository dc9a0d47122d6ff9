use std::any::{type_name, Any};
use std::fmt;
use std::iter::Zip;
use std::slice;

use crate::entity::Entity;
use crate::storage::SparseMap;

/// Packed storage for the values of one component type.
///
/// A sparse map from entity id to packed index sits in front of two dense
/// arrays: the values, and the entity owning each value. Lookup is O(1),
/// iteration touches only live values, and removal swaps the last value into
/// the hole so the arrays stay dense.
#[derive(Clone)]
pub struct Pool<T> {
    sparse: SparseMap<Entity, usize>,
    dense: Vec<T>,
    entities: Vec<Entity>,
}

/// An iterator over the entities and values in a [`Pool`].
#[derive(Clone)]
pub struct PoolIter<'a, T> {
    inner: Zip<slice::Iter<'a, Entity>, slice::Iter<'a, T>>,
}

/// A mutable iterator over the entities and values in a [`Pool`].
pub struct PoolIterMut<'a, T> {
    inner: Zip<slice::Iter<'a, Entity>, slice::IterMut<'a, T>>,
}

/// The untyped interface of a [`Pool`].
///
/// Lets the registry hold pools of different types in one collection and act
/// on an entity's components knowing only their ids.
pub(crate) trait ErasedPool: Send + Sync + 'static {
    fn len(&self) -> usize;

    fn contains(&self, entity: Entity) -> bool;

    fn resize(&mut self, slots: usize);

    /// Drops the value of an entity. Returns `true` if there was one.
    fn remove(&mut self, entity: Entity) -> bool;

    /// The name of the stored component type.
    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T> Pool<T> {
    /// Creates an empty pool.
    pub const fn new() -> Self {
        Self { sparse: SparseMap::new(), dense: Vec::new(), entities: Vec::new() }
    }

    /// Creates an empty pool with room for `capacity` values.
    pub fn with_capacity(capacity: usize) -> Self {
        let sparse = SparseMap::with_capacity(capacity);
        let dense = Vec::with_capacity(capacity);
        let entities = Vec::with_capacity(capacity);

        Self { sparse, dense, entities }
    }

    /// Returns the amount of values in the pool.
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Returns `true` if the pool holds no values.
    pub fn is_empty(&self) -> bool {
        self.sparse.is_empty()
    }

    /// Returns the amount of addressable entity slots.
    ///
    /// Grows on its own as values are [set](Self::set).
    pub fn slots(&self) -> usize {
        self.sparse.slot_count()
    }

    /// Sets the amount of addressable entity slots.
    ///
    /// Growing keeps every value. Shrinking below the id of an entity that
    /// still has a value is a logic error: it's caught by a debug assertion
    /// and otherwise clamped so no value is lost.
    pub fn resize(&mut self, slots: usize) {
        self.sparse.resize(slots);
    }

    /// Returns `true` if the entity has a value in this pool.
    pub fn contains(&self, entity: Entity) -> bool {
        self.sparse.contains(&entity)
    }

    /// Sets the value of an entity.
    ///
    /// Returns the previous value if there was one.
    pub fn set(&mut self, entity: Entity, value: T) -> Option<T> {
        if let Some(&index) = self.sparse.get(&entity) {
            return Some(std::mem::replace(&mut self.dense[index], value));
        }

        self.sparse.insert(entity, self.dense.len());
        self.dense.push(value);
        self.entities.push(entity);

        None
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.slot(entity).map(|index| &self.dense[index])
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.slot(entity).map(|index| &mut self.dense[index])
    }

    /// Removes the value of an entity.
    ///
    /// The last value takes the place of the removed one.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let index = self.sparse.remove(&entity)?;
        let value = self.dense.swap_remove(index);

        self.entities.swap_remove(index);

        if let Some(&moved) = self.entities.get(index) {
            self.sparse.insert(moved, index);
        }

        Some(value)
    }

    /// Removes all values, keeping the addressable range.
    pub fn clear(&mut self) {
        let slots = self.sparse.slot_count();

        self.sparse.clear();
        self.sparse.resize(slots);
        self.dense.clear();
        self.entities.clear();
    }

    /// Iterate over the entities and their values in packed order.
    pub fn iter(&self) -> PoolIter<'_, T> {
        PoolIter { inner: self.entities.iter().zip(self.dense.iter()) }
    }

    /// Iterate mutably over the entities and their values in packed order.
    pub fn iter_mut(&mut self) -> PoolIterMut<'_, T> {
        PoolIterMut { inner: self.entities.iter().zip(self.dense.iter_mut()) }
    }

    /// Returns the packed values.
    pub fn values(&self) -> &[T] {
        &self.dense
    }

    /// Returns the packed values mutably.
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.dense
    }

    /// Returns the packed index of an entity's value.
    pub(crate) fn slot(&self, entity: Entity) -> Option<usize> {
        self.sparse.get(&entity).copied()
    }
}

impl<T: Send + Sync + 'static> ErasedPool for Pool<T> {
    fn len(&self) -> usize {
        self.len()
    }

    fn contains(&self, entity: Entity) -> bool {
        self.contains(entity)
    }

    fn resize(&mut self, slots: usize) {
        self.resize(slots);
    }

    fn remove(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a Pool<T> {
    type IntoIter = PoolIter<'a, T>;
    type Item = (Entity, &'a T);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Pool<T> {
    type IntoIter = PoolIterMut<'a, T>;
    type Item = (Entity, &'a mut T);

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<'a, T> Iterator for PoolIter<'a, T> {
    type Item = (Entity, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(entity, value)| (*entity, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for PoolIter<'_, T> {}

impl<'a, T> Iterator for PoolIterMut<'a, T> {
    type Item = (Entity, &'a mut T);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(entity, value)| (*entity, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for PoolIterMut<'_, T> {}
