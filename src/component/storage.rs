use std::any::type_name;
use std::fmt;
use std::ops::{Deref, DerefMut};

use atomic_refcell::{AtomicRef, AtomicRefCell, AtomicRefMut};

use super::{Component, ComponentError, ComponentId, ErasedPool, Pool};
use crate::entity::Entity;
use crate::signature::Signature;
use crate::storage::SparseMap;

/// Storage for the pools of every component type, indexed by component id.
#[derive(Default)]
pub struct Components {
    pools: SparseMap<ComponentId, PoolBox>,
    /// The addressable range new pools start with.
    slots: usize,
}

/// A reference to a component of an entity.
pub struct ComponentRef<'w, C: Component> {
    inner: AtomicRef<'w, C>,
}

/// A mutable reference to a component of an entity.
pub struct ComponentMut<'w, C: Component> {
    inner: AtomicRefMut<'w, C>,
}

/// Storage for a single pool.
#[repr(transparent)]
struct PoolBox {
    inner: AtomicRefCell<Box<dyn ErasedPool>>,
}

impl Components {
    /// Creates a component storage whose pools start with room for `slots`
    /// entities.
    pub fn with_capacity(slots: usize) -> Self {
        Self { pools: SparseMap::new(), slots }
    }

    /// Sets the component of an entity, creating the pool if necessary.
    ///
    /// Returns the previous value.
    pub fn insert<C: Component>(
        &mut self,
        id: ComponentId,
        entity: Entity,
        component: C,
    ) -> Option<C> {
        let slots = self.slots;
        let pool = self
            .pools
            .get_or_insert_with(id, || PoolBox::new::<C>(slots));

        // SAFETY: the pool at the id of `C` is always a `Pool<C>`
        unsafe { pool.pool_mut::<C>() }.set(entity, component)
    }

    /// Removes the component of an entity.
    pub fn remove<C: Component>(
        &mut self,
        id: ComponentId,
        entity: Entity,
    ) -> Option<C> {
        let pool = self.pools.get_mut(&id)?;

        // SAFETY: the pool at the id of `C` is always a `Pool<C>`
        unsafe { pool.pool_mut::<C>() }.remove(entity)
    }

    pub fn get<C: Component>(
        &self,
        id: ComponentId,
        entity: Entity,
    ) -> Result<ComponentRef<'_, C>, ComponentError> {
        let pool = self
            .pools
            .get(&id)
            .ok_or(ComponentError::not_found::<C>(entity))?;

        // SAFETY: the pool at the id of `C` is always a `Pool<C>`
        unsafe { pool.get(entity) }
    }

    pub fn get_mut<C: Component>(
        &self,
        id: ComponentId,
        entity: Entity,
    ) -> Result<ComponentMut<'_, C>, ComponentError> {
        let pool = self
            .pools
            .get(&id)
            .ok_or(ComponentError::not_found::<C>(entity))?;

        // SAFETY: the pool at the id of `C` is always a `Pool<C>`
        unsafe { pool.get_mut(entity) }
    }

    /// Drops every component in the signature of an entity.
    ///
    /// Returns the amount of components dropped.
    pub fn free(&mut self, entity: Entity, signature: Signature) -> usize {
        let mut freed = 0;

        for id in signature {
            if let Some(pool) = self.pools.get_mut(&id) {
                freed += usize::from(pool.inner.get_mut().remove(entity));
            }
        }

        freed
    }

    /// Returns `true` if the entity has a value in the pool of `id`.
    pub fn contains(&self, id: ComponentId, entity: Entity) -> bool {
        self.pools
            .get(&id)
            .and_then(|pool| pool.inner.try_borrow().ok())
            .is_some_and(|pool| pool.contains(entity))
    }
}

impl PoolBox {
    fn new<C: Component>(slots: usize) -> Self {
        let mut pool: Box<dyn ErasedPool> = Box::new(Pool::<C>::new());

        pool.resize(slots);

        Self { inner: AtomicRefCell::new(pool) }
    }

    /// ## Safety
    ///
    /// The pool must be a `Pool<C>`.
    unsafe fn pool_mut<C: Component>(&mut self) -> &mut Pool<C> {
        let pool = self.inner.get_mut().as_any_mut();

        debug_assert!(
            pool.is::<Pool<C>>(),
            "pool is not a `Pool<{}>`",
            type_name::<C>(),
        );

        // SAFETY: ensured by the caller
        unsafe { pool.downcast_mut().unwrap_unchecked() }
    }

    /// ## Safety
    ///
    /// The pool must be a `Pool<C>`.
    unsafe fn get<C: Component>(
        &self,
        entity: Entity,
    ) -> Result<ComponentRef<'_, C>, ComponentError> {
        let guard = self
            .inner
            .try_borrow()
            .map_err(|_| ComponentError::AlreadyBorrowed(type_name::<C>()))?;
        // SAFETY: ensured by the caller
        let pool: AtomicRef<'_, Pool<C>> = AtomicRef::map(guard, |pool| unsafe {
            pool.as_any().downcast_ref().unwrap_unchecked()
        });
        let index = pool
            .slot(entity)
            .ok_or(ComponentError::not_found::<C>(entity))?;

        Ok(ComponentRef::new(AtomicRef::map(pool, |pool| &pool.values()[index])))
    }

    /// ## Safety
    ///
    /// The pool must be a `Pool<C>`.
    unsafe fn get_mut<C: Component>(
        &self,
        entity: Entity,
    ) -> Result<ComponentMut<'_, C>, ComponentError> {
        let guard = self
            .inner
            .try_borrow_mut()
            .map_err(|_| ComponentError::AlreadyBorrowed(type_name::<C>()))?;
        // SAFETY: ensured by the caller
        let pool: AtomicRefMut<'_, Pool<C>> =
            AtomicRefMut::map(guard, |pool| unsafe {
                pool.as_any_mut().downcast_mut().unwrap_unchecked()
            });
        let index = pool
            .slot(entity)
            .ok_or(ComponentError::not_found::<C>(entity))?;

        Ok(ComponentMut::new(AtomicRefMut::map(pool, |pool| {
            &mut pool.values_mut()[index]
        })))
    }
}

impl<'w, C: Component> ComponentRef<'w, C> {
    fn new(inner: AtomicRef<'w, C>) -> Self {
        Self { inner }
    }

    /// Clone this reference.
    ///
    /// This is an assosciated function so as to not interfere with
    /// dereferencing.
    #[allow(clippy::should_implement_trait)]
    pub fn clone(this: &Self) -> Self {
        Self { inner: AtomicRef::clone(&this.inner) }
    }
}

impl<'w, C: Component> ComponentMut<'w, C> {
    fn new(inner: AtomicRefMut<'w, C>) -> Self {
        Self { inner }
    }
}

// ---

impl fmt::Debug for Components {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.pools.iter()).finish()
    }
}

impl fmt::Debug for PoolBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(pool) => f
                .debug_struct("Pool")
                .field("type_name", &pool.type_name())
                .field("len", &pool.len())
                .finish(),
            Err(_) => f.write_str("Pool(<borrowed>)"),
        }
    }
}

impl<C: Component> Deref for ComponentRef<'_, C> {
    type Target = C;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<C: Component> Deref for ComponentMut<'_, C> {
    type Target = C;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<C: Component> DerefMut for ComponentMut<'_, C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl<C: Component + fmt::Debug> fmt::Debug for ComponentRef<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<C: Component + fmt::Debug> fmt::Debug for ComponentMut<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}
