//! Components, the data attached to entities.

use std::any::{type_name, TypeId};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{LazyLock, OnceLock};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
pub use signet_macros::Component;
use thiserror::Error;

pub use self::pool::*;
pub use self::storage::{ComponentMut, ComponentRef};
pub(crate) use self::storage::Components;
use crate::entity::{Entity, EntityNotFound};
use crate::storage::{IdHasher, SparseIndex};

mod pool;
mod storage;

/// The maximum amount of distinct component types in a process.
///
/// Bounded because [signatures](crate::signature::Signature) are fixed-width
/// bitsets.
pub const MAX_COMPONENTS: usize = 32;

/// Plain data that can be attached to an entity.
///
/// Usually implemented with `#[derive(Component)]`, which memoizes the id in a
/// static for non-generic types. A manual `impl Component for T {}` uses the
/// process-wide `TypeId` lookup instead; both yield the same id for a type.
///
/// ```
/// # use signet::prelude::*;
/// #
/// #[derive(Component)]
/// struct Health(u32);
///
/// assert_eq!(ComponentId::of::<Health>(), ComponentId::of::<Health>());
/// ```
pub trait Component: Sized + Send + Sync + 'static {
    /// Returns the id of this component type, allocating it on first use.
    #[doc(hidden)]
    fn id() -> Result<ComponentId, ComponentCapacityError> {
        ComponentId::lookup::<Self>()
    }
}

/// A unique identifier for a [`Component`] type.
///
/// Assigned sequentially the first time a type is referenced and stable for
/// the lifetime of the process. Always less than [`MAX_COMPONENTS`].
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(pub(crate) usize);

/// A static container for memoizing a [`ComponentId`].
///
/// Used by `#[derive(Component)]`.
pub struct ComponentIdCell<C: Component> {
    inner: OnceLock<ComponentId>,
    _marker: PhantomData<fn() -> C>,
}

/// An error for when more than [`MAX_COMPONENTS`] component types are used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error(
    "component capacity exceeded: cannot register `{type_name}`, at most \
     {max} component types are supported",
    max = MAX_COMPONENTS
)]
pub struct ComponentCapacityError {
    /// The component that couldn't be assigned an id.
    pub type_name: &'static str,
}

/// An error for accessing the components of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ComponentError {
    #[error(transparent)]
    EntityNotFound(#[from] EntityNotFound),
    #[error("{entity} does not have component `{component}`")]
    NotFound { entity: Entity, component: &'static str },
    #[error("component already borrowed: {0}")]
    AlreadyBorrowed(&'static str),
    #[error(transparent)]
    Capacity(#[from] ComponentCapacityError),
}

/// Component ids by the type they were assigned to.
static IDS: LazyLock<DashMap<TypeId, ComponentId, IdHasher>> =
    LazyLock::new(Default::default);

/// Type names by component id, for diagnostics.
static NAMES: LazyLock<DashMap<ComponentId, &'static str>> =
    LazyLock::new(DashMap::new);

/// The next component id to hand out.
static COUNTER: AtomicUsize = AtomicUsize::new(0);

impl ComponentId {
    /// Returns the id of the given component.
    pub fn of<C: Component>() -> Result<Self, ComponentCapacityError> {
        C::id()
    }

    /// Returns the index of this id, which is also its bit in a
    /// [`Signature`](crate::signature::Signature).
    pub const fn index(self) -> usize {
        self.0
    }

    /// Returns the name of the type this id was assigned to.
    ///
    /// Returns `None` for ids that were never assigned.
    pub fn type_name(self) -> Option<&'static str> {
        NAMES.get(&self).map(|name| *name)
    }

    /// Looks up the id of a type in the process-wide registry, assigning the
    /// next id if the type is new.
    pub(crate) fn lookup<C: 'static>() -> Result<Self, ComponentCapacityError> {
        match IDS.entry(TypeId::of::<C>()) {
            Entry::Occupied(entry) => Ok(*entry.get()),
            Entry::Vacant(entry) => {
                // never advance past the limit, so failed requests can't wrap
                let id = COUNTER
                    .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |next| {
                        (next < MAX_COMPONENTS).then_some(next + 1)
                    })
                    .map(Self)
                    .map_err(|_| {
                        let error = ComponentCapacityError::new::<C>();

                        log::error!("{error}");

                        error
                    })?;

                NAMES.insert(id, type_name::<C>());
                log::debug!("component `{}` assigned id {}", type_name::<C>(), id.0);

                Ok(*entry.insert(id))
            },
        }
    }
}

impl<C: Component> ComponentIdCell<C> {
    /// Creates a new component id cell.
    pub const fn new() -> Self {
        let inner = OnceLock::new();

        Self { inner, _marker: PhantomData }
    }

    /// Returns the stored component id, initializing it if necessary.
    ///
    /// A capacity error is not memoized: every call fails until an id can be
    /// assigned, which never happens within the same process.
    pub fn get_or_init(&self) -> Result<ComponentId, ComponentCapacityError> {
        if let Some(id) = self.inner.get() {
            return Ok(*id);
        }

        let id = ComponentId::lookup::<C>()?;

        Ok(*self.inner.get_or_init(|| id))
    }
}

impl<C: Component> Default for ComponentIdCell<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentCapacityError {
    pub(crate) fn new<C: 'static>() -> Self {
        Self { type_name: type_name::<C>() }
    }
}

impl ComponentError {
    pub(crate) fn not_found<C: Component>(entity: Entity) -> Self {
        Self::NotFound { entity, component: type_name::<C>() }
    }
}

impl SparseIndex for ComponentId {
    fn sparse_index(&self) -> usize {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Component)]
    struct A;

    #[derive(Component)]
    struct B;

    #[derive(Component)]
    struct Wrapper<T: Send + Sync + 'static>(T);

    #[test]
    fn ids_are_unique() {
        assert_ne!(ComponentId::of::<A>().unwrap(), ComponentId::of::<B>().unwrap());
    }

    #[test]
    fn ids_are_stable() {
        let first = ComponentId::of::<A>().unwrap();

        for _ in 0..8 {
            assert_eq!(ComponentId::of::<A>().unwrap(), first);
        }

        // the memoized and the shared lookup agree
        assert_eq!(ComponentId::lookup::<A>().unwrap(), first);
        assert!(first.index() < MAX_COMPONENTS);
    }

    #[test]
    fn generic_components_get_an_id_per_instantiation() {
        let a = ComponentId::of::<Wrapper<u8>>().unwrap();
        let b = ComponentId::of::<Wrapper<u16>>().unwrap();

        assert_ne!(a, b);
        assert_eq!(ComponentId::of::<Wrapper<u8>>().unwrap(), a);
    }

    #[test]
    fn type_name_is_recorded() {
        let id = ComponentId::of::<B>().unwrap();

        assert!(id.type_name().is_some_and(|name| name.ends_with("B")));
    }
}
