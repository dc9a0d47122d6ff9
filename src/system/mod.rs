//! Systems, the entity sets maintained by signature.
//!
//! A [`System`] is bookkeeping only: the set of entities whose components
//! satisfy its [signature](Signature). The game logic that iterates those
//! entities is a [`SystemLogic`] value registered with a
//! [`Registry`](crate::registry::Registry).
//!
//! ```
//! # use signet::prelude::*;
//! #
//! #[derive(Component)]
//! struct Position(f32);
//!
//! #[derive(Component)]
//! struct Velocity(f32);
//!
//! struct Movement;
//!
//! impl SystemLogic for Movement {
//!     fn require(&self, system: &mut System) -> Result<(), ComponentCapacityError> {
//!         system.require_component::<Position>()?.require_component::<Velocity>()?;
//!
//!         Ok(())
//!     }
//! }
//!
//! let mut registry = Registry::new();
//!
//! registry.add_system(Movement)?;
//! registry.spawn().add(Position(0.0))?.add(Velocity(2.0))?;
//! registry.update();
//!
//! let movement = registry.system::<Movement>()?;
//!
//! for entity in movement.system().iter() {
//!     let velocity = registry.component::<Velocity>(entity)?.0;
//!
//!     registry.component_mut::<Position>(entity)?.0 += velocity;
//! }
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```

use std::any::type_name;
use std::fmt;
use std::iter::Copied;
use std::ops::{Deref, DerefMut};

use atomic_refcell::{AtomicRef, AtomicRefMut};
use thiserror::Error;

pub(crate) use self::storage::*;
use crate::component::{Component, ComponentCapacityError, ComponentId};
use crate::entity::Entity;
use crate::signature::Signature;
use crate::storage::{SparseIter, SparseSet};

mod storage;

/// The entities matching a set of required components.
///
/// Membership is maintained by the registry: entities join and leave only
/// during [`Registry::update`](crate::registry::Registry::update).
#[derive(Debug, Default, Clone)]
pub struct System {
    signature: Signature,
    entities: SparseSet<Entity>,
}

/// Game-side logic operating on the entities of a [`System`].
///
/// A registry holds at most one value per logic type. The value carries any
/// state the logic needs; the registry never runs it.
pub trait SystemLogic: Send + Sync + 'static {
    /// Declares the components an entity needs to be part of this system.
    ///
    /// Called once, when the logic is registered.
    fn require(&self, system: &mut System) -> Result<(), ComponentCapacityError>;
}

/// A reference to a registered [`SystemLogic`] and its [`System`].
pub struct SystemRef<'r, S: SystemLogic> {
    inner: AtomicRef<'r, SystemSlot<S>>,
}

/// A mutable reference to a registered [`SystemLogic`].
///
/// The [`System`] itself stays read-only: its membership belongs to the
/// registry.
pub struct SystemMut<'r, S: SystemLogic> {
    inner: AtomicRefMut<'r, SystemSlot<S>>,
}

/// An error for accessing the systems of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SystemError {
    #[error("system not found: {0}")]
    NotFound(&'static str),
    #[error("system already registered: {0}")]
    AlreadyRegistered(&'static str),
    #[error("system already borrowed: {0}")]
    AlreadyBorrowed(&'static str),
    #[error(transparent)]
    Capacity(#[from] ComponentCapacityError),
}

impl System {
    /// Creates a system without requirements.
    ///
    /// Until components are required, every entity matches it.
    pub const fn new() -> Self {
        Self { signature: Signature::new(), entities: SparseSet::new() }
    }

    /// Requires entities to carry the component `C`.
    ///
    /// Fails if `C` can't be assigned a component id.
    pub fn require_component<C: Component>(
        &mut self,
    ) -> Result<&mut Self, ComponentCapacityError> {
        self.signature.set(ComponentId::of::<C>()?);

        Ok(self)
    }

    /// Returns the required components.
    pub const fn signature(&self) -> Signature {
        self.signature
    }

    /// Returns `true` if an entity with the given signature belongs to this
    /// system.
    pub const fn matches(&self, signature: Signature) -> bool {
        signature.contains_all(self.signature)
    }

    /// Adds an entity. Returns `true` if it wasn't a member.
    pub fn add_entity(&mut self, entity: Entity) -> bool {
        self.entities.insert(entity).is_none()
    }

    /// Removes an entity. Returns `true` if it was a member.
    pub fn remove_entity(&mut self, entity: Entity) -> bool {
        self.entities.remove(&entity).is_some()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains(&entity)
    }

    /// Returns the amount of member entities.
    pub const fn len(&self) -> usize {
        self.entities.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate over the member entities in ascending id order.
    pub fn iter(&self) -> Copied<SparseIter<'_, Entity>> {
        self.entities.iter().copied()
    }

    /// Returns a snapshot of the member entities in ascending id order.
    pub fn entities(&self) -> Vec<Entity> {
        self.iter().collect()
    }

    /// Adds the entity if its signature matches, removes it otherwise.
    ///
    /// Returns `true` if membership changed.
    pub(crate) fn rematch(&mut self, entity: Entity, signature: Signature) -> bool {
        if self.matches(signature) {
            self.add_entity(entity)
        } else {
            self.remove_entity(entity)
        }
    }
}

impl<'a> IntoIterator for &'a System {
    type IntoIter = Copied<SparseIter<'a, Entity>>;
    type Item = Entity;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'r, S: SystemLogic> SystemRef<'r, S> {
    fn new(inner: AtomicRef<'r, SystemSlot<S>>) -> Self {
        Self { inner }
    }

    /// Returns the system bookkeeping of this logic.
    pub fn system(&self) -> &System {
        &self.inner.system
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

impl<'r, S: SystemLogic> SystemMut<'r, S> {
    fn new(inner: AtomicRefMut<'r, SystemSlot<S>>) -> Self {
        Self { inner }
    }

    /// Returns the system bookkeeping of this logic.
    pub fn system(&self) -> &System {
        &self.inner.system
    }
}

impl SystemError {
    pub(crate) fn not_found<S: SystemLogic>() -> Self {
        Self::NotFound(type_name::<S>())
    }
}

// ---

impl<S: SystemLogic> Deref for SystemRef<'_, S> {
    type Target = S;

    fn deref(&self) -> &Self::Target {
        &self.inner.logic
    }
}

impl<S: SystemLogic> Deref for SystemMut<'_, S> {
    type Target = S;

    fn deref(&self) -> &Self::Target {
        &self.inner.logic
    }
}

impl<S: SystemLogic> DerefMut for SystemMut<'_, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner.logic
    }
}

impl<S: SystemLogic> fmt::Debug for SystemRef<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemRef")
            .field("logic", &type_name::<S>())
            .field("system", self.system())
            .finish()
    }
}

impl<S: SystemLogic> fmt::Debug for SystemMut<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemMut")
            .field("logic", &type_name::<S>())
            .field("system", self.system())
            .finish()
    }
}
