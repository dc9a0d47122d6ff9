//! Defines entities, the individual objects in an ECS.

use std::fmt;

use thiserror::Error;

pub(crate) use self::allocator::*;
use crate::storage::SparseIndex;

mod allocator;

/// An identifier for an entity in a [`Registry`](crate::registry::Registry).
///
/// Entities are plain value handles: they own none of their components.
/// Equality and ordering are by id. Ids are handed out sequentially and are
/// never reused, not even after the entity is removed.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity {
    pub(crate) id: u32,
}

/// The lifecycle state of an entity.
///
/// System membership only changes when the registry is
/// [updated](crate::registry::Registry::update), so an entity passes through
/// a pending state on its way in and on its way out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityState {
    /// Created, but not yet matched against any system.
    PendingAdd,
    /// Matched against systems.
    Active,
    /// Killed, but still a member of its systems until the next update.
    PendingKill,
    /// Removed from all systems, with all of its components dropped.
    Removed,
}

/// An error for when a requested entity was never created or was already
/// removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("entity not found: {0}")]
pub struct EntityNotFound(pub Entity);

impl Entity {
    pub(crate) const fn new(id: u32) -> Self {
        Self { id }
    }

    /// Returns the id of this entity.
    pub const fn id(self) -> u32 {
        self.id
    }
}

impl EntityState {
    /// Returns `true` if the entity has not been removed.
    pub const fn is_live(self) -> bool {
        !matches!(self, Self::Removed)
    }
}

impl SparseIndex for Entity {
    fn sparse_index(&self) -> usize {
        self.id as _
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity #{}", self.id)
    }
}
