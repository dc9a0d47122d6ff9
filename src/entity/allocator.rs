use std::iter::Enumerate;
use std::slice;

use super::{Entity, EntityState};
use crate::signature::Signature;

/// Allocates entities and tracks their lifecycle state and signature.
///
/// Slots are indexed by entity id. Ids are never reused, so a removed entity
/// keeps its (emptied) slot for the lifetime of the registry.
#[derive(Debug, Default)]
pub struct Entities {
    slots: Vec<EntitySlot>,
    /// The amount of slots that aren't [`EntityState::Removed`].
    live: usize,
}

/// Describes an allocated entity.
#[derive(Debug, Clone, Copy)]
pub struct EntitySlot {
    pub state: EntityState,
    /// The components the entity currently carries.
    pub signature: Signature,
}

/// An iterator over the [`EntityState::Active`] entities and their
/// signatures.
#[derive(Clone)]
pub struct ActiveEntities<'a> {
    inner: Enumerate<slice::Iter<'a, EntitySlot>>,
}

impl Entities {
    /// Creates an allocator with room for `capacity` entities.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { slots: Vec::with_capacity(capacity), live: 0 }
    }

    /// Amount of entities that haven't been removed.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Allocate a new entity in the [`EntityState::PendingAdd`] state.
    pub fn alloc(&mut self) -> Entity {
        let id = u32::try_from(self.slots.len()).expect("entity overflow");

        self.slots.push(EntitySlot::new());
        self.live += 1;

        Entity::new(id)
    }

    pub fn slot(&self, entity: Entity) -> Option<&EntitySlot> {
        self.slots.get(entity.id as usize)
    }

    /// Returns the slot of a live entity.
    pub fn live_slot_mut(&mut self, entity: Entity) -> Option<&mut EntitySlot> {
        self.slots
            .get_mut(entity.id as usize)
            .filter(|slot| slot.state.is_live())
    }

    /// Whether the entity was allocated and not yet removed.
    pub fn contains(&self, entity: Entity) -> bool {
        self.slot(entity).is_some_and(|slot| slot.state.is_live())
    }

    pub fn state(&self, entity: Entity) -> Option<EntityState> {
        self.slot(entity).map(|slot| slot.state)
    }

    /// Returns the signature of a live entity.
    pub fn signature(&self, entity: Entity) -> Option<Signature> {
        self.slot(entity)
            .filter(|slot| slot.state.is_live())
            .map(|slot| slot.signature)
    }

    /// Sets the state of a live entity.
    ///
    /// Returns `None` if the entity isn't live.
    pub fn set_state(&mut self, entity: Entity, state: EntityState) -> Option<()> {
        debug_assert_ne!(state, EntityState::Removed, "use `Entities::free`");

        self.live_slot_mut(entity).map(|slot| slot.state = state)
    }

    /// Marks an entity as removed and resets its signature.
    ///
    /// Returns the signature the entity had, or `None` if it wasn't live.
    pub fn free(&mut self, entity: Entity) -> Option<Signature> {
        let slot = self.live_slot_mut(entity)?;
        let signature = std::mem::take(&mut slot.signature);

        slot.state = EntityState::Removed;
        self.live -= 1;

        Some(signature)
    }

    /// Iterate over the active entities in id order.
    pub fn active(&self) -> ActiveEntities<'_> {
        ActiveEntities { inner: self.slots.iter().enumerate() }
    }

    /// Iterate over all live entities in id order.
    pub fn live(&self) -> impl Iterator<Item = Entity> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.state.is_live())
            .map(|(id, _)| Entity::new(id as _))
    }
}

impl EntitySlot {
    /// A fresh slot: pending addition with no components.
    const fn new() -> Self {
        Self { state: EntityState::PendingAdd, signature: Signature::new() }
    }
}

impl Iterator for ActiveEntities<'_> {
    type Item = (Entity, Signature);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().find_map(|(id, slot)| {
            (slot.state == EntityState::Active)
                .then(|| (Entity::new(id as _), slot.signature))
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }
}
