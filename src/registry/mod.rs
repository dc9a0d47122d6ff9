//! Defines the [`Registry`], the center of the ECS.

use std::collections::BTreeSet;
use std::mem;

pub use self::entity::*;
use crate::component::{
    Component,
    ComponentError,
    ComponentId,
    ComponentMut,
    ComponentRef,
    Components,
};
use crate::entity::{Entities, Entity, EntityNotFound, EntityState};
use crate::signature::Signature;
use crate::system::{SystemError, SystemLogic, SystemMut, SystemRef, Systems};

mod entity;
#[cfg(test)]
mod tests;

/// Owns all entities, components and systems.
///
/// Component changes take effect immediately, but system membership is only
/// synchronized by [`Registry::update`], which the game loop calls once per
/// frame.
///
/// - [Entity methods](#entity-methods)
/// - [Component methods](#component-methods)
/// - [System methods](#system-methods)
#[derive(Debug)]
pub struct Registry {
    entities: Entities,
    components: Components,
    systems: Systems,
    /// Entities to activate on the next update.
    pending_add: BTreeSet<Entity>,
    /// Entities to remove on the next update.
    pending_kill: BTreeSet<Entity>,
    /// Active entities whose signature changed since the last update.
    pending_refresh: BTreeSet<Entity>,
}

impl Registry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a new empty registry with room for `capacity` entities.
    pub fn with_capacity(capacity: usize) -> Self {
        let entities = Entities::with_capacity(capacity);
        let components = Components::with_capacity(capacity);
        let systems = Systems::new();

        Self {
            entities,
            components,
            systems,
            pending_add: BTreeSet::new(),
            pending_kill: BTreeSet::new(),
            pending_refresh: BTreeSet::new(),
        }
    }

    /// Synchronizes system membership with the entities.
    ///
    /// In order:
    ///
    /// 1. Created entities become [active](EntityState::Active) and join every
    ///    system they match.
    /// 2. Active entities whose components changed join the systems they now
    ///    match and leave the ones they don't.
    /// 3. Systems added since the last update pick up every matching active
    ///    entity.
    /// 4. Killed entities leave every system and their components are
    ///    dropped.
    ///
    /// Afterwards, an active entity is a member of a system if and only if its
    /// signature matches.
    pub fn update(&mut self) {
        let added = mem::take(&mut self.pending_add);
        let refreshed = mem::take(&mut self.pending_refresh);
        let killed = mem::take(&mut self.pending_kill);

        for &entity in &added {
            let Some(slot) = self.entities.live_slot_mut(entity) else {
                continue;
            };

            debug_assert_eq!(slot.state, EntityState::PendingAdd);

            slot.state = EntityState::Active;

            for system in self.systems.iter_mut() {
                if system.matches(slot.signature) {
                    system.add_entity(entity);
                }
            }
        }

        for &entity in &refreshed {
            let Some(signature) = self.active_signature(entity) else {
                continue;
            };

            for system in self.systems.iter_mut() {
                system.rematch(entity, signature);
            }
        }

        let mut scanned = 0;

        for system in self.systems.drain_pending() {
            for (entity, signature) in self.entities.active() {
                if system.matches(signature) {
                    system.add_entity(entity);
                }
            }

            scanned += 1;
        }

        for &entity in &killed {
            for system in self.systems.iter_mut() {
                system.remove_entity(entity);
            }

            if let Some(signature) = self.entities.free(entity) {
                let freed = self.components.free(entity, signature);

                debug_assert_eq!(freed, signature.len());
            }
        }

        log::trace!(
            "update: {} added, {} refreshed, {} killed, {scanned} new systems",
            added.len(),
            refreshed.len(),
            killed.len(),
        );
    }

    fn active_signature(&self, entity: Entity) -> Option<Signature> {
        self.entities
            .slot(entity)
            .filter(|slot| slot.state == EntityState::Active)
            .map(|slot| slot.signature)
    }
}

/// # Entity methods
impl Registry {
    /// Returns the count of entities that haven't been removed.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if every entity has been removed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the entity was created and not yet removed.
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains(entity)
    }

    /// Returns the lifecycle state of an entity.
    ///
    /// Returns `None` if the entity was never created by this registry.
    pub fn state(&self, entity: Entity) -> Option<EntityState> {
        self.entities.state(entity)
    }

    /// Returns the components an entity carries.
    pub fn signature(
        &self,
        entity: Entity,
    ) -> Result<Signature, EntityNotFound> {
        self.entities.signature(entity).ok_or(EntityNotFound(entity))
    }

    /// Creates a new entity without components.
    ///
    /// The entity joins systems on the next [update](Registry::update).
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.entities.alloc();

        self.pending_add.insert(entity);

        log::debug!("created {entity}");

        entity
    }

    /// Creates a new entity and returns a handle to it.
    pub fn spawn(&mut self) -> EntityMut<'_> {
        let entity = self.create_entity();

        EntityMut::new(self, entity)
    }

    /// Returns a handle to an entity.
    ///
    /// Returns an error if the entity doesn't exist in this registry.
    pub fn entity(
        &mut self,
        entity: Entity,
    ) -> Result<EntityMut<'_>, EntityNotFound> {
        if !self.contains(entity) {
            return Err(EntityNotFound(entity));
        }

        Ok(EntityMut::new(self, entity))
    }

    /// Queues an entity for removal.
    ///
    /// The entity keeps its components and system memberships until the next
    /// [update](Registry::update). Killing an entity that is already queued
    /// does nothing.
    pub fn kill_entity(
        &mut self,
        entity: Entity,
    ) -> Result<(), EntityNotFound> {
        match self.entities.state(entity) {
            Some(EntityState::PendingAdd | EntityState::Active) => {
                self.entities.set_state(entity, EntityState::PendingKill);
                self.pending_add.remove(&entity);
                self.pending_refresh.remove(&entity);
                self.pending_kill.insert(entity);

                log::debug!("killed {entity}");

                Ok(())
            },
            Some(EntityState::PendingKill) => Ok(()),
            Some(EntityState::Removed) | None => Err(EntityNotFound(entity)),
        }
    }

    /// Queues every entity for removal.
    pub fn kill_all(&mut self) {
        let live: Vec<_> = self.entities.live().collect();

        for entity in live {
            let killed = self.kill_entity(entity);

            debug_assert!(killed.is_ok(), "live {entity} could not be killed");
        }
    }
}

/// # Component methods
impl Registry {
    /// Returns `true` if the entity carries the component.
    ///
    /// Returns `false` for entities that don't exist.
    pub fn has_component<C: Component>(&self, entity: Entity) -> bool {
        self.entities
            .signature(entity)
            .zip(ComponentId::of::<C>().ok())
            .is_some_and(|(signature, id)| signature.contains(id))
    }

    /// Attaches a component to an entity, replacing and returning the previous
    /// value.
    ///
    /// The entity's signature changes immediately; its system memberships on
    /// the next [update](Registry::update).
    pub fn add_component<C: Component>(
        &mut self,
        entity: Entity,
        component: C,
    ) -> Result<Option<C>, ComponentError> {
        let slot = self
            .entities
            .live_slot_mut(entity)
            .ok_or(EntityNotFound(entity))?;
        let id = ComponentId::of::<C>()?;

        if slot.signature.set(id) && slot.state == EntityState::Active {
            self.pending_refresh.insert(entity);
        }

        Ok(self.components.insert(id, entity, component))
    }

    /// Detaches a component from an entity and returns it.
    ///
    /// Returns `Ok(None)` if the entity doesn't carry the component.
    pub fn remove_component<C: Component>(
        &mut self,
        entity: Entity,
    ) -> Result<Option<C>, ComponentError> {
        let slot = self
            .entities
            .live_slot_mut(entity)
            .ok_or(EntityNotFound(entity))?;
        // a type without an id can't be attached to anything
        let Ok(id) = ComponentId::of::<C>() else {
            return Ok(None);
        };

        if !slot.signature.unset(id) {
            return Ok(None);
        }

        if slot.state == EntityState::Active {
            self.pending_refresh.insert(entity);
        }

        debug_assert!(self.components.contains(id, entity));

        Ok(self.components.remove(id, entity))
    }

    /// Borrows a component of an entity.
    pub fn component<C: Component>(
        &self,
        entity: Entity,
    ) -> Result<ComponentRef<'_, C>, ComponentError> {
        let id = self.component_id::<C>(entity)?;

        self.components.get(id, entity)
    }

    /// Mutably borrows a component of an entity.
    ///
    /// Only components of other types can be borrowed at the same time.
    pub fn component_mut<C: Component>(
        &self,
        entity: Entity,
    ) -> Result<ComponentMut<'_, C>, ComponentError> {
        let id = self.component_id::<C>(entity)?;

        self.components.get_mut(id, entity)
    }

    /// Returns the id of `C` if the entity carries it.
    fn component_id<C: Component>(
        &self,
        entity: Entity,
    ) -> Result<ComponentId, ComponentError> {
        let signature = self.signature(entity)?;
        let id = ComponentId::of::<C>()?;

        signature
            .contains(id)
            .then_some(id)
            .ok_or(ComponentError::not_found::<C>(entity))
    }
}

/// # System methods
impl Registry {
    /// Registers a system.
    ///
    /// The logic declares its requirements through
    /// [`SystemLogic::require`]. The system is filled with matching entities on
    /// the next [update](Registry::update).
    pub fn add_system<S: SystemLogic>(
        &mut self,
        logic: S,
    ) -> Result<(), SystemError> {
        self.systems.insert(logic)?;

        log::debug!("added system `{}`", std::any::type_name::<S>());

        Ok(())
    }

    /// Returns `true` if a system of this type is registered.
    pub fn has_system<S: SystemLogic>(&self) -> bool {
        self.systems.contains::<S>()
    }

    /// Borrows a system.
    pub fn system<S: SystemLogic>(
        &self,
    ) -> Result<SystemRef<'_, S>, SystemError> {
        self.systems.get()
    }

    /// Mutably borrows the logic of a system.
    pub fn system_mut<S: SystemLogic>(
        &self,
    ) -> Result<SystemMut<'_, S>, SystemError> {
        self.systems.get_mut()
    }

    /// Unregisters a system and returns its logic.
    pub fn remove_system<S: SystemLogic>(&mut self) -> Result<S, SystemError> {
        let logic = self.systems.remove()?;

        log::debug!("removed system `{}`", std::any::type_name::<S>());

        Ok(logic)
    }

    /// Returns the amount of registered systems.
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
