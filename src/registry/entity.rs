use std::fmt;

use super::Registry;
use crate::component::{Component, ComponentError, ComponentMut, ComponentRef};
use crate::entity::{Entity, EntityNotFound, EntityState};
use crate::signature::Signature;

/// A mutable handle to an entity and its registry.
///
/// ```
/// # use signet::prelude::*;
/// #
/// #[derive(Component)]
/// struct Health(u32);
///
/// let mut registry = Registry::new();
/// let mut tank = registry.spawn();
///
/// tank.add(Health(100))?;
/// tank.get_mut::<Health>()?.0 -= 40;
///
/// assert_eq!(tank.get::<Health>()?.0, 60);
/// # Ok::<_, ComponentError>(())
/// ```
pub struct EntityMut<'r> {
    registry: &'r mut Registry,
    entity: Entity,
}

impl<'r> EntityMut<'r> {
    pub(crate) fn new(registry: &'r mut Registry, entity: Entity) -> Self {
        Self { registry, entity }
    }

    /// The [`Entity`] this points to.
    pub const fn id(&self) -> Entity {
        self.entity
    }

    /// Returns the lifecycle state of this entity.
    pub fn state(&self) -> EntityState {
        // the handle borrows the registry, so the entity can't be removed
        // while it exists
        self.registry.state(self.entity).unwrap_or(EntityState::Removed)
    }

    /// Returns the components this entity carries.
    pub fn signature(&self) -> Signature {
        self.registry.signature(self.entity).unwrap_or_default()
    }

    /// Returns `true` if this entity carries the component.
    pub fn has<C: Component>(&self) -> bool {
        self.registry.has_component::<C>(self.entity)
    }

    /// Attaches a component and returns `self`.
    ///
    /// Replaces the previous value of the component, if any.
    pub fn add<C: Component>(
        &mut self,
        component: C,
    ) -> Result<&mut Self, ComponentError> {
        self.insert(component)?;

        Ok(self)
    }

    /// Attaches a component. Returns the previous value (if present).
    pub fn insert<C: Component>(
        &mut self,
        component: C,
    ) -> Result<Option<C>, ComponentError> {
        self.registry.add_component(self.entity, component)
    }

    /// Detaches a component and returns it.
    pub fn remove<C: Component>(&mut self) -> Result<Option<C>, ComponentError> {
        self.registry.remove_component(self.entity)
    }

    /// Borrows a component of this entity.
    pub fn get<C: Component>(&self) -> Result<ComponentRef<'_, C>, ComponentError> {
        self.registry.component(self.entity)
    }

    /// Mutably borrows a component of this entity.
    pub fn get_mut<C: Component>(
        &mut self,
    ) -> Result<ComponentMut<'_, C>, ComponentError> {
        self.registry.component_mut(self.entity)
    }

    /// Queues this entity for removal on the next
    /// [update](Registry::update).
    pub fn kill(self) -> Result<(), EntityNotFound> {
        self.registry.kill_entity(self.entity)
    }
}

impl fmt::Debug for EntityMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityMut")
            .field("id", &self.entity)
            .field("state", &self.state())
            .field("signature", &self.signature())
            .finish()
    }
}
