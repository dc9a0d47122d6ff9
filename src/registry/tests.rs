use crate::prelude::*;

#[derive(Component, Debug, Clone, Copy, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
struct Velocity {
    x: f32,
    y: f32,
}

#[derive(Component, Debug, PartialEq)]
struct Health(u32);

#[derive(Component, Debug, PartialEq)]
struct Name(&'static str);

/// Requires `Position` and `Velocity`.
#[derive(Default)]
struct Movement {
    frames: u32,
}

/// Requires `Health`.
struct Damage;

/// Requires nothing.
struct Everything;

impl SystemLogic for Movement {
    fn require(&self, system: &mut System) -> Result<(), ComponentCapacityError> {
        system
            .require_component::<Position>()?
            .require_component::<Velocity>()?;

        Ok(())
    }
}

impl SystemLogic for Damage {
    fn require(&self, system: &mut System) -> Result<(), ComponentCapacityError> {
        system.require_component::<Health>()?;

        Ok(())
    }
}

impl SystemLogic for Everything {
    fn require(&self, _system: &mut System) -> Result<(), ComponentCapacityError> {
        Ok(())
    }
}

const ORIGIN: Position = Position { x: 0.0, y: 0.0 };
const DIAGONAL: Velocity = Velocity { x: 1.0, y: 1.0 };

fn members<S: SystemLogic>(registry: &Registry) -> Vec<Entity> {
    registry.system::<S>().unwrap().system().entities()
}

/// Checks that every active entity is a member of exactly the systems it
/// matches.
fn assert_membership_matches<S: SystemLogic>(registry: &Registry, all: &[Entity]) {
    let system = registry.system::<S>().unwrap();

    for &entity in all {
        let expected = registry.state(entity) == Some(EntityState::Active)
            && system.system().matches(registry.signature(entity).unwrap());

        assert_eq!(system.system().contains(entity), expected, "{entity}");
    }
}

#[test]
fn entity_ids_are_monotonic_and_never_reused() {
    let mut registry = Registry::new();

    let e0 = registry.create_entity();
    let e1 = registry.create_entity();

    registry.kill_entity(e0).unwrap();
    registry.update();

    let e2 = registry.create_entity();

    assert!(e0.id() < e1.id() && e1.id() < e2.id());
    assert_eq!(registry.state(e0), Some(EntityState::Removed));
    assert_eq!(registry.len(), 2);
}

#[test]
fn membership_is_deferred_until_update() {
    let mut registry = Registry::new();
    let e0 = registry.create_entity();

    registry.add_component(e0, ORIGIN).unwrap();
    registry.add_component(e0, DIAGONAL).unwrap();
    registry.add_system(Movement::default()).unwrap();

    // components are visible immediately, membership isn't
    assert!(registry.has_component::<Position>(e0));
    assert_eq!(registry.state(e0), Some(EntityState::PendingAdd));
    assert!(members::<Movement>(&registry).is_empty());

    registry.update();

    assert_eq!(registry.state(e0), Some(EntityState::Active));
    assert_eq!(members::<Movement>(&registry), [e0]);
}

#[test]
fn removing_a_component_leaves_systems_on_update() {
    let mut registry = Registry::new();

    registry.add_system(Movement::default()).unwrap();

    let e0 = registry.create_entity();

    registry.add_component(e0, ORIGIN).unwrap();
    registry.add_component(e0, DIAGONAL).unwrap();
    registry.update();

    assert_eq!(registry.remove_component::<Velocity>(e0), Ok(Some(DIAGONAL)));
    // still a member until the next update
    assert_eq!(members::<Movement>(&registry), [e0]);

    registry.update();

    assert!(members::<Movement>(&registry).is_empty());
    assert!(registry.has_component::<Position>(e0));
    assert!(!registry.has_component::<Velocity>(e0));
}

#[test]
fn adding_a_component_joins_systems_on_update() {
    let mut registry = Registry::new();

    registry.add_system(Movement::default()).unwrap();

    let e0 = registry.create_entity();

    registry.add_component(e0, ORIGIN).unwrap();
    registry.update();

    assert!(members::<Movement>(&registry).is_empty());

    registry.add_component(e0, DIAGONAL).unwrap();

    assert!(members::<Movement>(&registry).is_empty());

    registry.update();

    assert_eq!(members::<Movement>(&registry), [e0]);
}

#[test]
fn killed_entities_leave_systems_and_lose_components() {
    let mut registry = Registry::new();

    registry.add_system(Movement::default()).unwrap();
    registry.add_system(Everything).unwrap();

    let e0 = registry.create_entity();
    let e1 = registry.create_entity();

    for entity in [e0, e1] {
        registry.add_component(entity, ORIGIN).unwrap();
        registry.add_component(entity, DIAGONAL).unwrap();
    }

    registry.update();
    registry.kill_entity(e0).unwrap();

    // killing is deferred too
    assert_eq!(registry.state(e0), Some(EntityState::PendingKill));
    assert_eq!(members::<Movement>(&registry), [e0, e1]);
    assert!(registry.component::<Position>(e0).is_ok());

    registry.update();

    assert_eq!(members::<Movement>(&registry), [e1]);
    assert_eq!(members::<Everything>(&registry), [e1]);
    assert_eq!(registry.state(e0), Some(EntityState::Removed));
    assert_eq!(
        registry.component::<Position>(e0).map(|_| ()),
        Err(ComponentError::EntityNotFound(EntityNotFound(e0))),
    );
    assert!(!registry.has_component::<Position>(e0));
    assert_eq!(*registry.component::<Position>(e1).unwrap(), ORIGIN);
}

#[test]
fn operations_on_removed_entities_fail() {
    let mut registry = Registry::new();
    let e0 = registry.create_entity();

    registry.kill_entity(e0).unwrap();
    // killing twice before an update is harmless
    registry.kill_entity(e0).unwrap();
    registry.update();

    assert_eq!(registry.kill_entity(e0), Err(EntityNotFound(e0)));
    assert_eq!(
        registry.add_component(e0, Health(1)),
        Err(ComponentError::EntityNotFound(EntityNotFound(e0))),
    );
    assert!(registry.remove_component::<Health>(e0).is_err());
    assert!(registry.signature(e0).is_err());
    assert!(registry.entity(e0).is_err());
    assert!(!registry.contains(e0));
}

#[test]
fn unknown_entities_are_not_found() {
    let mut registry = Registry::new();
    let stranger = Registry::new().create_entity();

    assert_eq!(registry.state(stranger), None);
    assert_eq!(registry.kill_entity(stranger), Err(EntityNotFound(stranger)));
    assert!(registry.add_component(stranger, Health(1)).is_err());
    assert!(!registry.has_component::<Health>(stranger));
}

#[test]
fn killing_a_pending_entity_never_adds_it() {
    let mut registry = Registry::new();

    registry.add_system(Everything).unwrap();

    let e0 = registry.create_entity();

    registry.add_component(e0, Health(3)).unwrap();
    registry.kill_entity(e0).unwrap();
    registry.update();

    assert!(members::<Everything>(&registry).is_empty());
    assert_eq!(registry.state(e0), Some(EntityState::Removed));
    assert!(registry.is_empty());
}

#[test]
fn missing_components_are_reported() {
    let mut registry = Registry::new();
    let e0 = registry.create_entity();

    registry.add_component(e0, ORIGIN).unwrap();

    assert!(matches!(
        registry.component::<Velocity>(e0),
        Err(ComponentError::NotFound { entity, .. }) if entity == e0,
    ));
    assert!(registry.component_mut::<Name>(e0).is_err());
}

#[test]
fn removing_an_absent_component_changes_nothing() {
    let mut registry = Registry::new();
    let e0 = registry.create_entity();

    registry.add_component(e0, Health(10)).unwrap();

    let before = registry.signature(e0).unwrap();

    assert_eq!(registry.remove_component::<Name>(e0), Ok(None));
    assert_eq!(registry.signature(e0), Ok(before));
    assert_eq!(registry.remove_component::<Health>(e0), Ok(Some(Health(10))));
    assert_eq!(registry.remove_component::<Health>(e0), Ok(None));
    assert!(registry.signature(e0).unwrap().is_empty());
}

#[test]
fn adding_a_component_twice_replaces_it() {
    let mut registry = Registry::new();
    let e0 = registry.create_entity();

    assert_eq!(registry.add_component(e0, Name("tank")), Ok(None));
    assert_eq!(registry.add_component(e0, Name("ghost")), Ok(Some(Name("tank"))));
    assert_eq!(*registry.component::<Name>(e0).unwrap(), Name("ghost"));
    assert_eq!(registry.signature(e0).unwrap().len(), 1);
}

#[test]
fn systems_added_late_pick_up_existing_entities() {
    let mut registry = Registry::new();
    let e0 = registry.create_entity();
    let e1 = registry.create_entity();

    registry.add_component(e0, Health(5)).unwrap();
    registry.update();

    registry.add_system(Damage).unwrap();
    assert!(members::<Damage>(&registry).is_empty());

    registry.update();

    assert_eq!(members::<Damage>(&registry), [e0]);
    assert!(registry.system::<Everything>().is_err());

    registry.add_system(Everything).unwrap();
    registry.update();

    assert_eq!(members::<Everything>(&registry), [e0, e1]);
}

#[test]
fn systems_are_unique_per_type() {
    let mut registry = Registry::new();

    registry.add_system(Movement { frames: 1 }).unwrap();

    assert_eq!(
        registry.add_system(Movement { frames: 2 }),
        Err(SystemError::AlreadyRegistered(std::any::type_name::<Movement>())),
    );
    assert_eq!(registry.system::<Movement>().unwrap().frames, 1);
    assert_eq!(registry.system_count(), 1);
}

#[test]
fn removed_systems_can_be_registered_again() {
    let mut registry = Registry::new();
    let e0 = registry.create_entity();

    registry.add_component(e0, Health(1)).unwrap();
    registry.add_system(Damage).unwrap();
    registry.update();

    assert!(registry.remove_system::<Damage>().is_ok());
    assert!(!registry.has_system::<Damage>());
    assert!(matches!(
        registry.remove_system::<Damage>(),
        Err(SystemError::NotFound(_)),
    ));

    registry.add_system(Damage).unwrap();
    registry.update();

    assert_eq!(members::<Damage>(&registry), [e0]);
}

#[test]
fn system_logic_carries_state() {
    let mut registry = Registry::new();

    registry.add_system(Movement::default()).unwrap();

    for _ in 0..3 {
        registry.update();
        registry.system_mut::<Movement>().unwrap().frames += 1;
    }

    assert_eq!(registry.system::<Movement>().unwrap().frames, 3);
}

#[test]
fn frame_loop() {
    let mut registry = Registry::new();

    registry.add_system(Movement::default()).unwrap();

    let moving = registry.create_entity();
    let still = registry.create_entity();

    registry.add_component(moving, ORIGIN).unwrap();
    registry.add_component(moving, DIAGONAL).unwrap();
    registry.add_component(still, ORIGIN).unwrap();

    for _ in 0..4 {
        registry.update();

        let movement = registry.system::<Movement>().unwrap();

        for entity in movement.system() {
            let velocity = *registry.component::<Velocity>(entity).unwrap();
            let mut position = registry.component_mut::<Position>(entity).unwrap();

            position.x += velocity.x;
            position.y += velocity.y;
        }
    }

    assert_eq!(
        *registry.component::<Position>(moving).unwrap(),
        Position { x: 4.0, y: 4.0 },
    );
    assert_eq!(*registry.component::<Position>(still).unwrap(), ORIGIN);
}

#[test]
fn conflicting_borrows_are_errors() {
    let mut registry = Registry::new();
    let e0 = registry.create_entity();
    let e1 = registry.create_entity();

    registry.add_component(e0, Health(1)).unwrap();
    registry.add_component(e1, Health(2)).unwrap();
    registry.add_component(e0, Name("zero")).unwrap();
    registry.add_system(Damage).unwrap();

    let health = registry.component_mut::<Health>(e0).unwrap();

    // the whole pool is borrowed, other pools aren't
    assert!(matches!(
        registry.component::<Health>(e1),
        Err(ComponentError::AlreadyBorrowed(_)),
    ));
    assert!(registry.component_mut::<Name>(e0).is_ok());

    drop(health);

    let damage = registry.system::<Damage>().unwrap();

    assert!(matches!(
        registry.system_mut::<Damage>(),
        Err(SystemError::AlreadyBorrowed(_)),
    ));
    assert!(registry.component_mut::<Health>(e1).is_ok());

    drop(damage);
}

#[test]
fn entity_handle() {
    let mut registry = Registry::new();

    registry.add_system(Movement::default()).unwrap();

    let tank = registry
        .spawn()
        .add(ORIGIN)
        .unwrap()
        .add(DIAGONAL)
        .unwrap()
        .add(Health(100))
        .unwrap()
        .id();

    registry.update();

    {
        let mut handle = registry.entity(tank).unwrap();

        assert_eq!(handle.state(), EntityState::Active);
        assert!(handle.has::<Health>());

        handle.get_mut::<Health>().unwrap().0 -= 30;

        assert_eq!(handle.remove::<Velocity>(), Ok(Some(DIAGONAL)));
        assert_eq!(*handle.get::<Health>().unwrap(), Health(70));
        assert_eq!(handle.signature().len(), 2);

        handle.kill().unwrap();
    }

    assert_eq!(registry.state(tank), Some(EntityState::PendingKill));

    registry.update();

    assert!(registry.entity(tank).is_err());
    assert!(members::<Movement>(&registry).is_empty());
}

#[test]
fn kill_all() {
    let mut registry = Registry::new();

    registry.add_system(Everything).unwrap();

    let entities: Vec<_> = (0..8).map(|_| registry.create_entity()).collect();

    registry.update();
    registry.kill_entity(entities[0]).unwrap();
    registry.update();

    // removed, active, pending kill and pending add all at once
    let fresh = registry.create_entity();

    registry.kill_entity(entities[3]).unwrap();
    registry.kill_all();

    assert_eq!(registry.state(entities[0]), Some(EntityState::Removed));
    assert_eq!(registry.state(fresh), Some(EntityState::PendingKill));
    assert_eq!(members::<Everything>(&registry).len(), 7);

    registry.update();

    assert!(registry.is_empty());
    assert!(members::<Everything>(&registry).is_empty());
    assert_eq!(registry.state(fresh), Some(EntityState::Removed));
}

/// Interleaves creation, component changes and kills over several frames and
/// checks membership against signatures after every update.
#[test]
fn membership_always_matches_signatures() {
    let mut registry = Registry::with_capacity(32);

    registry.add_system(Movement::default()).unwrap();
    registry.add_system(Damage).unwrap();

    let mut all = Vec::new();

    for frame in 0..12u32 {
        let entity = registry.create_entity();

        all.push(entity);

        for (i, &entity) in all.iter().enumerate() {
            let key = frame as usize + i;

            if !registry.contains(entity) {
                continue;
            }

            let result = match key % 5 {
                0 => registry.add_component(entity, ORIGIN).map(drop),
                1 => registry.add_component(entity, DIAGONAL).map(drop),
                2 => registry.remove_component::<Position>(entity).map(drop),
                3 => registry.add_component(entity, Health(frame)).map(drop),
                _ => registry.remove_component::<Health>(entity).map(drop),
            };

            assert!(result.is_ok());
        }

        if frame % 4 == 3 {
            registry.kill_entity(all[frame as usize / 2]).unwrap_or_default();
        }

        if frame == 6 {
            registry.add_system(Everything).unwrap();
        }

        registry.update();

        assert_membership_matches::<Movement>(&registry, &all);
        assert_membership_matches::<Damage>(&registry, &all);

        if registry.has_system::<Everything>() {
            assert_membership_matches::<Everything>(&registry, &all);
        }
    }
}

#[test]
fn registry_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}

    assert_send_sync::<Registry>();
}
