//! A headless frame loop: a tank and a truck drive across the screen while a
//! "renderer" logs where they are.
//!
//! Run with `RUST_LOG=debug cargo run --example movement` to also see the
//! registry's own logs.

use env_logger::Env;
use signet::prelude::*;

/// Simulated frames per second.
const FPS: u32 = 60;
const FRAMES: u32 = 3 * FPS;

#[derive(Component, Debug, Clone, Copy)]
struct Transform {
    x: f32,
    y: f32,
}

#[derive(Component, Debug, Clone, Copy)]
struct RigidBody {
    x: f32,
    y: f32,
}

#[derive(Component)]
struct Sprite(&'static str);

/// Moves everything with a velocity.
struct Movement;

/// Reports where sprites are, once per second.
#[derive(Default)]
struct Render {
    frames: u32,
}

impl SystemLogic for Movement {
    fn require(&self, system: &mut System) -> Result<(), ComponentCapacityError> {
        system
            .require_component::<Transform>()?
            .require_component::<RigidBody>()?;

        Ok(())
    }
}

impl SystemLogic for Render {
    fn require(&self, system: &mut System) -> Result<(), ComponentCapacityError> {
        system
            .require_component::<Transform>()?
            .require_component::<Sprite>()?;

        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .init();

    let mut registry = Registry::new();

    registry.add_system(Movement)?;
    registry.add_system(Render::default())?;

    let tank = registry
        .spawn()
        .add(Transform { x: 10.0, y: 30.0 })?
        .add(RigidBody { x: 40.0, y: 0.0 })?
        .add(Sprite("tank"))?
        .id();

    registry
        .spawn()
        .add(Transform { x: 50.0, y: 100.0 })?
        .add(RigidBody { x: 0.0, y: 50.0 })?
        .add(Sprite("truck"))?;

    // scenery isn't moved, only rendered
    registry.spawn().add(Transform { x: 0.0, y: 0.0 })?.add(Sprite("tree"))?;

    let delta = 1.0 / FPS as f32;

    for frame in 0..FRAMES {
        registry.update();

        {
            let movement = registry.system::<Movement>()?;

            for entity in movement.system() {
                let velocity = *registry.component::<RigidBody>(entity)?;
                let mut transform = registry.component_mut::<Transform>(entity)?;

                transform.x += velocity.x * delta;
                transform.y += velocity.y * delta;
            }
        }

        render(&registry)?;

        // the tank runs out of fuel halfway through
        if frame == FRAMES / 2 {
            registry.remove_component::<RigidBody>(tank)?;
        }
    }

    registry.kill_all();
    registry.update();

    log::info!("{} entities left", registry.len());

    Ok(())
}

fn render(registry: &Registry) -> Result<(), ComponentError> {
    let Ok(mut render) = registry.system_mut::<Render>() else {
        return Ok(());
    };

    render.frames += 1;

    if render.frames % FPS != 0 {
        return Ok(());
    }

    for entity in render.system() {
        let sprite = registry.component::<Sprite>(entity)?;
        let transform = registry.component::<Transform>(entity)?;

        log::info!(
            "frame {}: {} at ({:.1}, {:.1})",
            render.frames,
            sprite.0,
            transform.x,
            transform.y,
        );
    }

    Ok(())
}
