//! Gameplay passes run by the frame loop between input and drawing.

use comet_ecs::world::World;
use tracing::trace;

use crate::components::{Controller, Transform};
use crate::input::{InputSource, Key};
use crate::particles::{EmitData, Particler};
use crate::physics::{Body, PhysicsWorld};
use crate::EngineError;

/// Steer every controlled body from the arrow keys.
///
/// Up/Down drive along the body's forward vector at `speed`; Left/Right spin
/// it at `torque`. Controllers on entities without a body do nothing.
/// Returns the number of bodies steered.
pub fn controller_system(world: &mut World, input: &dyn InputSource) -> Result<usize, EngineError> {
    let vertical = input.vertical(Key::Down, Key::Up);
    let horizontal = input.horizontal(Key::Left, Key::Right);

    let mut steered = 0;
    for entity in world.entities_with::<Controller>()? {
        let Ok(body) = world.get_component::<Body>(entity) else {
            continue;
        };
        let body = body.clone();
        let controller = world.get_component::<Controller>(entity)?.clone();
        let physics = world.resource_mut::<PhysicsWorld>()?;

        body.set_angular_velocity(physics, horizontal * controller.torque)?;
        let forward = body.forward_vector(physics)?;
        body.set_linear_velocity(physics, forward * (vertical * controller.speed))?;
        steered += 1;
    }
    trace!(steered, vertical, horizontal, "controller pass");
    Ok(steered)
}

/// Move every emitter to its entity, emit while the entity's body is moving,
/// then age all particles by `dt`.
pub fn particle_system(
    world: &mut World,
    dt: f32,
    per_frame: usize,
    emit: &EmitData,
) -> Result<(), EngineError> {
    for entity in world.entities_with::<Particler>()? {
        let transform = world.get_component::<Transform>(entity).ok().copied();
        let moving = match world.get_component::<Body>(entity) {
            Ok(body) => {
                let physics = world.resource::<PhysicsWorld>()?;
                body.linear_velocity(physics)?.manhattan() > 0.0
            }
            Err(_) => false,
        };

        let particler = world.get_component_mut::<Particler>(entity)?;
        if let Some(t) = transform {
            particler.transform = t;
        }
        if moving {
            particler.emit(per_frame, emit);
        }
        particler.update(dt);
    }
    Ok(())
}
