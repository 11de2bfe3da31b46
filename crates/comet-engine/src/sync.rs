//! Transform ⇄ rigid body synchronization.
//!
//! Before every physics step, [`pre_physics_sync`] copies each bodied entity's
//! [`Transform`] onto its rigid body. After the step, [`post_physics_sync`]
//! copies the simulated pose back. Both go through the unit conversion of the
//! [`PhysicsWorld`] resource, so a transform that was not touched by physics
//! survives the round trip unchanged up to float rounding.
//!
//! rapier reports angles in (-π, π]. The post-sync unwraps them against the
//! previous rotation, so a transform keeps its full turn count.
//!
//! An entity with a [`Body`] but no [`Transform`] is skipped with a warning.

use comet_ecs::entity::EntityId;
use comet_ecs::world::World;
use tracing::{trace, warn};

use crate::components::Transform;
use crate::physics::{Body, BodyHandle, CollisionPair, PhysicsWorld};
use crate::EngineError;

/// Copy every bodied entity's transform into physics.
///
/// Returns the number of bodies synchronized.
pub fn pre_physics_sync(world: &mut World) -> Result<usize, EngineError> {
    let mut synced = 0;
    for (entity, handle) in bodies(world)? {
        let transform = match world.get_component::<Transform>(entity) {
            Ok(t) => *t,
            Err(_) => {
                warn!(%entity, "entity has a body but no transform; skipping pre-physics sync");
                continue;
            }
        };
        world
            .resource_mut::<PhysicsWorld>()?
            .set_pose(handle, &transform)?;
        synced += 1;
    }
    trace!(synced, "pre-physics sync");
    Ok(synced)
}

/// Copy every simulated pose back into its entity's transform.
///
/// Returns the number of transforms written.
pub fn post_physics_sync(world: &mut World) -> Result<usize, EngineError> {
    let mut synced = 0;
    for (entity, handle) in bodies(world)? {
        let pose = world.resource::<PhysicsWorld>()?.pose(handle)?;
        match world.get_component_mut::<Transform>(entity) {
            Ok(transform) => {
                transform.position = pose.position;
                transform.rotation = continuous_angle(transform.rotation, pose.rotation);
                synced += 1;
            }
            Err(_) => {
                warn!(%entity, "entity has a body but no transform; skipping post-physics sync");
            }
        }
    }
    trace!(synced, "post-physics sync");
    Ok(synced)
}

/// Pre-sync, step the simulation by `dt`, post-sync.
pub fn physics_step(world: &mut World, dt: f32) -> Result<Vec<CollisionPair>, EngineError> {
    pre_physics_sync(world)?;
    let collisions = world.resource_mut::<PhysicsWorld>()?.step(dt);
    post_physics_sync(world)?;
    Ok(collisions)
}

/// The angle equal to `wrapped` modulo a full turn that lies nearest `previous`.
fn continuous_angle(previous: f32, wrapped: f32) -> f32 {
    use std::f64::consts::TAU;
    let previous = f64::from(previous);
    let delta = f64::from(wrapped) - previous;
    (previous + delta - TAU * (delta / TAU).round()) as f32
}

fn bodies(world: &World) -> Result<Vec<(EntityId, BodyHandle)>, EngineError> {
    Ok(world
        .iter_component::<Body>()?
        .map(|(entity, body)| (entity, body.handle()))
        .collect())
}
