//! The spaceship demo scene: component registration, lifecycle hooks and
//! entity factories.

use comet_ecs::entity::EntityId;
use comet_ecs::world::World;
use comet_ecs::EcsError;
use tracing::debug;

use crate::assets::{AssetCatalog, AssetSource};
use crate::components::{Controller, Transform, Vec2};
use crate::config::EngineConfig;
use crate::particles::Particler;
use crate::physics::{attach_body, Body, BodyDef, ColliderShape, PhysicsBodyType};
use crate::render::{Color, ParticleStyle, RectShape, Sprite};
use crate::EngineError;

/// Texture key of the player ship.
pub const SPACESHIP_TEXTURE: &str = "spaceship";

/// Damping high enough that a barrier stops as soon as nothing pushes it.
const BARRIER_DAMPING: f32 = i32::MAX as f32;

const BARRIER_HALF_EXTENTS: Vec2 = Vec2::new(10.0, 50.0);

/// Register every component type the engine's passes read.
pub fn register_components(world: &mut World) {
    world.register_component::<Transform>("transform");
    world.register_component::<Body>("body");
    world.register_component::<Controller>("controller");
    world.register_component::<Sprite>("sprite");
    world.register_component::<RectShape>("rect_shape");
    world.register_component::<Particler>("particler");
}

/// Install the lifecycle hooks: controllers and bodies learn their owner on
/// attach, bodies release their rigid body on detach.
pub fn install_callbacks(world: &mut World) -> Result<(), EngineError> {
    world.on_create_callback::<Controller, _>(bind_controller)?;
    world.on_create_callback::<Body, _>(Body::on_create)?;
    world.on_destroy_callback::<Body, _>(Body::on_destroy)?;
    Ok(())
}

fn bind_controller(world: &mut World, entity: EntityId) -> Result<(), EcsError> {
    world.get_component_mut::<Controller>(entity)?.entity = entity;
    Ok(())
}

/// Register the demo's textures, shader and font.
pub fn load_resources(assets: &mut AssetCatalog) {
    assets.load_texture(SPACESHIP_TEXTURE, "resources/spaceship.png", 64, 64);
    assets.load_shader("pixelate", "resources/pixelate.frag");
    assets.load_font("default", "resources/lato_light.ttf");
}

/// Player ship: kinematic circle sized from its texture, steerable, with an
/// exhaust emitter.
pub fn make_spaceship(
    world: &mut World,
    assets: &dyn AssetSource,
    position: Vec2,
    particle_seed: u64,
) -> Result<EntityId, EngineError> {
    let radius = assets.require_texture(SPACESHIP_TEXTURE)?.size().x * 0.5;

    let ship = world.spawn();
    attach_body(
        world,
        ship,
        &BodyDef {
            body_type: PhysicsBodyType::Kinematic,
            position,
            collider: ColliderShape::Circle { radius },
            density: 0.0,
            ..Default::default()
        },
    )?;
    world.add_component(ship, Transform::new(position, 0.0))?;
    world.add_component(ship, Controller::new(30.0, 3.0))?;
    world.add_component(ship, Sprite::new(SPACESHIP_TEXTURE, Vec2::new(radius, radius)))?;
    world.add_component(ship, Particler::new(ParticleStyle::Quads, 1_000_000, particle_seed))?;

    debug!(entity = %ship, ?position, radius, "spawned spaceship");
    Ok(ship)
}

/// A heavy black box the ship can shove around.
pub fn make_barrier(world: &mut World, position: Vec2) -> Result<EntityId, EngineError> {
    let barrier = world.spawn();
    attach_body(
        world,
        barrier,
        &BodyDef {
            body_type: PhysicsBodyType::Dynamic,
            position,
            linear_damping: BARRIER_DAMPING,
            angular_damping: BARRIER_DAMPING,
            collider: ColliderShape::Box {
                half_width: BARRIER_HALF_EXTENTS.x,
                half_height: BARRIER_HALF_EXTENTS.y,
            },
            density: 1.0,
            friction: 0.3,
            ..Default::default()
        },
    )?;
    world.add_component(barrier, Transform::new(position, 0.0))?;
    world.add_component(
        barrier,
        RectShape::centered(BARRIER_HALF_EXTENTS * 2.0, Color::BLACK),
    )?;

    debug!(entity = %barrier, ?position, "spawned barrier");
    Ok(barrier)
}

/// Entities created by [`build_demo_scene`].
#[derive(Debug, Clone, PartialEq)]
pub struct DemoScene {
    pub ship: EntityId,
    pub barriers: Vec<EntityId>,
}

/// Register components and hooks, insert the physics world, and spawn one
/// ship at the origin with three barriers around it.
pub fn build_demo_scene(
    world: &mut World,
    assets: &dyn AssetSource,
    config: &EngineConfig,
) -> Result<DemoScene, EngineError> {
    register_components(world);
    install_callbacks(world)?;
    world.insert_resource(config.physics_world()?);

    let ship = make_spaceship(world, assets, Vec2::ZERO, config.particle_seed)?;
    let barriers = [
        Vec2::new(-130.0, 110.0),
        Vec2::new(100.0, 80.0),
        Vec2::new(-50.0, -70.0),
    ]
    .into_iter()
    .map(|p| make_barrier(world, p))
    .collect::<Result<Vec<_>, _>>()?;

    Ok(DemoScene { ship, barriers })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::PhysicsWorld;

    fn scene() -> (World, DemoScene) {
        let mut assets = AssetCatalog::new();
        load_resources(&mut assets);
        let mut world = World::new();
        let scene = build_demo_scene(&mut world, &assets, &EngineConfig::default()).unwrap();
        (world, scene)
    }

    #[test]
    fn demo_scene_has_ship_and_three_barriers() {
        let (world, scene) = scene();
        assert_eq!(world.entity_count(), 4);
        assert_eq!(scene.barriers.len(), 3);
        assert_eq!(world.component_count::<Body>(), 4);
        assert_eq!(world.component_count::<RectShape>(), 3);
        assert_eq!(world.resource::<PhysicsWorld>().unwrap().body_count(), 4);
    }

    #[test]
    fn hooks_bind_owners() {
        let (world, scene) = scene();
        assert_eq!(world.get_component::<Controller>(scene.ship).unwrap().entity, scene.ship);
        for &e in std::iter::once(&scene.ship).chain(&scene.barriers) {
            let body = world.get_component::<Body>(e).unwrap();
            assert_eq!(body.entity, e);
            let physics = world.resource::<PhysicsWorld>().unwrap();
            assert_eq!(physics.entity_of(body.handle()).unwrap(), e);
        }
    }

    #[test]
    fn ship_sprite_pivots_on_texture_center() {
        let (world, scene) = scene();
        let sprite = world.get_component::<Sprite>(scene.ship).unwrap();
        assert_eq!(sprite.origin, Vec2::new(32.0, 32.0));
    }

    #[test]
    fn barriers_start_where_placed() {
        let (world, scene) = scene();
        let physics = world.resource::<PhysicsWorld>().unwrap();
        let body = world.get_component::<Body>(scene.barriers[0]).unwrap();
        let pose = physics.pose(body.handle()).unwrap();
        assert!(pose.position.approx_eq(Vec2::new(-130.0, 110.0), 1e-3));
    }

    #[test]
    fn spaceship_needs_its_texture() {
        let mut world = World::new();
        register_components(&mut world);
        world.insert_resource(PhysicsWorld::new_zero_gravity());
        let err = make_spaceship(&mut world, &AssetCatalog::new(), Vec2::ZERO, 1).unwrap_err();
        assert!(matches!(err, EngineError::MissingAsset { .. }));
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn despawning_the_ship_releases_its_body() {
        let (mut world, scene) = scene();
        world.despawn(scene.ship).unwrap();
        assert_eq!(world.resource::<PhysicsWorld>().unwrap().body_count(), 3);
    }
}
