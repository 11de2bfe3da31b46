//! Draw passes: presentation components → [`DrawCommand`]s.
//!
//! Each pass walks one component store, looks up the owner's [`Transform`]
//! and submits one command per instance on [`WORLD_LAYER`]. Instances whose
//! entity has no transform are skipped.

use comet_ecs::world::World;
use tracing::trace;

use super::{Camera, Color, DrawCommand, RectShape, RenderSurface, Sprite, WORLD_LAYER};
use crate::components::Transform;
use crate::particles::Particler;
use crate::EngineError;

/// Submit every [`Sprite`]. Returns the number drawn.
pub fn draw_sprites(
    world: &World,
    camera: &Camera,
    surface: &mut dyn RenderSurface,
) -> Result<usize, EngineError> {
    let mut drawn = 0;
    for (entity, sprite) in world.iter_component::<Sprite>()? {
        let Ok(transform) = world.get_component::<Transform>(entity) else {
            continue;
        };
        surface.draw_world(
            DrawCommand::Sprite {
                texture: sprite.texture.clone(),
                origin: sprite.origin,
                at: camera.world_to_screen(transform),
            },
            WORLD_LAYER,
        );
        drawn += 1;
    }
    trace!(drawn, "sprite pass");
    Ok(drawn)
}

/// Submit every [`RectShape`], sized in pixels. Returns the number drawn.
///
/// Rectangles turn clockwise with θ like sprites, so they stay aligned with
/// the forward vector. rapier turns the matching cuboid counter-clockwise;
/// a freely rotating rectangle is drawn mirrored in angle against its
/// collider. This is intentional: keep the single screen convention.
pub fn draw_rects(
    world: &World,
    camera: &Camera,
    surface: &mut dyn RenderSurface,
) -> Result<usize, EngineError> {
    let mut drawn = 0;
    for (entity, rect) in world.iter_component::<RectShape>()? {
        let Ok(transform) = world.get_component::<Transform>(entity) else {
            continue;
        };
        let at = camera.world_to_screen(transform);
        surface.draw_world(
            DrawCommand::Rect {
                size: rect.size * at.scale,
                origin: rect.origin * at.scale,
                fill: rect.fill,
                at,
            },
            WORLD_LAYER,
        );
        drawn += 1;
    }
    trace!(drawn, "rect pass");
    Ok(drawn)
}

/// Submit one batch per [`Particler`]. Returns the number of batches.
pub fn draw_particles(
    world: &World,
    camera: &Camera,
    surface: &mut dyn RenderSurface,
    color: Color,
) -> Result<usize, EngineError> {
    let mut drawn = 0;
    for (_, particler) in world.iter_component::<Particler>()? {
        surface.draw_world(particler.draw_command(camera, color), WORLD_LAYER);
        drawn += 1;
    }
    trace!(drawn, "particle pass");
    Ok(drawn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Vec2;
    use crate::render::RecordingSurface;

    fn world() -> World {
        let mut world = World::new();
        world.register_component::<Transform>("transform");
        world.register_component::<Sprite>("sprite");
        world.register_component::<RectShape>("rect_shape");
        world.register_component::<Particler>("particler");
        world
    }

    #[test]
    fn sprite_and_rect_share_one_convention() {
        let mut world = world();
        let t = Transform::new(Vec2::new(-130.0, 110.0), 0.5);

        let ship = world.spawn();
        world.add_component(ship, t).unwrap();
        world
            .add_component(ship, Sprite::new("spaceship", Vec2::new(32.0, 32.0)))
            .unwrap();
        let wall = world.spawn();
        world.add_component(wall, t).unwrap();
        world
            .add_component(wall, RectShape::centered(Vec2::new(20.0, 100.0), Color::BLACK))
            .unwrap();

        let camera = Camera::default();
        let mut surface = RecordingSurface::new();
        assert_eq!(draw_sprites(&world, &camera, &mut surface).unwrap(), 1);
        assert_eq!(draw_rects(&world, &camera, &mut surface).unwrap(), 1);
        surface.present(Color::WHITE);

        let frame = surface.last_frame().unwrap();
        let poses: Vec<_> = frame
            .layer(WORLD_LAYER)
            .map(|c| match c {
                DrawCommand::Sprite { at, .. } | DrawCommand::Rect { at, .. } => *at,
                DrawCommand::Particles { .. } => unreachable!(),
            })
            .collect();
        assert_eq!(poses.len(), 2);
        assert_eq!(poses[0], poses[1]);
        assert_eq!(poses[0].position, Vec2::new(270.0, 190.0));
        assert!((poses[1].rotation_degrees - 0.5f32.to_degrees()).abs() < 1e-4);
    }

    #[test]
    fn renderables_without_transform_are_skipped() {
        let mut world = world();
        let e = world.spawn();
        world
            .add_component(e, Sprite::new("spaceship", Vec2::ZERO))
            .unwrap();
        let mut surface = RecordingSurface::new();
        assert_eq!(draw_sprites(&world, &Camera::default(), &mut surface).unwrap(), 0);
    }

    #[test]
    fn rect_size_follows_zoom() {
        let mut world = world();
        let e = world.spawn();
        world.add_component(e, Transform::default()).unwrap();
        world
            .add_component(e, RectShape::centered(Vec2::new(20.0, 100.0), Color::BLACK))
            .unwrap();
        let camera = Camera::new(Vec2::new(800.0, 600.0), 2.0);
        let mut surface = RecordingSurface::new();
        draw_rects(&world, &camera, &mut surface).unwrap();
        surface.present(Color::WHITE);

        match &surface.last_frame().unwrap().commands[0].1 {
            DrawCommand::Rect { size, origin, .. } => {
                assert_eq!(*size, Vec2::new(10.0, 50.0));
                assert_eq!(*origin, Vec2::new(5.0, 25.0));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
