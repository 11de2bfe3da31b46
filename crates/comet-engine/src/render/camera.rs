//! 2D camera and the world-to-screen mapping.

use crate::components::{Transform, Vec2};

/// A position and rotation in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenTransform {
    /// Pixels from the top-left corner of the viewport, y-down.
    pub position: Vec2,
    /// Clockwise, in degrees.
    pub rotation_degrees: f32,
    /// Pixels per world unit.
    pub scale: f32,
}

/// A 2D camera looking at `center`.
///
/// `zoom` is world units per pixel: 2.0 shows twice as much of the world.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera center in world units.
    pub center: Vec2,
    pub zoom: f32,
    /// Viewport size in pixels.
    pub viewport: Vec2,
}

impl Camera {
    pub fn new(viewport: Vec2, zoom: f32) -> Self {
        Self {
            center: Vec2::ZERO,
            zoom,
            viewport,
        }
    }

    /// Move by `direction` at `speed` world units per second, faster when
    /// zoomed out.
    pub fn pan(&mut self, direction: Vec2, speed: f32, dt: f32) {
        self.center += direction * (self.zoom * speed * dt);
    }

    /// Map a world-space transform to the viewport.
    ///
    /// y is flipped. Because rotation is clockwise from +y in world space and
    /// clockwise from -y (screen up) in screen space, the angle carries over
    /// unchanged apart from the unit.
    pub fn world_to_screen(&self, transform: &Transform) -> ScreenTransform {
        ScreenTransform {
            position: self.point_to_screen(transform.position),
            rotation_degrees: transform.rotation.to_degrees(),
            scale: 1.0 / self.zoom,
        }
    }

    pub fn point_to_screen(&self, p: Vec2) -> Vec2 {
        let half = self.viewport * 0.5;
        Vec2::new(
            (p.x - self.center.x) / self.zoom + half.x,
            (self.center.y - p.y) / self.zoom + half.y,
        )
    }

    /// Inverse of [`point_to_screen`](Self::point_to_screen).
    pub fn screen_to_world(&self, p: Vec2) -> Vec2 {
        let half = self.viewport * 0.5;
        Vec2::new(
            (p.x - half.x) * self.zoom + self.center.x,
            self.center.y - (p.y - half.y) * self.zoom,
        )
    }
}

impl Default for Camera {
    /// 800x600 viewport at zoom 1, centred on the origin.
    fn default() -> Self {
        Self::new(Vec2::new(800.0, 600.0), 1.0)
    }
}
