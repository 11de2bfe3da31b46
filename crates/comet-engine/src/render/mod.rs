//! Rendering boundary.
//!
//! The engine never talks to a graphics API. Draw passes turn presentation
//! components into [`DrawCommand`]s in screen space and hand them to a
//! [`RenderSurface`], which owns the window (or, headless, just records).
//!
//! World space is y-up with rotations measured clockwise from +y. Screen
//! space is pixels, y-down, centred on the [`Camera`]. Every renderable goes
//! through [`Camera::world_to_screen`]; there is no per-shape convention.

pub mod camera;
pub mod passes;
pub mod recording;

pub use camera::{Camera, ScreenTransform};
pub use passes::{draw_particles, draw_rects, draw_sprites};
pub use recording::{RecordedFrame, RecordingSurface};

use crate::components::Vec2;

/// Layer used for all world-space draw passes.
pub const WORLD_LAYER: i32 = 10;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

// ---------------------------------------------------------------------------
// Presentation components
// ---------------------------------------------------------------------------

/// Textured quad drawn at its entity's transform.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Sprite {
    /// Asset key of the texture.
    pub texture: String,
    /// Pivot in texture pixels, measured from the top-left corner.
    pub origin: Vec2,
}

impl Sprite {
    pub fn new(texture: impl Into<String>, origin: Vec2) -> Self {
        Self {
            texture: texture.into(),
            origin,
        }
    }
}

/// Solid rectangle drawn at its entity's transform.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RectShape {
    /// Full extents in world units.
    pub size: Vec2,
    /// Pivot measured from the top-left corner.
    pub origin: Vec2,
    pub fill: Color,
}

impl RectShape {
    /// A rectangle pivoting on its centre.
    pub fn centered(size: Vec2, fill: Color) -> Self {
        Self {
            size,
            origin: size * 0.5,
            fill,
        }
    }
}

// ---------------------------------------------------------------------------
// DrawCommand
// ---------------------------------------------------------------------------

/// How a particle batch is rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ParticleStyle {
    Points,
    Quads,
}

/// One particle in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSprite {
    pub position: Vec2,
    /// Edge length in pixels.
    pub size: f32,
    pub color: Color,
}

/// A screen-space draw request.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Sprite {
        texture: String,
        origin: Vec2,
        at: ScreenTransform,
    },
    Rect {
        /// Size in pixels.
        size: Vec2,
        /// Pivot in pixels.
        origin: Vec2,
        fill: Color,
        at: ScreenTransform,
    },
    Particles {
        style: ParticleStyle,
        particles: Vec<ParticleSprite>,
    },
}

// ---------------------------------------------------------------------------
// RenderSurface
// ---------------------------------------------------------------------------

/// A window-like target the frame loop draws into.
pub trait RenderSurface {
    /// `false` once the surface was closed; the frame loop stops then.
    fn is_open(&self) -> bool;

    /// Queue a command for the current frame. Lower layers are drawn first.
    fn draw_world(&mut self, command: DrawCommand, layer: i32);

    /// Clear to `clear`, flush the queued commands and show the frame.
    fn present(&mut self, clear: Color);

    fn close(&mut self);
}
