//! Gameplay-facing component types.
//!
//! All positions here are in world units. Rotation is in radians, with the
//! forward vector at angle `θ` defined as `(sin θ, cos θ)`: zero rotation
//! faces +y, positive rotation turns towards +x.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use comet_ecs::entity::EntityId;

// ---------------------------------------------------------------------------
// Vec2
// ---------------------------------------------------------------------------

/// A 2D vector in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector facing along `rotation` radians.
    #[inline]
    pub fn from_angle(rotation: f32) -> Self {
        Self::new(rotation.sin(), rotation.cos())
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Sum of absolute components; zero exactly when the vector is zero.
    #[inline]
    pub fn manhattan(self) -> f32 {
        self.x.abs() + self.y.abs()
    }

    /// Component-wise product.
    #[inline]
    pub fn scale(self, other: Vec2) -> Self {
        Self::new(self.x * other.x, self.y * other.y)
    }

    /// Whether both components are within `eps` of `other`'s.
    pub fn approx_eq(self, other: Vec2, eps: f32) -> bool {
        (self.x - other.x).abs() <= eps && (self.y - other.y).abs() <= eps
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// Where an entity is and which way it faces, in world space.
///
/// Written by the post-physics sync for entities with a body, and read by
/// every draw pass.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Transform {
    /// Position in world units.
    pub position: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
}

impl Transform {
    pub fn new(position: Vec2, rotation: f32) -> Self {
        Self { position, rotation }
    }

    /// Unit vector the entity faces.
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.rotation)
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Player steering parameters.
///
/// Each frame the controller pass turns the vertical input axis into linear
/// velocity along the body's forward vector (`speed` world units per second)
/// and the horizontal axis into angular velocity (`torque` radians per
/// second). An entity without a body ignores its controller.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Controller {
    /// Owner, bound by the on-create hook.
    pub entity: EntityId,
    pub speed: f32,
    pub torque: f32,
}

impl Controller {
    pub fn new(speed: f32, torque: f32) -> Self {
        Self {
            entity: EntityId::NULL,
            speed,
            torque,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_vector_convention() {
        assert!(Vec2::from_angle(0.0).approx_eq(Vec2::new(0.0, 1.0), 1e-6));
        assert!(Vec2::from_angle(std::f32::consts::FRAC_PI_2).approx_eq(Vec2::new(1.0, 0.0), 1e-6));
        let t = Transform::new(Vec2::ZERO, std::f32::consts::PI);
        assert!(t.forward().approx_eq(Vec2::new(0.0, -1.0), 1e-6));
    }

    #[test]
    fn vector_arithmetic() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, -4.0);
        assert_eq!(a + b, Vec2::new(4.0, -2.0));
        assert_eq!(a - b, Vec2::new(-2.0, 6.0));
        assert_eq!(a * 2.0, Vec2::new(2.0, 4.0));
        assert_eq!(-a, Vec2::new(-1.0, -2.0));
        assert_eq!(b.length(), 5.0);
        assert_eq!(b.manhattan(), 7.0);
        assert_eq!(a.scale(Vec2::new(1.0, -1.0)), Vec2::new(1.0, -2.0));
    }

    #[test]
    fn controller_starts_unbound() {
        let c = Controller::new(30.0, 3.0);
        assert!(c.entity.is_null());
    }
}
