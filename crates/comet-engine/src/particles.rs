//! CPU particle emitter.
//!
//! A [`Particler`] sits on an entity, follows that entity's transform, and
//! spawns short-lived particles behind it. Randomness comes from a seeded
//! PCG generator per emitter, so a run with the same seed and inputs emits
//! the same particles.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::components::{Transform, Vec2};
use crate::render::{Camera, Color, DrawCommand, ParticleSprite, ParticleStyle};

/// Ranges new particles are sampled from.
///
/// Angles are radians relative to the emitter's facing; `π` is straight back.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EmitData {
    pub min_lifetime: f32,
    pub max_lifetime: f32,
    pub min_direction_angle: f32,
    pub max_direction_angle: f32,
    /// World units per second at birth.
    pub min_velocity_start: f32,
    pub max_velocity_start: f32,
    /// World units per second at death.
    pub min_velocity_end: f32,
    pub max_velocity_end: f32,
    pub min_size_start: f32,
    pub max_size_start: f32,
    pub min_size_end: f32,
    pub max_size_end: f32,
    pub color: Color,
}

impl Default for EmitData {
    /// An exhaust plume fanning 40° around the rear.
    fn default() -> Self {
        Self {
            min_lifetime: 0.5,
            max_lifetime: 1.0,
            min_direction_angle: 160f32.to_radians(),
            max_direction_angle: 200f32.to_radians(),
            min_velocity_start: 1.0,
            max_velocity_start: 1000.0,
            min_velocity_end: 0.0,
            max_velocity_end: 0.1,
            min_size_start: 1.0,
            max_size_start: 5.0,
            min_size_end: 0.0,
            max_size_end: 1.0,
            color: Color::rgb(255, 140, 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Particle {
    position: Vec2,
    direction: Vec2,
    velocity_start: f32,
    velocity_end: f32,
    size_start: f32,
    size_end: f32,
    lifetime: f32,
    age: f32,
}

impl Particle {
    fn progress(&self) -> f32 {
        (self.age / self.lifetime).clamp(0.0, 1.0)
    }

    fn velocity(&self) -> f32 {
        lerp(self.velocity_start, self.velocity_end, self.progress())
    }

    fn size(&self) -> f32 {
        lerp(self.size_start, self.size_end, self.progress())
    }
}

/// Particle emitter component.
#[derive(Debug, Clone)]
pub struct Particler {
    /// Pose particles are emitted from. Copied from the entity's transform
    /// every frame by the particle pass.
    pub transform: Transform,
    style: ParticleStyle,
    capacity: usize,
    particles: Vec<Particle>,
    rng: Pcg32,
}

impl Particler {
    /// An emitter holding at most `capacity` live particles.
    pub fn new(style: ParticleStyle, capacity: usize, seed: u64) -> Self {
        Self {
            transform: Transform::default(),
            style,
            capacity,
            particles: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn style(&self) -> ParticleStyle {
        self.style
    }

    /// Live particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Spawn up to `count` particles at the emitter's position. Returns how
    /// many were spawned, which is fewer once capacity is reached.
    pub fn emit(&mut self, count: usize, data: &EmitData) -> usize {
        let room = self.capacity.saturating_sub(self.particles.len());
        let n = count.min(room);
        for _ in 0..n {
            let angle = self.transform.rotation
                + sample(&mut self.rng, data.min_direction_angle, data.max_direction_angle);
            let particle = Particle {
                position: self.transform.position,
                direction: Vec2::from_angle(angle),
                velocity_start: sample(&mut self.rng, data.min_velocity_start, data.max_velocity_start),
                velocity_end: sample(&mut self.rng, data.min_velocity_end, data.max_velocity_end),
                size_start: sample(&mut self.rng, data.min_size_start, data.max_size_start),
                size_end: sample(&mut self.rng, data.min_size_end, data.max_size_end),
                lifetime: sample(&mut self.rng, data.min_lifetime, data.max_lifetime).max(f32::EPSILON),
                age: 0.0,
            };
            self.particles.push(particle);
        }
        n
    }

    /// Age and move every particle by `dt`, dropping the expired ones.
    pub fn update(&mut self, dt: f32) {
        for p in &mut self.particles {
            let v = p.velocity();
            p.position += p.direction * (v * dt);
            p.age += dt;
        }
        self.particles.retain(|p| p.age < p.lifetime);
    }

    /// Screen-space batch for the particle draw pass.
    pub fn draw_command(&self, camera: &Camera, color: Color) -> DrawCommand {
        let particles = self
            .particles
            .iter()
            .map(|p| {
                let fade = 1.0 - p.progress();
                ParticleSprite {
                    position: camera.point_to_screen(p.position),
                    size: p.size() / camera.zoom,
                    color: color.with_alpha((color.a as f32 * fade) as u8),
                }
            })
            .collect();
        DrawCommand::Particles {
            style: self.style,
            particles,
        }
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Uniform in `[min, max]`; `min` when the range is empty.
fn sample(rng: &mut Pcg32, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed() -> EmitData {
        EmitData {
            min_lifetime: 1.0,
            max_lifetime: 1.0,
            min_direction_angle: std::f32::consts::PI,
            max_direction_angle: std::f32::consts::PI,
            min_velocity_start: 10.0,
            max_velocity_start: 10.0,
            min_velocity_end: 10.0,
            max_velocity_end: 10.0,
            ..Default::default()
        }
    }

    #[test]
    fn emit_respects_capacity() {
        let mut p = Particler::new(ParticleStyle::Quads, 25, 1);
        assert_eq!(p.emit(20, &EmitData::default()), 20);
        assert_eq!(p.emit(20, &EmitData::default()), 5);
        assert_eq!(p.len(), 25);
    }

    #[test]
    fn particles_move_backwards_and_expire() {
        let mut p = Particler::new(ParticleStyle::Points, 10, 7);
        p.transform = Transform::new(Vec2::new(5.0, 5.0), 0.0);
        p.emit(1, &fixed());
        p.update(0.5);
        assert_eq!(p.len(), 1);
        let pos = p.particles[0].position;
        assert!(pos.approx_eq(Vec2::new(5.0, 0.0), 1e-4), "got {pos:?}");
        p.update(0.5);
        assert!(p.is_empty());
    }

    #[test]
    fn same_seed_same_particles() {
        let run = |seed| {
            let mut p = Particler::new(ParticleStyle::Quads, 100, seed);
            p.emit(20, &EmitData::default());
            p.update(0.1);
            p.particles.iter().map(|q| q.position).collect::<Vec<_>>()
        };
        assert_eq!(run(3), run(3));
        assert_ne!(run(3), run(4));
    }

    #[test]
    fn draw_command_is_in_screen_space() {
        let mut p = Particler::new(ParticleStyle::Quads, 10, 1);
        p.transform = Transform::new(Vec2::new(0.0, 100.0), 0.0);
        p.emit(1, &fixed());
        let cam = Camera::default();
        match p.draw_command(&cam, Color::WHITE) {
            DrawCommand::Particles { style, particles } => {
                assert_eq!(style, ParticleStyle::Quads);
                assert_eq!(particles.len(), 1);
                assert_eq!(particles[0].position, Vec2::new(400.0, 200.0));
                assert_eq!(particles[0].color.a, 255);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn empty_ranges_use_minimum() {
        let mut rng = Pcg32::seed_from_u64(0);
        assert_eq!(sample(&mut rng, 2.0, 2.0), 2.0);
        assert_eq!(sample(&mut rng, 3.0, 1.0), 3.0);
    }
}
