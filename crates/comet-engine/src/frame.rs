//! The per-frame driver.
//!
//! [`FrameLoop`] owns the [`World`] and the external services and runs one
//! frame as a fixed sequence of phases:
//!
//! 1. `clock.recalculate()`, `input.listen()`
//! 2. controller pass
//! 3. pre-physics sync → physics step → post-physics sync
//! 4. camera pan from WASD
//! 5. particle pass
//! 6. draw passes: sprites, rectangles, particles
//! 7. `surface.present(clear_color)`
//!
//! The physics step uses the configured `fixed_dt` when set, otherwise the
//! clock's delta. With a [`FixedClock`](crate::time::FixedClock) and
//! [`ScriptedInput`](crate::input::ScriptedInput) a run is fully
//! reproducible.
//!
//! # Example
//!
//! ```
//! use comet_engine::prelude::*;
//! use comet_engine::scene;
//!
//! let mut assets = AssetCatalog::new();
//! scene::load_resources(&mut assets);
//! let config = EngineConfig::default();
//! let mut world = World::new();
//! let demo = scene::build_demo_scene(&mut world, &assets, &config).unwrap();
//!
//! let mut frames = FrameLoop::new(
//!     world,
//!     ScriptedInput::new(),
//!     FixedClock::default(),
//!     RecordingSurface::with_frame_budget(10),
//!     config,
//! )
//! .unwrap();
//!
//! assert_eq!(frames.run_until_closed().unwrap(), 10);
//! assert!(frames.world().is_alive(demo.ship));
//! ```

use std::time::{Duration, Instant};

use comet_ecs::world::World;
use tracing::{debug, trace};

use crate::config::EngineConfig;
use crate::input::InputSource;
use crate::particles::EmitData;
use crate::physics::{CollisionPair, PhysicsWorld};
use crate::render::{self, Camera, RenderSurface};
use crate::sync;
use crate::systems;
use crate::time::TimeSource;
use crate::EngineError;

/// Wall-clock time spent in each phase of the last frame.
#[derive(Debug, Clone, Default)]
pub struct FrameDiagnostics {
    /// In execution order.
    pub phase_times: Vec<(&'static str, Duration)>,
    pub total_time: Duration,
    /// Bodies written by the pre-physics sync.
    pub bodies_synced: usize,
}

impl FrameDiagnostics {
    pub fn phase(&self, name: &str) -> Option<Duration> {
        self.phase_times
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, d)| *d)
    }

    pub fn phase_names(&self) -> Vec<&'static str> {
        self.phase_times.iter().map(|(n, _)| *n).collect()
    }
}

/// Runs frames over a world and its services.
pub struct FrameLoop<I, C, R> {
    world: World,
    input: I,
    clock: C,
    surface: R,
    camera: Camera,
    config: EngineConfig,
    emit_data: EmitData,
    frame_counter: u64,
    last_collisions: Vec<CollisionPair>,
    last_diagnostics: FrameDiagnostics,
}

impl<I: InputSource, C: TimeSource, R: RenderSurface> FrameLoop<I, C, R> {
    /// Validate `config` and take ownership of everything a frame touches.
    ///
    /// If `world` has no [`PhysicsWorld`] resource yet, one is built from the
    /// config.
    pub fn new(
        mut world: World,
        input: I,
        clock: C,
        surface: R,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        if !world.has_resource::<PhysicsWorld>() {
            world.insert_resource(config.physics_world()?);
        }
        let camera = Camera::new(config.viewport, config.zoom);
        debug!(?config, "frame loop created");
        Ok(Self {
            world,
            input,
            clock,
            surface,
            camera,
            config,
            emit_data: EmitData::default(),
            frame_counter: 0,
            last_collisions: Vec::new(),
            last_diagnostics: FrameDiagnostics::default(),
        })
    }

    /// Run one frame.
    pub fn frame(&mut self) -> Result<(), EngineError> {
        let frame_start = Instant::now();
        let mut phases = Vec::with_capacity(7);
        let mut mark = |name: &'static str, since: &mut Instant| {
            let now = Instant::now();
            phases.push((name, now - *since));
            *since = now;
        };
        let mut t = frame_start;

        self.clock.recalculate();
        self.input.listen();
        let dt = self.clock.delta_time();
        mark("input", &mut t);

        systems::controller_system(&mut self.world, &self.input)?;
        mark("controllers", &mut t);

        let physics_dt = self.config.fixed_dt.unwrap_or(dt);
        let bodies_synced = sync::pre_physics_sync(&mut self.world)?;
        self.last_collisions = self.world.resource_mut::<PhysicsWorld>()?.step(physics_dt);
        sync::post_physics_sync(&mut self.world)?;
        mark("physics", &mut t);

        let pan = self.input.keyboard_2d();
        self.camera.pan(pan, self.config.camera_speed, dt);
        mark("camera", &mut t);

        systems::particle_system(
            &mut self.world,
            dt,
            self.config.particles_per_frame,
            &self.emit_data,
        )?;
        mark("particles", &mut t);

        render::draw_sprites(&self.world, &self.camera, &mut self.surface)?;
        render::draw_rects(&self.world, &self.camera, &mut self.surface)?;
        render::draw_particles(&self.world, &self.camera, &mut self.surface, self.emit_data.color)?;
        mark("draw", &mut t);

        self.surface.present(self.config.clear_color);
        mark("present", &mut t);

        self.frame_counter += 1;
        self.last_diagnostics = FrameDiagnostics {
            phase_times: phases,
            total_time: frame_start.elapsed(),
            bodies_synced,
        };
        trace!(
            frame = self.frame_counter,
            dt,
            collisions = self.last_collisions.len(),
            "frame done"
        );
        Ok(())
    }

    /// Run up to `count` frames, stopping early if the surface closes.
    /// Returns the number of frames run.
    pub fn run_frames(&mut self, count: u64) -> Result<u64, EngineError> {
        let mut ran = 0;
        while ran < count && self.surface.is_open() {
            self.frame()?;
            ran += 1;
        }
        Ok(ran)
    }

    /// Run frames until the surface closes. Returns the number of frames run.
    pub fn run_until_closed(&mut self) -> Result<u64, EngineError> {
        let mut ran = 0;
        while self.surface.is_open() {
            self.frame()?;
            ran += 1;
        }
        debug!(frames = ran, "surface closed");
        Ok(ran)
    }

    // -- accessors ----------------------------------------------------------

    /// Frames run so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_counter
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// For setup and tests; systems get the world through the loop.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn surface(&self) -> &R {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut R {
        &mut self.surface
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the exhaust parameters used by the particle pass.
    pub fn set_emit_data(&mut self, emit_data: EmitData) {
        self.emit_data = emit_data;
    }

    /// Collisions that started during the last frame's physics step.
    pub fn last_collisions(&self) -> &[CollisionPair] {
        &self.last_collisions
    }

    pub fn last_diagnostics(&self) -> &FrameDiagnostics {
        &self.last_diagnostics
    }

    /// Give back the world, e.g. to inspect it after a headless run.
    pub fn into_world(self) -> World {
        self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Transform, Vec2};
    use crate::input::{Key, ScriptedInput};
    use crate::render::RecordingSurface;
    use crate::time::FixedClock;

    type TestLoop = FrameLoop<ScriptedInput, FixedClock, RecordingSurface>;

    fn empty_loop(config: EngineConfig) -> TestLoop {
        let mut world = World::new();
        crate::scene::register_components(&mut world);
        FrameLoop::new(
            world,
            ScriptedInput::new(),
            FixedClock::default(),
            RecordingSurface::new(),
            config,
        )
        .unwrap()
    }

    #[test]
    fn physics_resource_is_created_from_config() {
        let config = EngineConfig {
            simulation_scale: 0.5,
            ..Default::default()
        };
        let frames = empty_loop(config);
        let physics = frames.world().resource::<PhysicsWorld>().unwrap();
        assert_eq!(physics.simulation_scale(), 0.5);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = EngineConfig {
            zoom: 0.0,
            ..Default::default()
        };
        let result = FrameLoop::new(
            World::new(),
            ScriptedInput::new(),
            FixedClock::default(),
            RecordingSurface::new(),
            config,
        );
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn phases_run_in_order() {
        let mut frames = empty_loop(EngineConfig::default());
        frames.frame().unwrap();
        assert_eq!(
            frames.last_diagnostics().phase_names(),
            vec!["input", "controllers", "physics", "camera", "particles", "draw", "present"]
        );
        assert!(frames.last_diagnostics().phase("physics").is_some());
        assert_eq!(frames.frame_count(), 1);
        assert_eq!(frames.surface().frames_presented(), 1);
    }

    #[test]
    fn camera_pans_with_wasd() {
        let mut frames = empty_loop(EngineConfig::default());
        frames.input_mut().hold(&[Key::D, Key::W], 60);
        frames.run_frames(60).unwrap();
        let center = frames.camera().center;
        assert!(center.approx_eq(Vec2::new(200.0, 200.0), 1e-2), "got {center:?}");
    }

    #[test]
    fn run_frames_stops_when_surface_closes() {
        let mut frames = empty_loop(EngineConfig::default());
        frames.surface_mut().close();
        assert_eq!(frames.run_frames(5).unwrap(), 0);
        assert_eq!(frames.frame_count(), 0);
    }

    #[test]
    fn transform_without_body_is_left_alone() {
        let mut frames = empty_loop(EngineConfig::default());
        let e = frames.world_mut().spawn();
        let t = Transform::new(Vec2::new(1.0, 2.0), 0.3);
        frames.world_mut().add_component(e, t).unwrap();
        frames.run_frames(3).unwrap();
        assert_eq!(frames.world().get_component::<Transform>(e).unwrap(), &t);
    }
}
