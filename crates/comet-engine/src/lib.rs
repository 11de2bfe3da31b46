//! Comet Engine -- 2D game layer over [`comet_ecs`] with rapier2d physics.
//!
//! This crate wires the ECS to the outside world: a rapier2d
//! [`PhysicsWorld`](physics::PhysicsWorld) kept in step with entity
//! transforms, keyboard input, a frame clock, and a render boundary that
//! receives screen-space draw commands. The [`FrameLoop`](frame::FrameLoop)
//! runs them in a fixed order every frame.
//!
//! # Quick Start
//!
//! ```
//! use comet_engine::prelude::*;
//!
//! let mut world = World::new();
//! comet_engine::scene::register_components(&mut world);
//! comet_engine::scene::install_callbacks(&mut world).unwrap();
//! world.insert_resource(PhysicsWorld::new_zero_gravity());
//!
//! let e = world.spawn();
//! world.add_component(e, Transform::new(Vec2::new(10.0, 0.0), 0.0)).unwrap();
//! attach_body(&mut world, e, &BodyDef::default()).unwrap();
//!
//! physics_step(&mut world, 1.0 / 60.0).unwrap();
//! let t = world.get_component::<Transform>(e).unwrap();
//! assert!(t.position.approx_eq(Vec2::new(10.0, 0.0), 1e-3));
//! ```

#![deny(unsafe_code)]

pub mod assets;
pub mod components;
pub mod config;
pub mod frame;
pub mod input;
pub mod particles;
pub mod physics;
pub mod render;
pub mod scene;
pub mod sync;
pub mod systems;
pub mod time;

/// Re-export the ECS crate for convenience.
pub use comet_ecs;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by the engine layer.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Ecs(#[from] comet_ecs::EcsError),

    /// A body handle that the physics world does not (or no longer) own.
    #[error("physics body {handle:?} does not exist")]
    UnknownBody { handle: physics::BodyHandle },

    #[error("{kind} '{key}' is not registered")]
    MissingAsset { kind: &'static str, key: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("malformed JSON: {0}")]
    Config(#[from] serde_json::Error),

    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use comet_ecs::prelude::*;

    pub use crate::assets::{AssetCatalog, AssetSource};
    pub use crate::components::{Controller, Transform, Vec2};
    pub use crate::config::EngineConfig;
    pub use crate::frame::{FrameDiagnostics, FrameLoop};
    pub use crate::input::{InputSource, Key, ScriptedInput};
    pub use crate::particles::{EmitData, Particler};
    pub use crate::physics::{
        attach_body, Body, BodyDef, BodyHandle, ColliderShape, CollisionPair, PhysicsBodyType,
        PhysicsWorld,
    };
    pub use crate::render::{
        Camera, Color, DrawCommand, RecordingSurface, RectShape, RenderSurface, Sprite,
    };
    pub use crate::sync::{physics_step, post_physics_sync, pre_physics_sync};
    pub use crate::time::{FixedClock, SystemClock, TimeSource};
    pub use crate::EngineError;
}
