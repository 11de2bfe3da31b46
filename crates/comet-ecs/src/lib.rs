//! Comet ECS -- sparse-set Entity Component System with lifecycle hooks.
//!
//! Entities are generational ids. Each component type lives in its own
//! [`SparseSet`](storage::SparseSet): a packed array of values plus an index
//! from entity to slot, so insert, lookup, removal and iteration are all O(1)
//! per element and a component reference can be resolved back to its owner.
//!
//! Component types may register an on-create and an on-destroy hook. Hooks run
//! with full access to the [`World`](world::World), which lets a component
//! bind its owner id when attached or release an external handle when
//! detached.
//!
//! # Quick Start
//!
//! ```
//! use comet_ecs::prelude::*;
//!
//! #[derive(Debug, PartialEq)]
//! struct Position { x: f32, y: f32 }
//!
//! let mut world = World::new();
//! world.register_component::<Position>("position");
//!
//! let entity = world.spawn();
//! world.add_component(entity, Position { x: 0.0, y: 0.0 }).unwrap();
//!
//! assert_eq!(world.get_component::<Position>(entity).unwrap(), &Position { x: 0.0, y: 0.0 });
//! ```

#![deny(unsafe_code)]

pub mod component;
pub mod entity;
pub mod hooks;
pub mod resource;
pub mod storage;
pub mod world;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by ECS operations.
///
/// Every variant describes a programming error in the caller; none of them is
/// expected during a correct frame.
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
    /// The entity was despawned (stale generation) or never allocated.
    #[error("entity {entity} does not exist (stale or never allocated)")]
    StaleEntity { entity: entity::EntityId },

    /// The null sentinel was used where a real entity is required.
    #[error("entity {entity} is not a valid entity")]
    InvalidEntity { entity: entity::EntityId },

    /// The entity has no component of the requested type.
    #[error("entity {entity} has no '{component}' component")]
    NotFound {
        entity: entity::EntityId,
        component: String,
    },

    /// The entity already has a component of this type.
    #[error("entity {entity} already has a '{component}' component")]
    DuplicateComponent {
        entity: entity::EntityId,
        component: String,
    },

    /// A lifecycle hook tried to add or remove a component of its own type.
    #[error("'{component}' {event} hook tried to add or remove a '{component}' component")]
    ReentrantCallback {
        component: String,
        event: hooks::HookKind,
    },

    /// A component type was referenced that has not been registered.
    #[error("component type '{name}' not registered. Registered components: [{registered}]")]
    UnknownComponent { name: String, registered: String },

    /// A resource was requested that was never inserted.
    #[error("resource '{name}' not present in the world")]
    MissingResource { name: &'static str },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::component::{ComponentInfo, ComponentRegistry, ComponentTypeId};
    pub use crate::entity::EntityId;
    pub use crate::hooks::{Hook, HookKind};
    pub use crate::storage::SparseSet;
    pub use crate::world::World;
    pub use crate::EcsError;
}

// ---------------------------------------------------------------------------
// Integration Tests
// ---------------------------------------------------------------------------
