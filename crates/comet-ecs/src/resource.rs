//! Type-keyed singleton storage owned by the [`World`](crate::world::World).
//!
//! Resources hold state that belongs to no particular entity but must be
//! reachable from systems and lifecycle hooks, such as the physics world that
//! owns every rigid body.

use std::any::{Any, TypeId};
use std::collections::HashMap;

/// A map from Rust type to a single value of that type.
#[derive(Default)]
pub struct Resources {
    map: HashMap<TypeId, Box<dyn Any>>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value`, returning the previous value of the same type.
    pub fn insert<R: 'static>(&mut self, value: R) -> Option<R> {
        self.map
            .insert(TypeId::of::<R>(), Box::new(value))
            .and_then(|old| old.downcast::<R>().ok())
            .map(|old| *old)
    }

    pub fn get<R: 'static>(&self) -> Option<&R> {
        self.map.get(&TypeId::of::<R>())?.downcast_ref::<R>()
    }

    pub fn get_mut<R: 'static>(&mut self) -> Option<&mut R> {
        self.map.get_mut(&TypeId::of::<R>())?.downcast_mut::<R>()
    }

    pub fn remove<R: 'static>(&mut self) -> Option<R> {
        self.map
            .remove(&TypeId::of::<R>())
            .and_then(|old| old.downcast::<R>().ok())
            .map(|old| *old)
    }

    pub fn contains<R: 'static>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<R>())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl std::fmt::Debug for Resources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resources")
            .field("len", &self.map.len())
            .finish()
    }
}
