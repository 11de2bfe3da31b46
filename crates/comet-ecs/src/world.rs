//! The [`World`] is the top-level container for the ECS. It owns the entity
//! allocator, the component registry, one [`SparseSet`] per registered
//! component type, the lifecycle hook table and the resource map.
//!
//! All component access is checked: lookups return `Result` and fail with
//! [`EcsError::NotFound`] rather than handing out a missing value.

use std::any::type_name;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::component::{ComponentRegistry, ComponentTypeId};
use crate::entity::{EntityAllocator, EntityId};
use crate::hooks::{Hook, HookKind, HookTable};
use crate::resource::Resources;
use crate::storage::{ErasedStorage, SparseSet};
use crate::EcsError;

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// The ECS world: entities, their components, and shared resources.
pub struct World {
    allocator: EntityAllocator,
    registry: ComponentRegistry,
    /// Indexed by `ComponentTypeId`; each entry is a `SparseSet<T>`.
    storages: Vec<Box<dyn ErasedStorage>>,
    hooks: HookTable,
    resources: Resources,
    /// Entities whose `despawn` is tearing them down; adds to them are refused.
    despawning: Vec<EntityId>,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entity_count", &self.entity_count())
            .field("component_types", &self.registry.len())
            .field("hooks", &self.hooks)
            .field("resources", &self.resources)
            .finish()
    }
}

impl World {
    /// Create an empty world.
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            registry: ComponentRegistry::new(),
            storages: Vec::new(),
            hooks: HookTable::new(),
            resources: Resources::new(),
            despawning: Vec::new(),
        }
    }

    /// Read-only access to the component registry.
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Register a component type so that it can be stored in this world.
    ///
    /// Registering the same type twice returns the existing id.
    pub fn register_component<T: 'static>(&mut self, name: &str) -> ComponentTypeId {
        let id = self.registry.register::<T>(name);
        if id.index() == self.storages.len() {
            self.storages.push(Box::new(SparseSet::<T>::new()));
            self.hooks.ensure(id);
            debug!(component = name, id = id.index(), "registered component type");
        }
        id
    }

    // -- entities -----------------------------------------------------------

    /// Allocate a new, empty entity.
    pub fn spawn(&mut self) -> EntityId {
        let entity = self.allocator.allocate();
        trace!(%entity, "spawned entity");
        entity
    }

    /// Spawn an entity and attach a single component to it.
    pub fn spawn_with<T: 'static>(&mut self, component: T) -> Result<EntityId, EcsError> {
        let entity = self.spawn();
        let added = self.add_component(entity, component).map(|_| ());
        if let Err(e) = added {
            self.allocator.deallocate(entity);
            return Err(e);
        }
        Ok(entity)
    }

    /// Remove every component of `entity`, then recycle its id.
    ///
    /// Components are removed in registration order and each type's
    /// on-destroy hook fires as usual. Hooks may not add components to the
    /// entity being despawned; such adds fail with [`EcsError::InvalidEntity`].
    /// If a hook fails the remaining components are still removed, the id is
    /// still recycled, and the first error is returned.
    pub fn despawn(&mut self, entity: EntityId) -> Result<(), EcsError> {
        self.check_entity(entity)?;

        // Refuse up front rather than tearing the entity down halfway.
        for (index, storage) in self.storages.iter().enumerate() {
            let id = ComponentTypeId(index as u32);
            if let Some(event) = self.hooks.running(id) {
                if storage.contains(entity) {
                    return Err(EcsError::ReentrantCallback {
                        component: self.component_name(id),
                        event,
                    });
                }
            }
        }

        self.despawning.push(entity);
        let mut first_error = None;
        for index in 0..self.storages.len() {
            let id = ComponentTypeId(index as u32);
            if !self.storages[index].contains(entity) {
                continue;
            }
            let result = self.dispatch(id, HookKind::OnDestroy, entity);
            self.storages[index].remove_erased(entity);
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        }

        self.despawning.retain(|&e| e != entity);
        self.allocator.deallocate(entity);
        trace!(%entity, "despawned entity");
        first_error.map_or(Ok(()), Err)
    }

    /// Whether `entity` is currently alive.
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.allocator.is_alive(entity)
    }

    /// Number of alive entities.
    pub fn entity_count(&self) -> usize {
        self.allocator.alive_count()
    }

    // -- components ---------------------------------------------------------

    /// Attach `component` to `entity` and fire the type's on-create hook.
    ///
    /// An entity holds at most one component per type; adding a second one
    /// fails with [`EcsError::DuplicateComponent`] and leaves the first
    /// untouched. If the on-create hook fails, the new component is erased
    /// again (without firing on-destroy) and the hook's error is returned.
    pub fn add_component<T: 'static>(
        &mut self,
        entity: EntityId,
        component: T,
    ) -> Result<&mut T, EcsError> {
        let id = self.type_id::<T>()?;
        self.ensure_idle(id)?;
        self.check_entity(entity)?;
        if self.despawning.contains(&entity) {
            return Err(EcsError::InvalidEntity { entity });
        }

        let storage = self.storage_mut::<T>(id)?;
        if storage.contains(entity) {
            return Err(EcsError::DuplicateComponent {
                entity,
                component: self.component_name(id),
            });
        }
        storage.insert(entity, component);

        if let Err(e) = self.dispatch(id, HookKind::OnCreate, entity) {
            self.storage_mut::<T>(id)?.remove(entity);
            return Err(e);
        }

        self.storage_mut::<T>(id)?
            .get_mut(entity)
            .ok_or_else(|| missing::<T>(entity))
    }

    /// Detach and return `entity`'s `T`, firing the on-destroy hook first.
    ///
    /// The value is erased even if the hook fails; the hook's error is then
    /// returned instead of the value.
    pub fn remove_component<T: 'static>(&mut self, entity: EntityId) -> Result<T, EcsError> {
        let id = self.type_id::<T>()?;
        self.ensure_idle(id)?;
        self.check_entity(entity)?;

        if !self.storage::<T>()?.contains(entity) {
            return Err(self.not_found(id, entity));
        }

        let hook_result = self.dispatch(id, HookKind::OnDestroy, entity);
        let value = self
            .storage_mut::<T>(id)?
            .remove(entity)
            .ok_or_else(|| missing::<T>(entity))?;
        hook_result.map(|()| value)
    }

    /// Shared access to `entity`'s `T`.
    pub fn get_component<T: 'static>(&self, entity: EntityId) -> Result<&T, EcsError> {
        let id = self.type_id::<T>()?;
        self.check_entity(entity)?;
        self.storage::<T>()?
            .get(entity)
            .ok_or_else(|| self.not_found(id, entity))
    }

    /// Mutable access to `entity`'s `T`.
    pub fn get_component_mut<T: 'static>(&mut self, entity: EntityId) -> Result<&mut T, EcsError> {
        let id = self.type_id::<T>()?;
        self.check_entity(entity)?;
        if !self.storage::<T>()?.contains(entity) {
            return Err(self.not_found(id, entity));
        }
        self.storage_mut::<T>(id)?
            .get_mut(entity)
            .ok_or_else(|| missing::<T>(entity))
    }

    /// Whether `entity` currently has a `T`. Unregistered types and dead
    /// entities simply yield `false`.
    pub fn has_component<T: 'static>(&self, entity: EntityId) -> bool {
        self.storage::<T>()
            .map(|storage| storage.contains(entity))
            .unwrap_or(false)
    }

    /// Iterate every `(owner, &T)` pair.
    pub fn iter_component<T: 'static>(
        &self,
    ) -> Result<impl Iterator<Item = (EntityId, &T)> + '_, EcsError> {
        Ok(self.storage::<T>()?.iter())
    }

    /// Iterate every `(owner, &mut T)` pair.
    ///
    /// The store is exclusively borrowed for the whole pass, so no component
    /// can be added or removed mid-iteration. To remove while walking a store,
    /// iterate the snapshot returned by [`entities_with`](Self::entities_with).
    pub fn iter_component_mut<T: 'static>(
        &mut self,
    ) -> Result<impl Iterator<Item = (EntityId, &mut T)> + '_, EcsError> {
        let id = self.type_id::<T>()?;
        Ok(self.storage_mut::<T>(id)?.iter_mut())
    }

    /// Snapshot of all entities that currently have a `T`.
    pub fn entities_with<T: 'static>(&self) -> Result<Vec<EntityId>, EcsError> {
        Ok(self.storage::<T>()?.entities().to_vec())
    }

    /// Resolve a `T` reference obtained from this world back to its owner.
    pub fn get_entity<T: 'static>(&self, component: &T) -> Option<EntityId> {
        self.storage::<T>().ok()?.entity_of(component)
    }

    /// Number of stored `T` components.
    pub fn component_count<T: 'static>(&self) -> usize {
        self.storage::<T>().map(|storage| storage.len()).unwrap_or(0)
    }

    /// Direct read access to the store for `T`.
    pub fn storage<T: 'static>(&self) -> Result<&SparseSet<T>, EcsError> {
        let id = self.type_id::<T>()?;
        self.storages[id.index()]
            .as_any()
            .downcast_ref::<SparseSet<T>>()
            .ok_or_else(|| self.unknown_component::<T>())
    }

    // -- lifecycle hooks ----------------------------------------------------

    /// Set the hook fired right after a `T` is added. Replaces any previous one.
    pub fn on_create_callback<T, F>(&mut self, hook: F) -> Result<(), EcsError>
    where
        T: 'static,
        F: Fn(&mut World, EntityId) -> Result<(), EcsError> + 'static,
    {
        self.set_hook::<T>(HookKind::OnCreate, Rc::new(hook))
    }

    /// Set the hook fired right before a `T` is removed. Replaces any previous one.
    pub fn on_destroy_callback<T, F>(&mut self, hook: F) -> Result<(), EcsError>
    where
        T: 'static,
        F: Fn(&mut World, EntityId) -> Result<(), EcsError> + 'static,
    {
        self.set_hook::<T>(HookKind::OnDestroy, Rc::new(hook))
    }

    fn set_hook<T: 'static>(&mut self, kind: HookKind, hook: Hook) -> Result<(), EcsError> {
        let id = self.type_id::<T>()?;
        if self.hooks.set(id, kind, hook) {
            debug!(component = %self.component_name(id), %kind, "replaced lifecycle hook");
        }
        Ok(())
    }

    /// Run the `(id, kind)` hook for `entity`, if one is registered.
    fn dispatch(&mut self, id: ComponentTypeId, kind: HookKind, entity: EntityId) -> Result<(), EcsError> {
        let Some(hook) = self.hooks.get(id, kind) else {
            return Ok(());
        };
        trace!(%entity, component = %self.component_name(id), %kind, "firing lifecycle hook");
        self.hooks.mark_running(id, Some(kind));
        let result = hook(self, entity);
        self.hooks.mark_running(id, None);
        result
    }

    fn ensure_idle(&self, id: ComponentTypeId) -> Result<(), EcsError> {
        match self.hooks.running(id) {
            Some(event) => Err(EcsError::ReentrantCallback {
                component: self.component_name(id),
                event,
            }),
            None => Ok(()),
        }
    }

    // -- resources ----------------------------------------------------------

    /// Insert a resource, returning the previous one of the same type.
    pub fn insert_resource<R: 'static>(&mut self, resource: R) -> Option<R> {
        self.resources.insert(resource)
    }

    pub fn resource<R: 'static>(&self) -> Result<&R, EcsError> {
        self.resources.get::<R>().ok_or(EcsError::MissingResource {
            name: type_name::<R>(),
        })
    }

    pub fn resource_mut<R: 'static>(&mut self) -> Result<&mut R, EcsError> {
        self.resources.get_mut::<R>().ok_or(EcsError::MissingResource {
            name: type_name::<R>(),
        })
    }

    pub fn remove_resource<R: 'static>(&mut self) -> Option<R> {
        self.resources.remove::<R>()
    }

    pub fn has_resource<R: 'static>(&self) -> bool {
        self.resources.contains::<R>()
    }

    // -- internals ----------------------------------------------------------

    fn type_id<T: 'static>(&self) -> Result<ComponentTypeId, EcsError> {
        self.registry
            .lookup::<T>()
            .ok_or_else(|| self.unknown_component::<T>())
    }

    fn storage_mut<T: 'static>(&mut self, id: ComponentTypeId) -> Result<&mut SparseSet<T>, EcsError> {
        self.storages[id.index()]
            .as_any_mut()
            .downcast_mut::<SparseSet<T>>()
            .ok_or_else(|| EcsError::UnknownComponent {
                name: type_name::<T>().to_owned(),
                registered: String::new(),
            })
    }

    fn check_entity(&self, entity: EntityId) -> Result<(), EcsError> {
        if entity.is_null() {
            return Err(EcsError::InvalidEntity { entity });
        }
        if !self.allocator.is_alive(entity) {
            return Err(EcsError::StaleEntity { entity });
        }
        Ok(())
    }

    fn component_name(&self, id: ComponentTypeId) -> String {
        self.registry
            .get_info(id)
            .map(|info| info.name.clone())
            .unwrap_or_else(|| format!("{id:?}"))
    }

    fn not_found(&self, id: ComponentTypeId, entity: EntityId) -> EcsError {
        EcsError::NotFound {
            entity,
            component: self.component_name(id),
        }
    }

    fn unknown_component<T: 'static>(&self) -> EcsError {
        EcsError::UnknownComponent {
            name: type_name::<T>().to_owned(),
            registered: self.registry.registered_names().join(", "),
        }
    }
}

/// Fallback for lookups that were already checked; names the Rust type.
fn missing<T: 'static>(entity: EntityId) -> EcsError {
    EcsError::NotFound {
        entity,
        component: type_name::<T>().to_owned(),
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
