//! Component lifecycle hooks.
//!
//! Each component type has two single-slot hooks: one fired right after a
//! value is inserted ([`HookKind::OnCreate`]) and one fired right before a
//! value is erased ([`HookKind::OnDestroy`]). Registering a hook for a slot
//! that is already filled replaces the old one.
//!
//! Hooks receive the whole [`World`] and the owning entity. The component is
//! in storage for the entire duration of either hook, so
//! `world.get_component_mut::<T>(entity)` always succeeds from inside one. This
//! is how a component records its own owner or releases an external resource
//! it holds a handle to.
//!
//! While a hook for `T` runs, adding or removing any `T` is rejected with
//! [`EcsError::ReentrantCallback`].

use std::fmt;
use std::rc::Rc;

use crate::component::ComponentTypeId;
use crate::entity::EntityId;
use crate::world::World;
use crate::EcsError;

/// A lifecycle hook. Errors are propagated out of the world call that fired it.
pub type Hook = Rc<dyn Fn(&mut World, EntityId) -> Result<(), EcsError>>;

/// Which lifecycle event a hook reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    /// Fired once, after the component has been stored.
    OnCreate,
    /// Fired once, before the component is erased.
    OnDestroy,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookKind::OnCreate => f.write_str("on_create"),
            HookKind::OnDestroy => f.write_str("on_destroy"),
        }
    }
}

#[derive(Default)]
struct TypeHooks {
    on_create: Option<Hook>,
    on_destroy: Option<Hook>,
    /// Set while one of this type's hooks is executing.
    running: Option<HookKind>,
}

/// Hook slots for every registered component type, indexed by
/// [`ComponentTypeId`].
#[derive(Default)]
pub(crate) struct HookTable {
    per_type: Vec<TypeHooks>,
}

impl HookTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make sure a slot exists for `id`.
    pub(crate) fn ensure(&mut self, id: ComponentTypeId) {
        if id.index() >= self.per_type.len() {
            self.per_type.resize_with(id.index() + 1, TypeHooks::default);
        }
    }

    /// Store `hook` in the `(id, kind)` slot. Returns `true` if it replaced one.
    pub(crate) fn set(&mut self, id: ComponentTypeId, kind: HookKind, hook: Hook) -> bool {
        self.ensure(id);
        let slots = &mut self.per_type[id.index()];
        let slot = match kind {
            HookKind::OnCreate => &mut slots.on_create,
            HookKind::OnDestroy => &mut slots.on_destroy,
        };
        slot.replace(hook).is_some()
    }

    pub(crate) fn get(&self, id: ComponentTypeId, kind: HookKind) -> Option<Hook> {
        let slots = self.per_type.get(id.index())?;
        match kind {
            HookKind::OnCreate => slots.on_create.clone(),
            HookKind::OnDestroy => slots.on_destroy.clone(),
        }
    }

    /// The hook currently executing for `id`, if any.
    pub(crate) fn running(&self, id: ComponentTypeId) -> Option<HookKind> {
        self.per_type.get(id.index()).and_then(|slots| slots.running)
    }

    pub(crate) fn mark_running(&mut self, id: ComponentTypeId, kind: Option<HookKind>) {
        self.ensure(id);
        self.per_type[id.index()].running = kind;
    }
}

impl fmt::Debug for HookTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.per_type.iter().map(|slots| {
                (
                    slots.on_create.is_some(),
                    slots.on_destroy.is_some(),
                    slots.running,
                )
            }))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Hook {
        Rc::new(|_world: &mut World, _entity: EntityId| Ok(()))
    }

    #[test]
    fn set_reports_replacement() {
        let mut table = HookTable::new();
        let id = ComponentTypeId(2);
        assert!(!table.set(id, HookKind::OnCreate, noop()));
        assert!(table.set(id, HookKind::OnCreate, noop()));
        assert!(table.get(id, HookKind::OnCreate).is_some());
        assert!(table.get(id, HookKind::OnDestroy).is_none());
    }

    #[test]
    fn unknown_slot_has_no_hooks() {
        let table = HookTable::new();
        assert!(table.get(ComponentTypeId(7), HookKind::OnDestroy).is_none());
        assert_eq!(table.running(ComponentTypeId(7)), None);
    }

    #[test]
    fn running_flag_round_trip() {
        let mut table = HookTable::new();
        let id = ComponentTypeId(0);
        table.mark_running(id, Some(HookKind::OnDestroy));
        assert_eq!(table.running(id), Some(HookKind::OnDestroy));
        table.mark_running(id, None);
        assert_eq!(table.running(id), None);
    }

    #[test]
    fn hook_kind_display() {
        assert_eq!(HookKind::OnCreate.to_string(), "on_create");
        assert_eq!(HookKind::OnDestroy.to_string(), "on_destroy");
    }
}
