//! Per-type component storage.
//!
//! Each registered component type gets one [`SparseSet`]: a dense array of
//! values, a parallel dense array of owning entities, and a sparse array that
//! maps an entity's index to its dense slot. Insert, lookup and removal are
//! O(1); removal swaps the last element into the hole so the dense arrays
//! never contain gaps and iteration touches only live values.
//!
//! The owner array doubles as the reverse index: given a reference obtained
//! from the store, [`SparseSet::entity_of`] finds its slot from the address
//! offset into the dense array and returns the owner without scanning.

use std::any::Any;
use std::mem;

use crate::entity::EntityId;

// ---------------------------------------------------------------------------
// SparseSet
// ---------------------------------------------------------------------------

/// Dense storage for all components of one type, keyed by [`EntityId`].
#[derive(Debug)]
pub struct SparseSet<T> {
    /// Entity index -> dense slot. `None` when the index has no component.
    sparse: Vec<Option<usize>>,
    /// Component values, packed.
    dense: Vec<T>,
    /// `owners[i]` owns `dense[i]`.
    owners: Vec<EntityId>,
}

impl<T> SparseSet<T> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            sparse: Vec::new(),
            dense: Vec::new(),
            owners: Vec::new(),
        }
    }

    /// Dense slot of `entity`, if it has a value here.
    ///
    /// The generation is checked against the stored owner, so a stale id that
    /// shares an index with a live entity does not match.
    #[inline]
    fn slot(&self, entity: EntityId) -> Option<usize> {
        if entity.is_null() {
            return None;
        }
        let slot = (*self.sparse.get(entity.index() as usize)?)?;
        (self.owners[slot] == entity).then_some(slot)
    }

    /// Insert `value` for `entity`, returning the previous value if there was one.
    pub fn insert(&mut self, entity: EntityId, value: T) -> Option<T> {
        debug_assert!(!entity.is_null(), "cannot store a component for the null entity");

        if let Some(slot) = self.slot(entity) {
            return Some(mem::replace(&mut self.dense[slot], value));
        }

        let idx = entity.index() as usize;
        if idx >= self.sparse.len() {
            self.sparse.resize(idx + 1, None);
        }
        // A stale owner may still occupy this index; drop its value.
        if let Some(stale_slot) = self.sparse[idx] {
            let stale = self.owners[stale_slot];
            self.remove(stale);
        }

        self.sparse[idx] = Some(self.dense.len());
        self.dense.push(value);
        self.owners.push(entity);
        None
    }

    /// Remove and return the value for `entity`.
    ///
    /// The last element is swapped into the vacated slot, so the slot of at
    /// most one other entity changes.
    pub fn remove(&mut self, entity: EntityId) -> Option<T> {
        let slot = self.slot(entity)?;
        self.sparse[entity.index() as usize] = None;

        let last = self.dense.len() - 1;
        let value = self.dense.swap_remove(slot);
        self.owners.swap_remove(slot);

        if slot != last {
            let moved = self.owners[slot];
            self.sparse[moved.index() as usize] = Some(slot);
        }
        Some(value)
    }

    /// Whether `entity` has a value in this set.
    #[inline]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.slot(entity).is_some()
    }

    /// Shared access to the value for `entity`.
    #[inline]
    pub fn get(&self, entity: EntityId) -> Option<&T> {
        self.slot(entity).map(|slot| &self.dense[slot])
    }

    /// Mutable access to the value for `entity`.
    #[inline]
    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut T> {
        self.slot(entity).map(move |slot| &mut self.dense[slot])
    }

    /// Resolve a reference previously handed out by this set to its owner.
    ///
    /// Returns `None` if `value` does not point into this set's dense array.
    /// Zero-sized types have no distinguishable addresses and always yield
    /// `None`; iterate with [`iter`](Self::iter) to get their owners instead.
    pub fn entity_of(&self, value: &T) -> Option<EntityId> {
        let size = mem::size_of::<T>();
        if size == 0 {
            return None;
        }
        let base = self.dense.as_ptr() as usize;
        let addr = value as *const T as usize;
        let offset = addr.checked_sub(base)?;
        if offset % size != 0 {
            return None;
        }
        self.owners.get(offset / size).copied()
    }

    /// Iterate `(owner, value)` pairs in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.owners.iter().copied().zip(self.dense.iter())
    }

    /// Iterate `(owner, value)` pairs in dense order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> + '_ {
        self.owners.iter().copied().zip(self.dense.iter_mut())
    }

    /// Owners in dense order.
    pub fn entities(&self) -> &[EntityId] {
        &self.owners
    }

    /// Values in dense order.
    pub fn values(&self) -> &[T] {
        &self.dense
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Whether the set holds no values.
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }
}

impl<T> Default for SparseSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// ErasedStorage -- what the world needs without knowing T
// ---------------------------------------------------------------------------

/// Type-erased view of a [`SparseSet`], used for entity-wide operations such
/// as despawn and for downcasting back to the concrete set.
pub(crate) trait ErasedStorage: Any {
    fn contains(&self, entity: EntityId) -> bool;
    /// Drop the value for `entity`. Returns whether one was present.
    fn remove_erased(&mut self, entity: EntityId) -> bool;
    fn len(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: 'static> ErasedStorage for SparseSet<T> {
    fn contains(&self, entity: EntityId) -> bool {
        SparseSet::contains(self, entity)
    }

    fn remove_erased(&mut self, entity: EntityId) -> bool {
        self.remove(entity).is_some()
    }

    fn len(&self) -> usize {
        SparseSet::len(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
