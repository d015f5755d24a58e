// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Component storage
//!
//! Each component type lives in its own [`SparseSet`]: a sparse array indexed
//! by entity ID pointing into parallel dense arrays of entities, component
//! values and change bits. Insert, remove and lookup are O(1); iteration walks
//! the dense arrays contiguously.
//!
//! # Memory Layout
//!
//! ```text
//! sparse:     [ 2, -, 0, -, 1 ]        indexed by entity ID, - = absent
//! entities:   [ e2, e4, e0 ]           dense, insertion/swap order
//! components: [ c2, c4, c0 ]           same length as entities
//! changed:    [ 0,  1,  0 ]            one bit per dense slot
//! ```
//!
//! The World keeps stores behind the type-erased [`ComponentStorage`] trait so
//! it can sweep every store on despawn and at frame start without knowing the
//! concrete component types.

use crate::ecs::changed::ChangedBits;
use crate::ecs::component::{Component, DisposeError};
use crate::ecs::iter::{IterRef, Span};
use crate::ecs::Entity;
use crate::error::{EcsError, Result};
use std::any::Any;

/// Sparse entry for an entity without a component
const EMPTY: usize = usize::MAX;

type Disposer<T> = fn(&mut T) -> std::result::Result<(), DisposeError>;

/// Type-erased view of a component store
///
/// Covers the operations the World performs across all stores at once.
pub trait ComponentStorage: Send + Sync {
    /// Name of the stored component type
    fn component_name(&self) -> &'static str;

    /// Number of components stored
    fn len(&self) -> usize;

    /// Check if the storage is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if an entity has this component
    fn contains(&self, entity: Entity) -> bool;

    /// Remove the entity's component, running the disposal hook if one is
    /// registered. Disposal errors are logged and swallowed.
    fn despawn_entity(&mut self, entity: Entity) -> bool;

    /// Reset every change bit
    fn clear_changed_ticks(&mut self);

    /// Dispose and drop every component
    fn clear(&mut self);

    /// Upcast for downcasting to the concrete store
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete store
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Packed sparse-set storage for one component type
///
/// Keyed by entity ID: a store holds at most one component per ID, and the
/// dense entity entry is refreshed to the latest handle on every write.
///
/// # Example
///
/// ```
/// use sparse_ecs::ecs::{Component, Entity, SparseSet};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// struct Health(u32);
/// impl Component for Health {}
///
/// let mut storage = SparseSet::<Health>::new();
/// let entity = Entity::new(3, 1);
///
/// storage.add(entity, Health(10));
/// assert!(!storage.changed_this_frame(entity));
///
/// storage.update(entity, Health(7));
/// assert!(storage.changed_this_frame(entity));
/// assert_eq!(storage.try_get(entity), Some(Health(7)));
/// ```
pub struct SparseSet<T: Component> {
    sparse: Vec<usize>,
    entities: Vec<Entity>,
    components: Vec<T>,
    changed: ChangedBits,
    disposer: Option<Disposer<T>>,
}

impl<T: Component> SparseSet<T> {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Create a store with room for `component_capacity` components and
    /// entity IDs below `entity_capacity` without reallocating
    pub fn with_capacity(component_capacity: usize, entity_capacity: usize) -> Self {
        SparseSet {
            sparse: vec![EMPTY; entity_capacity],
            entities: Vec::with_capacity(component_capacity),
            components: Vec::with_capacity(component_capacity),
            changed: ChangedBits::with_capacity(component_capacity),
            disposer: None,
        }
    }

    /// Number of occupied dense slots
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Dense capacity before the next reallocation
    pub fn capacity(&self) -> usize {
        self.components.capacity()
    }

    /// Install the hook run on components removed by despawn
    pub fn set_disposer(&mut self, disposer: Disposer<T>) {
        self.disposer = Some(disposer);
    }

    /// Whether a disposal hook is installed
    pub fn has_disposer(&self) -> bool {
        self.disposer.is_some()
    }

    /// Dense slot holding the entity's component
    #[inline]
    pub fn dense_index(&self, entity: Entity) -> Option<usize> {
        match self.sparse.get(entity.index()) {
            Some(&index) if index != EMPTY => Some(index),
            _ => None,
        }
    }

    /// Write a value, returning its dense slot and whether it was appended
    fn place(&mut self, entity: Entity, component: T) -> (usize, bool) {
        if let Some(index) = self.dense_index(entity) {
            self.entities[index] = entity;
            self.components[index] = component;
            return (index, false);
        }

        let slot = entity.index();
        if slot >= self.sparse.len() {
            self.sparse.resize(slot + 1, EMPTY);
        }

        let index = self.components.len();
        self.components.push(component);
        self.entities.push(entity);
        self.sparse[slot] = index;
        self.changed.grow(self.components.len());

        debug_assert_eq!(self.entities.len(), self.components.len());
        (index, true)
    }

    /// Insert or overwrite without touching change state
    ///
    /// A new slot starts unchanged; an existing slot keeps whatever bit it had.
    pub fn add(&mut self, entity: Entity, component: T) {
        let (index, appended) = self.place(entity, component);
        if appended {
            self.changed.assign(index, false);
        }
    }

    /// Insert or overwrite and mark the slot changed
    pub fn update(&mut self, entity: Entity, component: T) {
        let (index, _) = self.place(entity, component);
        self.changed.assign(index, true);
    }

    /// Remove the entity's component with swap-with-last
    ///
    /// The entity moved into the vacated slot carries its change bit along.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let index = self.dense_index(entity)?;
        let last = self.components.len() - 1;
        let moved_changed = self.changed.get(last);

        let component = self.components.swap_remove(index);
        self.entities.swap_remove(index);

        if index != last {
            let moved = self.entities[index];
            self.sparse[moved.index()] = index;
            self.changed.assign(index, moved_changed);
        }
        self.changed.assign(last, false);
        self.sparse[entity.index()] = EMPTY;

        debug_assert_eq!(self.entities.len(), self.components.len());
        Some(component)
    }

    /// Check if an entity has this component
    #[inline]
    pub fn has(&self, entity: Entity) -> bool {
        self.dense_index(entity).is_some()
    }

    /// Get a reference to the entity's component
    pub fn get(&self, entity: Entity) -> Option<&T> {
        let index = self.dense_index(entity)?;
        Some(&self.components[index])
    }

    /// Get a mutable reference without marking the slot changed
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let index = self.dense_index(entity)?;
        Some(&mut self.components[index])
    }

    /// Copy the entity's component out
    pub fn try_get(&self, entity: Entity) -> Option<T>
    where
        T: Clone,
    {
        self.get(entity).cloned()
    }

    /// Mutable reference that treats absence as an error
    pub fn get_ref(&mut self, entity: Entity) -> Result<&mut T> {
        self.get_mut(entity).ok_or(EcsError::MissingComponent {
            entity,
            component: T::type_name(),
        })
    }

    /// Apply `f` in place and mark the slot changed; no-op if absent
    pub fn mutate<F>(&mut self, entity: Entity, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        match self.dense_index(entity) {
            Some(index) => {
                f(&mut self.components[index]);
                self.changed.assign(index, true);
                true
            }
            None => false,
        }
    }

    /// Whether the entity's component was written since the last frame start
    #[inline]
    pub fn changed_this_frame(&self, entity: Entity) -> bool {
        self.dense_index(entity)
            .map_or(false, |index| self.changed.get(index))
    }

    /// Mark the entity's component changed; false if absent
    pub fn mark_changed(&mut self, entity: Entity) -> bool {
        match self.dense_index(entity) {
            Some(index) => {
                self.changed.assign(index, true);
                true
            }
            None => false,
        }
    }

    /// Reset every change bit
    pub fn clear_changed_ticks(&mut self) {
        self.changed.clear();
    }

    /// Pre-grow dense and sparse storage
    ///
    /// Purely a performance hint.
    pub fn reserve(&mut self, component_capacity: usize, max_entity_id_hint: usize) {
        let additional = component_capacity.saturating_sub(self.components.len());
        self.components.reserve(additional);
        self.entities.reserve(additional);
        self.changed.grow(component_capacity);
        if max_entity_id_hint >= self.sparse.len() {
            self.sparse.resize(max_entity_id_hint + 1, EMPTY);
        }
    }

    /// Entity owning dense slot `index`
    #[inline]
    pub fn entity_by_dense_index(&self, index: usize) -> Entity {
        self.entities[index]
    }

    /// Component in dense slot `index`
    #[inline]
    pub fn component_by_dense_index(&self, index: usize) -> &T {
        &self.components[index]
    }

    /// Mutable component in dense slot `index`; does not mark changed
    #[inline]
    pub fn component_ref_by_dense_index(&mut self, index: usize) -> &mut T {
        &mut self.components[index]
    }

    /// Mark dense slot `index` changed
    #[inline]
    pub fn mark_changed_by_dense_index(&mut self, index: usize) {
        self.changed.assign(index, true);
    }

    /// Change bit of dense slot `index`
    #[inline]
    pub fn changed_by_dense_index(&self, index: usize) -> bool {
        self.changed.get(index)
    }

    /// Dense entity array
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Dense component array
    pub fn components(&self) -> &[T] {
        &self.components
    }

    /// Iterate over `(entity, component)` pairs in dense order
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        self.entities.iter().copied().zip(self.components.iter())
    }

    /// Iterate with handles that mark a slot changed when written through
    pub fn iter_ref(&mut self) -> IterRef<'_, T> {
        IterRef::new(&self.entities, &mut self.components, &self.changed)
    }

    /// Raw dense arrays for bulk writes that bypass change tracking
    pub fn span(&mut self) -> Span<'_, T> {
        Span::new(&self.entities, &mut self.components)
    }

    /// Replace every component with `f(entity, component)` and mark every
    /// visited slot changed, whether or not the value differs
    pub fn transform_each<F>(&mut self, mut f: F)
    where
        F: FnMut(Entity, &T) -> T,
    {
        for index in 0..self.components.len() {
            self.components[index] = f(self.entities[index], &self.components[index]);
            self.changed.assign(index, true);
        }
    }

    /// Parallel form of [`transform_each`](Self::transform_each)
    ///
    /// Dense indices are partitioned across the Rayon pool in runs of at
    /// least `min_chunk`. Each worker writes only its own slots; change bits
    /// are set with an atomic OR because neighbouring slots share a word.
    #[cfg(feature = "parallel")]
    pub fn par_transform_each<F>(&mut self, min_chunk: usize, f: F)
    where
        F: Fn(Entity, &T) -> T + Sync + Send,
    {
        use rayon::prelude::*;

        let entities = &self.entities;
        let changed = &self.changed;
        self.components
            .par_iter_mut()
            .with_min_len(min_chunk.max(1))
            .enumerate()
            .for_each(|(index, component)| {
                *component = f(entities[index], component);
                changed.set_atomic(index);
            });
    }

    fn dispose(&self, component: &mut T) {
        if let Some(hook) = self.disposer {
            if let Err(err) = hook(component) {
                let err = EcsError::Disposal {
                    component: T::type_name(),
                    reason: err.to_string(),
                };
                tracing::warn!("{}", err);
            }
        }
    }
}

impl<T: Component> Default for SparseSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ComponentStorage for SparseSet<T> {
    fn component_name(&self) -> &'static str {
        T::type_name()
    }

    fn len(&self) -> usize {
        self.components.len()
    }

    fn contains(&self, entity: Entity) -> bool {
        self.has(entity)
    }

    fn despawn_entity(&mut self, entity: Entity) -> bool {
        match self.remove(entity) {
            Some(mut component) => {
                self.dispose(&mut component);
                true
            }
            None => false,
        }
    }

    fn clear_changed_ticks(&mut self) {
        self.changed.clear();
    }

    fn clear(&mut self) {
        let mut components = std::mem::take(&mut self.components);
        for component in &mut components {
            self.dispose(component);
        }
        components.clear();
        self.components = components;
        self.entities.clear();
        self.sparse.iter_mut().for_each(|slot| *slot = EMPTY);
        self.changed.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
