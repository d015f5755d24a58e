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
//! World management
//!
//! The World is the central container for all ECS data: it owns the entity
//! allocator, one [`SparseSet`] per component type (created on first use) and
//! the frame tick. Every mutation and query goes through it.
//!
//! # Frame cycle
//!
//! ```text
//! [writes set change bits] -> begin_frame -> [bits cleared, tick + 1] -> ...
//! ```
//!
//! Only [`World::begin_frame`] resets change state. Writes that mark a slot:
//! `update`, `mutate`, `transform_each`, `parallel_transform_each` and the
//! `iterate_ref` forms. `add`, `get_ref` and `get_span` never do.

use crate::config::WorldConfig;
use crate::ecs::allocator::EntityAllocator;
use crate::ecs::component::{Component, Dispose};
use crate::ecs::iter::{IterRef, Span};
use crate::ecs::query::{join_mut, Query, Query2, Query3};
use crate::ecs::storage::{ComponentStorage, SparseSet};
use crate::ecs::Entity;
use crate::error::{EcsError, Result};
use std::any::TypeId;
use std::collections::HashMap;

/// The main ECS world container
///
/// World assumes cooperative single-threaded access; the only internal
/// fan-out is [`parallel_transform_each`](World::parallel_transform_each),
/// which borrows the world exclusively for its whole duration.
pub struct World {
    entities: EntityAllocator,
    storages: HashMap<TypeId, Box<dyn ComponentStorage>>,
    current_tick: u64,
    config: WorldConfig,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Create a world with custom capacity hints
    pub fn with_config(config: WorldConfig) -> Self {
        World {
            entities: EntityAllocator::with_capacity(config.initial_entity_capacity),
            storages: HashMap::new(),
            current_tick: 0,
            config,
        }
    }

    /// Configuration the world was created with
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Entities
    // ------------------------------------------------------------------

    /// Create a new entity
    pub fn spawn(&mut self) -> Entity {
        self.entities.spawn()
    }

    /// Destroy an entity
    ///
    /// Removes the entity's component from every store, running disposal
    /// hooks where registered, then releases the ID with its generation
    /// bumped. Returns false for stale or unknown handles.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if !self.entities.is_alive(entity) {
            return false;
        }
        for storage in self.storages.values_mut() {
            storage.despawn_entity(entity);
        }
        self.entities.despawn(entity)
    }

    /// Check if an entity is alive
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Current generation of an ID, 0 if it was never spawned
    pub fn generation(&self, id: u64) -> u32 {
        self.entities.generation(id)
    }

    /// Get the number of alive entities
    pub fn entity_count(&self) -> usize {
        self.entities.alive_count()
    }

    /// Get an iterator over all alive entities
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter_alive()
    }

    // ------------------------------------------------------------------
    // Frame
    // ------------------------------------------------------------------

    /// Start a new frame: advance the tick and clear every change bit
    pub fn begin_frame(&mut self) {
        self.current_tick += 1;
        for storage in self.storages.values_mut() {
            storage.clear_changed_ticks();
        }
        tracing::trace!(tick = self.current_tick, "frame started");
    }

    /// Number of frames started so far
    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    // ------------------------------------------------------------------
    // Stores
    // ------------------------------------------------------------------

    /// Create the store for `T` if it does not exist yet
    pub fn register<T: Component>(&mut self) {
        self.storage_or_insert::<T>();
    }

    /// Create the store for `T` and run `T::dispose` on every value removed
    /// by [`despawn`](Self::despawn) or [`clear`](Self::clear)
    pub fn register_disposable<T: Component + Dispose>(&mut self) {
        self.storage_or_insert::<T>().set_disposer(<T as Dispose>::dispose);
        tracing::debug!(component = T::type_name(), "disposal hook registered");
    }

    /// Store for `T`, if any component of that type was ever added
    pub fn storage<T: Component>(&self) -> Option<&SparseSet<T>> {
        self.storages
            .get(&TypeId::of::<T>())
            .and_then(|storage| storage.as_any().downcast_ref::<SparseSet<T>>())
    }

    /// Mutable store for `T`, if it exists
    pub fn storage_mut<T: Component>(&mut self) -> Option<&mut SparseSet<T>> {
        self.storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|storage| storage.as_any_mut().downcast_mut::<SparseSet<T>>())
    }

    fn storage_or_insert<T: Component>(&mut self) -> &mut SparseSet<T> {
        let config = &self.config;
        let storage = self.storages.entry(TypeId::of::<T>()).or_insert_with(|| {
            tracing::debug!(component = T::type_name(), "component store created");
            let storage: Box<dyn ComponentStorage> = Box::new(SparseSet::<T>::with_capacity(
                config.initial_component_capacity,
                config.initial_entity_capacity,
            ));
            storage
        });
        match storage.as_any_mut().downcast_mut::<SparseSet<T>>() {
            Some(storage) => storage,
            None => unreachable!("store registered under the TypeId of another component"),
        }
    }

    /// Number of component stores created so far
    pub fn storage_count(&self) -> usize {
        self.storages.len()
    }

    // ------------------------------------------------------------------
    // Components
    // ------------------------------------------------------------------

    /// Insert or overwrite a component without marking it changed
    ///
    /// Stores are keyed by entity ID, so writing through a despawned handle
    /// would leave the component behind for whoever is handed that ID next.
    /// Debug builds assert the handle is alive.
    pub fn add<T: Component>(&mut self, entity: Entity, component: T) {
        debug_assert!(
            self.entities.is_alive(entity),
            "component written to dead entity {}",
            entity
        );
        self.storage_or_insert::<T>().add(entity, component);
    }

    /// Insert or overwrite a component and mark it changed
    ///
    /// Same liveness requirement as [`add`](Self::add).
    pub fn update<T: Component>(&mut self, entity: Entity, component: T) {
        debug_assert!(
            self.entities.is_alive(entity),
            "component written to dead entity {}",
            entity
        );
        self.storage_or_insert::<T>().update(entity, component);
    }

    /// Remove a component, returning it if it was present
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Option<T> {
        self.storage_mut::<T>()?.remove(entity)
    }

    /// Check if an entity has a component of type `T`
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.storage::<T>().map_or(false, |s| s.has(entity))
    }

    /// Whether the entity's `T` was written since the last frame start
    pub fn changed<T: Component>(&self, entity: Entity) -> bool {
        self.storage::<T>()
            .map_or(false, |s| s.changed_this_frame(entity))
    }

    /// Borrow the entity's component
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.storage::<T>()?.get(entity)
    }

    /// Copy the entity's component out
    pub fn try_get<T: Component + Clone>(&self, entity: Entity) -> Option<T> {
        self.storage::<T>()?.try_get(entity)
    }

    /// Mutable reference to the entity's component
    ///
    /// Does not mark the component changed.
    ///
    /// # Errors
    ///
    /// [`EcsError::MissingComponent`] if the entity has no `T`.
    pub fn get_ref<T: Component>(&mut self, entity: Entity) -> Result<&mut T> {
        match self.storage_mut::<T>() {
            Some(storage) => storage.get_ref(entity),
            None => Err(EcsError::MissingComponent {
                entity,
                component: T::type_name(),
            }),
        }
    }

    /// Modify the entity's component in place and mark it changed
    ///
    /// Silently does nothing if the entity has no `T`; returns whether `f` ran.
    pub fn mutate<T, F>(&mut self, entity: Entity, f: F) -> bool
    where
        T: Component,
        F: FnOnce(&mut T),
    {
        self.storage_mut::<T>()
            .map_or(false, |storage| storage.mutate(entity, f))
    }

    /// Pre-size the store for `T`
    pub fn reserve<T: Component>(&mut self, capacity: usize, max_entity_hint: usize) {
        self.storage_or_insert::<T>().reserve(capacity, max_entity_hint);
    }

    /// Number of `T` components
    pub fn count<T: Component>(&self) -> usize {
        self.storage::<T>().map_or(0, |s| s.len())
    }

    /// Entities currently holding a `T`, in dense order
    pub fn entities_with<T: Component>(&self) -> &[Entity] {
        match self.storage::<T>() {
            Some(storage) => storage.entities(),
            None => &[],
        }
    }

    // ------------------------------------------------------------------
    // Bulk writes
    // ------------------------------------------------------------------

    /// Replace every `T` with `f(entity, &component)`, marking every slot
    /// changed even when the value is unchanged
    pub fn transform_each<T, F>(&mut self, f: F)
    where
        T: Component,
        F: FnMut(Entity, &T) -> T,
    {
        if let Some(storage) = self.storage_mut::<T>() {
            storage.transform_each(f);
        }
    }

    /// Parallel form of [`transform_each`](Self::transform_each)
    ///
    /// Dense slots are partitioned across the Rayon pool in runs of at least
    /// [`WorldConfig::parallel_min_chunk`]. Returns once every partition has
    /// finished. Without the `parallel` feature this runs sequentially.
    pub fn parallel_transform_each<T, F>(&mut self, f: F)
    where
        T: Component,
        F: Fn(Entity, &T) -> T + Sync + Send,
    {
        #[cfg(feature = "parallel")]
        {
            let min_chunk = self.config.parallel_min_chunk;
            if let Some(storage) = self.storage_mut::<T>() {
                storage.par_transform_each(min_chunk, f);
            }
        }

        #[cfg(not(feature = "parallel"))]
        {
            self.transform_each(f);
        }
    }

    /// Change-marking mutable iteration over every `T`
    ///
    /// Each handle marks its slot changed the first time it is written
    /// through.
    pub fn iterate_ref<T: Component>(&mut self) -> IterRef<'_, T> {
        self.storage_or_insert::<T>().iter_ref()
    }

    /// Mutable iteration over entities holding both `A` and `B`; both slots
    /// are marked changed for every visited entity
    ///
    /// # Panics
    ///
    /// Panics if `A` and `B` are the same type.
    pub fn iterate_ref2<A, B, F>(&mut self, f: F)
    where
        A: Component,
        B: Component,
        F: FnMut(Entity, &mut A, &mut B),
    {
        assert_ne!(
            TypeId::of::<A>(),
            TypeId::of::<B>(),
            "iterate_ref2 requires two distinct component types"
        );

        let Some(detached) = self.storages.remove(&TypeId::of::<B>()) else {
            return;
        };
        let mut guard = Reattach {
            storages: &mut self.storages,
            key: TypeId::of::<B>(),
            detached: Some(detached),
        };

        let a = guard
            .storages
            .get_mut(&TypeId::of::<A>())
            .and_then(|storage| storage.as_any_mut().downcast_mut::<SparseSet<A>>());
        let b = guard
            .detached
            .as_mut()
            .and_then(|storage| storage.as_any_mut().downcast_mut::<SparseSet<B>>());
        if let (Some(a), Some(b)) = (a, b) {
            join_mut(a, b, f);
        }
    }

    /// Raw dense arrays of `T` for bulk writes that bypass change tracking
    pub fn get_span<T: Component>(&mut self) -> Span<'_, T> {
        self.storage_or_insert::<T>().span()
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Iterate over `(entity, &T)`
    pub fn query<T: Component>(&self) -> Query<'_, T> {
        Query::new(self.storage::<T>())
    }

    /// Iterate over entities holding both `A` and `B`
    pub fn query2<A: Component, B: Component>(&self) -> Query2<'_, A, B> {
        Query2::new(self.storage::<A>(), self.storage::<B>())
    }

    /// Iterate over entities holding `A`, `B` and `C`
    pub fn query3<A: Component, B: Component, C: Component>(&self) -> Query3<'_, A, B, C> {
        Query3::new(self.storage::<A>(), self.storage::<B>(), self.storage::<C>())
    }

    /// Lazily filtered [`query`](Self::query)
    pub fn query_where<'w, T, P>(
        &'w self,
        mut predicate: P,
    ) -> impl Iterator<Item = (Entity, &'w T)> + 'w
    where
        T: Component,
        P: FnMut(Entity, &T) -> bool + 'w,
    {
        self.query::<T>()
            .filter(move |(entity, component)| predicate(*entity, *component))
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// Dispose every component, drop every store and despawn all entities
    ///
    /// Entity generations and the tick keep counting, so handles from before
    /// the clear never match entities spawned after it.
    pub fn clear(&mut self) {
        for storage in self.storages.values_mut() {
            storage.clear();
        }
        self.storages.clear();
        self.entities.clear();
    }
}

/// Puts a store taken out of the map back when dropped, including while
/// unwinding from a panicking callback
struct Reattach<'a> {
    storages: &'a mut HashMap<TypeId, Box<dyn ComponentStorage>>,
    key: TypeId,
    detached: Option<Box<dyn ComponentStorage>>,
}

impl Drop for Reattach<'_> {
    fn drop(&mut self) {
        if let Some(storage) = self.detached.take() {
            self.storages.insert(self.key, storage);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
