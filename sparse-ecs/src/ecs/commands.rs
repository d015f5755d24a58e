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
//! Deferred structural changes
//!
//! Spawning, adding, removing and despawning can resize dense and sparse
//! arrays, which must not happen while an iterator over those arrays is
//! alive. Systems record such changes in a [`CommandBuffer`] during iteration
//! and apply it to the World once the pass is over.

use crate::ecs::component::Component;
use crate::ecs::{Entity, World};

type Command = Box<dyn FnOnce(&mut World) + Send>;

/// Ordered list of deferred world mutations
///
/// # Example
///
/// ```
/// use sparse_ecs::ecs::{CommandBuffer, Component, World};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// struct Health(u32);
/// impl Component for Health {}
///
/// let mut world = World::new();
/// let mut commands = CommandBuffer::new();
/// commands.spawn_with(|world, entity| world.add(entity, Health(3)));
/// commands.apply(&mut world);
///
/// assert_eq!(world.count::<Health>(), 1);
/// ```
#[derive(Default)]
pub struct CommandBuffer {
    commands: Vec<Command>,
}

impl CommandBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an arbitrary world mutation
    pub fn push<F>(&mut self, command: F)
    where
        F: FnOnce(&mut World) + Send + 'static,
    {
        self.commands.push(Box::new(command));
    }

    /// Spawn an entity at apply time and initialise it with `init`
    pub fn spawn_with<F>(&mut self, init: F)
    where
        F: FnOnce(&mut World, Entity) + Send + 'static,
    {
        self.push(move |world| {
            let entity = world.spawn();
            init(world, entity);
        });
    }

    /// Add a component without marking it changed
    ///
    /// Skipped if the entity is dead by the time the command runs.
    pub fn add<T: Component>(&mut self, entity: Entity, component: T) {
        self.push(move |world| {
            if world.is_alive(entity) {
                world.add(entity, component);
            }
        });
    }

    /// Add or overwrite a component and mark it changed
    ///
    /// Skipped if the entity is dead by the time the command runs.
    pub fn update<T: Component>(&mut self, entity: Entity, component: T) {
        self.push(move |world| {
            if world.is_alive(entity) {
                world.update(entity, component);
            }
        });
    }

    /// Remove a component
    pub fn remove<T: Component>(&mut self, entity: Entity) {
        self.push(move |world| {
            world.remove::<T>(entity);
        });
    }

    /// Despawn an entity
    pub fn despawn(&mut self, entity: Entity) {
        self.push(move |world| {
            world.despawn(entity);
        });
    }

    /// Number of recorded commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if nothing is recorded
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Run every command in recording order and empty the buffer
    pub fn apply(&mut self, world: &mut World) {
        tracing::trace!(commands = self.commands.len(), "applying command buffer");
        for command in self.commands.drain(..) {
            command(world);
        }
    }
}
