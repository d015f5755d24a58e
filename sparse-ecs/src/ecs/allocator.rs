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
//! Entity allocation
//!
//! Issues entity handles, tracks a generation counter per slot and recycles
//! despawned IDs through a LIFO free list, so the most recently despawned ID
//! is the first one handed out again.

use crate::ecs::Entity;

/// Allocator for entity IDs with per-slot generation counters
///
/// Slot `i` has generation 0 until it is spawned for the first time. Every
/// despawn bumps the generation, so a handle taken before the despawn no
/// longer matches the slot.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    generations: Vec<u32>,
    alive: Vec<bool>,
    free_list: Vec<u64>,
    alive_count: usize,
}

impl EntityAllocator {
    /// Create an empty allocator
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an allocator with room for `capacity` slots before reallocating
    pub fn with_capacity(capacity: usize) -> Self {
        EntityAllocator {
            generations: Vec::with_capacity(capacity),
            alive: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            alive_count: 0,
        }
    }

    /// Hand out an unused entity
    ///
    /// Recycled IDs come back with the generation they were left at by
    /// `despawn`; fresh IDs start at generation 1.
    pub fn spawn(&mut self) -> Entity {
        self.alive_count += 1;

        if let Some(id) = self.free_list.pop() {
            let slot = id as usize;
            self.alive[slot] = true;
            return Entity::new(id, self.generations[slot]);
        }

        let id = self.generations.len() as u64;
        self.generations.push(1);
        self.alive.push(true);
        Entity::new(id, 1)
    }

    /// Release an entity
    ///
    /// Returns false if the handle is stale or was never spawned.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }

        let slot = entity.index();
        self.alive[slot] = false;
        self.generations[slot] = self.generations[slot].wrapping_add(1).max(1);
        self.free_list.push(entity.id().raw());
        self.alive_count -= 1;
        true
    }

    /// Current generation of a slot, 0 if it was never spawned
    pub fn generation(&self, id: u64) -> u32 {
        self.generations.get(id as usize).copied().unwrap_or(0)
    }

    /// Whether the handle refers to the live occupant of its slot
    pub fn is_alive(&self, entity: Entity) -> bool {
        let slot = entity.index();
        slot < self.alive.len()
            && self.alive[slot]
            && self.generations[slot] == entity.generation()
    }

    /// Number of live entities
    pub fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Highest ID ever issued plus one
    pub fn slot_count(&self) -> usize {
        self.generations.len()
    }

    /// Iterate over all live entities in ID order
    pub fn iter_alive(&self) -> impl Iterator<Item = Entity> + '_ {
        self.alive
            .iter()
            .zip(self.generations.iter())
            .enumerate()
            .filter(|(_, (alive, _))| **alive)
            .map(|(id, (_, generation))| Entity::new(id as u64, *generation))
    }

    /// Release every live entity at once
    ///
    /// Generations survive, so handles taken before the clear stay stale
    /// after their IDs are handed out again.
    pub fn clear(&mut self) {
        for (generation, alive) in self.generations.iter_mut().zip(self.alive.iter_mut()) {
            if *alive {
                *generation = generation.wrapping_add(1).max(1);
                *alive = false;
            }
        }
        self.free_list.clear();
        self.free_list.extend((0..self.generations.len() as u64).rev());
        self.alive_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fresh_ids_start_at_generation_one() {
        let mut allocator = EntityAllocator::new();
        let e0 = allocator.spawn();
        let e1 = allocator.spawn();

        assert_eq!(e0.id().raw(), 0);
        assert_eq!(e1.id().raw(), 1);
        assert_eq!(e0.generation(), 1);
        assert_eq!(allocator.generation(0), 1);
        assert_eq!(allocator.generation(99), 0);
    }

    #[test]
    fn test_despawned_id_is_reused_before_new_allocation() {
        let mut allocator = EntityAllocator::new();
        let e0 = allocator.spawn();
        let _e1 = allocator.spawn();

        assert!(allocator.despawn(e0));
        let reused = allocator.spawn();
        assert_eq!(reused.id(), e0.id());
        assert_eq!(reused.generation(), 2);

        let fresh = allocator.spawn();
        assert_eq!(fresh.id().raw(), 2);
    }

    #[test]
    fn test_generation_increases_on_every_despawn() {
        let mut allocator = EntityAllocator::new();
        let mut entity = allocator.spawn();
        let mut last = allocator.generation(entity.id().raw());

        for _ in 0..10 {
            allocator.despawn(entity);
            let after = allocator.generation(entity.id().raw());
            assert!(after > last);
            last = after;
            entity = allocator.spawn();
            assert_eq!(entity.generation(), last);
        }
    }

    #[test]
    fn test_stale_despawn_is_rejected() {
        let mut allocator = EntityAllocator::new();
        let e = allocator.spawn();
        assert!(allocator.despawn(e));
        assert!(!allocator.despawn(e));
        assert!(!allocator.despawn(Entity::new(50, 1)));
        assert_eq!(allocator.alive_count(), 0);
    }

    #[test]
    fn test_live_ids_are_unique() {
        let mut allocator = EntityAllocator::new();
        let mut live = Vec::new();

        for round in 0..200u64 {
            if round % 3 == 2 {
                let victim = live.remove((round as usize * 7) % live.len());
                allocator.despawn(victim);
            } else {
                live.push(allocator.spawn());
            }
            let ids: HashSet<_> = live.iter().map(|e| e.id()).collect();
            assert_eq!(ids.len(), live.len());
            assert_eq!(allocator.alive_count(), live.len());
        }
        assert!(live.iter().all(|e| allocator.is_alive(*e)));
    }

    #[test]
    fn test_clear_keeps_old_handles_stale() {
        let mut allocator = EntityAllocator::new();
        let a = allocator.spawn();
        let b = allocator.spawn();
        allocator.despawn(b);
        let b2 = allocator.spawn();

        allocator.clear();
        assert_eq!(allocator.alive_count(), 0);
        assert_eq!(allocator.generation(0), 2);
        assert_eq!(allocator.generation(1), 3);

        let fresh = allocator.spawn();
        assert_eq!(fresh.id(), a.id());
        assert_eq!(fresh.generation(), 2);
        assert!(!allocator.is_alive(a));
        assert!(!allocator.is_alive(b2));

        let next = allocator.spawn();
        assert_eq!(next.id(), b.id());
        assert_eq!(allocator.spawn().id().raw(), 2);
    }

    #[test]
    fn test_iter_alive() {
        let mut allocator = EntityAllocator::new();
        let a = allocator.spawn();
        let b = allocator.spawn();
        let c = allocator.spawn();
        allocator.despawn(b);

        let alive: Vec<Entity> = allocator.iter_alive().collect();
        assert_eq!(alive, vec![a, c]);
    }
}
