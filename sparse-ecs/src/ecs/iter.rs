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
//! Zero-allocation iteration over dense storage
//!
//! [`IterRef`] hands out [`Mut`] handles pointing straight into a store's
//! dense component array. Reading through a handle is free; the first mutable
//! dereference sets the slot's change bit. [`Span`] exposes the raw dense
//! arrays and never touches change state.
//!
//! Both borrow the store mutably, so the store cannot be resized while either
//! is alive.

use crate::ecs::changed::ChangedBits;
use crate::ecs::Entity;
use std::ops::{Deref, DerefMut};
use std::slice;

/// Mutable handle to one dense slot that marks the slot changed on write
pub struct Mut<'a, T> {
    entity: Entity,
    index: usize,
    value: &'a mut T,
    changed: &'a ChangedBits,
}

impl<'a, T> Mut<'a, T> {
    /// Entity owning the slot
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Dense index of the slot
    pub fn dense_index(&self) -> usize {
        self.index
    }
}

impl<'a, T> Deref for Mut<'a, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &*self.value
    }
}

impl<'a, T> DerefMut for Mut<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.changed.set_atomic(self.index);
        &mut *self.value
    }
}

/// Iterator over change-marking handles of one store
pub struct IterRef<'a, T> {
    entities: slice::Iter<'a, Entity>,
    components: slice::IterMut<'a, T>,
    changed: &'a ChangedBits,
    index: usize,
}

impl<'a, T> IterRef<'a, T> {
    pub(crate) fn new(
        entities: &'a [Entity],
        components: &'a mut [T],
        changed: &'a ChangedBits,
    ) -> Self {
        debug_assert_eq!(entities.len(), components.len());
        IterRef {
            entities: entities.iter(),
            components: components.iter_mut(),
            changed,
            index: 0,
        }
    }
}

impl<'a, T> Iterator for IterRef<'a, T> {
    type Item = Mut<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let entity = *self.entities.next()?;
        let value = self.components.next()?;
        let index = self.index;
        self.index += 1;
        Some(Mut {
            entity,
            index,
            value,
            changed: self.changed,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.components.size_hint()
    }
}

impl<'a, T> ExactSizeIterator for IterRef<'a, T> {}

/// Raw view of a store's parallel dense arrays
///
/// Writes through `components` are invisible to change tracking.
pub struct Span<'a, T> {
    /// Dense entity array
    pub entities: &'a [Entity],
    /// Dense component array, index-aligned with `entities`
    pub components: &'a mut [T],
}

impl<'a, T> Span<'a, T> {
    pub(crate) fn new(entities: &'a [Entity], components: &'a mut [T]) -> Self {
        debug_assert_eq!(entities.len(), components.len());
        Span { entities, components }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Check if the span is empty
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Iterate over `(entity, &mut component)` pairs
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> + '_ {
        self.entities.iter().copied().zip(self.components.iter_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mut_marks_only_on_write() {
        let entities = [Entity::new(0, 1), Entity::new(1, 1), Entity::new(2, 1)];
        let mut values = [1, 2, 3];
        let changed = ChangedBits::with_capacity(3);

        for mut handle in IterRef::new(&entities, &mut values, &changed) {
            if *handle == 2 {
                *handle = 20;
            }
        }

        assert_eq!(values, [1, 20, 3]);
        assert!(!changed.get(0));
        assert!(changed.get(1));
        assert!(!changed.get(2));
    }

    #[test]
    fn test_iter_ref_exact_size() {
        let entities = [Entity::new(0, 1), Entity::new(1, 1)];
        let mut values = [0u8, 0];
        let changed = ChangedBits::with_capacity(2);
        let iter = IterRef::new(&entities, &mut values, &changed);
        assert_eq!(iter.len(), 2);
    }

    #[test]
    fn test_span_iter_mut() {
        let entities = [Entity::new(4, 1), Entity::new(9, 2)];
        let mut values = [1.0f32, 2.0];
        let mut span = Span::new(&entities, &mut values);

        for (entity, value) in span.iter_mut() {
            *value += entity.id().raw() as f32;
        }
        assert_eq!(span.len(), 2);
        assert_eq!(values, [5.0, 11.0]);
    }
}
