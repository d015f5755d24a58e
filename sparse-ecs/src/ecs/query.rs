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
//! Query and join iterators
//!
//! Queries are lazy and restartable: cloning a query, or asking the World for
//! a new one, starts from the first dense slot again. Joins drive iteration
//! from the smallest participating store and probe the others through their
//! sparse arrays, so a join costs O(min dense size) rather than a product.

use crate::ecs::component::Component;
use crate::ecs::storage::SparseSet;
use crate::ecs::Entity;

/// Single-component query yielding `(entity, &component)`
pub struct Query<'w, T: Component> {
    storage: Option<&'w SparseSet<T>>,
    index: usize,
}

impl<'w, T: Component> Query<'w, T> {
    pub(crate) fn new(storage: Option<&'w SparseSet<T>>) -> Self {
        Query { storage, index: 0 }
    }
}

impl<'w, T: Component> Clone for Query<'w, T> {
    fn clone(&self) -> Self {
        Query {
            storage: self.storage,
            index: self.index,
        }
    }
}

impl<'w, T: Component> Iterator for Query<'w, T> {
    type Item = (Entity, &'w T);

    fn next(&mut self) -> Option<Self::Item> {
        let storage = self.storage?;
        if self.index >= storage.len() {
            return None;
        }
        let index = self.index;
        self.index += 1;
        Some((
            storage.entity_by_dense_index(index),
            storage.component_by_dense_index(index),
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .storage
            .map_or(0, |s| s.len().saturating_sub(self.index));
        (remaining, Some(remaining))
    }
}

impl<'w, T: Component> ExactSizeIterator for Query<'w, T> {}

/// Two-way join yielding `(entity, &a, &b)`
pub struct Query2<'w, A: Component, B: Component> {
    a: Option<&'w SparseSet<A>>,
    b: Option<&'w SparseSet<B>>,
    drive_a: bool,
    index: usize,
}

impl<'w, A: Component, B: Component> Query2<'w, A, B> {
    pub(crate) fn new(a: Option<&'w SparseSet<A>>, b: Option<&'w SparseSet<B>>) -> Self {
        let drive_a = match (a, b) {
            (Some(a), Some(b)) => a.len() <= b.len(),
            _ => true,
        };
        Query2 { a, b, drive_a, index: 0 }
    }
}

impl<'w, A: Component, B: Component> Clone for Query2<'w, A, B> {
    fn clone(&self) -> Self {
        Query2 {
            a: self.a,
            b: self.b,
            drive_a: self.drive_a,
            index: self.index,
        }
    }
}

impl<'w, A: Component, B: Component> Iterator for Query2<'w, A, B> {
    type Item = (Entity, &'w A, &'w B);

    fn next(&mut self) -> Option<Self::Item> {
        let (a, b) = (self.a?, self.b?);

        if self.drive_a {
            while self.index < a.len() {
                let index = self.index;
                self.index += 1;
                let entity = a.entity_by_dense_index(index);
                if let Some(other) = b.get(entity) {
                    return Some((entity, a.component_by_dense_index(index), other));
                }
            }
        } else {
            while self.index < b.len() {
                let index = self.index;
                self.index += 1;
                let entity = b.entity_by_dense_index(index);
                if let Some(other) = a.get(entity) {
                    return Some((entity, other, b.component_by_dense_index(index)));
                }
            }
        }
        None
    }
}

/// Which operand of a three-way join drives iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Driver {
    First,
    Second,
    Third,
}

/// Three-way join yielding `(entity, &a, &b, &c)`
pub struct Query3<'w, A: Component, B: Component, C: Component> {
    a: Option<&'w SparseSet<A>>,
    b: Option<&'w SparseSet<B>>,
    c: Option<&'w SparseSet<C>>,
    driver: Driver,
    index: usize,
}

impl<'w, A: Component, B: Component, C: Component> Query3<'w, A, B, C> {
    pub(crate) fn new(
        a: Option<&'w SparseSet<A>>,
        b: Option<&'w SparseSet<B>>,
        c: Option<&'w SparseSet<C>>,
    ) -> Self {
        let driver = match (a, b, c) {
            (Some(a), Some(b), Some(c)) => {
                let (la, lb, lc) = (a.len(), b.len(), c.len());
                if la <= lb && la <= lc {
                    Driver::First
                } else if lb <= lc {
                    Driver::Second
                } else {
                    Driver::Third
                }
            }
            _ => Driver::First,
        };
        Query3 {
            a,
            b,
            c,
            driver,
            index: 0,
        }
    }
}

impl<'w, A: Component, B: Component, C: Component> Clone for Query3<'w, A, B, C> {
    fn clone(&self) -> Self {
        Query3 {
            a: self.a,
            b: self.b,
            c: self.c,
            driver: self.driver,
            index: self.index,
        }
    }
}

impl<'w, A: Component, B: Component, C: Component> Iterator for Query3<'w, A, B, C> {
    type Item = (Entity, &'w A, &'w B, &'w C);

    fn next(&mut self) -> Option<Self::Item> {
        let (a, b, c) = (self.a?, self.b?, self.c?);
        let len = match self.driver {
            Driver::First => a.len(),
            Driver::Second => b.len(),
            Driver::Third => c.len(),
        };

        while self.index < len {
            let index = self.index;
            self.index += 1;
            let entity = match self.driver {
                Driver::First => a.entity_by_dense_index(index),
                Driver::Second => b.entity_by_dense_index(index),
                Driver::Third => c.entity_by_dense_index(index),
            };
            if let (Some(ca), Some(cb), Some(cc)) = (a.get(entity), b.get(entity), c.get(entity)) {
                return Some((entity, ca, cb, cc));
            }
        }
        None
    }
}

/// Visit every entity present in both stores with mutable access to both
/// components, marking both slots changed
///
/// The smaller store drives the walk and the other is probed.
pub(crate) fn join_mut<A, B, F>(a: &mut SparseSet<A>, b: &mut SparseSet<B>, mut f: F)
where
    A: Component,
    B: Component,
    F: FnMut(Entity, &mut A, &mut B),
{
    if a.len() <= b.len() {
        for index in 0..a.len() {
            let entity = a.entity_by_dense_index(index);
            if let Some(other) = b.dense_index(entity) {
                f(
                    entity,
                    a.component_ref_by_dense_index(index),
                    b.component_ref_by_dense_index(other),
                );
                a.mark_changed_by_dense_index(index);
                b.mark_changed_by_dense_index(other);
            }
        }
    } else {
        for index in 0..b.len() {
            let entity = b.entity_by_dense_index(index);
            if let Some(other) = a.dense_index(entity) {
                f(
                    entity,
                    a.component_ref_by_dense_index(other),
                    b.component_ref_by_dense_index(index),
                );
                a.mark_changed_by_dense_index(other);
                b.mark_changed_by_dense_index(index);
            }
        }
    }
}
