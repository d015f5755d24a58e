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
//! Entity Component System (ECS) storage engine
//!
//! This module provides:
//! - Entity allocation with generation-tagged, recycled IDs
//! - Sparse-set component storage with per-slot change bits
//! - Single and multi-component queries driven by the smallest store
//! - Zero-allocation mutable iteration and parallel transforms via Rayon
//! - A deferred command buffer for structural changes during iteration

mod allocator;
mod changed;
mod commands;
mod component;
mod entity;
mod iter;
mod query;
mod storage;
mod world;

pub use allocator::EntityAllocator;
pub use changed::ChangedBits;
pub use commands::CommandBuffer;
pub use component::{Component, Dispose, DisposeError};
pub use entity::{Entity, EntityId};
pub use iter::{IterRef, Mut, Span};
pub use query::{Query, Query2, Query3};
pub use storage::{ComponentStorage, SparseSet};
pub use world::World;
