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
//! # Sparse ECS
//!
//! The entity-component storage and query engine behind a frame-driven game
//! runtime. An external scheduler calls [`World::begin_frame`] once per frame
//! and then runs its systems against the world.
//!
//! ## Features
//!
//! - **Generational entities**: despawned IDs are recycled with a bumped generation
//! - **Sparse-set storage**: O(1) insert, remove and lookup per component type
//! - **Change tracking**: per-slot "written this frame" bits, reset at frame start
//! - **Joins**: two- and three-way queries driven by the smallest store
//! - **Parallelization**: optional Rayon-backed `parallel_transform_each`
//!
//! ## Example
//!
//! ```rust
//! use sparse_ecs::ecs::{Component, World};
//!
//! #[derive(Debug, Clone, Copy, PartialEq)]
//! struct Position(f32);
//! impl Component for Position {}
//!
//! let mut world = World::new();
//! let entity = world.spawn();
//! world.add(entity, Position(1.0));
//!
//! world.begin_frame();
//! world.mutate::<Position, _>(entity, |p| p.0 += 1.0);
//! assert!(world.changed::<Position>(entity));
//! assert_eq!(world.try_get::<Position>(entity), Some(Position(2.0)));
//! ```

#![warn(missing_docs)]

/// Entity Component System implementation
pub mod ecs;

/// World configuration
pub mod config;

/// Error types
pub mod error;

pub use config::WorldConfig;
pub use ecs::{Component, Entity, World};
pub use error::{EcsError, Result};
