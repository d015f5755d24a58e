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
//! World configuration
//!
//! Capacity hints applied when stores are created lazily, and the minimum
//! partition length used by parallel transforms.

/// Configuration for world and store sizing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldConfig {
    /// Entity slots reserved up front in the allocator and in each store's
    /// sparse array
    pub initial_entity_capacity: usize,
    /// Dense slots reserved when a store is first created
    pub initial_component_capacity: usize,
    /// Smallest number of dense slots handed to one worker by
    /// `parallel_transform_each`
    pub parallel_min_chunk: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            initial_entity_capacity: 1024,
            initial_component_capacity: 256,
            parallel_min_chunk: 1024,
        }
    }
}

impl WorldConfig {
    /// Create a configuration with custom capacities
    pub fn new(initial_entity_capacity: usize, initial_component_capacity: usize) -> Self {
        WorldConfig {
            initial_entity_capacity,
            initial_component_capacity,
            ..Self::default()
        }
    }

    /// Set the entity capacity hint
    pub fn with_entity_capacity(mut self, capacity: usize) -> Self {
        self.initial_entity_capacity = capacity;
        self
    }

    /// Set the per-store component capacity hint
    pub fn with_component_capacity(mut self, capacity: usize) -> Self {
        self.initial_component_capacity = capacity;
        self
    }

    /// Set the minimum partition length for parallel transforms
    pub fn with_parallel_min_chunk(mut self, chunk: usize) -> Self {
        assert!(chunk >= 1, "Parallel chunk length must be >= 1");
        self.parallel_min_chunk = chunk;
        self
    }
}
