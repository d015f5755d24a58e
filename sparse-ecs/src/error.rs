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
//! Error types for the ECS storage engine
//!
//! Absence of a component is an ordinary outcome for almost every accessor
//! and is reported through `Option`/`bool`. Only the direct mutable accessor
//! treats it as an error.

use crate::ecs::Entity;
use thiserror::Error;

/// Errors produced by world and storage operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The entity holds no component of the requested type.
    #[error("entity {entity} has no component of type {component}")]
    MissingComponent {
        /// Entity that was looked up.
        entity: Entity,
        /// Type name of the missing component.
        component: &'static str,
    },

    /// A component's disposal hook failed.
    ///
    /// Only ever logged; despawn always completes.
    #[error("failed to dispose {component}: {reason}")]
    Disposal {
        /// Type name of the component being disposed.
        component: &'static str,
        /// Message from the failing hook.
        reason: String,
    },
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, EcsError>;
