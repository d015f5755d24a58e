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
//! Component traits
//!
//! Components are plain data attached to entities. Types that own an external
//! resource can additionally implement [`Dispose`] and be registered with
//! [`World::register_disposable`](crate::ecs::World::register_disposable) so
//! the resource is released when the owning entity is despawned.

use std::error::Error;

/// Trait that all components must implement
///
/// Components should be plain data structures without behavior.
/// Keep components small and focused for better cache performance.
pub trait Component: 'static + Send + Sync {
    /// Human readable name of the component type, used in errors and logs
    fn type_name() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }
}

/// Error returned by a failing disposal hook
pub type DisposeError = Box<dyn Error + Send + Sync>;

/// Cleanup hook for components owning external resources
///
/// Called once per removed value when its entity is despawned. A returned
/// error is logged and discarded, and the despawn still completes.
///
/// Failures must be reported through the `Err` return. Panicking is outside
/// the contract: the hook runs in the middle of the despawn sweep, so an
/// unwind leaves the entity alive with some of its components already gone.
pub trait Dispose {
    /// Release whatever the component owns
    fn dispose(&mut self) -> Result<(), DisposeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Health(u32);

    impl Component for Health {}

    struct Handle {
        released: bool,
    }

    impl Component for Handle {}

    impl Dispose for Handle {
        fn dispose(&mut self) -> Result<(), DisposeError> {
            if self.released {
                return Err("already released".into());
            }
            self.released = true;
            Ok(())
        }
    }

    #[test]
    fn test_type_name() {
        assert!(Health::type_name().ends_with("Health"));
    }

    #[test]
    fn test_dispose_hook() {
        let mut handle = Handle { released: false };
        assert!(handle.dispose().is_ok());
        assert!(handle.dispose().is_err());
    }
}
