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
//! Bulk and parallel transform tests

use sparse_ecs::ecs::{Component, Entity, World};
use sparse_ecs::WorldConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Particle {
    x: f64,
    vx: f64,
}

impl Component for Particle {}

fn particles(world: &mut World, count: usize) -> Vec<Entity> {
    world.reserve::<Particle>(count, count);
    (0..count)
        .map(|i| {
            let e = world.spawn();
            world.add(
                e,
                Particle {
                    x: i as f64,
                    vx: 1.0 + (i % 7) as f64,
                },
            );
            e
        })
        .collect()
}

fn step(_: Entity, p: &Particle) -> Particle {
    Particle {
        x: p.x + p.vx * 0.5,
        vx: p.vx,
    }
}

#[test]
fn test_parallel_matches_sequential() {
    let config = WorldConfig::default().with_parallel_min_chunk(16);
    let mut sequential = World::with_config(config.clone());
    let mut parallel = World::with_config(config);
    let seq_entities = particles(&mut sequential, 5_000);
    let par_entities = particles(&mut parallel, 5_000);

    for _ in 0..3 {
        sequential.transform_each::<Particle, _>(step);
        parallel.parallel_transform_each::<Particle, _>(step);
    }

    for (s, p) in seq_entities.iter().zip(par_entities.iter()) {
        assert_eq!(sequential.try_get::<Particle>(*s), parallel.try_get::<Particle>(*p));
    }
}

#[test]
fn test_parallel_marks_every_slot() {
    // chunk of 1 forces neighbouring slots of one bitset word onto different workers
    let mut world = World::with_config(WorldConfig::default().with_parallel_min_chunk(1));
    let entities = particles(&mut world, 10_003);
    world.begin_frame();

    world.parallel_transform_each::<Particle, _>(|_, p| *p);

    assert!(entities.iter().all(|e| world.changed::<Particle>(*e)));
}

#[test]
fn test_parallel_sees_entity_per_slot() {
    let mut world = World::with_config(WorldConfig::default().with_parallel_min_chunk(8));
    let entities = particles(&mut world, 1_000);

    world.parallel_transform_each::<Particle, _>(|entity, p| Particle {
        x: entity.id().raw() as f64,
        vx: p.vx,
    });

    for e in &entities {
        assert_eq!(world.get::<Particle>(*e).map(|p| p.x), Some(e.id().raw() as f64));
    }
}

#[test]
fn test_parallel_on_missing_store_is_noop() {
    let mut world = World::new();
    world.parallel_transform_each::<Particle, _>(step);
    assert_eq!(world.count::<Particle>(), 0);
}
