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
//! Change tracking tests
//!
//! Which writes mark a component changed, and when the marks are reset.

use sparse_ecs::ecs::{Component, Entity, World};
use sparse_ecs::EcsError;

#[derive(Debug, Clone, Copy, PartialEq)]
struct TestComp {
    a: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Velocity(i32);

impl Component for TestComp {}
impl Component for Velocity {}

fn populated(count: usize) -> (World, Vec<Entity>) {
    let mut world = World::new();
    let entities: Vec<Entity> = (0..count)
        .map(|i| {
            let e = world.spawn();
            world.add(e, TestComp { a: i as i32 });
            e
        })
        .collect();
    (world, entities)
}

#[test]
fn test_frame_scenario() {
    let mut world = World::new();
    let e1 = world.spawn();
    let e2 = world.spawn();
    world.add(e1, TestComp { a: 1 });
    world.add(e2, TestComp { a: 2 });

    let mut rows: Vec<(Entity, TestComp)> = world
        .query::<TestComp>()
        .map(|(e, c)| (e, *c))
        .collect();
    rows.sort_by_key(|(e, _)| *e);
    assert_eq!(rows, vec![(e1, TestComp { a: 1 }), (e2, TestComp { a: 2 })]);

    world.begin_frame();
    world.update(e1, TestComp { a: 5 });

    assert!(world.changed::<TestComp>(e1));
    assert!(!world.changed::<TestComp>(e2));
    assert_eq!(world.try_get::<TestComp>(e1), Some(TestComp { a: 5 }));
}

#[test]
fn test_add_is_silent_update_is_not() {
    let (mut world, entities) = populated(3);
    assert!(entities.iter().all(|e| !world.changed::<TestComp>(*e)));

    world.add(entities[0], TestComp { a: 100 });
    assert!(!world.changed::<TestComp>(entities[0]));
    assert_eq!(world.try_get::<TestComp>(entities[0]), Some(TestComp { a: 100 }));

    world.update(entities[1], TestComp { a: 200 });
    assert!(world.changed::<TestComp>(entities[1]));
}

#[test]
fn test_begin_frame_resets_every_write_kind() {
    let (mut world, entities) = populated(8);

    world.update(entities[0], TestComp { a: 0 });
    world.mutate::<TestComp, _>(entities[1], |c| c.a += 1);
    world.transform_each::<TestComp, _>(|_, c| *c);
    for mut handle in world.iterate_ref::<TestComp>() {
        handle.a += 1;
    }
    assert!(entities.iter().all(|e| world.changed::<TestComp>(*e)));

    world.begin_frame();
    assert!(entities.iter().all(|e| !world.changed::<TestComp>(*e)));

    // reads keep the marks clear
    let _ = world.query::<TestComp>().count();
    let _ = world.try_get::<TestComp>(entities[0]);
    let _ = world.get::<TestComp>(entities[0]);
    assert!(entities.iter().all(|e| !world.changed::<TestComp>(*e)));
}

#[test]
fn test_swap_back_preserves_changed_bit() {
    let mut world = World::new();
    let a = world.spawn();
    let b = world.spawn();
    world.add(a, TestComp { a: 1 });
    world.add(b, TestComp { a: 2 });
    world.begin_frame();

    world.update(b, TestComp { a: 3 });
    assert_eq!(world.remove::<TestComp>(a), Some(TestComp { a: 1 }));

    assert!(world.changed::<TestComp>(b));
    assert_eq!(world.try_get::<TestComp>(b), Some(TestComp { a: 3 }));
    assert_eq!(world.entities_with::<TestComp>(), &[b]);
}

#[test]
fn test_despawn_relocation_preserves_changed_bit() {
    let (mut world, entities) = populated(4);
    world.update(entities[3], TestComp { a: 30 });

    world.despawn(entities[0]);
    assert!(world.changed::<TestComp>(entities[3]));
    assert!(!world.changed::<TestComp>(entities[1]));
    assert!(!world.changed::<TestComp>(entities[2]));
}

#[test]
fn test_removing_last_slot_leaves_no_stale_mark() {
    let (mut world, entities) = populated(2);
    world.update(entities[1], TestComp { a: 9 });
    world.remove::<TestComp>(entities[1]);

    // re-adding lands in the vacated trailing slot
    world.add(entities[1], TestComp { a: 1 });
    assert!(!world.changed::<TestComp>(entities[1]));
    assert!(!world.changed::<TestComp>(entities[0]));
}

#[test]
fn test_span_mutation_does_not_mark() {
    let (mut world, entities) = populated(5);

    {
        let mut span = world.get_span::<TestComp>();
        assert_eq!(span.len(), 5);
        for (_, component) in span.iter_mut() {
            component.a *= 10;
        }
    }

    assert!(entities.iter().all(|e| !world.changed::<TestComp>(*e)));
    assert_eq!(world.try_get::<TestComp>(entities[4]), Some(TestComp { a: 40 }));

    world.mutate::<TestComp, _>(entities[4], |_| {});
    assert!(world.changed::<TestComp>(entities[4]));
}

#[test]
fn test_iterate_ref_marks_only_written_slots() {
    let (mut world, entities) = populated(6);

    for mut handle in world.iterate_ref::<TestComp>() {
        if handle.a % 2 == 0 {
            handle.a = -handle.a;
        }
    }

    for (i, e) in entities.iter().enumerate() {
        assert_eq!(world.changed::<TestComp>(*e), i % 2 == 0);
    }
}

#[test]
fn test_iterate_ref2_marks_both_stores() {
    let (mut world, entities) = populated(5);
    world.add(entities[1], Velocity(10));
    world.add(entities[3], Velocity(30));

    world.iterate_ref2::<TestComp, Velocity, _>(|_, comp, vel| comp.a += vel.0);

    assert_eq!(world.try_get::<TestComp>(entities[3]), Some(TestComp { a: 33 }));
    for (i, e) in entities.iter().enumerate() {
        let joined = i == 1 || i == 3;
        assert_eq!(world.changed::<TestComp>(*e), joined);
        assert_eq!(world.changed::<Velocity>(*e), joined);
    }
}

#[test]
fn test_transform_each_marks_unchanged_values() {
    let (mut world, entities) = populated(3);
    world.transform_each::<TestComp, _>(|_, c| *c);
    assert!(entities.iter().all(|e| world.changed::<TestComp>(*e)));
}

#[test]
fn test_get_ref_does_not_mark() {
    let (mut world, entities) = populated(1);
    world.get_ref::<TestComp>(entities[0]).unwrap().a = 77;
    assert!(!world.changed::<TestComp>(entities[0]));

    let missing = world.get_ref::<Velocity>(entities[0]);
    assert!(matches!(missing, Err(EcsError::MissingComponent { .. })));
}

#[test]
fn test_mutate_absent_is_silent() {
    let (mut world, entities) = populated(1);
    let ran = world.mutate::<Velocity, _>(entities[0], |v| v.0 = 1);
    assert!(!ran);
    assert!(!world.has::<Velocity>(entities[0]));
    assert!(!world.changed::<Velocity>(entities[0]));
}
