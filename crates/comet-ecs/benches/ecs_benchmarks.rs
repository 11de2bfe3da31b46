//! Sparse-set storage benchmarks.
//!
//! Measures the operations a frame leans on: adding components to fresh
//! entities, iterating a full store, random-access lookups by entity, and
//! despawning with swap-and-pop removal.
//!
//! Run with: `cargo bench --bench ecs_benchmarks`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use comet_ecs::entity::EntityId;
use comet_ecs::world::World;

// ---------------------------------------------------------------------------
// Benchmark component types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, PartialEq)]
struct Velocity {
    dx: f32,
    dy: f32,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn setup_world(entity_count: usize) -> (World, Vec<EntityId>) {
    let mut world = World::new();
    world.register_component::<Position>("position");
    world.register_component::<Velocity>("velocity");

    let mut entities = Vec::with_capacity(entity_count);
    for i in 0..entity_count {
        let e = world.spawn();
        world
            .add_component(e, Position { x: i as f32, y: 0.0 })
            .expect("add position");
        world
            .add_component(e, Velocity { dx: 1.0, dy: 0.5 })
            .expect("add velocity");
        entities.push(e);
    }
    (world, entities)
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_components");
    for &count in &[1_000usize, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| black_box(setup_world(count)));
        });
    }
    group.finish();
}

fn bench_iterate(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterate_velocity");
    for &count in &[1_000usize, 10_000] {
        let (mut world, _) = setup_world(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                for (_, vel) in world.iter_component_mut::<Velocity>().expect("registered") {
                    vel.dx = black_box(vel.dx * 1.0001);
                }
            });
        });
    }
    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let (world, entities) = setup_world(10_000);
    c.bench_function("get_component_10k", |b| {
        b.iter(|| {
            let mut sum = 0.0f32;
            for &e in entities.iter().step_by(7) {
                sum += world.get_component::<Position>(e).expect("present").x;
            }
            black_box(sum)
        });
    });
}

fn bench_despawn(c: &mut Criterion) {
    c.bench_function("despawn_half_10k", |b| {
        b.iter_batched(
            || setup_world(10_000),
            |(mut world, entities)| {
                for &e in entities.iter().step_by(2) {
                    world.despawn(e).expect("alive");
                }
                black_box(world.entity_count())
            },
            criterion::BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, bench_add, bench_iterate, bench_lookup, bench_despawn);
criterion_main!(benches);
