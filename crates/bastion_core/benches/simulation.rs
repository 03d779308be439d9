//! Simulation benchmarks for bastion_core.
//!
//! Run with: `cargo bench -p bastion_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use bastion_core::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// A mid-game economy: every POI conquered, a full forge queue.
fn busy_simulation() -> Simulation {
    let mut sim = Simulation::with_seed(42);
    let poi_ids: Vec<PoiId> = sim.catalog().pois.iter().map(|p| p.id.clone()).collect();
    for poi in &poi_ids {
        sim.conquer(poi.as_str());
    }
    sim.state_mut()
        .resources
        .set(ResourceKind::Gold, Fixed::from_num(100_000));
    sim.state_mut()
        .resources
        .set(ResourceKind::Wood, Fixed::from_num(100_000));
    for _ in 0..5 {
        let _ = sim.enqueue("RCP3");
    }
    sim
}

pub fn world_tick_benchmark(c: &mut Criterion) {
    c.bench_function("world_tick_1000", |b| {
        b.iter_batched(
            busy_simulation,
            |mut sim| {
                for _ in 0..1000 {
                    black_box(sim.advance_world_tick());
                }
                sim
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

pub fn forge_tick_benchmark(c: &mut Criterion) {
    c.bench_function("forge_tick_1000", |b| {
        b.iter_batched(
            busy_simulation,
            |mut sim| {
                for _ in 0..1000 {
                    black_box(sim.advance_forge_tick());
                }
                sim
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

pub fn state_hash_benchmark(c: &mut Criterion) {
    let sim = busy_simulation();
    c.bench_function("state_hash", |b| b.iter(|| black_box(sim.state_hash())));
}

criterion_group!(
    benches,
    world_tick_benchmark,
    forge_tick_benchmark,
    state_hash_benchmark
);
criterion_main!(benches);
