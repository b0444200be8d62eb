//! Criterion benchmarks for batched stepping, sequential vs pooled.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use depot_bench::{reference_profile, ActionStream};
use depot_engine::{BatchedEngine, OwnedBuffers};

const NUM_ENVS: usize = 64;

fn bench_batch_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_step_64_envs");
    for threads in [None, Some(2), Some(4), Some(8)] {
        let label = threads.map_or_else(|| "sequential".to_string(), |n| format!("{n}_threads"));
        let mut engine = BatchedEngine::new(reference_profile(42), NUM_ENVS, threads).unwrap();
        let mut buffers = OwnedBuffers::for_engine(&engine);
        let mut actions = ActionStream::new(3, buffers.actions.len());
        engine.reset(&mut buffers.view()).unwrap();

        group.bench_function(BenchmarkId::from_parameter(label), |b| {
            b.iter(|| {
                buffers.actions.copy_from_slice(actions.next_batch());
                let result = engine.step(&mut buffers.view()).unwrap();
                black_box(&result);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_batch_step);
criterion_main!(benches);
