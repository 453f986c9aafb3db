//! Benchmark: parallel Gaussian elimination scaling
//!
//! Measures how the solver scales with:
//! 1. Matrix dimension N (fixed worker count)
//! 2. Number of workers (fixed N)
//! 3. Chunk size and schedule (fixed N and workers)
//!
//! Run with:
//!   cargo bench -p math-gauss --bench elimination_scaling

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use math_gauss::generate::diagonally_dominant_system;
use math_gauss::{GaussConfig, GaussSolver, Schedule, SystemStore};
use std::time::Duration;

fn system(n: usize) -> SystemStore<f32> {
    diagonally_dominant_system(n, 42).expect("benchmark dimension within capacity")
}

/// Roughly 2N³/3 flops for the forward elimination
fn elimination_flops(n: usize) -> u64 {
    (2 * n * n * n / 3) as u64
}

fn bench_dimension(c: &mut Criterion) {
    let mut group = c.benchmark_group("gauss_dimension");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(20);

    let solver = GaussSolver::new(GaussConfig::new(4, 5)).expect("worker pool");
    for &n in &[64, 128, 256, 512] {
        let input = system(n);
        group.throughput(Throughput::Elements(elimination_flops(n)));
        group.bench_with_input(BenchmarkId::new("workers_4", n), &input, |b, input| {
            b.iter(|| {
                let mut store = input.clone();
                solver.solve(&mut store).expect("dominant system is solvable");
                black_box(store.into_solution())
            });
        });
    }

    group.finish();
}

fn bench_workers(c: &mut Criterion) {
    let mut group = c.benchmark_group("gauss_workers");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(20);

    let n = 384;
    let input = system(n);
    for &workers in &[1, 2, 4, 8] {
        let solver = GaussSolver::new(GaussConfig::new(workers, 5)).expect("worker pool");
        group.bench_with_input(BenchmarkId::new("n_384", workers), &input, |b, input| {
            b.iter(|| {
                let mut store = input.clone();
                solver.solve(&mut store).expect("dominant system is solvable");
                black_box(store.into_solution())
            });
        });
    }

    group.finish();
}

fn bench_chunking(c: &mut Criterion) {
    let mut group = c.benchmark_group("gauss_chunking");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(20);

    let n = 384;
    let input = system(n);
    for (label, chunk_size, schedule) in [
        ("dynamic_1", 1, Schedule::Dynamic),
        ("dynamic_5", 5, Schedule::Dynamic),
        ("dynamic_32", 32, Schedule::Dynamic),
        ("static", 5, Schedule::Static),
    ] {
        let config = GaussConfig {
            schedule,
            ..GaussConfig::new(4, chunk_size)
        };
        let solver = GaussSolver::new(config).expect("worker pool");
        group.bench_function(label, |b| {
            b.iter(|| {
                let mut store = input.clone();
                solver.solve(&mut store).expect("dominant system is solvable");
                black_box(store.into_solution())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_dimension, bench_workers, bench_chunking);
criterion_main!(benches);
