//! Benchmarks for this crate's [`RandomizedTree`].

use criterion::{AxisScale, BenchmarkId, Criterion, PlotConfiguration, black_box};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rbst::RandomizedTree;

/// Batch sizes, doubling from one key.
pub const SIZES: [usize; 15] = [
    1, 2, 4, 8, 16, 32, 64, 128, 256, 512, 1024, 2048, 4096, 8192, 16_384,
];

/// Keys are drawn from `[0, MAX_KEY]`, so large batches contain duplicates.
pub const MAX_KEY: u32 = 100_000;

/// A reproducible batch of random keys.
pub fn keys(size: usize) -> Vec<u32> {
    let mut rng = StdRng::seed_from_u64(0x1234_abcd);
    std::iter::repeat_with(|| rng.random_range(0..=MAX_KEY))
        .take(size)
        .collect()
}

/// Benchmarking a balanced build from an empty tree.
pub fn build_balanced(c: &mut Criterion) {
    let mut group = c.benchmark_group("RandomizedTree Build");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        let values = keys(size);
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| {
                let mut tree = RandomizedTree::with_seed(0x1234_abcd);
                for &v in &values {
                    tree.insert_balanced(v);
                }
                black_box(tree)
            });
        });
    }
}

/// Benchmarking a search for every key of the batch.
pub fn search(c: &mut Criterion) {
    let mut group = c.benchmark_group("RandomizedTree Search");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        let values = keys(size);
        let mut tree = RandomizedTree::with_seed(0x1234_abcd);
        tree.extend(values.iter().copied());

        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| {
                for v in &values {
                    black_box(tree.find(v));
                }
            });
        });
    }
}

/// Benchmarking the unbalanced baseline on sorted input, against balanced
/// insertion of the same keys.
pub fn build_plain_sorted(c: &mut Criterion) {
    let mut group = c.benchmark_group("RandomizedTree Sorted Build");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in [16, 256, 4096] {
        group.bench_with_input(BenchmarkId::new("plain", size), &size, |b, &size| {
            b.iter(|| {
                let mut tree = RandomizedTree::with_seed(0);
                for v in 0..size {
                    tree.insert(v);
                }
                black_box(tree)
            });
        });
        group.bench_with_input(BenchmarkId::new("balanced", size), &size, |b, &size| {
            b.iter(|| {
                let mut tree = RandomizedTree::with_seed(0);
                for v in 0..size {
                    tree.insert_balanced(v);
                }
                black_box(tree)
            });
        });
    }
}

/// Benchmarking access by rank.
pub fn select(c: &mut Criterion) {
    let mut group = c.benchmark_group("RandomizedTree Select");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let mut tree = RandomizedTree::with_seed(0x1234_abcd);
            tree.extend(keys(size));
            let ranks: Vec<usize> = std::iter::repeat_with(|| rng.random_range(0..tree.len()))
                .take(10)
                .collect();

            b.iter(|| {
                for &r in &ranks {
                    black_box(tree.select(r).ok());
                }
            });
        });
    }
}
