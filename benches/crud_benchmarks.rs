use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use mway_tree::BTree;
use std::collections::BTreeSet;

const N: usize = 10_000;

/// Orders to sweep: narrow nodes stress rebalancing, wide nodes stress
/// in-node search.
const ORDERS: [usize; 3] = [4, 16, 64];

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for a deterministic pseudo-random sequence.
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

fn filled_tree(order: usize, keys: &[i64]) -> BTree<i64> {
    let mut tree = BTree::new(order);
    for &k in keys {
        let _ = tree.insert(k);
    }
    tree
}

// ─── Insert benchmarks ──────────────────────────────────────────────────────

fn bench_insert_ordered(c: &mut Criterion) {
    let keys = ordered_keys(N);
    let mut group = c.benchmark_group("insert_ordered");

    for order in ORDERS {
        group.bench_function(BenchmarkId::new(format!("BTree/m={order}"), N), |b| {
            b.iter(|| filled_tree(order, &keys));
        });
    }

    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
        b.iter(|| {
            let mut set = BTreeSet::new();
            for &k in &keys {
                set.insert(k);
            }
            set
        });
    });

    group.finish();
}

fn bench_insert_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("insert_random");

    for order in ORDERS {
        group.bench_function(BenchmarkId::new(format!("BTree/m={order}"), N), |b| {
            b.iter(|| filled_tree(order, &keys));
        });
    }

    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
        b.iter(|| {
            let mut set = BTreeSet::new();
            for &k in &keys {
                set.insert(k);
            }
            set
        });
    });

    group.finish();
}

// ─── Lookup benchmarks ──────────────────────────────────────────────────────

fn bench_contains(c: &mut Criterion) {
    let keys = random_keys(N);
    let bt_set: BTreeSet<i64> = keys.iter().copied().collect();

    let mut group = c.benchmark_group("contains");

    for order in ORDERS {
        let tree = filled_tree(order, &keys);
        group.bench_function(BenchmarkId::new(format!("BTree/m={order}"), N), |b| {
            b.iter(|| {
                let mut hits = 0usize;
                for k in &keys {
                    if tree.contains(k) {
                        hits += 1;
                    }
                }
                hits
            });
        });
    }

    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for k in &keys {
                if bt_set.contains(k) {
                    hits += 1;
                }
            }
            hits
        });
    });

    group.finish();
}

// ─── Remove benchmarks ──────────────────────────────────────────────────────

fn bench_remove(c: &mut Criterion) {
    let keys = random_keys(N);

    let mut group = c.benchmark_group("remove");

    for order in ORDERS {
        group.bench_function(BenchmarkId::new(format!("BTree/m={order}"), N), |b| {
            b.iter_batched(
                || filled_tree(order, &keys),
                |mut tree| {
                    for k in &keys {
                        let _ = tree.remove(k);
                    }
                    tree
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
        b.iter_batched(
            || keys.iter().copied().collect::<BTreeSet<i64>>(),
            |mut set| {
                for k in &keys {
                    set.remove(k);
                }
                set
            },
            criterion::BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_insert_ordered, bench_insert_random, bench_contains, bench_remove);
criterion_main!(benches);
