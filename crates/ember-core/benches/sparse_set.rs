//! Benchmarks for the generational arena backing asset records and entities.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ember_core::alloc::{
    HashMap,
    sparse_set::{IndexSlot, SparseSet},
};

#[derive(Clone, Copy, Debug, Default)]
struct Body {
    position: (f32, f32),
    velocity: (f32, f32),
    order: u32,
}

fn bench_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_set_push");

    for size in [100, 1000, 10000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut set = SparseSet::new();
                for _ in 0..size {
                    set.push(black_box(Body::default()));
                }
                set
            });
        });
    }

    group.finish();
}

fn bench_lookup_vs_hashmap(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_set_lookup");

    for size in [100, 1000, 10000] {
        group.throughput(Throughput::Elements(size as u64));

        let mut set = SparseSet::new();
        let slots: Vec<IndexSlot> = (0..size).map(|_| set.push(Body::default())).collect();
        group.bench_with_input(BenchmarkId::new("sparse_set", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0;
                for &slot in &slots {
                    sum += set.get(black_box(slot)).position.0;
                }
                sum
            });
        });

        let map: HashMap<u64, Body> = (0..size as u64).map(|id| (id, Body::default())).collect();
        group.bench_with_input(BenchmarkId::new("hashmap", size), &size, |b, &size| {
            b.iter(|| {
                let mut sum = 0.0;
                for id in 0..size as u64 {
                    sum += map[&black_box(id)].position.0;
                }
                sum
            });
        });
    }

    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    c.bench_function("sparse_set_churn_1000", |b| {
        b.iter(|| {
            let mut set = SparseSet::new();
            let slots: Vec<_> = (0..1000).map(|i| set.push(i)).collect();
            for slot in slots.iter().step_by(3) {
                set.remove(*slot);
            }
            for i in 0..333 {
                set.push(black_box(i));
            }
            set.len()
        });
    });
}

criterion_group!(benches, bench_push, bench_lookup_vs_hashmap, bench_churn);
criterion_main!(benches);
