//! Benchmarks for merging and reversing mapping sets.
//!
//! Each benchmark works on a chain of two synthetic sets where every left class has a
//! continuation on the right, with a handful of fields and methods per class.

extern crate mapscope;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use mapscope::{
    merge::{MappingSetMerger, MergeConfig},
    model::MappingSet,
    signatures::{FieldSignature, MethodSignature},
};
use std::{hint::black_box, sync::Arc};

fn chained_sets(classes: usize) -> (Arc<MappingSet>, Arc<MappingSet>) {
    let left = MappingSet::new();
    let right = MappingSet::new();
    for index in 0..classes {
        let obfuscated = format!("a{index}");
        let intermediate = format!("net/example/Intermediate{index}");

        let class = left.create_top_level_class_mapping(&obfuscated, &intermediate);
        let next = right.create_top_level_class_mapping(&intermediate, &format!("com/example/Final{index}"));
        for member in 0..8 {
            class.create_field_mapping(FieldSignature::untyped(format!("f{member}")), &format!("field{member}"));
            next.create_field_mapping(FieldSignature::untyped(format!("field{member}")), &format!("value{member}"));

            let signature = MethodSignature::parse(&format!("m{member}(L{obfuscated};I)V")).unwrap();
            class.create_method_mapping(signature, &format!("method{member}"));
            let signature =
                MethodSignature::parse(&format!("method{member}(L{intermediate};I)V")).unwrap();
            next.create_method_mapping(signature, &format!("run{member}"))
                .create_parameter_mapping(1, "count");
        }
    }
    (left, right)
}

/// Benchmark a full merge with the default worker pool.
fn bench_merge_default(c: &mut Criterion) {
    let (left, right) = chained_sets(500);

    c.bench_function("merge_500_classes", |b| {
        b.iter(|| {
            let merged = left.merge(black_box(&right)).unwrap();
            black_box(merged)
        });
    });
}

/// Benchmark how the merge scales with the number of workers.
fn bench_merge_parallelism(c: &mut Criterion) {
    let (left, right) = chained_sets(500);
    let mut group = c.benchmark_group("merge_parallelism");

    for threads in [1, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &threads| {
            b.iter(|| {
                let config = MergeConfig::builder().with_parallelism(threads).build();
                let merged = MappingSetMerger::new(&left, &right, config).merge().unwrap();
                black_box(merged)
            });
        });
    }
    group.finish();
}

/// Benchmark reversing a populated set.
fn bench_reverse(c: &mut Criterion) {
    let (left, _) = chained_sets(500);

    c.bench_function("reverse_500_classes", |b| {
        b.iter(|| {
            let reversed = black_box(&left).reverse();
            black_box(reversed)
        });
    });
}

criterion_group!(
    benches,
    bench_merge_default,
    bench_merge_parallelism,
    bench_reverse,
);
criterion_main!(benches);
