//! Benchmarks for mantle-collections
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::HashMap;

use mantle_collections::{AssocStore, KeyedList, ObservableMap, SeqStore};

// =============================================================================
// OBSERVABLE MAP BENCHMARKS
// =============================================================================

fn bench_map_set_unobserved(c: &mut Criterion) {
    let mut map = ObservableMap::new(HashMap::<u64, u64>::new());
    let mut i = 0u64;
    c.bench_function("observable_map_set_unobserved", |b| {
        b.iter(|| {
            map.set(black_box(i % 1024), i);
            i += 1;
        })
    });
}

fn bench_map_set_observed(c: &mut Criterion) {
    let mut map = ObservableMap::new(HashMap::<u64, u64>::new());
    // One observer forces the old-value pre-capture and the clones.
    let sub = map.subscribe(|note| {
        black_box(note.value);
    });
    let mut i = 0u64;
    c.bench_function("observable_map_set_observed", |b| {
        b.iter(|| {
            map.set(black_box(i % 1024), i);
            i += 1;
        })
    });
    sub.cancel();
}

fn bench_map_remove_miss(c: &mut Criterion) {
    let mut map = ObservableMap::new(HashMap::<u64, u64>::new());
    c.bench_function("observable_map_remove_miss", |b| {
        b.iter(|| black_box(map.remove(&black_box(1))))
    });
}

// =============================================================================
// KEYED LIST BENCHMARKS
// =============================================================================

fn bench_keyed_push(c: &mut Criterion) {
    c.bench_function("keyed_list_push_1k", |b| {
        b.iter_with_setup(
            || KeyedList::new(Vec::<u64>::new(), |item: &u64| *item).unwrap(),
            |mut list| {
                for i in 0..1024u64 {
                    list.push(black_box(i)).unwrap();
                }
                list
            },
        )
    });
}

fn bench_keyed_remove_by_key(c: &mut Criterion) {
    c.bench_function("keyed_list_remove_by_key", |b| {
        b.iter_with_setup(
            || {
                let mut list = KeyedList::new(Vec::<u64>::new(), |item: &u64| *item).unwrap();
                for i in 0..256u64 {
                    list.push(i).unwrap();
                }
                list
            },
            |mut list| {
                for i in 0..256u64 {
                    black_box(list.remove_by_key(&i));
                }
            },
        )
    });
}

criterion_group!(
    benches,
    bench_map_set_unobserved,
    bench_map_set_observed,
    bench_map_remove_miss,
    bench_keyed_push,
    bench_keyed_remove_by_key
);
criterion_main!(benches);
