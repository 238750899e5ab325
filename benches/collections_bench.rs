//! Benchmarks for the sparse vector, the ordered hash table and the codecs
//!
//! Each group runs against `std::collections` where a comparable baseline exists.

use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput,
};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use ordered_collections::{HashTable, Value, Vector, TYPE_I64, TYPE_STRING};

// =============================================================================
// BENCHMARK CONFIGURATION
// =============================================================================

const SMALL_SIZE: usize = 100;
const MEDIUM_SIZE: usize = 1_000;
const LARGE_SIZE: usize = 10_000;
const SIZES: &[usize] = &[SMALL_SIZE, MEDIUM_SIZE, LARGE_SIZE];

fn keys(size: usize) -> Vec<String> {
    (0..size).map(|i| format!("key_{:08}", i)).collect()
}

fn string_table(size: usize) -> HashTable<'static> {
    let mut table = HashTable::new(&TYPE_STRING, size);
    for (i, key) in keys(size).into_iter().enumerate() {
        table
            .add_entry(Value::from(key), Value::I64(i as i64), None)
            .unwrap();
    }
    table
}

// =============================================================================
// VECTOR BENCHMARKS
// =============================================================================

fn bench_vector_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("vector_fill");
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(2));

    for &size in SIZES {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("std::Vec", size), &size, |b, &size| {
            b.iter(|| {
                let mut vec = Vec::with_capacity(size);
                for i in 0..size {
                    vec.push(black_box(i as i64));
                }
                black_box(vec)
            });
        });

        group.bench_with_input(BenchmarkId::new("add_entry", size), &size, |b, &size| {
            b.iter(|| {
                let mut vector = Vector::with_capacity(&TYPE_I64, size).unwrap();
                for i in 0..size {
                    vector.add_entry(None, Value::I64(black_box(i as i64)), None).unwrap();
                }
                black_box(vector)
            });
        });

        // Filling from the top down re-threads every neighbour.
        group.bench_with_input(BenchmarkId::new("set_entry_reverse", size), &size, |b, &size| {
            b.iter(|| {
                let mut vector = Vector::with_capacity(&TYPE_I64, size).unwrap();
                for i in (0..size).rev() {
                    vector.set_entry(i, None, Value::I64(black_box(i as i64)), None).unwrap();
                }
                black_box(vector)
            });
        });
    }

    group.finish();
}

fn bench_vector_iterate(c: &mut Criterion) {
    let mut group = c.benchmark_group("vector_iterate");

    for &size in SIZES {
        group.throughput(Throughput::Elements(size as u64));
        // Every fourth slot allocated.
        let mut vector = Vector::new(&TYPE_I64);
        for i in 0..size {
            vector.set_entry(i * 4, None, Value::I64(i as i64), None).unwrap();
        }

        group.bench_with_input(BenchmarkId::new("sparse", size), &vector, |b, vector| {
            b.iter(|| {
                let sum: i64 = vector.values().filter_map(Value::as_i64).sum();
                black_box(sum)
            });
        });
    }

    group.finish();
}

// =============================================================================
// HASH TABLE BENCHMARKS
// =============================================================================

fn bench_table_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_insertion");
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(2));

    for &size in SIZES {
        group.throughput(Throughput::Elements(size as u64));
        let keys = keys(size);

        group.bench_with_input(BenchmarkId::new("std::BTreeMap", size), &keys, |b, keys| {
            b.iter(|| {
                let mut map = BTreeMap::new();
                for (i, key) in keys.iter().enumerate() {
                    map.insert(black_box(key.clone()), black_box(i as i64));
                }
                black_box(map)
            });
        });

        group.bench_with_input(BenchmarkId::new("HashTable", size), &keys, |b, keys| {
            b.iter(|| {
                let mut table = HashTable::new(&TYPE_STRING, keys.len());
                for (i, key) in keys.iter().enumerate() {
                    table
                        .add_entry(Value::from(black_box(key.clone())), Value::I64(i as i64), None)
                        .unwrap();
                }
                black_box(table)
            });
        });

        // Borrowed keys skip the per-key allocation.
        group.bench_with_input(BenchmarkId::new("HashTable_borrowed", size), &keys, |b, keys| {
            b.iter(|| {
                let mut table = HashTable::new(&TYPE_STRING, keys.len());
                for (i, key) in keys.iter().enumerate() {
                    table
                        .add_entry(Value::from(black_box(key.as_str())), Value::I64(i as i64), None)
                        .unwrap();
                }
                black_box(table)
            });
        });
    }

    group.finish();
}

fn bench_table_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_lookup");

    for &size in SIZES {
        group.throughput(Throughput::Elements(size as u64));
        let keys = keys(size);
        let std_map: HashMap<String, i64> =
            keys.iter().enumerate().map(|(i, k)| (k.clone(), i as i64)).collect();
        let table = string_table(size);

        group.bench_with_input(BenchmarkId::new("std::HashMap", size), &keys, |b, keys| {
            b.iter(|| {
                for key in keys {
                    black_box(std_map.get(black_box(key)));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("HashTable", size), &keys, |b, keys| {
            b.iter(|| {
                for key in keys {
                    black_box(table.get_value(&Value::from(black_box(key.as_str()))));
                }
            });
        });
    }

    group.finish();
}

fn bench_table_removal(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_removal");

    for &size in SIZES {
        group.throughput(Throughput::Elements(size as u64));
        let keys = keys(size);
        let table = string_table(size);

        group.bench_with_input(BenchmarkId::new("HashTable", size), &keys, |b, keys| {
            b.iter_batched(
                || table.copy(),
                |mut table| {
                    for key in keys {
                        black_box(table.remove_entry(&Value::from(key.as_str())));
                    }
                    table
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

// =============================================================================
// CODEC BENCHMARKS
// =============================================================================

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    for &size in SIZES {
        let table = string_table(size);
        let bytes = table.to_bytes().unwrap();
        group.throughput(Throughput::Bytes(bytes.len() as u64));

        group.bench_with_input(BenchmarkId::new("encode", size), &table, |b, table| {
            b.iter(|| black_box(table.to_bytes().unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("decode_owned", size), &bytes, |b, bytes| {
            b.iter(|| black_box(HashTable::from_bytes(bytes, false).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("decode_in_place", size), &bytes, |b, bytes| {
            b.iter(|| black_box(HashTable::from_bytes(bytes, true).unwrap()));
        });
    }

    group.finish();
}

fn bench_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("json");

    for &size in &[SMALL_SIZE, MEDIUM_SIZE] {
        let text = string_table(size).to_json();
        group.throughput(Throughput::Bytes(text.len() as u64));

        group.bench_with_input(BenchmarkId::new("render", size), &size, |b, &size| {
            let table = string_table(size);
            b.iter(|| black_box(table.to_json()));
        });

        group.bench_with_input(BenchmarkId::new("parse", size), &text, |b, text| {
            b.iter(|| black_box(HashTable::from_json(text).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    collection_benches,
    bench_vector_fill,
    bench_vector_iterate,
    bench_table_insertion,
    bench_table_lookup,
    bench_table_removal,
    bench_codec,
    bench_json
);

criterion_main!(collection_benches);
