//! Throughput Benchmark for gcmap
//!
//! This benchmark measures the performance of the storage engine
//! under various workloads. The sweeper is disabled everywhere except in
//! the purge benchmark.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use gcmap::{with_entry_ttl, with_gc_interval, Storage};
use std::sync::Arc;
use std::time::Duration;

fn storage_without_sweeper() -> Storage<Bytes, Bytes> {
    Storage::new([with_gc_interval(Duration::ZERO)]).expect("storage")
}

/// Benchmark store operations
fn bench_store(c: &mut Criterion) {
    let storage = storage_without_sweeper();

    let mut group = c.benchmark_group("store");
    group.throughput(Throughput::Elements(1));

    group.bench_function("store_small", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = Bytes::from(format!("key:{}", i));
            storage.store(key, Bytes::from("small_value"));
            i += 1;
        });
    });

    group.bench_function("store_medium", |b| {
        let mut i = 0u64;
        let value = Bytes::from("x".repeat(1024)); // 1KB value
        b.iter(|| {
            let key = Bytes::from(format!("key:{}", i));
            storage.store(key, value.clone());
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark store followed by load of the same key
fn bench_load_and_store(c: &mut Criterion) {
    let storage = storage_without_sweeper();

    let mut group = c.benchmark_group("load_and_store");
    group.throughput(Throughput::Elements(1));

    group.bench_function("store_then_load", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = Bytes::from(format!("key:{}", i));
            storage.store(key.clone(), Bytes::from("value"));
            black_box(storage.load(&key));
            i += 1;
        });
    });

    group.bench_function("load_missing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = Bytes::from(format!("missing:{}", i));
            black_box(storage.load(&key));
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark merging writes on a single hot key
fn bench_store_or_update(c: &mut Criterion) {
    let storage: Storage<&str, u64> =
        Storage::new([with_gc_interval(Duration::ZERO)]).expect("storage");

    let mut group = c.benchmark_group("store_or_update");
    group.throughput(Throughput::Elements(1));

    group.bench_function("single_counter", |b| {
        b.iter(|| {
            black_box(storage.store_or_update("counter", 1, |old, new| old + new));
        });
    });

    group.finish();
}

/// Benchmark concurrent access
fn bench_concurrent(c: &mut Criterion) {
    use std::thread;

    let mut group = c.benchmark_group("concurrent");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("4_threads_mixed", |b| {
        b.iter(|| {
            let storage = Arc::new(storage_without_sweeper());
            let handles: Vec<_> = (0..4)
                .map(|t| {
                    let storage = Arc::clone(&storage);
                    thread::spawn(move || {
                        for i in 0..10_000 {
                            let key = Bytes::from(format!("key:{}:{}", t, i));
                            storage.store(key.clone(), Bytes::from("value"));
                            storage.load(&key);
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().expect("worker panicked");
            }

            black_box(storage.len());
        });
    });

    group.finish();
}

/// Benchmark a full purge pass over a populated map
fn bench_purge(c: &mut Criterion) {
    let mut group = c.benchmark_group("purge");

    group.bench_function("purge_10k_fresh", |b| {
        b.iter_batched(
            || {
                let storage: Storage<u64, u64> = Storage::new([
                    with_gc_interval(Duration::ZERO),
                    with_entry_ttl(Duration::from_secs(3600)),
                ])
                .expect("storage");
                for i in 0..10_000 {
                    storage.store(i, i);
                }
                storage
            },
            |storage| black_box(storage.purge_stale()),
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

/// Benchmark a full range walk
fn bench_range(c: &mut Criterion) {
    let storage = storage_without_sweeper();
    for i in 0..10_000 {
        storage.store(Bytes::from(format!("key:{}", i)), Bytes::from("value"));
    }

    c.bench_function("range_10k", |b| {
        b.iter(|| {
            let mut bytes = 0usize;
            storage.range(|_, v| {
                bytes += v.len();
                true
            });
            black_box(bytes)
        });
    });
}

criterion_group!(
    benches,
    bench_store,
    bench_load_and_store,
    bench_store_or_update,
    bench_concurrent,
    bench_purge,
    bench_range,
);

criterion_main!(benches);
