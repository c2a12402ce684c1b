//! Aggregate store benchmark: append rows and read back the latest.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use chrono::{TimeZone, Utc};
use tempfile::tempdir;
use tripflow::store::AggregateStore;
use tripflow::window::AggregateRecord;

fn record(count: u64, end_ms: i64) -> AggregateRecord {
    AggregateRecord {
        count,
        window_end: Utc.timestamp_millis_opt(end_ms).unwrap(),
    }
}

fn bench_append(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let store = AggregateStore::open(&dir.path().join("aggregates.db"), "trip_aggregates").unwrap();
    let rec = record(42, 615_000);

    c.bench_function("storage_append_aggregate", |b| {
        b.iter(|| black_box(store.append(black_box(&rec))).unwrap())
    });
}

fn bench_latest(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let store = AggregateStore::open(&dir.path().join("aggregates.db"), "trip_aggregates").unwrap();
    for i in 0..1_000 {
        store.append(&record(i, 600_000 + (i as i64) * 15_000)).unwrap();
    }

    c.bench_function("storage_latest_aggregate", |b| {
        b.iter(|| black_box(store.latest()).unwrap())
    });
}

criterion_group!(benches, bench_append, bench_latest);
criterion_main!(benches);
