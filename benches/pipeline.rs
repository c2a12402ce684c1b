//! Pipeline benchmark: events → sliding-window assignment and closure.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use chrono::{TimeZone, Utc};
use tripflow::config::{SourceConfig, WindowConfig};
use tripflow::source::{TripEvent, TripGenerator};
use tripflow::window::SlidingWindowAggregator;

fn make_events(n: usize) -> Vec<TripEvent> {
    (0..n)
        .map(|i| TripEvent::new(Utc.timestamp_millis_opt(600_000 + (i as i64) * 100).unwrap()))
        .collect()
}

fn bench_window_assignment(c: &mut Criterion) {
    let config = WindowConfig {
        length_secs: 300,
        slide_secs: 15,
        allowed_lateness_secs: 60,
    };
    let events = make_events(1_000);

    c.bench_function("window_observe_1000_events", |b| {
        b.iter(|| {
            let mut agg = SlidingWindowAggregator::new(&config).unwrap();
            for ev in black_box(&events) {
                black_box(agg.observe(ev));
            }
            black_box(agg.flush())
        })
    });
}

fn bench_generator_batch(c: &mut Criterion) {
    let generator = TripGenerator::new(SourceConfig {
        events_per_sec: 100.0,
        rate_jitter: 0.5,
        duplicate_probability: 0.02,
        batch_interval_secs: 1,
    });

    c.bench_function("generator_batch_100_per_sec", |b| {
        b.iter(|| black_box(generator.next_batch(Utc::now())))
    });
}

criterion_group!(benches, bench_window_assignment, bench_generator_batch);
criterion_main!(benches);
