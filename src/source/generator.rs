//! Variable-rate trip event simulator with at-least-once redelivery.

use super::TripEvent;
use crate::config::SourceConfig;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;

pub struct TripGenerator {
    config: SourceConfig,
}

impl TripGenerator {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    /// Emit one batch of events for the interval ending at `now`.
    ///
    /// Batch size varies around the configured mean rate; event timestamps
    /// are scattered across the interval so arrival order does not follow
    /// event time. With `duplicate_probability` an event is emitted twice,
    /// same id and timestamp, mimicking at-least-once bus delivery.
    pub fn next_batch(&self, now: DateTime<Utc>) -> Vec<TripEvent> {
        let mut rng = rand::thread_rng();
        let interval_ms = (self.config.batch_interval_secs.max(1) * 1000) as i64;

        let expected = self.config.events_per_sec * self.config.batch_interval_secs.max(1) as f64;
        let jitter = self.config.rate_jitter.clamp(0.0, 1.0);
        let factor = if jitter > 0.0 {
            1.0 + rng.gen_range(-jitter..=jitter)
        } else {
            1.0
        };
        let n = (expected * factor).round().max(0.0) as usize;

        let mut batch = Vec::with_capacity(n + n / 8 + 1);
        for _ in 0..n {
            let offset_ms = rng.gen_range(0..interval_ms);
            let ev = TripEvent::new(now - ChronoDuration::milliseconds(offset_ms));
            if rng.gen_bool(self.config.duplicate_probability.clamp(0.0, 1.0)) {
                batch.push(ev.clone());
            }
            batch.push(ev);
        }
        batch
    }
}
