//! Sliding-window aggregation: events in, one count per closed window out.
//!
//! Windows are half-open intervals `[start, start + L)` with starts aligned
//! to multiples of the slide S, so an on-time event lands in exactly L/S
//! overlapping windows. The watermark is the maximum event timestamp seen;
//! a window fires exactly once, `allowed_lateness` after its end has passed
//! the watermark. Duplicate events count twice — at-least-once input is
//! accepted, not corrected.

use super::AggregateRecord;
use crate::config::WindowConfig;
use crate::source::TripEvent;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowError {
    ZeroSlide,
    LengthNotMultipleOfSlide,
}

impl std::fmt::Display for WindowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowError::ZeroSlide => write!(f, "slide interval must be non-zero"),
            WindowError::LengthNotMultipleOfSlide => {
                write!(f, "window length must be a multiple of the slide interval")
            }
        }
    }
}

impl std::error::Error for WindowError {}

#[derive(Debug)]
pub struct SlidingWindowAggregator {
    length_ms: i64,
    slide_ms: i64,
    lateness_ms: i64,
    /// Open windows keyed by start (ms since epoch), value = event count.
    /// Created on first touch; removed when fired.
    open: BTreeMap<i64, u64>,
    /// Max event timestamp observed (ms); i64::MIN until the first event.
    watermark_ms: i64,
    dropped_late: u64,
}

fn ms_to_utc(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_else(Utc::now)
}

impl SlidingWindowAggregator {
    pub fn new(config: &WindowConfig) -> Result<Self, WindowError> {
        if config.slide_secs == 0 {
            return Err(WindowError::ZeroSlide);
        }
        if config.length_secs % config.slide_secs != 0 {
            return Err(WindowError::LengthNotMultipleOfSlide);
        }
        Ok(Self {
            length_ms: (config.length_secs * 1000) as i64,
            slide_ms: (config.slide_secs * 1000) as i64,
            lateness_ms: (config.allowed_lateness_secs * 1000) as i64,
            open: BTreeMap::new(),
            watermark_ms: i64::MIN,
            dropped_late: 0,
        })
    }

    /// Feed one event; returns the records for any windows the advancing
    /// watermark closed. An event is assigned to every window whose interval
    /// contains its timestamp and that has not already fired; if all of its
    /// windows have fired, the event is dropped as late.
    pub fn observe(&mut self, event: &TripEvent) -> Vec<AggregateRecord> {
        let ts = event.ts.timestamp_millis();
        let last_start = ts.div_euclid(self.slide_ms) * self.slide_ms;
        let first_start = last_start - self.length_ms + self.slide_ms;

        let mut assigned = false;
        let mut start = first_start;
        while start <= last_start {
            // A window still accepts data until its end + lateness passes
            // the watermark; after that it has fired and is gone.
            if start + self.length_ms + self.lateness_ms > self.watermark_ms {
                *self.open.entry(start).or_insert(0) += 1;
                assigned = true;
            }
            start += self.slide_ms;
        }
        if !assigned {
            self.dropped_late += 1;
            debug!(event_id = %event.id, ts = %event.ts, "event behind lateness horizon, dropped");
        }

        if ts > self.watermark_ms {
            self.watermark_ms = ts;
        }
        self.close_ripe()
    }

    fn close_ripe(&mut self) -> Vec<AggregateRecord> {
        let mut out = Vec::new();
        // BTreeMap keeps starts ordered, so ends are ordered too; stop at the
        // first window that is still within the lateness horizon.
        while let Some((&start, _)) = self.open.iter().next() {
            let end = start + self.length_ms;
            if end + self.lateness_ms > self.watermark_ms {
                break;
            }
            if let Some(count) = self.open.remove(&start) {
                out.push(AggregateRecord {
                    count,
                    window_end: ms_to_utc(end),
                });
            }
        }
        out
    }

    /// Close every tracked window regardless of the watermark (shutdown).
    pub fn flush(&mut self) -> Vec<AggregateRecord> {
        let open = std::mem::take(&mut self.open);
        open.into_iter()
            .map(|(start, count)| AggregateRecord {
                count,
                window_end: ms_to_utc(start + self.length_ms),
            })
            .collect()
    }

    /// Current event-time watermark, if any event has been observed.
    pub fn watermark(&self) -> Option<DateTime<Utc>> {
        (self.watermark_ms != i64::MIN).then(|| ms_to_utc(self.watermark_ms))
    }

    pub fn open_windows(&self) -> usize {
        self.open.len()
    }

    pub fn dropped_late(&self) -> u64 {
        self.dropped_late
    }

    /// Windows an on-time event is replicated into (L / S).
    pub fn windows_per_event(&self) -> usize {
        (self.length_ms / self.slide_ms) as usize
    }
}
