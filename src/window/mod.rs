//! Sliding-window counting of trip events.

mod aggregator;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use aggregator::{SlidingWindowAggregator, WindowError};

/// One emitted aggregate: the trip count for a closed window, keyed by the
/// window's end. Written once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    pub count: u64,
    pub window_end: DateTime<Utc>,
}
