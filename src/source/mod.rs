//! Trip event source: shared event type plus a rate-varying simulator
//! standing in for the external trip-completion feed.

mod generator;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use generator::TripGenerator;

/// A single trip-completion event. Immutable once emitted; consumers must
/// tolerate duplicate delivery and out-of-order timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripEvent {
    pub id: String,
    pub ts: DateTime<Utc>,
}

impl TripEvent {
    pub fn new(ts: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            ts,
        }
    }
}
