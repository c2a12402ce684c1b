//! In-process pub/sub topic for trip events.
//!
//! Contract matches the external bus it stands in for: at-least-once from the
//! subscriber's viewpoint (the producer may redeliver; the bus never
//! deduplicates) and no cross-subscriber ordering guarantee. A subscriber that
//! falls behind the channel capacity observes loss explicitly via a lag error
//! rather than silently.

use crate::config::BusConfig;
use crate::source::TripEvent;
use tokio::sync::broadcast;
use tracing::debug;

pub struct EventBus {
    topic: String,
    tx: broadcast::Sender<TripEvent>,
}

impl EventBus {
    pub fn new(config: &BusConfig) -> Self {
        let (tx, _) = broadcast::channel(config.capacity.max(1));
        Self {
            topic: config.topic.clone(),
            tx,
        }
    }

    /// Publish one event; returns the number of subscribers it reached.
    /// Publishing to a topic with no subscribers is not an error.
    pub fn publish(&self, event: TripEvent) -> usize {
        match self.tx.send(event) {
            Ok(n) => n,
            Err(_) => {
                debug!(topic = %self.topic, "publish with no subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TripEvent> {
        self.tx.subscribe()
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}
