//! Merges the latest window count into a feature vector at prediction time.

use super::FeatureVector;
use crate::store::AggregateStore;
use crate::window::AggregateRecord;
use std::sync::Arc;

#[derive(Debug)]
pub enum AugmentError {
    /// No aggregate row exists yet. Fatal for the request: a prediction made
    /// before the first window closes has no recency signal and gets no
    /// default.
    NoAggregate,
    Store(rusqlite::Error),
}

impl std::fmt::Display for AugmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AugmentError::NoAggregate => write!(f, "no aggregate has been written yet"),
            AugmentError::Store(e) => write!(f, "aggregate store error: {}", e),
        }
    }
}

impl std::error::Error for AugmentError {}

impl From<rusqlite::Error> for AugmentError {
    fn from(e: rusqlite::Error) -> Self {
        AugmentError::Store(e)
    }
}

pub struct FeatureAugmenter {
    store: Arc<AggregateStore>,
    feature_key: String,
}

impl FeatureAugmenter {
    pub fn new(store: Arc<AggregateStore>, feature_key: impl Into<String>) -> Self {
        Self {
            store,
            feature_key: feature_key.into(),
        }
    }

    /// Point lookup of the most recent aggregate, merged into `features`
    /// under the configured key. Returns the record used, for logging.
    pub fn augment(&self, features: &mut FeatureVector) -> Result<AggregateRecord, AugmentError> {
        let record = self.store.latest()?.ok_or(AugmentError::NoAggregate)?;
        features.insert(self.feature_key.clone(), record.count as f64);
        Ok(record)
    }

    pub fn feature_key(&self) -> &str {
        &self.feature_key
    }
}
