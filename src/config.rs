//! Pipeline configuration. Window geometry and topic/table names are fixed
//! at launch, not runtime.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Data directory (aggregate store)
    pub data_dir: PathBuf,
    /// Trip event simulator parameters
    pub source: SourceConfig,
    /// In-process event bus
    pub bus: BusConfig,
    /// Sliding-window geometry
    pub window: WindowConfig,
    /// Aggregate store table
    pub store: StoreConfig,
    /// Prediction endpoint and augmentation key
    pub predictor: PredictorConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Mean trip completions per second
    pub events_per_sec: f64,
    /// Multiplicative rate jitter in [0, 1] applied per batch
    pub rate_jitter: f64,
    /// Probability that an emitted event is re-delivered (at-least-once)
    pub duplicate_probability: f64,
    /// Batch emission interval (seconds)
    pub batch_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    /// Topic name carrying trip events
    pub topic: String,
    /// Broadcast channel capacity; lagging subscribers lose the overflow
    pub capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Window length L (seconds); must be a multiple of the slide
    pub length_secs: u64,
    /// Slide interval S (seconds)
    pub slide_secs: u64,
    /// How long after a window's end late events are still accepted
    pub allowed_lateness_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Aggregate table name (two columns: trip_count, window_end)
    pub table: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Whether the demo prediction loop runs
    pub enabled: bool,
    /// Prediction endpoint URL when enabled
    pub endpoint: Option<String>,
    /// Request timeout seconds
    pub timeout_secs: u64,
    /// Feature name the latest count is merged under; deliberately distinct
    /// from the stored column name
    pub feature_key: String,
    /// Seconds between demo prediction requests
    pub interval_secs: u64,
    /// Base features sent with every demo request
    pub base_features: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".tripflow"),
            source: SourceConfig::default(),
            bus: BusConfig::default(),
            window: WindowConfig::default(),
            store: StoreConfig::default(),
            predictor: PredictorConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            events_per_sec: 4.0,
            rate_jitter: 0.5,
            duplicate_probability: 0.02,
            batch_interval_secs: 1,
        }
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            topic: "trip-events".to_string(),
            capacity: 1024,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            length_secs: 300,
            slide_secs: 15,
            allowed_lateness_secs: 60,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table: "trip_aggregates".to_string(),
        }
    }
}

impl Default for PredictorConfig {
    fn default() -> Self {
        let mut base_features = BTreeMap::new();
        base_features.insert("trip_distance_km".to_string(), 3.2);
        base_features.insert("passenger_count".to_string(), 1.0);
        Self {
            enabled: false,
            endpoint: None,
            timeout_secs: 15,
            feature_key: "trips_last_5m".to_string(),
            interval_secs: 30,
            base_features,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl PipelineConfig {
    /// Load from JSON file if present; otherwise return default
    pub fn load(path: &std::path::Path) -> Self {
        if path.exists() {
            if let Ok(data) = std::fs::read_to_string(path) {
                if let Ok(c) = serde_json::from_str::<PipelineConfig>(&data) {
                    return c;
                }
            }
        }
        Self::default()
    }
}
