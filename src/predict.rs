//! Prediction client: send an augmented feature vector to the serving
//! endpoint, get a scalar back.

use crate::config::PredictorConfig;
use crate::features::FeatureVector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Request/response shapes of the serving endpoint: a batch of feature maps
/// in, one scalar per instance out.
#[derive(Serialize)]
struct PredictRequest<'a> {
    instances: Vec<&'a BTreeMap<String, f64>>,
}

#[derive(Deserialize)]
struct PredictResponse {
    predictions: Vec<f64>,
}

pub struct PredictionClient {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl PredictionClient {
    /// None when the predictor is disabled or has no endpoint configured.
    pub fn new(config: &PredictorConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let endpoint = config.endpoint.as_ref()?.trim_end_matches('/').to_string();
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .ok()?;
        Some(Self { client, endpoint })
    }

    /// Single synchronous prediction call for one feature vector.
    pub fn predict(&self, features: &FeatureVector) -> Result<f64, String> {
        let body = PredictRequest {
            instances: vec![&features.values],
        };
        let res = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(|e| e.to_string())?;
        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().unwrap_or_default();
            return Err(format!("{} {}", status, text));
        }
        let parsed: PredictResponse = res.json().map_err(|e| e.to_string())?;
        parsed
            .predictions
            .first()
            .copied()
            .ok_or_else(|| "empty predictions list".to_string())
    }
}
