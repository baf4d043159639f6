//! Stub market data sources and classifiers shared by the unit tests.

use async_trait::async_trait;
use chrono::DateTime;
use data_ingestion::error::DataFetchError;
use data_ingestion::fetcher::{Candle, KlineSource};
use feature_processing::{Features, TrainingSet};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::engine::{ClassProbabilities, Classifier, TrainableClassifier};
use crate::error::ModelError;

pub fn rising(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 + i as f64).collect()
}

/// Serves the same closes for every symbol and records what was asked for.
pub struct StaticSource {
    closes: Vec<f64>,
    requests: Mutex<Vec<(String, u32)>>,
}

impl StaticSource {
    pub fn new(closes: Vec<f64>) -> Self {
        Self {
            closes,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<(String, u32)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl KlineSource for StaticSource {
    async fn fetch_klines(
        &self,
        symbol: &str,
        _interval: &str,
        limit: u32,
    ) -> Result<Vec<Candle>, DataFetchError> {
        self.requests.lock().unwrap().push((symbol.to_string(), limit));
        Ok(self
            .closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                open_time: DateTime::from_timestamp(i as i64 * 3600, 0).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1.0,
            })
            .collect())
    }
}

pub struct FailingSource;

#[async_trait]
impl KlineSource for FailingSource {
    async fn fetch_klines(
        &self,
        _symbol: &str,
        _interval: &str,
        _limit: u32,
    ) -> Result<Vec<Candle>, DataFetchError> {
        Err(DataFetchError::MalformedCandle {
            index: 0,
            reason: "exchange unavailable".to_string(),
        })
    }
}

/// Always answers with the same probabilities.
pub struct FixedClassifier {
    pub up: f64,
}

impl Classifier for FixedClassifier {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn predict_proba(&self, _features: &Features) -> ClassProbabilities {
        ClassProbabilities::from_up(self.up)
    }
}

/// Predicts the training set's up rate for every input.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct MeanClassifier {
    pub up: f64,
}

impl Classifier for MeanClassifier {
    fn name(&self) -> &'static str {
        "mean"
    }

    fn predict_proba(&self, _features: &Features) -> ClassProbabilities {
        ClassProbabilities::from_up(self.up)
    }
}

impl TrainableClassifier for MeanClassifier {
    fn fit(samples: &TrainingSet) -> Result<Self, ModelError> {
        if samples.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        Ok(Self {
            up: samples.positive_rate(),
        })
    }

    fn to_bytes(&self) -> Result<Vec<u8>, ModelError> {
        Ok(bincode::serialize(self)?)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, ModelError> {
        Ok(bincode::deserialize(bytes)?)
    }
}
