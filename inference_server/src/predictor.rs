use data_ingestion::error::DataFetchError;
use data_ingestion::fetcher::{HOURLY, KlineSource, closes};
use data_ingestion::synthetic::{PREDICTION_FALLBACK_LEN, SYNTHETIC_BASE_PRICE, random_walk};
use feature_processing::{FeatureError, Features, featurize};
use log::{debug, warn};
use std::sync::Arc;
use thiserror::Error;

use crate::engine::SharedModel;
use crate::misc::PredictionResponse;

pub const PREDICTION_CANDLES: u32 = 200;

/// Exchange symbol for a coin ticker: uppercased and quoted in USDT.
pub fn symbol_for(coin: &str) -> String {
    let coin = coin.to_uppercase();
    if coin == "BTC" {
        "BTCUSDT".to_string()
    } else {
        format!("{}USDT", coin)
    }
}

#[derive(Error, Debug)]
enum LiveDataError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] DataFetchError),

    #[error("unusable history: {0}")]
    Features(#[from] FeatureError),
}

pub struct Predictor {
    source: Arc<dyn KlineSource>,
    model: SharedModel,
}

impl Predictor {
    pub fn new(source: Arc<dyn KlineSource>, model: SharedModel) -> Self {
        Self { source, model }
    }

    pub fn model_name(&self) -> &'static str {
        self.model.name()
    }

    /// Classify the next move of `coin`. Live history is preferred; any
    /// failure to fetch or featurize it falls back to a synthetic series.
    pub async fn predict(&self, coin: &str) -> Result<PredictionResponse, FeatureError> {
        let symbol = symbol_for(coin);
        let features = match self.live_features(&symbol).await {
            Ok(features) => features,
            Err(e) => {
                warn!("{}: {}; predicting from synthetic history", symbol, e);
                fallback_features()?
            }
        };

        let probs = self.model.predict_proba(&features);
        debug!("{} features={:?} probs={:?}", symbol, features, probs);
        Ok(PredictionResponse::from_probabilities(coin, probs))
    }

    async fn live_features(&self, symbol: &str) -> Result<Features, LiveDataError> {
        let candles = self
            .source
            .fetch_klines(symbol, HOURLY, PREDICTION_CANDLES)
            .await?;
        Ok(featurize(&closes(&candles))?)
    }
}

fn fallback_features() -> Result<Features, FeatureError> {
    let series = random_walk(PREDICTION_FALLBACK_LEN, SYNTHETIC_BASE_PRICE, &mut rand::rng());
    featurize(&series)
}
