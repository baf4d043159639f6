use data_ingestion::fetcher::{HOURLY, KlineSource, closes};
use data_ingestion::synthetic::{SYNTHETIC_BASE_PRICE, TRAINING_FALLBACK_LEN, random_walk};
use feature_processing::{Features, TrainingSet, build_training_set};
use log::{info, warn};
use rand::Rng;

use crate::engine::TrainableClassifier;
use crate::error::ModelError;

pub const REFERENCE_SYMBOL: &str = "BTCUSDT";
pub const TRAINING_CANDLES: u32 = 1000;
pub const MIN_TRAINING_SAMPLES: usize = 10;
pub const SYNTHETIC_SAMPLES: usize = 100;

/// Fit a fresh classifier on hourly history of the reference symbol.
pub async fn train<C, R>(source: &dyn KlineSource, rng: &mut R) -> Result<C, ModelError>
where
    C: TrainableClassifier,
    R: Rng + ?Sized,
{
    let samples = collect_samples(source, rng).await;
    info!(
        "Fitting classifier on {} samples ({:.1}% labelled up)",
        samples.len(),
        samples.positive_rate() * 100.0
    );
    let model = C::fit(&samples)?;
    info!("Training done✅");
    Ok(model)
}

/// Labelled samples from live history, degrading to synthetic data when the
/// feed is down or too short.
pub async fn collect_samples<R>(source: &dyn KlineSource, rng: &mut R) -> TrainingSet
where
    R: Rng + ?Sized,
{
    let series = match source
        .fetch_klines(REFERENCE_SYMBOL, HOURLY, TRAINING_CANDLES)
        .await
    {
        Ok(candles) => closes(&candles),
        Err(e) => {
            warn!(
                "Could not fetch {} history ({}); training on a synthetic random walk",
                REFERENCE_SYMBOL, e
            );
            random_walk(TRAINING_FALLBACK_LEN, SYNTHETIC_BASE_PRICE, rng)
        }
    };

    let samples = build_training_set(&series);
    if samples.len() < MIN_TRAINING_SAMPLES {
        warn!(
            "Only {} samples from {} closes; substituting {} random samples",
            samples.len(),
            series.len(),
            SYNTHETIC_SAMPLES
        );
        return synthetic_samples(SYNTHETIC_SAMPLES, rng);
    }
    samples
}

/// Uniform features in [-1, 1) with coin-flip labels.
pub fn synthetic_samples<R: Rng + ?Sized>(n: usize, rng: &mut R) -> TrainingSet {
    let mut set = TrainingSet::new();
    for _ in 0..n {
        let features = Features::from_array([
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        ]);
        set.push(features, u8::from(rng.random_bool(0.5)));
    }
    set
}
