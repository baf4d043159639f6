use log::debug;
use ndarray::{ArrayView1, s};

use crate::error::FeatureError;
use crate::misc::{Features, TrainingSet};

pub const SHORT_WINDOW: usize = 12;
pub const LONG_WINDOW: usize = 26;
pub const VOLATILITY_WINDOW: usize = 24;
/// Long average plus one extra close for the latest return.
pub const MIN_HISTORY: usize = LONG_WINDOW + 1;

pub const TRAINING_WINDOW: usize = 30;
pub const LABEL_HORIZON: usize = 24;

/// Compute the feature vector from an ordered close series.
///
/// Volatility is the population standard deviation (ddof = 0) of the last
/// 24 log-returns. The same formula serves training and prediction.
pub fn featurize(closes: &[f64]) -> Result<Features, FeatureError> {
    if closes.len() < MIN_HISTORY {
        return Err(FeatureError::InsufficientHistory {
            required: MIN_HISTORY,
            actual: closes.len(),
        });
    }
    // Only the trailing long window feeds any feature.
    let offset = closes.len() - LONG_WINDOW;
    let tail = &closes[offset..];
    if let Some((index, &price)) = tail
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite() || **p <= 0.0)
    {
        return Err(FeatureError::NonPositivePrice {
            index: offset + index,
            price,
        });
    }

    let prices = ArrayView1::from(tail);
    let returns = (&prices.slice(s![1..]) / &prices.slice(s![..-1])).mapv(f64::ln);

    let last_return = returns[returns.len() - 1];

    let ema_short = trailing_mean(prices, SHORT_WINDOW);
    let ema_long = trailing_mean(prices, LONG_WINDOW);
    if ema_long == 0.0 {
        return Err(FeatureError::ZeroLongAverage);
    }
    let trend_divergence = (ema_short - ema_long) / ema_long;

    let volatility = returns.slice(s![-(VOLATILITY_WINDOW as isize)..]).std(0.0);

    Ok(Features {
        last_return,
        trend_divergence,
        volatility,
    })
}

fn trailing_mean(prices: ArrayView1<f64>, window: usize) -> f64 {
    prices.slice(s![-(window as isize)..]).sum() / window as f64
}

/// Slide a 31-close window over the series and label each step by whether the
/// close `LABEL_HORIZON` periods later is higher.
pub fn build_training_set(closes: &[f64]) -> TrainingSet {
    let mut set = TrainingSet::new();
    if closes.len() <= TRAINING_WINDOW + LABEL_HORIZON {
        return set;
    }

    for i in TRAINING_WINDOW..closes.len() - LABEL_HORIZON {
        let window = &closes[i - TRAINING_WINDOW..=i];
        match featurize(window) {
            Ok(features) => {
                let label = u8::from(closes[i + LABEL_HORIZON] > closes[i]);
                set.push(features, label);
            }
            Err(e) => debug!("Skipping window ending at {}: {}", i, e),
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jump_series() -> Vec<f64> {
        let mut closes = vec![100.0; 26];
        closes.push(110.0);
        closes
    }

    #[test]
    fn featurize_step_jump() {
        let f = featurize(&jump_series()).unwrap();

        assert!((f.last_return - (1.1f64).ln()).abs() < 1e-12);
        assert!((f.last_return - 0.0953).abs() < 1e-4);

        let short = (11.0 * 100.0 + 110.0) / 12.0;
        let long = (25.0 * 100.0 + 110.0) / 26.0;
        assert!((f.trend_divergence - (short - long) / long).abs() < 1e-12);
        assert!(f.trend_divergence > 0.0 && f.trend_divergence < 0.01);

        // 23 zero returns and one ln(1.1)
        let r = (1.1f64).ln();
        let expected_vol = r * (1.0 / 24.0 - 1.0 / 576.0f64).sqrt();
        assert!((f.volatility - expected_vol).abs() < 1e-12);
    }

    #[test]
    fn featurize_is_deterministic() {
        let closes: Vec<f64> = (0..200).map(|i| 100.0 + (i as f64 * 0.37).sin() * 5.0).collect();
        let a = featurize(&closes).unwrap();
        let b = featurize(&closes).unwrap();
        assert_eq!(a.to_array().map(f64::to_bits), b.to_array().map(f64::to_bits));
    }

    #[test]
    fn featurize_outputs_are_finite() {
        let closes: Vec<f64> = (1..=27).map(|i| i as f64 * 1000.0).collect();
        let f = featurize(&closes).unwrap();
        assert!(f.is_finite());
    }

    #[test]
    fn flat_series_has_zero_features() {
        let f = featurize(&[42.0; 40]).unwrap();
        assert_eq!(f.to_array(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn only_trailing_window_matters() {
        let mut long = vec![1.0; 100];
        long.extend(jump_series());
        assert_eq!(featurize(&long).unwrap(), featurize(&jump_series()).unwrap());
    }

    #[test]
    fn bad_price_outside_window_is_ignored() {
        let mut closes = vec![100.0; 200];
        closes[0] = 0.0;
        closes[173] = f64::NAN;
        let f = featurize(&closes).unwrap();
        assert_eq!(f.to_array(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn too_short_history() {
        let err = featurize(&[100.0; 26]).unwrap_err();
        assert_eq!(
            err,
            FeatureError::InsufficientHistory {
                required: 27,
                actual: 26
            }
        );
    }

    #[test]
    fn rejects_zero_and_nan_prices() {
        let mut closes = vec![100.0; 30];
        closes[5] = 0.0;
        assert!(matches!(
            featurize(&closes),
            Err(FeatureError::NonPositivePrice { index: 5, .. })
        ));

        closes[5] = f64::NAN;
        assert!(matches!(
            featurize(&closes),
            Err(FeatureError::NonPositivePrice { index: 5, .. })
        ));
    }

    #[test]
    fn training_set_window_bounds() {
        let closes: Vec<f64> = (0..100).map(|i| 100.0 + i as f64).collect();
        let set = build_training_set(&closes);
        // i runs over 30..76
        assert_eq!(set.len(), 100 - TRAINING_WINDOW - LABEL_HORIZON);
        assert!(set.labels.iter().all(|&l| l == 1));
        assert_eq!(set.positive_rate(), 1.0);
    }

    #[test]
    fn training_labels_follow_future_price() {
        let closes: Vec<f64> = (0..80).map(|i| 500.0 - i as f64).collect();
        let set = build_training_set(&closes);
        assert!(!set.is_empty());
        assert!(set.labels.iter().all(|&l| l == 0));
    }

    #[test]
    fn training_set_first_sample_uses_first_window() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64).sqrt()).collect();
        let set = build_training_set(&closes);
        assert_eq!(set.len(), 6);
        assert_eq!(set.features[0], featurize(&closes[0..=30]).unwrap());
    }

    #[test]
    fn short_series_gives_empty_training_set() {
        assert!(build_training_set(&[100.0; 54]).is_empty());
        assert_eq!(build_training_set(&[100.0; 55]).len(), 1);
    }
}
