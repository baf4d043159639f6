use serde::{Deserialize, Serialize};

pub const NUM_FEATURES: usize = 3;

/// Momentum, trend divergence and volatility of a close series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Features {
    pub last_return: f64,
    pub trend_divergence: f64,
    pub volatility: f64,
}

impl Features {
    pub fn to_array(&self) -> [f64; NUM_FEATURES] {
        [self.last_return, self.trend_divergence, self.volatility]
    }

    pub fn from_array(values: [f64; NUM_FEATURES]) -> Self {
        Self {
            last_return: values[0],
            trend_divergence: values[1],
            volatility: values[2],
        }
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

/// Labelled samples; a label of 1 means the price went up over the horizon.
#[derive(Debug, Clone, Default)]
pub struct TrainingSet {
    pub features: Vec<Features>,
    pub labels: Vec<u8>,
}

impl TrainingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, features: Features, label: u8) {
        self.features.push(features);
        self.labels.push(label);
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Share of samples labelled up; 0 for an empty set.
    pub fn positive_rate(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.labels.iter().filter(|&&l| l == 1).count() as f64 / self.len() as f64
    }
}
