use serde::{Deserialize, Serialize};

use crate::engine::ClassProbabilities;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub coin: String,
    pub prediction: Direction,
    /// `p_up - p_down`, in [-1, 1].
    pub score: f64,
    /// Probability of the more likely class as a percentage, in [50, 100].
    pub confidence: f64,
}

impl PredictionResponse {
    pub fn from_probabilities(coin: &str, probs: ClassProbabilities) -> Self {
        let prediction = if probs.up > 0.5 {
            Direction::Up
        } else {
            Direction::Down
        };
        Self {
            coin: coin.to_string(),
            prediction,
            score: probs.up - probs.down,
            confidence: 100.0 * probs.up.max(probs.down),
        }
    }
}
