use feature_processing::{Features, TrainingSet};
use std::sync::Arc;

use crate::error::ModelError;

/// `[p_down, p_up]` for one feature vector. The two always sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassProbabilities {
    pub down: f64,
    pub up: f64,
}

impl ClassProbabilities {
    pub fn from_up(up: f64) -> Self {
        let up = up.clamp(0.0, 1.0);
        Self { down: 1.0 - up, up }
    }
}

/// Read-only inference. Implementations must be safe to call from many
/// requests at once.
pub trait Classifier: Send + Sync {
    fn name(&self) -> &'static str;

    fn predict_proba(&self, features: &Features) -> ClassProbabilities;
}

/// A classifier that can be fit once and persisted as opaque bytes.
pub trait TrainableClassifier: Classifier + Sized {
    fn fit(samples: &TrainingSet) -> Result<Self, ModelError>;

    fn to_bytes(&self) -> Result<Vec<u8>, ModelError>;

    fn from_bytes(bytes: &[u8]) -> Result<Self, ModelError>;
}

/// The model handle shared by every request.
pub type SharedModel = Arc<dyn Classifier>;
