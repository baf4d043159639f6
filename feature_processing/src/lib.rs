pub mod error;
pub mod misc;
pub mod processor;

pub use error::FeatureError;
pub use misc::{Features, NUM_FEATURES, TrainingSet};
pub use processor::{build_training_set, featurize};
