use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("cannot fit a classifier on an empty training set")]
    EmptyTrainingSet,

    #[error("training set has {features} feature rows but {labels} labels")]
    LabelMismatch { features: usize, labels: usize },

    #[error("model encoding error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("model file {} is unreadable: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model file {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: Box<ModelError>,
    },
}
