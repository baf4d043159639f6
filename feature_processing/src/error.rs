use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    #[error("need at least {required} closes, got {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    #[error("close at index {index} is not a positive finite price: {price}")]
    NonPositivePrice { index: usize, price: f64 },

    #[error("long moving average is zero")]
    ZeroLongAverage,
}
