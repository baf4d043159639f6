use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataFetchError {
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Upstream returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed candle at index {index}: {reason}")]
    MalformedCandle { index: usize, reason: String },
}
