use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::config::AppConfig;
use crate::error::DataFetchError;

pub const HOURLY: &str = "1h";

/// Fields every kline row must carry: open time, open, high, low, close, volume.
const KLINE_MIN_FIELDS: usize = 6;
const CLOSE_INDEX: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Anything that can hand back an ordered run of candles for a symbol.
#[async_trait]
pub trait KlineSource: Send + Sync {
    async fn fetch_klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Vec<Candle>, DataFetchError>;
}

pub struct BinanceClient {
    client: Client,
    base_url: String,
}

impl BinanceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DataFetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, DataFetchError> {
        Self::new(config.market_data_url.clone(), config.request_timeout())
    }
}

#[async_trait]
impl KlineSource for BinanceClient {
    async fn fetch_klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Vec<Candle>, DataFetchError> {
        let url = format!("{}/api/v3/klines", self.base_url);
        let limit = limit.to_string();
        debug!("GET {} symbol={} interval={} limit={}", url, symbol, interval, limit);

        let response = self
            .client
            .get(&url)
            .query(&[("symbol", symbol), ("interval", interval), ("limit", limit.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataFetchError::Status { status, body });
        }

        let body = response.text().await?;
        let candles = parse_klines(&body)?;
        for candle in &candles {
            validate_candle(candle);
        }
        debug!("Fetched {} candles for {}", candles.len(), symbol);
        Ok(candles)
    }
}

/// Parse the exchange's array-of-arrays kline payload.
pub fn parse_klines(body: &str) -> Result<Vec<Candle>, DataFetchError> {
    let rows: Vec<Vec<Value>> = serde_json::from_str(body)?;
    rows.iter()
        .enumerate()
        .map(|(index, row)| parse_row(index, row))
        .collect()
}

fn parse_row(index: usize, row: &[Value]) -> Result<Candle, DataFetchError> {
    if row.len() < KLINE_MIN_FIELDS {
        return Err(DataFetchError::MalformedCandle {
            index,
            reason: format!("expected at least {} fields, got {}", KLINE_MIN_FIELDS, row.len()),
        });
    }

    let open_ms = row[0].as_i64().ok_or_else(|| DataFetchError::MalformedCandle {
        index,
        reason: "open time is not an integer".to_string(),
    })?;
    let open_time =
        DateTime::from_timestamp_millis(open_ms).ok_or_else(|| DataFetchError::MalformedCandle {
            index,
            reason: format!("open time {} out of range", open_ms),
        })?;

    Ok(Candle {
        open_time,
        open: number_at(index, row, 1)?,
        high: number_at(index, row, 2)?,
        low: number_at(index, row, 3)?,
        close: number_at(index, row, CLOSE_INDEX)?,
        volume: number_at(index, row, 5)?,
    })
}

// Binance sends prices as decimal strings; accept plain JSON numbers too.
fn number_at(index: usize, row: &[Value], field: usize) -> Result<f64, DataFetchError> {
    let parsed = match &row[field] {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed.ok_or_else(|| DataFetchError::MalformedCandle {
        index,
        reason: format!("field {} is not a number: {}", field, row[field]),
    })
}

pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Logs every suspicious value in a candle; returns false if any were found.
pub fn validate_candle(candle: &Candle) -> bool {
    let mut is_valid = true;
    if !candle.volume.is_finite() || candle.volume < 0.0 {
        warn!("Invalid volume {} at {}", candle.volume, candle.open_time);
        is_valid = false;
    }

    for (name, price) in [
        ("open", candle.open),
        ("high", candle.high),
        ("low", candle.low),
        ("close", candle.close),
    ] {
        if !price.is_finite() || price < 0.0 {
            warn!("{} cannot be {} at {}", name, price, candle.open_time);
            is_valid = false;
        }
    }

    is_valid
}
