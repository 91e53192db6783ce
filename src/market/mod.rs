//! Market data module

pub mod binance;

use crate::error::{AppError, Result};
use crate::series::{TimePoint, TimeSeries};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Market data source that all exchange implementations must implement
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Fetch up to `limit` historical candles for a symbol, oldest first
    async fn fetch(&self, symbol: &str, interval: Interval, limit: u32) -> Result<Vec<Candle>>;
}

/// Candle interval supported by the user-facing controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    Min1,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "3d")]
    Day3,
    #[serde(rename = "1w")]
    Week1,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Min1 => "1m",
            Interval::Hour1 => "1h",
            Interval::Day1 => "1d",
            Interval::Day3 => "3d",
            Interval::Week1 => "1w",
        }
    }

    /// All supported intervals, in ascending cadence order
    pub fn all() -> &'static [Interval] {
        &[
            Interval::Min1,
            Interval::Hour1,
            Interval::Day1,
            Interval::Day3,
            Interval::Week1,
        ]
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "1m" => Ok(Interval::Min1),
            "1h" => Ok(Interval::Hour1),
            "1d" => Ok(Interval::Day1),
            "3d" => Ok(Interval::Day3),
            "1w" => Ok(Interval::Week1),
            other => Err(AppError::InvalidParameter(format!(
                "unsupported interval: {}",
                other
            ))),
        }
    }
}

/// One OHLCV price bar as returned by the exchange
///
/// Only `close` is consumed downstream; the remaining fields are carried
/// for API clients that want the full bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candle {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub close_time: DateTime<Utc>,
    pub quote_asset_volume: f64,
    pub number_of_trades: i64,
    pub taker_buy_base_asset_volume: f64,
    pub taker_buy_quote_asset_volume: f64,
}

/// Project the close prices out of a candle batch
pub fn close_series(candles: &[Candle]) -> Result<TimeSeries> {
    let points = candles
        .iter()
        .map(|c| TimePoint::new(c.timestamp, c.close))
        .collect();

    TimeSeries::new(points)
        .map_err(|e| AppError::DataUnavailable(format!("malformed candle batch: {}", e)))
}
