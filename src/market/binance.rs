//! Binance spot market data adapter

use crate::config::MarketConfig;
use crate::error::{AppError, Result};
use crate::market::{Candle, Interval, MarketData};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

/// One kline row as Binance returns it: a fixed-arity array whose
/// positions are (open_time, open, high, low, close, volume, close_time,
/// quote_asset_volume, number_of_trades, taker_buy_base_asset_volume,
/// taker_buy_quote_asset_volume, ignore). Prices and volumes arrive as
/// strings and must be coerced explicitly.
#[derive(Debug, Deserialize)]
struct RawKline(
    i64,
    String,
    String,
    String,
    String,
    String,
    i64,
    String,
    i64,
    String,
    String,
    serde_json::Value,
);

/// Binance market data implementation
pub struct BinanceClient {
    client: Client,
    base_url: String,
}

impl BinanceClient {
    pub fn new(config: &MarketConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(config.timeout)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: config.base_url.clone(),
        }
    }
}

#[async_trait]
impl MarketData for BinanceClient {
    async fn fetch(&self, symbol: &str, interval: Interval, limit: u32) -> Result<Vec<Candle>> {
        let url = format!("{}/api/v3/klines", self.base_url);
        let limit = limit.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("interval", interval.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::DataUnavailable(format!("klines request timed out: {}", e))
                } else {
                    AppError::DataUnavailable(format!("klines request failed: {}", e))
                }
            })?;

        let response = response.error_for_status().map_err(|e| {
            AppError::DataUnavailable(format!("klines request rejected: {}", e))
        })?;

        let rows: Vec<RawKline> = response.json().await.map_err(|e| {
            AppError::DataUnavailable(format!("klines payload did not parse: {}", e))
        })?;

        candles_from_rows(rows)
    }
}

/// Convert raw kline rows into typed candles, validating shape and order
fn candles_from_rows(rows: Vec<RawKline>) -> Result<Vec<Candle>> {
    if rows.is_empty() {
        return Err(AppError::DataUnavailable(
            "klines response contained no candles".to_string(),
        ));
    }

    let mut candles = Vec::with_capacity(rows.len());
    let mut previous: Option<DateTime<Utc>> = None;

    for row in rows {
        let timestamp = timestamp_from_ms(row.0)?;
        let close_time = timestamp_from_ms(row.6)?;

        if let Some(prev) = previous {
            if timestamp <= prev {
                return Err(AppError::DataUnavailable(format!(
                    "candle timestamps not strictly increasing ({} followed by {})",
                    prev, timestamp
                )));
            }
        }
        previous = Some(timestamp);

        candles.push(Candle {
            timestamp,
            open: parse_decimal(&row.1, "open")?,
            high: parse_decimal(&row.2, "high")?,
            low: parse_decimal(&row.3, "low")?,
            close: parse_decimal(&row.4, "close")?,
            volume: parse_decimal(&row.5, "volume")?,
            close_time,
            quote_asset_volume: parse_decimal(&row.7, "quote_asset_volume")?,
            number_of_trades: row.8,
            taker_buy_base_asset_volume: parse_decimal(&row.9, "taker_buy_base_asset_volume")?,
            taker_buy_quote_asset_volume: parse_decimal(&row.10, "taker_buy_quote_asset_volume")?,
        });
    }

    Ok(candles)
}

fn timestamp_from_ms(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| {
        AppError::DataUnavailable(format!("timestamp out of range: {}ms", ms))
    })
}

/// Coerce a text-encoded decimal column; a non-numeric or non-finite
/// value must surface here rather than propagate downstream
fn parse_decimal(raw: &str, field: &str) -> Result<f64> {
    let value: f64 = raw.parse().map_err(|_| {
        AppError::DataUnavailable(format!("non-numeric {} field: {:?}", field, raw))
    })?;

    if !value.is_finite() {
        return Err(AppError::DataUnavailable(format!(
            "non-finite {} field: {:?}",
            field, raw
        )));
    }

    Ok(value)
}
