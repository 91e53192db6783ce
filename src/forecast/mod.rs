//! Forecasting module

pub mod additive;
pub mod validation;

use crate::error::{AppError, Result};
use crate::series::TimeSeries;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum number of observations a model fit requires. Two
/// strictly-increasing finite points determine the base trend line;
/// anything less is rejected with `FitFailure`.
pub const MIN_OBSERVATIONS: usize = 2;

/// How the seasonal component combines with the trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalityMode {
    Additive,
    Multiplicative,
}

impl SeasonalityMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeasonalityMode::Additive => "additive",
            SeasonalityMode::Multiplicative => "multiplicative",
        }
    }
}

impl fmt::Display for SeasonalityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeasonalityMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "additive" => Ok(SeasonalityMode::Additive),
            "multiplicative" => Ok(SeasonalityMode::Multiplicative),
            other => Err(AppError::InvalidParameter(format!(
                "unsupported seasonality mode: {}",
                other
            ))),
        }
    }
}

/// Model output covering the historical window plus a future extension
///
/// Invariants, enforced at construction: the series is `horizon` points
/// longer than the historical window, and a caller holding the input
/// series can rely on the first `len - horizon` timestamps matching it.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastResult {
    series: TimeSeries,
    horizon: usize,
}

impl ForecastResult {
    pub fn new(series: TimeSeries, horizon: usize) -> Result<Self> {
        if horizon == 0 || series.len() <= horizon {
            return Err(AppError::InvariantViolation(format!(
                "forecast of {} points cannot cover a horizon of {}",
                series.len(),
                horizon
            )));
        }
        Ok(Self { series, horizon })
    }

    pub fn series(&self) -> &TimeSeries {
        &self.series
    }

    pub fn into_series(self) -> TimeSeries {
        self.series
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Number of in-sample (historical) points
    pub fn historical_len(&self) -> usize {
        self.series.len() - self.horizon
    }
}

/// Forecasting model seam used by the recompute pipeline
///
/// Implementations construct a fresh model per call; no fitted state
/// survives between invocations. Byte-identical output across runs with
/// the same input is not part of the contract.
pub trait Forecaster: Send + Sync {
    fn fit_and_forecast(
        &self,
        actual: &TimeSeries,
        horizon: usize,
        seasonality_mode: SeasonalityMode,
        changepoint_prior_scale: f64,
    ) -> Result<ForecastResult>;
}
