//! User-adjustable parameter store
//!
//! Controls post their values as text; every field validates on write and
//! a rejected write leaves the stored value untouched, so a bad edit can
//! never corrupt state or feed garbage into a recompute cycle.

use crate::error::{AppError, Result};
use crate::forecast::SeasonalityMode;
use crate::market::Interval;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Current value of each user-facing control
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameters {
    pub symbol: String,
    pub interval: Interval,
    pub horizon: u32,
    pub seasonality_mode: SeasonalityMode,
    pub changepoint_prior_scale: f64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".to_string(),
            interval: Interval::Day3,
            horizon: 30,
            seasonality_mode: SeasonalityMode::Additive,
            changepoint_prior_scale: 0.05,
        }
    }
}

/// Which control a set operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamField {
    Symbol,
    Interval,
    Horizon,
    SeasonalityMode,
    ChangepointPriorScale,
}

/// Result of a set operation: whether the stored value changed, and the
/// full parameter set after validation
#[derive(Debug, Clone)]
pub struct SetOutcome {
    pub changed: bool,
    pub params: Parameters,
}

/// Holds the current Parameters; the pipeline only ever reads snapshots
pub struct ParameterStore {
    current: RwLock<Parameters>,
}

impl ParameterStore {
    pub fn new(initial: Parameters) -> Self {
        Self {
            current: RwLock::new(initial),
        }
    }

    /// By-value copy of the current parameters, immune to later edits
    pub fn snapshot(&self) -> Parameters {
        self.current.read().clone()
    }

    /// Validate and apply one control edit
    pub fn set(&self, field: ParamField, raw: &str) -> Result<SetOutcome> {
        let validated = Self::validate(field, raw)?;

        let mut current = self.current.write();
        let changed = match &validated {
            ValidatedValue::Symbol(symbol) => {
                let changed = current.symbol != *symbol;
                current.symbol = symbol.clone();
                changed
            }
            ValidatedValue::Interval(interval) => {
                let changed = current.interval != *interval;
                current.interval = *interval;
                changed
            }
            ValidatedValue::Horizon(horizon) => {
                let changed = current.horizon != *horizon;
                current.horizon = *horizon;
                changed
            }
            ValidatedValue::SeasonalityMode(mode) => {
                let changed = current.seasonality_mode != *mode;
                current.seasonality_mode = *mode;
                changed
            }
            ValidatedValue::ChangepointPriorScale(scale) => {
                let changed = current.changepoint_prior_scale != *scale;
                current.changepoint_prior_scale = *scale;
                changed
            }
        };

        Ok(SetOutcome {
            changed,
            params: current.clone(),
        })
    }

    /// Parse and validate without touching the store
    fn validate(field: ParamField, raw: &str) -> Result<ValidatedValue> {
        let raw = raw.trim();
        match field {
            ParamField::Symbol => {
                if raw.is_empty() {
                    return Err(AppError::InvalidParameter(
                        "symbol must not be empty".to_string(),
                    ));
                }
                Ok(ValidatedValue::Symbol(raw.to_uppercase()))
            }
            ParamField::Interval => Ok(ValidatedValue::Interval(raw.parse()?)),
            ParamField::Horizon => {
                let horizon: u32 = raw.parse().map_err(|_| {
                    AppError::InvalidParameter(format!(
                        "horizon must be a positive integer, got {:?}",
                        raw
                    ))
                })?;
                if horizon == 0 {
                    return Err(AppError::InvalidParameter(
                        "horizon must be positive".to_string(),
                    ));
                }
                Ok(ValidatedValue::Horizon(horizon))
            }
            ParamField::SeasonalityMode => Ok(ValidatedValue::SeasonalityMode(raw.parse()?)),
            ParamField::ChangepointPriorScale => {
                let scale: f64 = raw.parse().map_err(|_| {
                    AppError::InvalidParameter(format!(
                        "changepoint prior scale must be a number, got {:?}",
                        raw
                    ))
                })?;
                if !scale.is_finite() || scale <= 0.0 {
                    return Err(AppError::InvalidParameter(format!(
                        "changepoint prior scale must be positive and finite, got {}",
                        scale
                    )));
                }
                Ok(ValidatedValue::ChangepointPriorScale(scale))
            }
        }
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new(Parameters::default())
    }
}

enum ValidatedValue {
    Symbol(String),
    Interval(Interval),
    Horizon(u32),
    SeasonalityMode(SeasonalityMode),
    ChangepointPriorScale(f64),
}
