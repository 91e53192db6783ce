//! Changepoint prior scale sweep
//!
//! Holds out the final `horizon` observations, fits on the remaining
//! prefix once per grid value, and scores each fit's future extension
//! against the holdout. A rolling-origin check of trend flexibility.

use crate::error::{AppError, Result};
use crate::forecast::{Forecaster, SeasonalityMode, MIN_OBSERVATIONS};
use crate::metrics::{accuracy, Metrics};
use crate::series::TimeSeries;
use serde::Serialize;

/// Default grid of trend-flexibility values to evaluate
pub const DEFAULT_GRID: [f64; 4] = [0.001, 0.01, 0.1, 1.0];

/// Holdout accuracy for one grid value
#[derive(Debug, Clone, Serialize)]
pub struct SweepOutcome {
    pub changepoint_prior_scale: f64,
    pub metrics: Metrics,
}

pub fn sweep_changepoint_scale(
    forecaster: &dyn Forecaster,
    actual: &TimeSeries,
    horizon: usize,
    seasonality_mode: SeasonalityMode,
    grid: &[f64],
) -> Result<Vec<SweepOutcome>> {
    if horizon == 0 {
        return Err(AppError::InvalidParameter(
            "horizon must be positive".to_string(),
        ));
    }
    if grid.is_empty() {
        return Err(AppError::InvalidParameter(
            "sweep grid must not be empty".to_string(),
        ));
    }

    let n = actual.len();
    if n < MIN_OBSERVATIONS + horizon {
        return Err(AppError::FitFailure(format!(
            "need at least {} observations to hold out {} for validation, got {}",
            MIN_OBSERVATIONS + horizon,
            horizon,
            n
        )));
    }

    let split = n - horizon;
    let train = TimeSeries::new(actual.points()[..split].to_vec())?;
    let holdout: Vec<f64> = actual.values()[split..].to_vec();

    let mut outcomes = Vec::with_capacity(grid.len());
    for &scale in grid {
        let forecast =
            forecaster.fit_and_forecast(&train, horizon, seasonality_mode, scale)?;
        let predicted: Vec<f64> = forecast.series().values()[split..].to_vec();
        let metrics = accuracy(&holdout, &predicted)?;
        outcomes.push(SweepOutcome {
            changepoint_prior_scale: scale,
            metrics,
        });
    }

    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::additive::AdditiveForecaster;
    use crate::series::TimePoint;
    use chrono::DateTime;

    const DAY_MS: i64 = 86_400_000;

    fn daily_series(values: &[f64]) -> TimeSeries {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                TimePoint::new(
                    DateTime::from_timestamp_millis(i as i64 * DAY_MS).unwrap(),
                    v,
                )
            })
            .collect();
        TimeSeries::new(points).unwrap()
    }

    #[test]
    fn test_sweep_scores_each_grid_value() {
        let values: Vec<f64> = (0..20).map(|i| 100.0 + 2.0 * i as f64).collect();
        let series = daily_series(&values);

        let outcomes = sweep_changepoint_scale(
            &AdditiveForecaster::new(),
            &series,
            4,
            SeasonalityMode::Additive,
            &DEFAULT_GRID,
        )
        .unwrap();

        assert_eq!(outcomes.len(), DEFAULT_GRID.len());
        for (outcome, &scale) in outcomes.iter().zip(DEFAULT_GRID.iter()) {
            assert_eq!(outcome.changepoint_prior_scale, scale);
            assert!(outcome.metrics.rmse.is_finite());
        }
    }

    #[test]
    fn test_sweep_requires_enough_history() {
        let series = daily_series(&[100.0, 101.0, 102.0]);
        let result = sweep_changepoint_scale(
            &AdditiveForecaster::new(),
            &series,
            3,
            SeasonalityMode::Additive,
            &DEFAULT_GRID,
        );
        assert!(matches!(result, Err(AppError::FitFailure(_))));
    }

    #[test]
    fn test_sweep_rejects_empty_grid() {
        let series = daily_series(&[100.0, 101.0, 102.0, 103.0]);
        let result = sweep_changepoint_scale(
            &AdditiveForecaster::new(),
            &series,
            1,
            SeasonalityMode::Additive,
            &[],
        );
        assert!(matches!(result, Err(AppError::InvalidParameter(_))));
    }
}
