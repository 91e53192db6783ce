//! Forecast accuracy metrics
//!
//! Pure functions over aligned actual/predicted values. MAPE is undefined
//! when any actual value is exactly zero; that case fails loudly instead
//! of producing a NaN that would silently reach the dashboard.

use crate::error::{AppError, Result};
use crate::forecast::ForecastResult;
use crate::series::TimeSeries;
use serde::Serialize;

/// Accuracy metrics over the historical overlap of a forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    /// Mean absolute error
    pub mae: f64,
    /// Mean squared error
    pub mse: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Mean absolute percentage error, as a percentage
    pub mape: f64,
}

/// Score a forecast against the actual series over the historical prefix
pub fn evaluate(actual: &TimeSeries, forecast: &ForecastResult) -> Result<Metrics> {
    if forecast.historical_len() != actual.len() {
        return Err(AppError::InvariantViolation(format!(
            "forecast covers {} historical points but the actual series has {}",
            forecast.historical_len(),
            actual.len()
        )));
    }

    let predicted = forecast.series().values();
    accuracy(&actual.values(), &predicted[..actual.len()])
}

/// Slice-level metric computation over pairwise-aligned values
pub fn accuracy(actual: &[f64], predicted: &[f64]) -> Result<Metrics> {
    if actual.is_empty() || actual.len() != predicted.len() {
        return Err(AppError::InvariantViolation(format!(
            "actual ({}) and predicted ({}) values must have the same non-zero length",
            actual.len(),
            predicted.len()
        )));
    }

    let n = actual.len() as f64;

    let mut abs_sum = 0.0;
    let mut sq_sum = 0.0;
    let mut pct_sum = 0.0;

    for (i, (&a, &p)) in actual.iter().zip(predicted.iter()).enumerate() {
        if a == 0.0 {
            return Err(AppError::DivisionByZero(format!(
                "actual value at position {} is zero, MAPE is undefined",
                i
            )));
        }
        let error = a - p;
        abs_sum += error.abs();
        sq_sum += error * error;
        pct_sum += (error / a).abs();
    }

    let mse = sq_sum / n;

    Ok(Metrics {
        mae: abs_sum / n,
        mse,
        rmse: mse.sqrt(),
        mape: pct_sum / n * 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_worked_example() {
        let metrics = accuracy(&[100.0, 200.0, 300.0], &[110.0, 190.0, 300.0]).unwrap();

        assert_relative_eq!(metrics.mae, 10.0, epsilon = 1e-9);
        assert_relative_eq!(metrics.mse, 200.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(metrics.rmse, (200.0f64 / 3.0).sqrt(), epsilon = 1e-9);
        // (10/100 + 10/200 + 0/300) / 3 * 100
        assert_relative_eq!(metrics.mape, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_perfect_forecast_scores_zero() {
        let metrics = accuracy(&[5.0, 6.0, 7.0], &[5.0, 6.0, 7.0]).unwrap();
        assert_eq!(metrics.mae, 0.0);
        assert_eq!(metrics.mse, 0.0);
        assert_eq!(metrics.rmse, 0.0);
        assert_eq!(metrics.mape, 0.0);
    }

    #[test]
    fn test_aligned_permutation_leaves_metrics_unchanged() {
        let actual = [100.0, 200.0, 300.0, 400.0];
        let predicted = [110.0, 190.0, 290.0, 410.0];
        let baseline = accuracy(&actual, &predicted).unwrap();

        // Permute both slices identically; pairwise alignment preserved
        let order = [2usize, 0, 3, 1];
        let actual_perm: Vec<f64> = order.iter().map(|&i| actual[i]).collect();
        let predicted_perm: Vec<f64> = order.iter().map(|&i| predicted[i]).collect();
        let permuted = accuracy(&actual_perm, &predicted_perm).unwrap();

        assert_relative_eq!(baseline.mae, permuted.mae, epsilon = 1e-12);
        assert_relative_eq!(baseline.mse, permuted.mse, epsilon = 1e-12);
        assert_relative_eq!(baseline.rmse, permuted.rmse, epsilon = 1e-12);
        assert_relative_eq!(baseline.mape, permuted.mape, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_actual_fails_explicitly() {
        let result = accuracy(&[100.0, 0.0, 300.0], &[110.0, 10.0, 300.0]);
        assert!(matches!(result, Err(AppError::DivisionByZero(_))));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let result = accuracy(&[1.0, 2.0], &[1.0]);
        assert!(matches!(result, Err(AppError::InvariantViolation(_))));

        let result = accuracy(&[], &[]);
        assert!(matches!(result, Err(AppError::InvariantViolation(_))));
    }
}
