//! Additive trend + seasonality forecaster
//!
//! The trend is piecewise linear: a base line plus hinge terms at up to
//! 25 changepoints spread over the first 80% of the history, fitted by
//! least squares with an L2 penalty of `1 / changepoint_prior_scale` on
//! the hinge coefficients. A larger prior scale therefore allows a more
//! flexible trend. The seasonal component is fitted on the detrended
//! series by phase averaging when at least two full periods of data are
//! available, and extends past the history by repeating the phase cycle.

use crate::error::{AppError, Result};
use crate::forecast::{ForecastResult, Forecaster, SeasonalityMode, MIN_OBSERVATIONS};
use crate::series::{TimePoint, TimeSeries};
use chrono::Duration;

const MAX_CHANGEPOINTS: usize = 25;
const CHANGEPOINT_RANGE: f64 = 0.8;

/// Additive time-series model. Stateless; every call fits from scratch.
#[derive(Debug, Clone, Default)]
pub struct AdditiveForecaster;

impl AdditiveForecaster {
    pub fn new() -> Self {
        Self
    }
}

impl Forecaster for AdditiveForecaster {
    fn fit_and_forecast(
        &self,
        actual: &TimeSeries,
        horizon: usize,
        seasonality_mode: SeasonalityMode,
        changepoint_prior_scale: f64,
    ) -> Result<ForecastResult> {
        if horizon == 0 {
            return Err(AppError::InvalidParameter(
                "horizon must be positive".to_string(),
            ));
        }
        if !changepoint_prior_scale.is_finite() || changepoint_prior_scale <= 0.0 {
            return Err(AppError::InvalidParameter(format!(
                "changepoint prior scale must be a positive finite number, got {}",
                changepoint_prior_scale
            )));
        }

        let n = actual.len();
        if n < MIN_OBSERVATIONS {
            return Err(AppError::FitFailure(format!(
                "need at least {} observations, got {}",
                MIN_OBSERVATIONS, n
            )));
        }

        let y = actual.values();
        if y.iter().any(|v| !v.is_finite()) {
            return Err(AppError::FitFailure(
                "input series contains non-finite values".to_string(),
            ));
        }

        let step = actual
            .step()
            .ok_or_else(|| AppError::FitFailure("series has no cadence".to_string()))?;
        if step <= Duration::zero() {
            return Err(AppError::FitFailure("series cadence is not positive".to_string()));
        }

        // Normalized time axis; index i maps to i / (n - 1), so the
        // future extension lives past t = 1 and the hinge terms keep
        // the final trend segment's slope.
        let t: Vec<f64> = (0..n).map(|i| i as f64 / (n - 1) as f64).collect();

        let trend_model = fit_trend(&t, &y, changepoint_prior_scale)?;
        let trend: Vec<f64> = t.iter().map(|&ti| trend_model.value_at(ti)).collect();

        let seasonal = match seasonal_period(step) {
            Some(period) if n >= 2 * period => {
                Some(fit_seasonal(&y, &trend, period, seasonality_mode))
            }
            _ => None,
        };

        let last_timestamp = actual
            .last()
            .map(|p| p.timestamp)
            .ok_or_else(|| AppError::FitFailure("series is empty".to_string()))?;

        let mut points = Vec::with_capacity(n + horizon);
        for i in 0..n + horizon {
            let ti = i as f64 / (n - 1) as f64;
            let trend_value = if i < n { trend[i] } else { trend_model.value_at(ti) };
            let value = match &seasonal {
                Some(component) => component.apply(trend_value, i),
                None => trend_value,
            };
            let timestamp = if i < n {
                actual.points()[i].timestamp
            } else {
                last_timestamp + step * (i - n + 1) as i32
            };
            points.push(TimePoint::new(timestamp, value));
        }

        let series = TimeSeries::new(points)?;
        ForecastResult::new(series, horizon)
    }
}

/// Fitted piecewise-linear trend: intercept, base slope, and one hinge
/// coefficient per changepoint
struct TrendModel {
    coefficients: Vec<f64>,
    changepoints: Vec<f64>,
}

impl TrendModel {
    fn value_at(&self, t: f64) -> f64 {
        let mut value = self.coefficients[0] + self.coefficients[1] * t;
        for (j, &cp) in self.changepoints.iter().enumerate() {
            if t > cp {
                value += self.coefficients[j + 2] * (t - cp);
            }
        }
        value
    }
}

fn fit_trend(t: &[f64], y: &[f64], changepoint_prior_scale: f64) -> Result<TrendModel> {
    let n = t.len();
    let k = if n >= 4 {
        MAX_CHANGEPOINTS.min(n - 3)
    } else {
        0
    };
    let changepoints: Vec<f64> = (0..k)
        .map(|j| CHANGEPOINT_RANGE * (j + 1) as f64 / (k + 1) as f64)
        .collect();

    let p = k + 2;
    let penalty = 1.0 / changepoint_prior_scale;

    // Normal equations: (X'X + penalty * D) beta = X'y, where D penalizes
    // only the hinge coefficients.
    let mut xtx = vec![vec![0.0; p]; p];
    let mut xty = vec![0.0; p];

    for (i, &ti) in t.iter().enumerate() {
        let mut row = Vec::with_capacity(p);
        row.push(1.0);
        row.push(ti);
        for &cp in &changepoints {
            row.push(if ti > cp { ti - cp } else { 0.0 });
        }

        for a in 0..p {
            xty[a] += row[a] * y[i];
            for b in 0..p {
                xtx[a][b] += row[a] * row[b];
            }
        }
    }

    for j in 2..p {
        xtx[j][j] += penalty;
    }

    let coefficients = solve_linear_system(xtx, xty)?;
    Ok(TrendModel {
        coefficients,
        changepoints,
    })
}

/// Gaussian elimination with partial pivoting; the systems here are at
/// most (MAX_CHANGEPOINTS + 2) square
fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let p = b.len();

    for col in 0..p {
        let mut pivot_row = col;
        for row in col + 1..p {
            if a[row][col].abs() > a[pivot_row][col].abs() {
                pivot_row = row;
            }
        }
        if a[pivot_row][col].abs() < 1e-12 {
            return Err(AppError::FitFailure(
                "degenerate trend system: observations do not determine a trend".to_string(),
            ));
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in col + 1..p {
            let factor = a[row][col] / a[col][col];
            for c in col..p {
                let value = a[col][c];
                a[row][c] -= factor * value;
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; p];
    for col in (0..p).rev() {
        let mut sum = b[col];
        for c in col + 1..p {
            sum -= a[col][c] * x[c];
        }
        x[col] = sum / a[col][col];
    }

    Ok(x)
}

/// Seasonal cycle length implied by the bar cadence: minute bars cycle
/// over the hour, hourly bars over the day, daily bars over the week.
/// Multi-day bars have no sub-cycle worth fitting.
fn seasonal_period(step: Duration) -> Option<usize> {
    match step.num_seconds() {
        60 => Some(60),
        3_600 => Some(24),
        86_400 => Some(7),
        _ => None,
    }
}

/// Per-phase seasonal factors, one entry per position in the cycle
enum SeasonalComponent {
    /// Offsets centered on zero, added to the trend
    Additive(Vec<f64>),
    /// Ratios normalized to one, multiplied with the trend
    Multiplicative(Vec<f64>),
}

impl SeasonalComponent {
    fn apply(&self, trend_value: f64, index: usize) -> f64 {
        match self {
            SeasonalComponent::Additive(offsets) => trend_value + offsets[index % offsets.len()],
            SeasonalComponent::Multiplicative(ratios) => {
                trend_value * ratios[index % ratios.len()]
            }
        }
    }
}

/// Extract the seasonal component from the detrended series by phase
/// averaging. Multiplicative extraction needs strictly positive data and
/// trend; otherwise it falls back to the additive form.
fn fit_seasonal(
    y: &[f64],
    trend: &[f64],
    period: usize,
    mode: SeasonalityMode,
) -> SeasonalComponent {
    let multiplicative = mode == SeasonalityMode::Multiplicative
        && y.iter().all(|&v| v > 0.0)
        && trend.iter().all(|&v| v > 0.0);

    let mut sums = vec![0.0; period];
    let mut counts = vec![0usize; period];

    for (i, (&value, &trend_value)) in y.iter().zip(trend.iter()).enumerate() {
        let detrended = if multiplicative {
            value / trend_value
        } else {
            value - trend_value
        };
        sums[i % period] += detrended;
        counts[i % period] += 1;
    }

    let mut factors: Vec<f64> = sums
        .iter()
        .zip(counts.iter())
        .map(|(&sum, &count)| if count > 0 { sum / count as f64 } else { 0.0 })
        .collect();

    let mean = factors.iter().sum::<f64>() / period as f64;
    if multiplicative {
        if mean.abs() > f64::EPSILON {
            for factor in &mut factors {
                *factor /= mean;
            }
        }
        SeasonalComponent::Multiplicative(factors)
    } else {
        for factor in &mut factors {
            *factor -= mean;
        }
        SeasonalComponent::Additive(factors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
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
    fn test_forecast_length_and_prefix_timestamps() {
        let actual = daily_series(&[100.0, 101.0, 102.0, 103.0, 104.0]);
        let result = AdditiveForecaster::new()
            .fit_and_forecast(&actual, 2, SeasonalityMode::Additive, 0.05)
            .unwrap();

        assert_eq!(result.series().len(), actual.len() + 2);
        assert_eq!(result.horizon(), 2);
        for (forecast_point, actual_point) in
            result.series().points().iter().zip(actual.points())
        {
            assert_eq!(forecast_point.timestamp, actual_point.timestamp);
        }
    }

    #[test]
    fn test_future_points_continue_at_input_cadence() {
        let actual = daily_series(&[100.0, 101.0, 102.0, 103.0, 104.0]);
        let result = AdditiveForecaster::new()
            .fit_and_forecast(&actual, 3, SeasonalityMode::Additive, 0.05)
            .unwrap();

        for pair in result.series().points()[4..].windows(2) {
            let gap = pair[1].timestamp - pair[0].timestamp;
            assert_eq!(gap.num_milliseconds(), DAY_MS);
        }
    }

    #[test]
    fn test_linear_trend_is_recovered() {
        let values: Vec<f64> = (0..12).map(|i| 50.0 + 3.0 * i as f64).collect();
        let actual = daily_series(&values);
        let result = AdditiveForecaster::new()
            .fit_and_forecast(&actual, 4, SeasonalityMode::Additive, 0.05)
            .unwrap();

        // In-sample fit tracks the line closely and the extension keeps
        // climbing at roughly the same slope.
        let fitted = result.series().values();
        for (i, &value) in fitted.iter().take(12).enumerate() {
            assert_relative_eq!(value, 50.0 + 3.0 * i as f64, epsilon = 0.5);
        }
        assert!(fitted[15] > fitted[11]);
    }

    #[test]
    fn test_two_points_is_enough() {
        let actual = daily_series(&[100.0, 110.0]);
        let result = AdditiveForecaster::new()
            .fit_and_forecast(&actual, 1, SeasonalityMode::Additive, 0.05)
            .unwrap();
        assert_eq!(result.series().len(), 3);
        assert!(result.series().values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_single_point_rejected() {
        let actual = daily_series(&[100.0]);
        let result =
            AdditiveForecaster::new().fit_and_forecast(&actual, 1, SeasonalityMode::Additive, 0.05);
        assert!(matches!(result, Err(AppError::FitFailure(_))));
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let actual = daily_series(&[100.0, f64::NAN, 102.0]);
        let result =
            AdditiveForecaster::new().fit_and_forecast(&actual, 1, SeasonalityMode::Additive, 0.05);
        assert!(matches!(result, Err(AppError::FitFailure(_))));
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let actual = daily_series(&[100.0, 101.0]);
        let result =
            AdditiveForecaster::new().fit_and_forecast(&actual, 0, SeasonalityMode::Additive, 0.05);
        assert!(matches!(result, Err(AppError::InvalidParameter(_))));
    }

    #[test]
    fn test_non_positive_prior_scale_rejected() {
        let actual = daily_series(&[100.0, 101.0]);
        let result =
            AdditiveForecaster::new().fit_and_forecast(&actual, 1, SeasonalityMode::Additive, 0.0);
        assert!(matches!(result, Err(AppError::InvalidParameter(_))));
    }

    #[test]
    fn test_multiplicative_mode_on_non_positive_data_still_fits() {
        let actual = daily_series(&[-5.0, -3.0, -1.0, 1.0, 3.0, 5.0]);
        let result = AdditiveForecaster::new()
            .fit_and_forecast(&actual, 2, SeasonalityMode::Multiplicative, 0.05)
            .unwrap();
        assert!(result.series().values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_seasonal_phase_means_additive() {
        // Flat trend, repeating offsets of -2, 0, +2
        let y = vec![8.0, 10.0, 12.0, 8.0, 10.0, 12.0, 8.0, 10.0, 12.0];
        let trend = vec![10.0; 9];
        let component = fit_seasonal(&y, &trend, 3, SeasonalityMode::Additive);

        match component {
            SeasonalComponent::Additive(offsets) => {
                assert_relative_eq!(offsets[0], -2.0, epsilon = 1e-9);
                assert_relative_eq!(offsets[1], 0.0, epsilon = 1e-9);
                assert_relative_eq!(offsets[2], 2.0, epsilon = 1e-9);
            }
            SeasonalComponent::Multiplicative(_) => panic!("expected additive component"),
        }
    }

    #[test]
    fn test_seasonal_phase_ratios_multiplicative() {
        let y = vec![5.0, 10.0, 15.0, 5.0, 10.0, 15.0];
        let trend = vec![10.0; 6];
        let component = fit_seasonal(&y, &trend, 3, SeasonalityMode::Multiplicative);

        match component {
            SeasonalComponent::Multiplicative(ratios) => {
                assert_relative_eq!(ratios[0], 0.5, epsilon = 1e-9);
                assert_relative_eq!(ratios[1], 1.0, epsilon = 1e-9);
                assert_relative_eq!(ratios[2], 1.5, epsilon = 1e-9);
            }
            SeasonalComponent::Additive(_) => panic!("expected multiplicative component"),
        }
    }

    #[test]
    fn test_seasonal_period_mapping() {
        assert_eq!(seasonal_period(Duration::seconds(60)), Some(60));
        assert_eq!(seasonal_period(Duration::hours(1)), Some(24));
        assert_eq!(seasonal_period(Duration::days(1)), Some(7));
        assert_eq!(seasonal_period(Duration::days(3)), None);
        assert_eq!(seasonal_period(Duration::weeks(1)), None);
    }

    #[test]
    fn test_solver_recovers_known_solution() {
        // 2x + y = 5, x + 3y = 10 -> x = 1, y = 3
        let a = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        let b = vec![5.0, 10.0];
        let x = solve_linear_system(a, b).unwrap();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(x[1], 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_singular_system_rejected() {
        let a = vec![vec![1.0, 1.0], vec![1.0, 1.0]];
        let b = vec![2.0, 2.0];
        assert!(matches!(
            solve_linear_system(a, b),
            Err(AppError::FitFailure(_))
        ));
    }
}
