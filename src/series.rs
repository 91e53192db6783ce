//! Time series primitives
//!
//! A `TimeSeries` is an ordered sequence of (timestamp, value) pairs with
//! strictly increasing timestamps. Both the actual close series and the
//! forecast series flow through the system as this type.

use crate::error::{AppError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// One observation in a time series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimePoint {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl TimePoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Ordered (timestamp, value) sequence, strictly increasing by timestamp
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TimeSeries {
    points: Vec<TimePoint>,
}

impl TimeSeries {
    /// Build a series, rejecting duplicate or out-of-order timestamps
    pub fn new(points: Vec<TimePoint>) -> Result<Self> {
        for pair in points.windows(2) {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(AppError::InvariantViolation(format!(
                    "timestamps must be strictly increasing ({} followed by {})",
                    pair[0].timestamp, pair[1].timestamp
                )));
            }
        }
        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    pub fn last(&self) -> Option<&TimePoint> {
        self.points.last()
    }

    /// Gap between the final two observations, i.e. the cadence at which
    /// a future extension of this series should continue
    pub fn step(&self) -> Option<Duration> {
        let n = self.points.len();
        if n < 2 {
            return None;
        }
        Some(self.points[n - 1].timestamp - self.points[n - 2].timestamp)
    }
}
