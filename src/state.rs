//! Application state management

use crate::error::AppError;
use crate::metrics::Metrics;
use crate::params::{ParameterStore, Parameters};
use crate::series::TimeSeries;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

/// The externally visible snapshot of one completed recompute cycle
///
/// All fields originate from the same cycle. The view is replaced as a
/// whole, never mutated in place, so a reader can never observe a torn
/// combination of series and metrics.
#[derive(Debug, Clone, Serialize)]
pub struct PublishedView {
    pub title: String,
    pub actual: TimeSeries,
    pub forecast: TimeSeries,
    pub metrics: Metrics,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub generated_at: DateTime<Utc>,
}

/// Where the pipeline currently is within a recompute cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStage {
    Idle,
    Fetching,
    Fitting,
    Evaluating,
    Publishing,
}

/// Pipeline progress and outcome, surfaced to the dashboard status line
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStatus {
    pub stage: CycleStage,
    pub last_error: Option<String>,
    pub cycles_completed: u64,
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub last_completed_at: Option<DateTime<Utc>>,
}

impl Default for PipelineStatus {
    fn default() -> Self {
        Self {
            stage: CycleStage::Idle,
            last_error: None,
            cycles_completed: 0,
            last_completed_at: None,
        }
    }
}

/// Application state shared between the pipeline and the API handlers
pub struct AppState {
    /// User-adjustable controls
    pub params: ParameterStore,

    /// The single snapshot the render surface reads
    view: RwLock<Option<Arc<PublishedView>>>,

    /// Pipeline stage and last outcome
    status: RwLock<PipelineStatus>,
}

impl AppState {
    pub fn new(initial: Parameters) -> Self {
        Self {
            params: ParameterStore::new(initial),
            view: RwLock::new(None),
            status: RwLock::new(PipelineStatus::default()),
        }
    }

    /// Get the currently published view, if any cycle has completed yet
    pub fn published_view(&self) -> Option<Arc<PublishedView>> {
        self.view.read().clone()
    }

    /// Atomically replace the published view
    pub fn publish(&self, view: Arc<PublishedView>) {
        *self.view.write() = Some(view);
    }

    /// Get the current pipeline status
    pub fn status(&self) -> PipelineStatus {
        self.status.read().clone()
    }

    pub(crate) fn set_stage(&self, stage: CycleStage) {
        self.status.write().stage = stage;
    }

    pub(crate) fn record_success(&self) {
        let mut status = self.status.write();
        status.stage = CycleStage::Idle;
        status.last_error = None;
        status.cycles_completed += 1;
        status.last_completed_at = Some(Utc::now());
    }

    pub(crate) fn record_error(&self, error: &AppError) {
        let mut status = self.status.write();
        status.stage = CycleStage::Idle;
        status.last_error = Some(error.to_string());
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Parameters::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_replaces_view_wholesale() {
        let state = AppState::default();
        assert!(state.published_view().is_none());

        let view = Arc::new(PublishedView {
            title: "BTCUSDT Price Forecast".to_string(),
            actual: TimeSeries::new(vec![]).unwrap(),
            forecast: TimeSeries::new(vec![]).unwrap(),
            metrics: Metrics {
                mae: 0.0,
                mse: 0.0,
                rmse: 0.0,
                mape: 0.0,
            },
            generated_at: Utc::now(),
        });

        state.publish(view.clone());
        let read_back = state.published_view().unwrap();
        assert!(Arc::ptr_eq(&view, &read_back));
    }

    #[test]
    fn test_error_resets_stage_and_keeps_counter() {
        let state = AppState::default();
        state.set_stage(CycleStage::Fetching);
        state.record_error(&AppError::DataUnavailable("boom".to_string()));

        let status = state.status();
        assert_eq!(status.stage, CycleStage::Idle);
        assert_eq!(status.cycles_completed, 0);
        assert!(status.last_error.unwrap().contains("boom"));
    }

    #[test]
    fn test_success_clears_error_and_counts() {
        let state = AppState::default();
        state.record_error(&AppError::Internal("old".to_string()));
        state.record_success();

        let status = state.status();
        assert_eq!(status.stage, CycleStage::Idle);
        assert_eq!(status.cycles_completed, 1);
        assert!(status.last_error.is_none());
        assert!(status.last_completed_at.is_some());
    }
}
