//! Dashboard and REST API endpoint handlers

use crate::error::Result;
use crate::forecast::validation::{sweep_changepoint_scale, DEFAULT_GRID};
use crate::forecast::Forecaster;
use crate::market::{close_series, Interval, MarketData};
use crate::pipeline::RecomputePipeline;
use crate::server::types::*;
use crate::state::AppState;
use axum::extract::{Json, State as AxumState};
use axum::response::Html;
use std::sync::Arc;
use tracing::info;

/// Shared state for API handlers
pub struct DashboardState {
    pub app: Arc<AppState>,
    pub pipeline: RecomputePipeline,
    pub market: Arc<dyn MarketData>,
    pub forecaster: Arc<dyn Forecaster>,
    pub candle_limit: u32,
}

/// The render surface: a static page that polls the view endpoint and
/// posts control edits back - GET /
pub async fn dashboard() -> Html<&'static str> {
    Html(include_str!("../../assets/dashboard.html"))
}

/// Health check endpoint - GET /health
pub async fn health_check() -> Json<ApiResponse<Empty>> {
    Json(ApiResponse::success_with_message(
        "Candlecast API is running",
    ))
}

/// Current published view and pipeline status - GET /api/v1/view
pub async fn get_view(AxumState(state): AxumState<Arc<DashboardState>>) -> Json<ViewResponse> {
    Json(ViewResponse {
        view: state.app.published_view().map(|v| (*v).clone()),
        status: state.app.status(),
    })
}

/// Current control values - GET /api/v1/params
pub async fn get_params(
    AxumState(state): AxumState<Arc<DashboardState>>,
) -> Json<ApiResponse<crate::params::Parameters>> {
    Json(ApiResponse::success(state.app.params.snapshot()))
}

/// One control edit - POST /api/v1/params
///
/// Routes the edit through the parameter store; a rejected value leaves
/// the store untouched and no recompute is queued.
pub async fn update_param(
    AxumState(state): AxumState<Arc<DashboardState>>,
    Json(update): Json<ParamUpdate>,
) -> Result<Json<ParamUpdateResponse>> {
    let outcome = state.app.params.set(update.field, &update.value)?;

    if outcome.changed {
        info!("Parameter {:?} changed, queueing recompute", update.field);
        state.pipeline.request_recompute();
    }

    Ok(Json(ParamUpdateResponse {
        changed: outcome.changed,
        recompute_queued: outcome.changed,
        params: outcome.params,
    }))
}

/// Pipeline stage and last outcome - GET /api/v1/status
pub async fn get_status(
    AxumState(state): AxumState<Arc<DashboardState>>,
) -> Json<crate::state::PipelineStatus> {
    Json(state.app.status())
}

/// Supported intervals - GET /api/v1/intervals
pub async fn get_intervals() -> Json<IntervalsResult> {
    Json(IntervalsResult {
        intervals: Interval::all()
            .iter()
            .map(|i| i.as_str().to_string())
            .collect(),
    })
}

/// Changepoint-prior-scale sweep over the current symbol/interval -
/// POST /api/v1/sweep
///
/// Fetches fresh history and scores each grid value against a holdout
/// tail. Read-only with respect to the published view.
pub async fn run_sweep(
    AxumState(state): AxumState<Arc<DashboardState>>,
    Json(request): Json<SweepRequest>,
) -> Result<Json<SweepResponse>> {
    let params = state.app.params.snapshot();
    info!(
        "Running changepoint sweep for {} {} (horizon {})",
        params.symbol, params.interval, params.horizon
    );

    let candles = state
        .market
        .fetch(&params.symbol, params.interval, state.candle_limit)
        .await?;
    let actual = close_series(&candles)?;

    let grid = request.grid.unwrap_or_else(|| DEFAULT_GRID.to_vec());
    let outcomes = sweep_changepoint_scale(
        state.forecaster.as_ref(),
        &actual,
        params.horizon as usize,
        params.seasonality_mode,
        &grid,
    )?;

    Ok(Json(SweepResponse {
        symbol: params.symbol,
        horizon: params.horizon,
        seasonality_mode: params.seasonality_mode,
        outcomes,
    }))
}
