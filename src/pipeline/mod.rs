//! Recompute pipeline
//!
//! The reactive heart of the service. Every accepted control edit queues
//! a recompute; the worker task drains that queue one cycle at a time:
//! snapshot parameters, fetch candles, fit and forecast, evaluate, then
//! publish the assembled view in a single swap. Edits arriving while a
//! cycle is in flight coalesce into at most one follow-up cycle, run
//! with the latest parameter snapshot. An in-flight cycle is never
//! preempted, and a failed cycle leaves the previously published view
//! untouched.

use crate::error::Result;
use crate::forecast::Forecaster;
use crate::market::{close_series, MarketData};
use crate::metrics;
use crate::params::Parameters;
use crate::state::{AppState, CycleStage, PublishedView};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};
use tracing::{info, warn};

/// Orchestrates fetch -> fit -> evaluate -> publish cycles
#[derive(Clone)]
pub struct RecomputePipeline {
    inner: Arc<PipelineInner>,
}

struct PipelineInner {
    market: Arc<dyn MarketData>,
    forecaster: Arc<dyn Forecaster>,
    state: Arc<AppState>,
    candle_limit: u32,

    /// Coalesced "a recompute is wanted" flag; many edits, one bit
    pending: AtomicBool,
    notify: Notify,

    /// At most one cycle executes at a time
    cycle_gate: Mutex<()>,
}

impl RecomputePipeline {
    pub fn new(
        market: Arc<dyn MarketData>,
        forecaster: Arc<dyn Forecaster>,
        state: Arc<AppState>,
        candle_limit: u32,
    ) -> Self {
        Self {
            inner: Arc::new(PipelineInner {
                market,
                forecaster,
                state,
                candle_limit,
                pending: AtomicBool::new(false),
                notify: Notify::new(),
                cycle_gate: Mutex::new(()),
            }),
        }
    }

    /// Queue a recompute. Cheap and non-blocking; callers fire this once
    /// per accepted control edit.
    pub fn request_recompute(&self) {
        self.inner.pending.store(true, Ordering::SeqCst);
        self.inner.notify.notify_one();
    }

    /// Spawn the worker task that owns cycle execution
    pub fn spawn_worker(&self) -> tokio::task::JoinHandle<()> {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            info!("Recompute worker started");
            loop {
                inner.notify.notified().await;
                while inner.pending.swap(false, Ordering::SeqCst) {
                    match run_cycle(&inner).await {
                        Ok(view) => info!(
                            "Published {} ({} actual / {} forecast points)",
                            view.title,
                            view.actual.len(),
                            view.forecast.len()
                        ),
                        Err(e) => warn!("Recompute cycle failed: {}", e),
                    }
                }
            }
        })
    }

    /// Drive one cycle to completion directly. Shares the cycle gate with
    /// the worker, so mutual exclusion holds either way.
    pub async fn run_once(&self) -> Result<Arc<PublishedView>> {
        run_cycle(&self.inner).await
    }
}

async fn run_cycle(inner: &PipelineInner) -> Result<Arc<PublishedView>> {
    let _guard = inner.cycle_gate.lock().await;

    // Copy-by-value snapshot; edits landing after this point belong to
    // the next cycle.
    let params = inner.state.params.snapshot();

    let result = execute_cycle(inner, &params).await;
    match &result {
        Ok(_) => inner.state.record_success(),
        Err(e) => inner.state.record_error(e),
    }
    result
}

async fn execute_cycle(inner: &PipelineInner, params: &Parameters) -> Result<Arc<PublishedView>> {
    inner.state.set_stage(CycleStage::Fetching);
    let candles = inner
        .market
        .fetch(&params.symbol, params.interval, inner.candle_limit)
        .await?;
    let actual = close_series(&candles)?;

    inner.state.set_stage(CycleStage::Fitting);
    let forecast = inner.forecaster.fit_and_forecast(
        &actual,
        params.horizon as usize,
        params.seasonality_mode,
        params.changepoint_prior_scale,
    )?;

    inner.state.set_stage(CycleStage::Evaluating);
    let metrics = metrics::evaluate(&actual, &forecast)?;

    inner.state.set_stage(CycleStage::Publishing);
    let view = Arc::new(PublishedView {
        title: format!("{} Price Forecast", params.symbol),
        actual,
        forecast: forecast.into_series(),
        metrics,
        generated_at: Utc::now(),
    });
    inner.state.publish(view.clone());

    Ok(view)
}
