//! Candlecast - Price Forecasting Dashboard
//!
//! Fetches historical candles from Binance, fits an additive time-series
//! model to the close prices, scores the fit, and publishes actual and
//! forecast series plus accuracy metrics to a browser dashboard with
//! live-updating parameter controls.

pub mod config;
pub mod error;
pub mod forecast;
pub mod market;
pub mod metrics;
pub mod params;
pub mod pipeline;
pub mod series;
pub mod server;
pub mod state;

use crate::config::Config;
use crate::forecast::additive::AdditiveForecaster;
use crate::forecast::Forecaster;
use crate::market::binance::BinanceClient;
use crate::market::MarketData;
use crate::params::Parameters;
use crate::pipeline::RecomputePipeline;
use crate::server::{DashboardServer, DashboardState};
use crate::state::AppState;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize and run the service until ctrl-c
pub async fn run(config: Config) -> error::Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "candlecast=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Candlecast...");

    let app = Arc::new(AppState::new(Parameters::default()));
    let market: Arc<dyn MarketData> = Arc::new(BinanceClient::new(&config.market));
    let forecaster: Arc<dyn Forecaster> = Arc::new(AdditiveForecaster::new());

    let pipeline = RecomputePipeline::new(
        market.clone(),
        forecaster.clone(),
        app.clone(),
        config.market.candle_limit,
    );
    let _worker = pipeline.spawn_worker();

    // First view, computed from the default parameters
    pipeline.request_recompute();

    let dashboard_state = Arc::new(DashboardState {
        app,
        pipeline,
        market,
        forecaster,
        candle_limit: config.market.candle_limit,
    });

    let mut server = DashboardServer::new(dashboard_state);
    server.start(&config.server).await?;

    tracing::info!("Application state initialized");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    server.stop();

    Ok(())
}
