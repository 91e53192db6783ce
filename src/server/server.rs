//! HTTP server for the dashboard and REST API
//!
//! Serves the render surface at `/` and the JSON API under `/api/v1/*`.

use crate::config::ServerConfig;
use crate::error::{AppError, Result};
use crate::server::handlers::{self, DashboardState};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Dashboard/API server manager
pub struct DashboardServer {
    state: Arc<DashboardState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl DashboardServer {
    /// Create a new server
    pub fn new(state: Arc<DashboardState>) -> Self {
        Self {
            state,
            shutdown_tx: None,
        }
    }

    /// Bind and start serving in a background task
    pub async fn start(&mut self, config: &ServerConfig) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid address: {}", e)))?;

        // CORS is open: the page and the API share an origin in normal
        // use, and the API carries no credentials.
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let app = Router::new()
            .route("/", get(handlers::dashboard))
            .route("/health", get(handlers::health_check))
            .route(
                "/api/v1/params",
                get(handlers::get_params).post(handlers::update_param),
            )
            .route("/api/v1/view", get(handlers::get_view))
            .route("/api/v1/status", get(handlers::get_status))
            .route("/api/v1/intervals", get(handlers::get_intervals))
            .route("/api/v1/sweep", post(handlers::run_sweep))
            .with_state(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http());

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Starting Candlecast server on {}", addr);

        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Dashboard server shutting down");
            });

            if let Err(e) = server.await {
                error!("Dashboard server error: {}", e);
            }
        });

        info!("Dashboard:     http://{}/", addr);
        info!("Health check:  http://{}/health", addr);
        info!("View API:      http://{}/api/v1/view", addr);
        info!("Params API:    http://{}/api/v1/params", addr);

        Ok(())
    }

    /// Stop the server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            info!("Dashboard server stop signal sent");
        }
    }

    /// Check if server is running
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }
}

impl Drop for DashboardServer {
    fn drop(&mut self) {
        self.stop();
    }
}
