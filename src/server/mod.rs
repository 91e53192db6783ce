//! Dashboard and REST API server module
//!
//! Provides:
//! - The dashboard page at `/` (the render surface)
//! - A JSON API under `/api/v1/*` for the published view, the control
//!   store, pipeline status, and the changepoint sweep

mod server;
pub mod handlers;
mod types;

pub use handlers::DashboardState;
pub use server::DashboardServer;
pub use types::{
    ApiResponse, Empty, IntervalsResult, ParamUpdate, ParamUpdateResponse, SweepRequest,
    SweepResponse, ViewResponse,
};
