//! Application error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Remote market data could not be fetched or did not parse
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// The forecasting model rejected its input
    #[error("Fit failure: {0}")]
    FitFailure(String),

    /// Actual/forecast series disagree on shape or alignment
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Degenerate metric input (an actual value of exactly zero)
    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    /// User-supplied control value failed validation
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Serializable error response for API clients
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        let code = match err {
            AppError::DataUnavailable(_) => "DATA_UNAVAILABLE",
            AppError::FitFailure(_) => "FIT_FAILURE",
            AppError::InvariantViolation(_) => "INVARIANT_VIOLATION",
            AppError::DivisionByZero(_) => "DIVISION_BY_ZERO",
            AppError::InvalidParameter(_) => "INVALID_PARAMETER",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        };

        ErrorResponse {
            code: code.to_string(),
            message: err.to_string(),
        }
    }
}

// Allow AppError to be returned from axum handlers
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            AppError::DataUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::FitFailure(_)
            | AppError::InvariantViolation(_)
            | AppError::DivisionByZero(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Config(_) | AppError::Io(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
