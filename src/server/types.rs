//! Dashboard REST API types
//!
//! Note: the dashboard controls post their values as text, but JSON
//! clients may send plain numbers, so the control-event payload accepts
//! both via a custom deserializer.

use crate::forecast::validation::SweepOutcome;
use crate::forecast::SeasonalityMode;
use crate::params::{ParamField, Parameters};
use crate::state::{PipelineStatus, PublishedView};
use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize a value that can be either a string or a bare number
fn deserialize_flexible_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlexibleValue {
        Str(String),
        Int(i64),
        Float(f64),
    }

    match FlexibleValue::deserialize(deserializer)? {
        FlexibleValue::Str(s) => Ok(s),
        FlexibleValue::Int(i) => Ok(i.to_string()),
        FlexibleValue::Float(f) => Ok(f.to_string()),
    }
}

/// Standard API response envelope
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(message: &str) -> Self {
        Self {
            status: "success".to_string(),
            message: Some(message.to_string()),
            data: None,
        }
    }
}

/// Empty data payload for message-only responses
#[derive(Debug, Clone, Serialize)]
pub struct Empty {}

/// One discrete control edit from the dashboard
#[derive(Debug, Deserialize)]
pub struct ParamUpdate {
    pub field: ParamField,
    #[serde(deserialize_with = "deserialize_flexible_string")]
    pub value: String,
}

/// Outcome of a control edit
#[derive(Debug, Serialize)]
pub struct ParamUpdateResponse {
    pub changed: bool,
    pub recompute_queued: bool,
    pub params: Parameters,
}

/// Current snapshot plus pipeline progress, polled by the dashboard
#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub view: Option<PublishedView>,
    pub status: PipelineStatus,
}

/// Supported intervals
#[derive(Debug, Clone, Serialize)]
pub struct IntervalsResult {
    pub intervals: Vec<String>,
}

/// Changepoint-prior-scale sweep request; omitted grid uses the default
#[derive(Debug, Default, Deserialize)]
pub struct SweepRequest {
    #[serde(default)]
    pub grid: Option<Vec<f64>>,
}

#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub symbol: String,
    pub horizon: u32,
    pub seasonality_mode: SeasonalityMode,
    pub outcomes: Vec<SweepOutcome>,
}
