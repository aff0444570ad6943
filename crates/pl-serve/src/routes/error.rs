use axum::http::StatusCode;
use axum::Json;
use pl_core::error::{DiscoveryError, InsightError, LogError};
use pl_core::types::AnalysisResult;
use pl_core::ProcessError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const SUCCESS_MESSAGE: &str = "Processing successful.";
pub const INTERNAL_MESSAGE: &str =
    "An internal server error occurred while processing the event log.";
pub const DISCOVERY_MESSAGE: &str = "Failed to discover a process model from the event log.";

/// Body of every `/api/process` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ApiEnvelope {
    pub success: bool,
    pub message: String,
    pub data: Option<AnalysisResult>,
}

impl ApiEnvelope {
    pub fn ok(data: AnalysisResult) -> Self {
        Self {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

pub fn failure(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ApiEnvelope>) {
    (status, Json(ApiEnvelope::failure(message)))
}

pub fn map_error(err: &ProcessError) -> (StatusCode, Json<ApiEnvelope>) {
    let (status, message) = match err {
        ProcessError::Log(log) => map_log_error(log),
        ProcessError::Discovery(discovery) => map_discovery_error(discovery),
        ProcessError::Insight(insight) => map_insight_error(insight),
        ProcessError::Internal { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
        }
    };
    failure(status, message)
}

fn map_log_error(err: &LogError) -> (StatusCode, String) {
    if err.is_validation() {
        (StatusCode::BAD_REQUEST, err.to_string())
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
    }
}

fn map_discovery_error(err: &DiscoveryError) -> (StatusCode, String) {
    match err {
        DiscoveryError::Failed { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, DISCOVERY_MESSAGE.to_string())
        }
    }
}

fn map_insight_error(err: &InsightError) -> (StatusCode, String) {
    match err {
        InsightError::InvalidGraphInput { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
        }
    }
}
