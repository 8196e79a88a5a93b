use serde::{Deserialize, Serialize};

use crate::domain::DecisionResult;

/// Batch evaluation response, element-wise with the request's resources.
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchEvaluateResponse {
    pub results: Vec<DecisionResult>,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub policies: usize,
    pub uptime_secs: u64,
}

/// Readiness check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub policies: usize,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        ErrorResponse {
            error: error.into(),
            code: code.into(),
        }
    }

    pub fn no_policy_loaded() -> Self {
        ErrorResponse::new("no policies loaded", "NO_POLICY_LOADED")
    }
}
