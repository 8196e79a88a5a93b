use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::audit::{AuditRecord, SafeLogger};
use crate::domain::AccessRequest;
use crate::engine::{self, EvalError};
use crate::policy::PolicyStore;

use super::request::BatchEvaluateRequest;
use super::response::{BatchEvaluateResponse, ErrorResponse, HealthResponse, ReadyResponse};

/// Shared application state.
pub struct AppState {
    /// Current policy store, swapped atomically on reload.
    pub store_rx: watch::Receiver<Arc<PolicyStore>>,

    /// Redacting logger for received audit records.
    pub audit: SafeLogger,

    /// Application start time.
    pub start_time: Instant,

    /// Application version.
    pub version: String,
}

/// Create the application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/decision/evaluate", post(handle_evaluate))
        .route("/v1/decision/evaluate-batch", post(handle_evaluate_batch))
        .route("/v1/audit", post(handle_audit))
        .route("/health", get(handle_health))
        .route("/ready", get(handle_ready))
        .route("/metrics", get(handle_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle a single evaluation request.
async fn handle_evaluate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AccessRequest>,
) -> axum::response::Response {
    let store = state.store_rx.borrow().clone();

    match engine::evaluate(&store, &request) {
        Ok(result) => {
            info!(
                role = %request.role,
                intent = %request.intent,
                disclosed = result.fields.len(),
                "Decision completed"
            );
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(EvalError::NoPolicyLoaded) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::no_policy_loaded()),
        )
            .into_response(),
    }
}

/// Handle a batch evaluation request.
async fn handle_evaluate_batch(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BatchEvaluateRequest>,
) -> axum::response::Response {
    let store = state.store_rx.borrow().clone();

    match engine::evaluate_many(
        &store,
        &request.role,
        &request.intent,
        &request.attributes,
        &request.resources,
    ) {
        Ok(results) => {
            info!(
                role = %request.role,
                intent = %request.intent,
                resources = results.len(),
                "Batch decision completed"
            );
            (StatusCode::OK, Json(BatchEvaluateResponse { results })).into_response()
        }
        Err(EvalError::NoPolicyLoaded) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::no_policy_loaded()),
        )
            .into_response(),
    }
}

/// Accept an audit record and log it through the redacting logger.
async fn handle_audit(
    State(state): State<Arc<AppState>>,
    Json(record): Json<AuditRecord>,
) -> impl IntoResponse {
    if let Some(data) = serde_json::to_value(&record).ok().and_then(|v| match v {
        serde_json::Value::Object(map) => Some(map),
        _ => None,
    }) {
        state.audit.info("Audit record received", &data);
    }

    StatusCode::ACCEPTED
}

/// Health check endpoint.
async fn handle_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store = state.store_rx.borrow().clone();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        policies: store.len(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// Readiness check endpoint: not ready until policies are loaded.
async fn handle_ready(State(state): State<Arc<AppState>>) -> axum::response::Response {
    let store = state.store_rx.borrow().clone();

    if store.is_empty() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new("No policies loaded", "NOT_READY")),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        Json(ReadyResponse {
            ready: true,
            policies: store.len(),
        }),
    )
        .into_response()
}

/// Metrics endpoint (Prometheus text format).
async fn handle_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store = state.store_rx.borrow().clone();

    let metrics = format!(
        r#"# HELP redactr_uptime_seconds Application uptime in seconds
# TYPE redactr_uptime_seconds counter
redactr_uptime_seconds {}

# HELP redactr_policies Number of policies loaded
# TYPE redactr_policies gauge
redactr_policies {}
"#,
        state.start_time.elapsed().as_secs(),
        store.len(),
    );

    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; charset=utf-8",
        )],
        metrics,
    )
}
