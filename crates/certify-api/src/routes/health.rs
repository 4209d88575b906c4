//! # Health Probes
//!
//! Mounted outside auth. Readiness tracks the chain: the service is only
//! ready once the registry contract is bound.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use certify_chain::ConnectionState;

use crate::middleware::metrics::MetricsSnapshot;
use crate::state::AppState;

/// Build the health router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .route("/health/metrics", get(metrics))
}

/// Liveness probe: 200 while the process runs.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 only with a bound registry.
async fn readiness(State(state): State<AppState>) -> (StatusCode, String) {
    match state.connection_state() {
        ConnectionState::ContractBound => (StatusCode::OK, "ready".to_string()),
        other => (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("not ready: {other}"),
        ),
    }
}

/// Counters plus chain state.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    #[serde(flatten)]
    pub counters: MetricsSnapshot,
    /// `DISCONNECTED`, `CONNECTED` or `CONTRACT_BOUND`.
    #[schema(value_type = String)]
    pub chain_state: ConnectionState,
    #[schema(value_type = Option<String>)]
    pub contract_address: Option<String>,
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: i64,
}

/// GET /health/metrics
#[utoipa::path(
    get,
    path = "/health/metrics",
    responses((status = 200, description = "Request counters and chain state", body = MetricsResponse)),
    tag = "health"
)]
pub(crate) async fn metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        counters: state.metrics.snapshot(),
        chain_state: state.connection_state(),
        contract_address: state.contract_address().map(|a| a.to_string()),
        started_at: state.started_at,
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
    })
}
