//! # Request Metrics
//!
//! Process-local response counters, bucketed by status class and served as
//! JSON at `/health/metrics`. Counters reset on restart.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Default)]
struct Counters {
    requests: AtomicU64,
    client_errors: AtomicU64,
    server_errors: AtomicU64,
}

/// Shared handle to the counters. Clones count into the same totals.
#[derive(Debug, Clone, Default)]
pub struct ApiMetrics {
    counters: Arc<Counters>,
}

impl ApiMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one finished response.
    pub fn record(&self, status: StatusCode) {
        let c = &self.counters;
        c.requests.fetch_add(1, Ordering::Relaxed);
        if status.is_client_error() {
            c.client_errors.fetch_add(1, Ordering::Relaxed);
        } else if status.is_server_error() {
            c.server_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Point-in-time copy of the counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let c = &self.counters;
        MetricsSnapshot {
            requests: c.requests.load(Ordering::Relaxed),
            client_errors: c.client_errors.load(Ordering::Relaxed),
            server_errors: c.server_errors.load(Ordering::Relaxed),
        }
    }
}

/// Counter values at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Responses sent.
    pub requests: u64,
    /// Responses with a 4xx status.
    pub client_errors: u64,
    /// Responses with a 5xx status, including 503 while the chain is down.
    pub server_errors: u64,
}

/// Count every response, using the [`ApiMetrics`] request extension.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();
    let response = next.run(request).await;
    if let Some(metrics) = metrics {
        metrics.record(response.status());
    }
    response
}
