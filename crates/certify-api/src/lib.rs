//! # certify-api: HTTP Service for the Certificate Registry
//!
//! Serves the web UI and a JSON API over a bound registry contract.
//!
//! ## API Surface
//!
//! | Route                          | Module                      | Auth   |
//! |--------------------------------|-----------------------------|--------|
//! | `POST /api/issue-certificate`  | [`routes::certificates`]    | bearer |
//! | `POST /api/verify-certificate` | [`routes::certificates`]    |        |
//! | `POST /api/revoke-certificate` | [`routes::certificates`]    | bearer |
//! | `GET /api/certificate/:hash`   | [`routes::certificates`]    |        |
//! | `POST /api/verify-file`        | [`routes::files`]           |        |
//! | `GET /api/contract-info`       | [`routes::contract`]        |        |
//! | `/health/*`                    | [`routes::health`]          |        |
//! | `GET /openapi.json`            | [`openapi`]                 |        |
//! | `GET /`, static assets         | `public/`                   |        |
//!
//! Bearer auth applies only when `AUTH_TOKEN` is set.
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! NoCacheHeaders → TraceLayer → MetricsMiddleware → [BearerAuth] → Handler
//! ```
//!
//! ## Chain Availability
//!
//! Until bootstrap binds the registry contract, every `/api/*` route
//! answers 503 `CHAIN_UNAVAILABLE`. The UI, health probes and OpenAPI
//! document are always served.

pub mod auth;
pub mod bootstrap;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

use crate::auth::AuthConfig;
use crate::state::AppState;

/// Page served at `/`.
pub const INDEX_PAGE: &str = "index.simple.html";

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let metrics = state.metrics.clone();
    let public_dir = state.config.public_dir.clone();

    let app = Router::new()
        .merge(routes::certificates::router())
        .merge(routes::files::router(state.config.max_upload_bytes))
        .merge(routes::contract::router())
        .merge(routes::health::router())
        .merge(openapi::router())
        .route_service("/", ServeFile::new(public_dir.join(INDEX_PAGE)))
        .fallback_service(ServeDir::new(public_dir))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(middleware::tracing_layer::layer())
        .layer(axum::Extension(auth_config))
        .layer(axum::Extension(metrics))
        .with_state(state);

    middleware::cache::no_cache(app)
}
