//! # Cache Suppression
//!
//! Every response carries headers that stop browsers and CDNs from caching
//! it. Verification results change when a certificate is revoked, and the
//! web UI must always load the current script.

use axum::http::header::{self, HeaderName, HeaderValue};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

/// `Cache-Control` value sent on every response.
pub const CACHE_CONTROL: &str = "no-store, no-cache, must-revalidate, proxy-revalidate";

/// Wrap `router` so every response carries the no-cache headers.
pub fn no_cache<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::EXPIRES,
            HeaderValue::from_static("0"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("surrogate-control"),
            HeaderValue::from_static("no-store"),
        ))
}
