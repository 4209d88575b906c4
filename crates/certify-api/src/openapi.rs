//! # OpenAPI Specification Assembly
//!
//! Collects the utoipa-documented routes into one OpenAPI document,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the certificate API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Certify: Blockchain Certificate Registry",
        version = "0.1.0",
        description = "Issue, verify and revoke course-completion certificates whose SHA-256 hashes are anchored in an Ethereum registry contract.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        crate::routes::certificates::issue_certificate,
        crate::routes::certificates::verify_certificate,
        crate::routes::certificates::revoke_certificate,
        crate::routes::certificates::get_certificate,
        crate::routes::files::verify_file,
        crate::routes::contract::contract_info,
        crate::routes::health::metrics,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::certificates::CertificateForm,
        crate::routes::certificates::IssueCertificateRequest,
        crate::routes::certificates::IssueCertificateResponse,
        crate::routes::certificates::VerifyCertificateResponse,
        crate::routes::certificates::RevokeCertificateResponse,
        crate::routes::certificates::CertificateView,
        crate::routes::certificates::GetCertificateResponse,
        crate::routes::files::VerifyFileResponse,
        crate::routes::files::FileDetails,
        crate::routes::contract::ContractInfoResponse,
        crate::routes::health::MetricsResponse,
        crate::middleware::metrics::MetricsSnapshot,
    )),
    tags(
        (name = "certificates", description = "Certificate issuance and verification"),
        (name = "contract", description = "Registry contract and signer"),
        (name = "health", description = "Probes and counters"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
