//! # Certificate Routes
//!
//! Issue, verify, revoke and look up course-completion certificates.
//!
//! The record submitted to issue and verify is hashed the same way, so a
//! verifier who retypes the certificate fields exactly gets the registry
//! key the issuer wrote.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use certify_core::{CertificateDetails, CertificateDocument, CertificateHash, CertificateMetadata};

use crate::auth::require_bearer;
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

/// Build the certificate router. Issue and revoke sit behind bearer auth.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/issue-certificate",
            post(issue_certificate).route_layer(from_fn(require_bearer)),
        )
        .route("/api/verify-certificate", post(verify_certificate))
        .route(
            "/api/revoke-certificate",
            post(revoke_certificate).route_layer(from_fn(require_bearer)),
        )
        .route("/api/certificate/:hash", get(get_certificate))
}

// -- Request/Response DTOs ----------------------------------------------------

/// Certificate fields submitted by the web form.
///
/// Handlers take the body as a raw JSON object and hash it with
/// [`CertificateDocument::from_submission`]; this type only documents the
/// expected shape. Values are hashed as submitted, so a number stays a number.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateForm {
    pub student_name: Option<String>,
    pub course_name: Option<String>,
    pub issue_date: Option<String>,
    /// Defaults to `N/A`.
    pub grade: Option<String>,
}

/// Request to issue a certificate.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueCertificateRequest {
    #[serde(flatten)]
    pub certificate: CertificateForm,
    /// Defaults to `Unknown Institution`.
    pub institution: Option<String>,
}

/// Successful issuance.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueCertificateResponse {
    pub success: bool,
    pub message: String,
    pub certificate_hash: String,
    pub transaction_hash: String,
    pub block_number: u64,
    pub gas_used: u64,
    /// The hashed document, with the grade default applied.
    #[schema(value_type = Object)]
    pub certificate: CertificateDocument,
    /// Metadata stored on-chain.
    #[schema(value_type = Object)]
    pub metadata: CertificateMetadata,
}

/// Verification outcome. Always returned with status 200.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCertificateResponse {
    pub success: bool,
    pub valid: bool,
    pub message: String,
    /// Registry entry, present only when the certificate is valid.
    #[schema(value_type = Option<Object>)]
    pub details: Option<CertificateDetails>,
    pub searched_hash: String,
}

/// Successful revocation.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevokeCertificateResponse {
    pub success: bool,
    pub message: String,
    pub certificate_hash: String,
    pub transaction_hash: String,
    pub block_number: u64,
}

/// A certificate looked up by hash.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateView {
    pub hash: String,
    pub issuer: String,
    pub issue_date: String,
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
    pub is_revoked: bool,
    pub valid: bool,
}

impl From<CertificateDetails> for CertificateView {
    fn from(d: CertificateDetails) -> Self {
        Self {
            hash: d.hash.to_hex(),
            issuer: d.issuer,
            issue_date: d.issue_date,
            metadata: d.metadata,
            is_revoked: d.is_revoked,
            valid: d.valid,
        }
    }
}

/// Response for `GET /api/certificate/:hash`.
#[derive(Debug, Serialize, ToSchema)]
pub struct GetCertificateResponse {
    pub success: bool,
    pub certificate: CertificateView,
}

// -- Handlers -----------------------------------------------------------------

/// POST /api/issue-certificate: hash the record and register it on-chain.
#[utoipa::path(
    post,
    path = "/api/issue-certificate",
    request_body = IssueCertificateRequest,
    responses(
        (status = 200, description = "Certificate issued", body = IssueCertificateResponse),
        (status = 400, description = "Missing required fields", body = crate::error::ErrorBody),
        (status = 401, description = "Missing or invalid bearer token", body = crate::error::ErrorBody),
        (status = 422, description = "Fractional number in the certificate", body = crate::error::ErrorBody),
        (status = 500, description = "Registry rejected the certificate", body = crate::error::ErrorBody),
        (status = 503, description = "Registry contract not bound", body = crate::error::ErrorBody),
    ),
    tag = "certificates"
)]
pub(crate) async fn issue_certificate(
    State(state): State<AppState>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<IssueCertificateResponse>, AppError> {
    let registry = state.registry()?;
    let fields = extract_json(body)?;

    let certificate = CertificateDocument::from_submission(&fields);
    certificate.require_record_fields()?;
    let institution = fields
        .get("institution")
        .and_then(Value::as_str)
        .map(str::to_string);
    let metadata = CertificateMetadata::web(institution);

    let hash = certificate.hash()?;
    tracing::info!(
        %hash,
        course = %certificate.fields().get("courseName").unwrap_or(&serde_json::Value::Null),
        institution = %metadata.institution,
        "issuing certificate"
    );
    let receipt = registry.issue(&hash, &metadata.to_json_string()?).await?;

    Ok(Json(IssueCertificateResponse {
        success: true,
        message: "Certificate issued successfully!".to_string(),
        certificate_hash: receipt.hash.to_hex(),
        transaction_hash: receipt.transaction_hash,
        block_number: receipt.block_number,
        gas_used: receipt.gas_used,
        certificate,
        metadata,
    }))
}

/// POST /api/verify-certificate: hash the record and look it up.
#[utoipa::path(
    post,
    path = "/api/verify-certificate",
    request_body = CertificateForm,
    responses(
        (status = 200, description = "Verification outcome", body = VerifyCertificateResponse),
        (status = 422, description = "Fractional number in the certificate", body = crate::error::ErrorBody),
        (status = 500, description = "Registry call failed", body = crate::error::ErrorBody),
        (status = 503, description = "Registry contract not bound", body = crate::error::ErrorBody),
    ),
    tag = "certificates"
)]
pub(crate) async fn verify_certificate(
    State(state): State<AppState>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<VerifyCertificateResponse>, AppError> {
    let registry = state.registry()?;
    // Incomplete submissions are hashed anyway: they can only fail to match.
    let certificate = CertificateDocument::from_submission(&extract_json(body)?);
    let hash = certificate.hash()?;

    let verification = registry.verify_certificate(&hash).await?;
    let valid = verification.is_valid();
    tracing::info!(%hash, valid, "certificate verified");

    Ok(Json(VerifyCertificateResponse {
        success: true,
        valid,
        message: if valid {
            "Certificate is authentic!"
        } else {
            "Certificate not found or invalid"
        }
        .to_string(),
        details: verification.into_details().filter(|d| d.valid),
        searched_hash: hash.to_hex(),
    }))
}

/// POST /api/revoke-certificate: mark the record's hash revoked.
#[utoipa::path(
    post,
    path = "/api/revoke-certificate",
    request_body = CertificateForm,
    responses(
        (status = 200, description = "Certificate revoked", body = RevokeCertificateResponse),
        (status = 400, description = "Missing required fields", body = crate::error::ErrorBody),
        (status = 401, description = "Missing or invalid bearer token", body = crate::error::ErrorBody),
        (status = 500, description = "Registry rejected the revocation", body = crate::error::ErrorBody),
        (status = 503, description = "Registry contract not bound", body = crate::error::ErrorBody),
    ),
    tag = "certificates"
)]
pub(crate) async fn revoke_certificate(
    State(state): State<AppState>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<RevokeCertificateResponse>, AppError> {
    let registry = state.registry()?;
    let certificate = CertificateDocument::from_submission(&extract_json(body)?);
    certificate.require_record_fields()?;
    let hash = certificate.hash()?;

    tracing::info!(%hash, "revoking certificate");
    let receipt = registry.revoke(&hash).await?;

    Ok(Json(RevokeCertificateResponse {
        success: true,
        message: "Certificate revoked successfully".to_string(),
        certificate_hash: receipt.hash.to_hex(),
        transaction_hash: receipt.transaction_hash,
        block_number: receipt.block_number,
    }))
}

/// GET /api/certificate/:hash: look up a registry key directly.
#[utoipa::path(
    get,
    path = "/api/certificate/:hash",
    params(("hash" = String, Path, description = "64 hex characters, optionally 0x-prefixed")),
    responses(
        (status = 200, description = "Certificate found", body = GetCertificateResponse),
        (status = 404, description = "Certificate not found", body = crate::error::ErrorBody),
        (status = 422, description = "Malformed hash", body = crate::error::ErrorBody),
        (status = 503, description = "Registry contract not bound", body = crate::error::ErrorBody),
    ),
    tag = "certificates"
)]
pub(crate) async fn get_certificate(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<GetCertificateResponse>, AppError> {
    let registry = state.registry()?;
    let hash = CertificateHash::from_hex(&raw)?;

    match registry.lookup(&hash).await? {
        Some(details) => Ok(Json(GetCertificateResponse {
            success: true,
            certificate: details.into(),
        })),
        None => Err(AppError::NotFound("Certificate not found".to_string())),
    }
}

