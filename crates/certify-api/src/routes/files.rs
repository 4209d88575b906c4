//! # File Verification Route
//!
//! Hashes an uploaded certificate file and looks the digest up in the
//! registry. The upload is hashed chunk by chunk as it streams in and is
//! never written to disk.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use certify_core::{CertificateHash, Sha256Accumulator};

use crate::error::AppError;
use crate::extractors::multipart_error;
use crate::state::AppState;

/// Multipart field carrying the file.
pub const UPLOAD_FIELD: &str = "certificate";

/// Build the file verification router with the given upload limit.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/api/verify-file", post(verify_file))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// File verification outcome.
#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyFileResponse {
    pub success: bool,
    pub valid: bool,
    pub message: String,
    pub details: FileDetails,
}

/// Registry entry for a file digest. Only `fileHash` and `fileName` are
/// present when the digest is unknown.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileDetails {
    pub file_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_revoked: Option<bool>,
    pub file_name: String,
}

struct Upload {
    file_name: String,
    hash: CertificateHash,
    size: u64,
}

async fn hash_upload(mut multipart: Multipart) -> Result<Option<Upload>, AppError> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let mut digest = Sha256Accumulator::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            digest.update(&chunk);
        }
        return Ok(Some(Upload {
            file_name,
            size: digest.bytes_seen(),
            hash: digest.finalize(),
        }));
    }
    Ok(None)
}

/// POST /api/verify-file
#[utoipa::path(
    post,
    path = "/api/verify-file",
    request_body(content = Vec<u8>, content_type = "multipart/form-data", description = "File in the `certificate` field"),
    responses(
        (status = 200, description = "Verification outcome", body = VerifyFileResponse),
        (status = 400, description = "No file uploaded", body = crate::error::ErrorBody),
        (status = 500, description = "Registry call failed", body = crate::error::ErrorBody),
        (status = 503, description = "Registry contract not bound", body = crate::error::ErrorBody),
    ),
    tag = "certificates"
)]
pub(crate) async fn verify_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<VerifyFileResponse>, AppError> {
    let registry = state.registry()?;
    let no_file = || AppError::BadRequest("No file uploaded".to_string());

    // A body that is not multipart cannot carry a file.
    let multipart = multipart.map_err(|_| no_file())?;
    let upload = hash_upload(multipart).await?.ok_or_else(no_file)?;
    tracing::info!(
        hash = %upload.hash,
        file_name = %upload.file_name,
        size = upload.size,
        "verifying uploaded file"
    );

    let response = match registry.lookup(&upload.hash).await? {
        Some(found) => VerifyFileResponse {
            success: true,
            valid: !found.is_revoked,
            message: if found.is_revoked {
                "Certificate is revoked"
            } else {
                "File certificate is authentic!"
            }
            .to_string(),
            details: FileDetails {
                file_hash: upload.hash.to_hex(),
                issuer: Some(found.issuer),
                issue_date: Some(found.issue_date),
                metadata: Some(found.metadata),
                is_revoked: Some(found.is_revoked),
                file_name: upload.file_name,
            },
        },
        None => VerifyFileResponse {
            success: true,
            valid: false,
            message: "Certificate file not found on blockchain".to_string(),
            details: FileDetails {
                file_hash: upload.hash.to_hex(),
                issuer: None,
                issue_date: None,
                metadata: None,
                is_revoked: None,
                file_name: upload.file_name,
            },
        },
    };
    Ok(Json(response))
}
