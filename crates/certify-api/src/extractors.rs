//! # Request Extraction Helpers
//!
//! Maps axum's JSON and multipart rejections into [`AppError`] so every
//! failure uses the same `{ "error": { "code", "message" } }` body.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
///
/// ```ignore
/// async fn handler(body: Result<Json<T>, JsonRejection>) -> Result<..., AppError> {
///     let req = extract_json(body)?;
/// }
/// ```
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Map a multipart stream error, including an exceeded body limit.
pub fn multipart_error(err: MultipartError) -> AppError {
    AppError::BadRequest(err.body_text())
}
