//! # Error Hierarchy
//!
//! Structured error types for certificate hashing and verification, built
//! with `thiserror`.

use thiserror::Error;

/// Top-level error type for certify-core operations.
#[derive(Error, Debug)]
pub enum CertifyError {
    /// Canonicalization failure during hash computation.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Certificate input failed validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Metadata stored on-chain is not valid JSON.
    #[error("registry metadata for {hash} is not valid JSON: {source}")]
    InvalidMetadata {
        /// Hash of the certificate whose metadata failed to parse.
        hash: String,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// On-chain timestamp cannot be represented as a date.
    #[error("registry timestamp {0} is out of range")]
    InvalidTimestamp(u64),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in certificate data; use a string or integer: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed during canonicalization.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Validation errors for certificate inputs.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// One or more required certificate fields are empty.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// A certificate hash is not 64 hexadecimal characters.
    #[error("invalid certificate hash: \"{0}\" (expected 64 hex characters, optionally 0x-prefixed)")]
    InvalidHash(String),

    /// A certificate document is not a JSON object.
    #[error("certificate document must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}
