//! # Verification Mapping
//!
//! Turns the raw `verifyCertificate` tuple returned by the registry contract
//! into the result shown to API and CLI callers.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::digest::CertificateHash;
use crate::error::CertifyError;

/// The 5-tuple returned by `verifyCertificate(string)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    /// Whether the hash was ever issued.
    pub exists: bool,
    /// Issuer address, EIP-55 checksummed.
    pub issuer: String,
    /// Block timestamp of issuance, in seconds.
    pub timestamp: u64,
    /// Whether the certificate was revoked.
    pub is_revoked: bool,
    /// Metadata JSON string as stored on-chain.
    pub metadata: String,
}

/// Details of a certificate that exists in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateDetails {
    /// `true` when the certificate exists and is not revoked.
    pub valid: bool,
    /// Always `true` for a found certificate.
    pub exists: bool,
    /// Issuer address.
    pub issuer: String,
    /// Issuance time, RFC 3339 UTC with milliseconds.
    pub issue_date: String,
    /// Parsed metadata object.
    pub metadata: Value,
    /// Whether the certificate was revoked.
    pub is_revoked: bool,
    /// Registry key.
    pub hash: CertificateHash,
}

/// Outcome of looking a hash up in the registry.
#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    /// The hash is registered (possibly revoked).
    Found(CertificateDetails),
    /// The hash was never issued.
    NotFound {
        /// The hash that was searched for.
        hash: CertificateHash,
    },
}

impl Verification {
    /// Map a registry entry into a verification result.
    pub fn from_entry(hash: CertificateHash, entry: RegistryEntry) -> Result<Self, CertifyError> {
        if !entry.exists {
            return Ok(Self::NotFound { hash });
        }

        let issue_date = format_timestamp(entry.timestamp)?;
        let metadata = parse_metadata(&hash, &entry.metadata)?;

        Ok(Self::Found(CertificateDetails {
            valid: !entry.is_revoked,
            exists: true,
            issuer: entry.issuer,
            issue_date,
            metadata,
            is_revoked: entry.is_revoked,
            hash,
        }))
    }

    /// `true` only for a found, unrevoked certificate.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Found(d) if d.valid)
    }

    /// The hash this result is about.
    pub fn hash(&self) -> &CertificateHash {
        match self {
            Self::Found(d) => &d.hash,
            Self::NotFound { hash } => hash,
        }
    }

    /// Details, if the certificate exists.
    pub fn details(&self) -> Option<&CertificateDetails> {
        match self {
            Self::Found(d) => Some(d),
            Self::NotFound { .. } => None,
        }
    }

    /// Consume into details, if the certificate exists.
    pub fn into_details(self) -> Option<CertificateDetails> {
        match self {
            Self::Found(d) => Some(d),
            Self::NotFound { .. } => None,
        }
    }
}

/// Render a block timestamp as RFC 3339 UTC with millisecond precision.
pub fn format_timestamp(seconds: u64) -> Result<String, CertifyError> {
    let secs = i64::try_from(seconds).map_err(|_| CertifyError::InvalidTimestamp(seconds))?;
    let dt: DateTime<Utc> =
        DateTime::from_timestamp(secs, 0).ok_or(CertifyError::InvalidTimestamp(seconds))?;
    Ok(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn parse_metadata(hash: &CertificateHash, raw: &str) -> Result<Value, CertifyError> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_str(raw).map_err(|source| CertifyError::InvalidMetadata {
        hash: hash.to_hex(),
        source,
    })
}
