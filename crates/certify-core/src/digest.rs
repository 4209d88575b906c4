//! # Certificate Hashes
//!
//! Defines [`CertificateHash`], the 32-byte SHA-256 digest that keys a
//! certificate in the on-chain registry.
//!
//! ## Registry Key Format
//!
//! The contract stores certificates under a `string` key: the digest as
//! 64 lowercase hex characters, without a `0x` prefix. [`CertificateHash`]
//! renders exactly that string through `Display` and `Serialize`, and
//! normalizes caller-supplied hashes back to it in [`CertificateHash::from_hex`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::{CanonicalizationError, ValidationError};

/// SHA-256 digest identifying a certificate in the registry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CertificateHash([u8; 32]);

impl CertificateHash {
    /// Wrap raw digest bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a hex-encoded hash.
    ///
    /// Accepts upper- or lowercase hex with an optional `0x` prefix. The
    /// result always renders as lowercase without prefix.
    pub fn from_hex(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let mut bytes = [0u8; 32];
        if digits.len() != 64 || hex::decode_to_slice(digits, &mut bytes).is_err() {
            return Err(ValidationError::InvalidHash(input.to_string()));
        }
        Ok(Self(bytes))
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Return the digest as a lowercase hex string (the registry key).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for CertificateHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for CertificateHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CertificateHash({})", self.to_hex())
    }
}

impl FromStr for CertificateHash {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for CertificateHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for CertificateHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Hash canonical certificate bytes.
pub fn sha256_digest(canonical: &CanonicalBytes) -> CertificateHash {
    sha256_bytes(canonical.as_bytes())
}

/// Hash raw bytes, e.g. an uploaded certificate file.
pub fn sha256_bytes(data: &[u8]) -> CertificateHash {
    CertificateHash(Sha256::digest(data).into())
}

/// Canonicalize and hash any serializable certificate in one step.
pub fn hash_certificate(value: &impl Serialize) -> Result<CertificateHash, CanonicalizationError> {
    let canonical = CanonicalBytes::new(value)?;
    Ok(sha256_digest(&canonical))
}

/// Incremental SHA-256 over chunked input.
///
/// Used for streamed uploads so that a file never needs to be buffered or
/// written to disk before it is hashed.
#[derive(Clone, Default)]
pub struct Sha256Accumulator {
    hasher: Sha256,
    bytes_seen: u64,
}

impl fmt::Debug for Sha256Accumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sha256Accumulator")
            .field("bytes_seen", &self.bytes_seen)
            .finish()
    }
}

impl Sha256Accumulator {
    /// Start a new accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next chunk.
    pub fn update(&mut self, chunk: &[u8]) {
        self.bytes_seen += chunk.len() as u64;
        self.hasher.update(chunk);
    }

    /// Total number of bytes fed so far.
    pub fn bytes_seen(&self) -> u64 {
        self.bytes_seen
    }

    /// Finish and return the hash.
    pub fn finalize(self) -> CertificateHash {
        CertificateHash(self.hasher.finalize().into())
    }
}
