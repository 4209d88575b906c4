//! # Canonical Serialization
//!
//! This module defines [`CanonicalBytes`], the sole construction path for
//! bytes that are hashed into a certificate registry key.
//!
//! ## Encoding Rules
//!
//! 1. Compact separators: no whitespace between tokens.
//! 2. Object keys keep their declared (struct) or insertion (document)
//!    order. Keys are NOT sorted: certificates issued through the web
//!    interface were hashed in field order, and re-sorting would orphan
//!    every registry entry already on-chain.
//! 3. Reject non-integer numbers. Float rendering differs between JSON
//!    encoders (`3.0` vs `3`), so a float would make the hash depend on
//!    the encoder.
//! 4. Strings are emitted verbatim with only the escapes JSON requires.
//!    Non-ASCII characters are not `\u`-escaped.
//!
//! ## Security Invariant
//!
//! The inner `Vec<u8>` is private. The only way to construct
//! `CanonicalBytes` is through [`CanonicalBytes::new()`], so no caller can
//! hash a pretty-printed or re-ordered rendering by accident.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by the certificate canonicalization rules.
///
/// The inner `Vec<u8>` is private. Downstream code can only construct
/// `CanonicalBytes` through [`CanonicalBytes::new()`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// The value is first checked for float numbers, then serialized
    /// compactly. Struct fields serialize in declaration order; dynamic
    /// JSON objects keep insertion order.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        reject_floats(&value)?;
        let bytes = serde_json::to_vec(&value)?;
        Ok(Self(bytes))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume and return the inner byte vector.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Number of canonical bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the canonical encoding is empty. Never true for a value
    /// produced by [`CanonicalBytes::new`], since `null` encodes as 4 bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Walk a JSON value and reject any number that is not an integer.
fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Number(n) => {
            if n.is_f64() {
                return Err(CanonicalizationError::FloatRejected(
                    n.as_f64().unwrap_or(f64::NAN),
                ));
            }
            Ok(())
        }
        Value::Object(map) => map.values().try_for_each(reject_floats),
        Value::Array(arr) => arr.iter().try_for_each(reject_floats),
        Value::String(_) | Value::Bool(_) | Value::Null => Ok(()),
    }
}
