#![deny(missing_docs)]

//! # certify-core: Foundational Types for Certificate Registration
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies. From the external ecosystem it
//! uses `serde`, `serde_json`, `thiserror`, `chrono`, `sha2` and `hex`.
//!
//! ## Design Principles
//!
//! 1. **[`CanonicalBytes`] is the sole path to a certificate hash.** Every
//!    hash that is written to or looked up in the on-chain registry flows
//!    through `CanonicalBytes::new()`. Uploaded files are the one exception:
//!    their raw bytes are hashed with [`sha256_bytes`].
//!
//! 2. **Record order is part of the hash.** Certificate fields serialize in
//!    declaration order with compact separators, so the same record always
//!    produces the same registry key.
//!
//! 3. **Registry results are mapped in one place.** [`Verification::from_entry`]
//!    turns the contract's raw `verifyCertificate` tuple into the result
//!    shape shown to API and CLI callers.
//!
//! 4. **[`CertifyError`] hierarchy.** Structured errors with `thiserror`. No
//!    `Box<dyn Error>` and no `.unwrap()` outside tests.

pub mod canonical;
pub mod certificate;
pub mod digest;
pub mod error;
pub mod verification;

// Re-export primary types at crate root for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use certificate::{CertificateDocument, CertificateMetadata, CertificateRecord};
pub use digest::{hash_certificate, sha256_bytes, sha256_digest, CertificateHash, Sha256Accumulator};
pub use error::{CanonicalizationError, CertifyError, ValidationError};
pub use verification::{format_timestamp, CertificateDetails, RegistryEntry, Verification};
