//! # Hash Subcommand
//!
//! Computes registry keys without touching the chain.
//!
//! - `certify hash record` hashes the four certificate fields.
//! - `certify hash file <path>` hashes a file's raw bytes, as the
//!   file-upload verification endpoint does.
//! - `certify hash json <path>` hashes an arbitrary JSON certificate
//!   document, preserving its key order.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use certify_core::{CertificateDocument, CertificateHash, Sha256Accumulator};

use crate::RecordArgs;

/// Arguments for `certify hash`.
#[derive(Args, Debug)]
pub struct HashArgs {
    #[command(subcommand)]
    pub command: HashCommand,
}

/// What to hash.
#[derive(Subcommand, Debug)]
pub enum HashCommand {
    /// Hash certificate fields.
    Record(RecordArgs),

    /// Hash a file's contents.
    File {
        /// File to hash.
        path: PathBuf,
    },

    /// Hash a JSON certificate document.
    Json {
        /// JSON file containing a single object.
        path: PathBuf,
    },
}

/// Execute `certify hash`. Prints the hash and returns exit code 0.
pub fn run_hash(args: &HashArgs) -> Result<u8> {
    let hash = match &args.command {
        HashCommand::Record(record) => {
            let record = record.record();
            tracing::debug!(?record, "hashing certificate record");
            record.hash()?
        }
        HashCommand::File { path } => hash_file(path)?,
        HashCommand::Json { path } => hash_json(path)?,
    };
    println!("{hash}");
    Ok(0)
}

/// SHA-256 of a file's bytes, read in fixed-size chunks.
pub fn hash_file(path: &Path) -> Result<CertificateHash> {
    let mut file = std::fs::File::open(path)
        .with_context(|| format!("cannot open {}", path.display()))?;
    let mut digest = Sha256Accumulator::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file
            .read(&mut buf)
            .with_context(|| format!("cannot read {}", path.display()))?;
        if n == 0 {
            break;
        }
        digest.update(&buf[..n]);
    }
    tracing::debug!(path = %path.display(), bytes = digest.bytes_seen(), "hashed file");
    Ok(digest.finalize())
}

/// Hash of a JSON certificate document.
pub fn hash_json(path: &Path) -> Result<CertificateHash> {
    Ok(load_document(path)?.hash()?)
}

/// Read a JSON certificate document. The file must hold a single object.
pub fn load_document(path: &Path) -> Result<CertificateDocument> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    CertificateDocument::from_value(value)
        .with_context(|| format!("{} must contain a JSON object", path.display()))
}
