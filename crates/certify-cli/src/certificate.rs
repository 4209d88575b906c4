//! # Certificate Subcommands
//!
//! `issue`, `verify`, `revoke` and `lookup` against the bound registry.
//! The first three take the certificate as field flags or, with
//! `--document`, as a JSON file carrying extra fields.
//! Output follows one convention: a status word (`OK`, `VALID`, `REVOKED`,
//! `NOT FOUND`) then indented detail lines, or the raw result with `--json`.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{json, Value};

use certify_core::{CertificateDetails, CertificateHash, CertificateMetadata, Verification};

use crate::{connect, CertificateArgs, ChainArgs};

/// Arguments for `certify issue`.
#[derive(Args, Debug)]
pub struct IssueArgs {
    #[command(flatten)]
    pub certificate: CertificateArgs,

    /// Issuing institution. Defaults to "Unknown Institution".
    #[arg(long)]
    pub institution: Option<String>,

    /// Extra metadata as key=value. Repeatable. Numbers and booleans are
    /// stored as JSON scalars.
    #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_meta)]
    pub meta: Vec<(String, Value)>,
}

impl IssueArgs {
    /// On-chain metadata for this issuance.
    pub fn metadata(&self) -> CertificateMetadata {
        self.meta.iter().fold(
            CertificateMetadata::cli(self.institution.clone()),
            |metadata, (key, value)| metadata.with_field(key.as_str(), value.clone()),
        )
    }
}

/// Arguments for `certify verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub certificate: CertificateArgs,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `certify revoke`.
#[derive(Args, Debug)]
pub struct RevokeArgs {
    #[command(flatten)]
    pub certificate: CertificateArgs,
}

/// Arguments for `certify lookup`.
#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Certificate hash, 64 hex characters with optional 0x prefix.
    pub hash: String,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Parse `key=value`. The value is kept as a JSON number or boolean when it
/// parses as one, otherwise as a string.
pub fn parse_meta(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in `{raw}`"));
    }
    let value = match serde_json::from_str::<Value>(value) {
        Ok(v @ (Value::Number(_) | Value::Bool(_))) => v,
        _ => Value::String(value.to_string()),
    };
    Ok((key.to_string(), value))
}

/// Execute `certify issue`.
pub async fn run_issue(args: &IssueArgs, chain: &ChainArgs) -> Result<u8> {
    let document = args.certificate.document()?;
    document.require_record_fields()?;
    let hash = document.hash()?;
    let metadata = args.metadata().to_json_string()?;

    let registry = connect(chain.config()?).await?;
    tracing::info!(%hash, fields = document.fields().len(), "issuing certificate");
    let receipt = registry
        .issue(&hash, &metadata)
        .await
        .context("issueCertificate failed")?;

    println!("OK: certificate issued");
    println!("  hash:         {}", receipt.hash);
    println!("  transaction:  {}", receipt.transaction_hash);
    println!("  block:        {}", receipt.block_number);
    println!("  gas used:     {}", receipt.gas_used);
    Ok(0)
}

/// Execute `certify verify`. Exits 1 unless the certificate is valid.
pub async fn run_verify(args: &VerifyArgs, chain: &ChainArgs) -> Result<u8> {
    let hash = args.certificate.document()?.hash()?;
    let registry = connect(chain.config()?).await?;
    tracing::debug!(%hash, "verifying certificate");
    let verification = registry
        .verify_certificate(&hash)
        .await
        .context("verifyCertificate failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&verification_json(&verification))?);
    } else {
        print!("{}", render_verification(&verification));
    }
    Ok(if verification.is_valid() { 0 } else { 1 })
}

/// Execute `certify revoke`.
pub async fn run_revoke(args: &RevokeArgs, chain: &ChainArgs) -> Result<u8> {
    let document = args.certificate.document()?;
    document.require_record_fields()?;
    let hash = document.hash()?;

    let registry = connect(chain.config()?).await?;
    tracing::info!(%hash, "revoking certificate");
    let receipt = registry
        .revoke(&hash)
        .await
        .context("revokeCertificate failed")?;

    println!("OK: certificate revoked");
    println!("  hash:         {}", receipt.hash);
    println!("  transaction:  {}", receipt.transaction_hash);
    println!("  block:        {}", receipt.block_number);
    Ok(0)
}

/// Execute `certify lookup`. Exits 1 when the hash was never issued.
pub async fn run_lookup(args: &LookupArgs, chain: &ChainArgs) -> Result<u8> {
    let hash = CertificateHash::from_hex(&args.hash)?;
    let registry = connect(chain.config()?).await?;
    let found = registry.lookup(&hash).await.context("lookup failed")?;

    let verification = match found {
        Some(details) => Verification::Found(details),
        None => Verification::NotFound { hash },
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&verification_json(&verification))?);
    } else {
        print!("{}", render_verification(&verification));
    }
    Ok(if verification.details().is_some() { 0 } else { 1 })
}

/// JSON form of a verification result.
pub fn verification_json(verification: &Verification) -> Value {
    match verification {
        Verification::Found(details) => json!(details),
        Verification::NotFound { hash } => json!({
            "valid": false,
            "exists": false,
            "hash": hash,
        }),
    }
}

/// Human-readable verification result, one line per field.
pub fn render_verification(verification: &Verification) -> String {
    match verification {
        Verification::Found(details) => render_details(details),
        Verification::NotFound { hash } => {
            format!("NOT FOUND: certificate not found on blockchain\n  hash:         {hash}\n")
        }
    }
}

fn render_details(details: &CertificateDetails) -> String {
    let status = if details.is_revoked {
        "REVOKED: certificate has been revoked"
    } else {
        "VALID: certificate is authentic"
    };
    format!(
        "{status}\n  hash:         {}\n  issuer:       {}\n  issued at:    {}\n  metadata:     {}\n",
        details.hash, details.issuer, details.issue_date, details.metadata
    )
}
