//! # certify-cli: Operator CLI for the Certificate Registry
//!
//! Provides the `certify` command-line interface.
//!
//! ## Subcommands
//!
//! - `certify hash` computes certificate hashes offline.
//! - `certify issue`, `certify verify`, `certify revoke` and
//!   `certify lookup` operate on registry entries.
//! - `certify info` prints the contract, owner, signer and network.
//! - `certify check` walks through the connection step by step.
//! - `certify authorize-issuer` grants issuing rights (owner only).
//!
//! ```bash
//! certify hash record --student "John Doe" --course "Blockchain Development Fundamentals" --date 2024-01-15 --grade A+
//! certify --rpc-url http://127.0.0.1:8545 verify --student "John Doe" --course "..." --date 2024-01-15
//! certify verify --document certificate.json
//! certify check
//! ```
//!
//! Every handler returns `anyhow::Result<u8>`; the `u8` is the process exit
//! code.

pub mod certificate;
pub mod check;
pub mod contract;
pub mod hash;

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use certify_chain::{CertificateRegistry, ChainConfig, ChainSession, ContractArtifact};
use certify_core::{CertificateDocument, CertificateRecord};

/// Connection options shared by every subcommand that talks to a node.
///
/// Flags override the `CERTIFY_*` environment variables read by
/// [`ChainConfig::from_env`].
#[derive(Args, Debug, Clone, Default)]
pub struct ChainArgs {
    /// JSON-RPC endpoint of the Ethereum node.
    #[arg(long, global = true, value_name = "URL")]
    pub rpc_url: Option<String>,

    /// Path to the deployed contract's `contract-info.json`.
    #[arg(long, global = true, value_name = "PATH")]
    pub contract_info: Option<PathBuf>,
}

impl ChainArgs {
    /// Environment configuration with command-line overrides applied.
    pub fn config(&self) -> anyhow::Result<ChainConfig> {
        let mut config = ChainConfig::from_env().context("invalid chain configuration")?;
        if let Some(url) = &self.rpc_url {
            config.rpc_url = url
                .parse()
                .with_context(|| format!("invalid --rpc-url: {url}"))?;
        }
        if let Some(path) = &self.contract_info {
            config = config.with_contract_info(path);
        }
        Ok(config)
    }
}

/// The certificate fields, as flags.
#[derive(Args, Debug, Clone)]
pub struct RecordArgs {
    /// Name of the certificate holder.
    #[arg(long)]
    pub student: String,

    /// Name of the completed course.
    #[arg(long)]
    pub course: String,

    /// Issue date, hashed exactly as given (e.g. 2024-01-15).
    #[arg(long)]
    pub date: String,

    /// Grade. Defaults to N/A.
    #[arg(long)]
    pub grade: Option<String>,
}

impl RecordArgs {
    /// Build the record. Required fields are not validated here.
    pub fn record(&self) -> CertificateRecord {
        CertificateRecord::new(
            self.student.as_str(),
            self.course.as_str(),
            self.date.as_str(),
            self.grade.clone(),
        )
    }
}

/// The certificate an issue, verify or revoke acts on: the field flags, or
/// a JSON document with extra fields such as credits or an instructor.
#[derive(Args, Debug, Clone, Default)]
pub struct CertificateArgs {
    /// Name of the certificate holder.
    #[arg(long, required_unless_present = "document")]
    pub student: Option<String>,

    /// Name of the completed course.
    #[arg(long, required_unless_present = "document")]
    pub course: Option<String>,

    /// Issue date, hashed exactly as given (e.g. 2024-01-15).
    #[arg(long, required_unless_present = "document")]
    pub date: Option<String>,

    /// Grade. Defaults to N/A.
    #[arg(long)]
    pub grade: Option<String>,

    /// JSON certificate document, hashed with its key order intact.
    #[arg(
        long,
        value_name = "PATH",
        conflicts_with_all = ["student", "course", "date", "grade"]
    )]
    pub document: Option<PathBuf>,
}

impl CertificateArgs {
    /// The document to hash. Flags hash exactly like the record they form.
    pub fn document(&self) -> anyhow::Result<CertificateDocument> {
        match &self.document {
            Some(path) => hash::load_document(path),
            None => {
                let field = |v: &Option<String>| v.clone().unwrap_or_default();
                let record = CertificateRecord::new(
                    field(&self.student),
                    field(&self.course),
                    field(&self.date),
                    self.grade.clone(),
                );
                Ok(CertificateDocument::from_record(&record))
            }
        }
    }
}

/// Load the artifact, connect and bind, returning the registry.
pub async fn connect(config: ChainConfig) -> anyhow::Result<CertificateRegistry> {
    let artifact = ContractArtifact::load(&config.contract_info_path).with_context(|| {
        format!(
            "cannot load contract artifact {}",
            config.contract_info_path.display()
        )
    })?;
    let rpc_url = config.rpc_url.clone();
    let session = ChainSession::new(config)?
        .connect()
        .await
        .with_context(|| format!("cannot connect to node at {rpc_url}"))?;
    let bound = session
        .bind(&artifact)
        .await
        .with_context(|| format!("registry contract not answering at {}", artifact.address))?;
    Ok(bound.into_registry())
}
