//! # certify CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use certify_cli::certificate::{
    run_issue, run_lookup, run_revoke, run_verify, IssueArgs, LookupArgs, RevokeArgs, VerifyArgs,
};
use certify_cli::check::{run_check, CheckArgs};
use certify_cli::contract::{run_authorize_issuer, run_info, AuthorizeIssuerArgs, InfoArgs};
use certify_cli::hash::{run_hash, HashArgs};
use certify_cli::ChainArgs;

/// Certificate registry operator CLI.
///
/// Hashes certificates offline, issues, verifies and revokes them on the
/// registry contract, and diagnoses the node connection.
#[derive(Parser, Debug)]
#[command(name = "certify", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    chain: ChainArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute a certificate hash without contacting the chain.
    Hash(HashArgs),

    /// Issue a certificate on the registry.
    Issue(IssueArgs),

    /// Verify a certificate. Exits 1 unless it is valid.
    Verify(VerifyArgs),

    /// Revoke a certificate.
    Revoke(RevokeArgs),

    /// Look up a certificate by hash.
    Lookup(LookupArgs),

    /// Show contract, owner, signer, balance and network.
    Info(InfoArgs),

    /// Diagnose the node and contract connection step by step.
    Check(CheckArgs),

    /// Authorize an address to issue certificates (contract owner only).
    AuthorizeIssuer(AuthorizeIssuerArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Hash(args) => run_hash(args),
        Commands::Issue(args) => run_issue(args, &cli.chain).await,
        Commands::Verify(args) => run_verify(args, &cli.chain).await,
        Commands::Revoke(args) => run_revoke(args, &cli.chain).await,
        Commands::Lookup(args) => run_lookup(args, &cli.chain).await,
        Commands::Info(args) => run_info(args, &cli.chain).await,
        Commands::Check(args) => run_check(args, &cli.chain).await,
        Commands::AuthorizeIssuer(args) => run_authorize_issuer(args, &cli.chain).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("FAIL: {e:#}");
            ExitCode::from(2)
        }
    }
}
