//! # Connection Diagnostics
//!
//! `certify check` walks the path from artifact file to a usable registry
//! one step at a time and stops at the first failure, printing a hint for
//! the step that broke:
//!
//! 1. contract artifact loads and exposes the registry interface
//! 2. node answers `eth_chainId`
//! 3. node offers unlocked accounts
//! 4. configured signer index selects one of them
//! 5. signer balance is readable
//! 6. contract answers `owner()` at the artifact address
//! 7. signer is an authorized issuer
//!
//! An unauthorized signer is a warning, not a failure: the connection works,
//! and reads and verification need no authorization.

use std::fmt;

use anyhow::Result;
use clap::Args;

use certify_chain::{
    format_ether, ChainConfig, ChainError, ChainSession, ContractArtifact, NetworkInfo, RpcClient,
};

use crate::ChainArgs;

/// Arguments for `certify check`.
#[derive(Args, Debug, Default)]
pub struct CheckArgs {}

/// Step names, in execution order.
pub const STEPS: [&str; 7] = [
    "contract artifact",
    "provider and network",
    "accounts",
    "signer",
    "balance",
    "contract owner()",
    "authorized issuer",
];

/// Result of one diagnostic step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass(String),
    /// Passed, with something the operator should know about.
    Warn { detail: String, hint: Option<String> },
    Fail { error: String, hint: String },
    /// Not run because an earlier step failed.
    Skipped,
}

/// One numbered step and its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub number: usize,
    pub name: &'static str,
    pub outcome: Outcome,
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}/{}] {:<22}", self.number, STEPS.len(), self.name)?;
        match &self.outcome {
            Outcome::Pass(detail) => write!(f, "OK: {detail}"),
            Outcome::Warn { detail, hint } => {
                write!(f, "WARN: {detail}")?;
                match hint {
                    Some(hint) => write!(f, "\n      hint: {hint}"),
                    None => Ok(()),
                }
            }
            Outcome::Fail { error, hint } => write!(f, "FAIL: {error}\n      hint: {hint}"),
            Outcome::Skipped => write!(f, "SKIP"),
        }
    }
}

/// Accumulates step outcomes in order.
struct Diagnosis {
    reports: Vec<StepReport>,
}

impl Diagnosis {
    fn new() -> Self {
        Self {
            reports: Vec::with_capacity(STEPS.len()),
        }
    }

    fn record(&mut self, outcome: Outcome) {
        let number = self.reports.len() + 1;
        let name = STEPS[number - 1];
        match &outcome {
            Outcome::Pass(detail) => tracing::info!(step = number, name, %detail, "check passed"),
            Outcome::Warn { detail, .. } => tracing::warn!(step = number, name, %detail, "check warning"),
            Outcome::Fail { error, .. } => tracing::warn!(step = number, name, %error, "check failed"),
            Outcome::Skipped => {}
        }
        self.reports.push(StepReport {
            number,
            name,
            outcome,
        });
    }

    fn pass(&mut self, detail: impl Into<String>) {
        self.record(Outcome::Pass(detail.into()));
    }

    fn warn(&mut self, detail: impl Into<String>, hint: Option<String>) {
        self.record(Outcome::Warn {
            detail: detail.into(),
            hint,
        });
    }

    /// Record a failure and mark every remaining step skipped.
    fn fail(mut self, error: impl fmt::Display, hint: impl Into<String>) -> Vec<StepReport> {
        self.record(Outcome::Fail {
            error: error.to_string(),
            hint: hint.into(),
        });
        while self.reports.len() < STEPS.len() {
            self.record(Outcome::Skipped);
        }
        self.reports
    }
}

const HINT_NODE: &str = "start a local node (e.g. `npx hardhat node`) or point --rpc-url at a running one";
const HINT_DEPLOY: &str = "deploy the registry (e.g. `npx hardhat run scripts/deploy.js --network localhost`) \
     and make sure contract-info.json was written for this node";

/// Run every step against `config`, stopping at the first failure.
pub async fn diagnose(config: &ChainConfig) -> Vec<StepReport> {
    let mut diagnosis = Diagnosis::new();

    // 1
    let artifact = match ContractArtifact::load(&config.contract_info_path) {
        Ok(artifact) => artifact,
        Err(e) => return diagnosis.fail(e, HINT_DEPLOY),
    };
    if let Err(e) = artifact.interface() {
        return diagnosis.fail(
            e,
            "the artifact ABI is not a certificate registry; redeploy and regenerate contract-info.json",
        );
    }
    diagnosis.pass(format!(
        "{} ({} ABI entries) at {}",
        config.contract_info_path.display(),
        artifact.abi.len(),
        artifact.address
    ));

    // 2
    let rpc = match RpcClient::new(config.rpc_url.clone(), config.timeout()) {
        Ok(rpc) => rpc,
        Err(e) => return diagnosis.fail(e, HINT_NODE),
    };
    match rpc.chain_id().await {
        Ok(chain_id) => {
            let network = NetworkInfo::from_chain_id(chain_id);
            diagnosis.pass(format!(
                "{} is {} (chain id {})",
                config.rpc_url, network.name, network.chain_id
            ));
        }
        Err(e) => return diagnosis.fail(e, HINT_NODE),
    }

    // 3
    let accounts = match rpc.accounts().await {
        Ok(accounts) if accounts.is_empty() => {
            return diagnosis.fail(
                ChainError::NoAccounts,
                "use a development node with unlocked accounts (Hardhat and Anvil provide them by default)",
            )
        }
        Ok(accounts) => accounts,
        Err(e) => return diagnosis.fail(e, HINT_NODE),
    };
    diagnosis.pass(format!("{} account(s)", accounts.len()));

    // 4
    let index = config.signer_index;
    let Some(signer) = accounts.get(index).copied() else {
        return diagnosis.fail(
            ChainError::SignerIndexOutOfRange {
                index,
                available: accounts.len(),
            },
            format!("set CERTIFY_SIGNER_INDEX to a value below {}", accounts.len()),
        );
    };
    diagnosis.pass(format!("{signer} (account #{index})"));

    // 5
    match rpc.balance(&signer).await {
        Ok(0) => diagnosis.pass("0.0 ETH; transactions from this signer will fail"),
        Ok(wei) => diagnosis.pass(format!("{} ETH", format_ether(wei))),
        Err(e) => return diagnosis.fail(e, HINT_NODE),
    }

    // 6
    let bound = match ChainSession::new(config.clone()) {
        Ok(session) => match session.connect().await {
            Ok(connected) => connected.bind(&artifact).await,
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };
    let registry = match bound {
        Ok(bound) => bound.into_registry(),
        Err(e) => return diagnosis.fail(e, HINT_DEPLOY),
    };
    let owner = match registry.owner().await {
        Ok(owner) => owner,
        Err(e) => return diagnosis.fail(e, HINT_DEPLOY),
    };
    if owner == signer {
        diagnosis.pass(format!("{owner} (the signer)"));
    } else {
        diagnosis.pass(owner.to_string());
    }

    // 7
    match registry.is_authorized_issuer(&signer).await {
        Ok(true) => diagnosis.pass(format!("{signer} may issue certificates")),
        Ok(false) if owner == signer => diagnosis.warn(
            format!("{signer} owns the contract but is not on the issuer allow-list"),
            None,
        ),
        Ok(false) => diagnosis.warn(
            format!("{signer} is not an authorized issuer; issuing and revoking will be rejected"),
            Some(format!(
                "have the owner {owner} run `certify authorize-issuer {signer}`"
            )),
        ),
        Err(ChainError::Unsupported(_)) => {
            diagnosis.pass("contract has no issuer allow-list; any signer may issue")
        }
        Err(e) => return diagnosis.fail(e, HINT_DEPLOY),
    }

    diagnosis.reports
}

/// Execute `certify check`. Exits 1 if any step fails; warnings still exit 0.
pub async fn run_check(_args: &CheckArgs, chain: &ChainArgs) -> Result<u8> {
    let config = chain.config()?;
    println!(
        "Checking {} against {}",
        config.contract_info_path.display(),
        config.rpc_url
    );

    let reports = diagnose(&config).await;
    for report in &reports {
        println!("{report}");
    }

    let passed = reports
        .iter()
        .filter(|r| matches!(r.outcome, Outcome::Pass(_) | Outcome::Warn { .. }))
        .count();
    let warnings = reports
        .iter()
        .filter(|r| matches!(r.outcome, Outcome::Warn { .. }))
        .count();
    if passed == STEPS.len() {
        if warnings == 0 {
            println!("OK: all {} checks passed", STEPS.len());
        } else {
            println!("OK: all {} checks passed, {warnings} with warnings", STEPS.len());
        }
        Ok(0)
    } else {
        println!("FAIL: {passed} of {} checks passed", STEPS.len());
        Ok(1)
    }
}
