//! # Chain Bootstrap
//!
//! Brings the registry connection up at startup.
//!
//! ## Bootstrap Sequence
//!
//! 1. **Load Artifact**: read `contract-info.json` (address + ABI).
//! 2. **Connect**: `eth_chainId` and `eth_accounts`, select the signer.
//! 3. **Bind**: resolve the registry ABI and probe `owner()`.
//! 4. **Banner**: log listen URL, contract address and chain status.
//!
//! A failure at any step is logged with operator guidance and the server
//! starts anyway. Chain routes then answer 503 until the process is
//! restarted against a running node.

use certify_chain::{Address, ChainConfig, ChainError, ChainSession, ConnectionState, ContractArtifact};

use crate::state::{AppConfig, ChainStatus};

/// What bootstrap reached.
#[derive(Debug)]
pub struct BootstrapOutcome {
    /// Status to install in [`crate::state::AppState`].
    pub status: ChainStatus,
    /// Contract address from the artifact, when it could be read.
    pub contract_address: Option<Address>,
}

impl BootstrapOutcome {
    fn failed(
        status: ChainStatus,
        contract_address: Option<Address>,
        config: &ChainConfig,
        err: &ChainError,
    ) -> Self {
        tracing::error!(state = %status.state(), "blockchain initialization failed: {err}");
        log_guidance(config);
        Self {
            status,
            contract_address,
        }
    }
}

/// Load the artifact, connect, and bind. Never fails: the outcome records
/// how far it got.
pub async fn initialize_chain(config: ChainConfig) -> BootstrapOutcome {
    let artifact = match ContractArtifact::load(&config.contract_info_path) {
        Ok(artifact) => artifact,
        Err(e) => {
            return BootstrapOutcome::failed(
                ChainStatus::disconnected(),
                None,
                &config,
                &ChainError::from(e),
            )
        }
    };
    let contract_address = Some(artifact.address);
    tracing::info!(
        rpc_url = %config.rpc_url,
        contract = %artifact.address,
        "connecting to blockchain"
    );

    let guidance_config = config.clone();
    let session = match ChainSession::new(config) {
        Ok(session) => session,
        Err(e) => {
            return BootstrapOutcome::failed(
                ChainStatus::disconnected(),
                contract_address,
                &guidance_config,
                &e,
            )
        }
    };

    let connected = match session.connect().await {
        Ok(connected) => connected,
        Err(e) => {
            return BootstrapOutcome::failed(
                ChainStatus::disconnected(),
                contract_address,
                &guidance_config,
                &e,
            )
        }
    };

    match connected.bind(&artifact).await {
        Ok(bound) => {
            tracing::info!("blockchain connection established");
            BootstrapOutcome {
                status: ChainStatus::bound(bound.into_registry()),
                contract_address,
            }
        }
        Err(e) => BootstrapOutcome::failed(
            ChainStatus::connected(),
            contract_address,
            &guidance_config,
            &e,
        ),
    }
}

fn log_guidance(config: &ChainConfig) {
    tracing::warn!(
        rpc_url = %config.rpc_url,
        contract_info = %config.contract_info_path.display(),
        "make sure (1) an Ethereum node is running at the RPC URL, e.g. `npx hardhat node`, \
         and (2) the registry contract is deployed and its artifact written to the contract info path"
    );
}

/// Startup banner.
pub fn log_banner(config: &AppConfig, outcome: &BootstrapOutcome) {
    let state = outcome.status.state();
    let contract = outcome
        .contract_address
        .map(|a| a.to_string())
        .unwrap_or_else(|| "not loaded".to_string());
    tracing::info!(
        url = %format!("http://localhost:{}", config.port),
        contract = %contract,
        chain_state = %state,
        auth = config.auth_token.is_some(),
        "certificate registry web server started"
    );
    if state != ConnectionState::ContractBound {
        tracing::warn!(
            chain_state = %state,
            "blockchain not connected: certificate routes will answer 503 until the server is restarted against a running node"
        );
    }
}
