//! # Connection Lifecycle Typestate
//!
//! The chain connection moves through three states, each a distinct type:
//!
//! ```text
//! Disconnected ──connect()──▶ Connected ──bind(artifact)──▶ Bound
//! ```
//!
//! - `Disconnected`: HTTP client built, nothing sent yet.
//! - `Connected`: the node answered `eth_chainId` and offered a signer
//!   through `eth_accounts`.
//! - `Bound`: the registry ABI resolved and `owner()` answered at the
//!   artifact's address. Only a bound session hands out a
//!   [`CertificateRegistry`].
//!
//! A failed transition consumes the session and returns the error.
//! Reconnecting means starting over from [`ChainSession::new`].
//!
//! Calling `.bind()` on a `ChainSession<Disconnected>` is a compile error:
//!
//! ```compile_fail
//! use certify_chain::{ChainConfig, ChainSession, ContractArtifact};
//!
//! async fn skip_connect(config: ChainConfig, artifact: ContractArtifact) {
//!     let session = ChainSession::new(config).unwrap();
//!     // ERROR: no method named `bind` found for `ChainSession<Disconnected>`
//!     let _bound = session.bind(&artifact).await;
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::abi::Address;
use crate::artifact::ContractArtifact;
use crate::config::ChainConfig;
use crate::error::ChainError;
use crate::registry::CertificateRegistry;
use crate::rpc::RpcClient;

/// Runtime view of the lifecycle, for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionState {
    /// No node connection.
    Disconnected,
    /// Node connected, contract not bound.
    Connected,
    /// Contract bound and answering.
    ContractBound,
}

impl ConnectionState {
    /// Wire name, e.g. `CONTRACT_BOUND`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "DISCONNECTED",
            Self::Connected => "CONNECTED",
            Self::ContractBound => "CONTRACT_BOUND",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network the node reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    /// EIP-155 chain id.
    pub chain_id: u64,
    /// Well-known network name, or `unknown`.
    pub name: String,
}

impl NetworkInfo {
    /// Name a chain id.
    pub fn from_chain_id(chain_id: u64) -> Self {
        let name = match chain_id {
            1 => "mainnet",
            11155111 => "sepolia",
            17000 => "holesky",
            137 => "matic",
            31337 => "hardhat",
            _ => "unknown",
        };
        Self {
            chain_id,
            name: name.to_string(),
        }
    }
}

// ─── State Types ─────────────────────────────────────────────────────

/// Session state: not yet talking to the node.
#[derive(Debug)]
pub struct Disconnected;

/// Session state: node reachable, signer selected.
#[derive(Debug)]
pub struct Connected {
    network: NetworkInfo,
    accounts: Vec<Address>,
    signer: Address,
}

/// Session state: registry contract bound.
#[derive(Debug)]
pub struct Bound {
    registry: CertificateRegistry,
}

mod private {
    pub trait Sealed {}
    impl Sealed for super::Disconnected {}
    impl Sealed for super::Connected {}
    impl Sealed for super::Bound {}
}

/// Marker trait for session states. Sealed.
pub trait SessionState: private::Sealed + fmt::Debug {
    /// Runtime name of this state.
    const STATE: ConnectionState;
}

impl SessionState for Disconnected {
    const STATE: ConnectionState = ConnectionState::Disconnected;
}
impl SessionState for Connected {
    const STATE: ConnectionState = ConnectionState::Connected;
}
impl SessionState for Bound {
    const STATE: ConnectionState = ConnectionState::ContractBound;
}

// ─── Session ─────────────────────────────────────────────────────────

/// A chain connection in lifecycle state `S`.
#[derive(Debug)]
pub struct ChainSession<S: SessionState> {
    config: ChainConfig,
    rpc: Arc<RpcClient>,
    state: S,
}

impl<S: SessionState> ChainSession<S> {
    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        S::STATE
    }

    /// Configuration in use.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }
}

impl ChainSession<Disconnected> {
    /// Build the HTTP client. No request is sent.
    pub fn new(config: ChainConfig) -> Result<Self, ChainError> {
        let rpc = RpcClient::new(config.rpc_url.clone(), config.timeout())?;
        Ok(Self {
            config,
            rpc: Arc::new(rpc),
            state: Disconnected,
        })
    }

    /// Reach the node and select the signing account.
    pub async fn connect(self) -> Result<ChainSession<Connected>, ChainError> {
        let chain_id = self.rpc.chain_id().await?;
        let network = NetworkInfo::from_chain_id(chain_id);

        let accounts = self.rpc.accounts().await?;
        if accounts.is_empty() {
            return Err(ChainError::NoAccounts);
        }
        let index = self.config.signer_index;
        let signer = accounts
            .get(index)
            .copied()
            .ok_or(ChainError::SignerIndexOutOfRange {
                index,
                available: accounts.len(),
            })?;

        tracing::info!(
            from = %ConnectionState::Disconnected,
            to = %ConnectionState::Connected,
            rpc_url = %self.config.rpc_url,
            chain_id,
            network = %network.name,
            signer = %signer,
            "chain session connected"
        );

        Ok(ChainSession {
            config: self.config,
            rpc: self.rpc,
            state: Connected {
                network,
                accounts,
                signer,
            },
        })
    }
}

impl ChainSession<Connected> {
    /// Network the node reported.
    pub fn network(&self) -> &NetworkInfo {
        &self.state.network
    }

    /// Accounts the node offers.
    pub fn accounts(&self) -> &[Address] {
        &self.state.accounts
    }

    /// Selected signer.
    pub fn signer(&self) -> Address {
        self.state.signer
    }

    /// Shared RPC client.
    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    /// Resolve the registry interface and probe the contract with `owner()`.
    pub async fn bind(self, artifact: &ContractArtifact) -> Result<ChainSession<Bound>, ChainError> {
        let interface = artifact.interface()?;
        let registry = CertificateRegistry::new(
            Arc::clone(&self.rpc),
            &self.config,
            interface,
            artifact.address,
            self.state.signer,
            self.state.network,
        );

        let owner = registry.owner().await?;
        tracing::info!(
            from = %ConnectionState::Connected,
            to = %ConnectionState::ContractBound,
            contract = %artifact.address,
            owner = %owner,
            "chain session bound to registry contract"
        );

        Ok(ChainSession {
            config: self.config,
            rpc: self.rpc,
            state: Bound { registry },
        })
    }
}

impl ChainSession<Bound> {
    /// The bound registry.
    pub fn registry(&self) -> &CertificateRegistry {
        &self.state.registry
    }

    /// Consume the session, keeping only the registry.
    pub fn into_registry(self) -> CertificateRegistry {
        self.state.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_names() {
        assert_eq!(ConnectionState::Disconnected.to_string(), "DISCONNECTED");
        assert_eq!(ConnectionState::Connected.to_string(), "CONNECTED");
        assert_eq!(ConnectionState::ContractBound.to_string(), "CONTRACT_BOUND");
        assert_eq!(
            serde_json::to_string(&ConnectionState::ContractBound).unwrap(),
            "\"CONTRACT_BOUND\""
        );
    }

    #[test]
    fn new_session_is_disconnected() {
        let config = ChainConfig::for_endpoint("http://127.0.0.1:8545").unwrap();
        let session = ChainSession::new(config).unwrap();
        assert_eq!(session.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn network_names() {
        assert_eq!(NetworkInfo::from_chain_id(31337).name, "hardhat");
        assert_eq!(NetworkInfo::from_chain_id(1).name, "mainnet");
        assert_eq!(NetworkInfo::from_chain_id(424242).name, "unknown");
    }

    #[tokio::test]
    async fn connect_to_closed_port_fails() {
        let config = ChainConfig::for_endpoint("http://127.0.0.1:1").unwrap();
        let session = ChainSession::new(config).unwrap();
        let err = session.connect().await.unwrap_err();
        assert!(err.is_transport());
    }
}
