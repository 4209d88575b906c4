//! # certify-chain: Certificate Registry Client
//!
//! Talks to the on-chain certificate registry over Ethereum JSON-RPC.
//!
//! ## Architecture
//!
//! - [`config`]: environment-driven [`ChainConfig`].
//! - [`artifact`]: loads the deployed contract's address and ABI from
//!   `contract-info.json`.
//! - [`abi`]: addresses, function selectors, and head/tail encoding for the
//!   handful of Solidity types the registry uses.
//! - [`rpc`]: JSON-RPC 2.0 transport. Transactions are signed by the node
//!   through its unlocked accounts; no private keys are held here.
//! - [`session`]: the connection lifecycle as a typestate,
//!   `ChainSession<Disconnected> -> ChainSession<Connected> -> ChainSession<Bound>`,
//!   which hands out a [`CertificateRegistry`].
//! - [`registry`]: issue, verify, revoke and inspect certificates.
//!
//! ## Failure Handling
//!
//! Idempotent reads retry transport failures with exponential backoff.
//! Transactions are sent once. A failed lifecycle transition returns the
//! error and leaves reconnection to the caller.

pub mod abi;
pub mod artifact;
pub mod config;
pub mod error;
pub mod registry;
pub(crate) mod retry;
pub mod rpc;
pub mod session;
pub mod units;

pub use abi::{function_selector, Address, ContractInterface, Token};
pub use artifact::ContractArtifact;
pub use config::{parse_number, ChainConfig, ConfigError};
pub use error::{AbiError, ArtifactError, ChainError};
pub use registry::{CertificateRegistry, ContractInfo, IssueReceipt, RevokeReceipt};
pub use rpc::{RpcClient, TransactionReceipt, TransactionRequest};
pub use session::{Bound, ChainSession, Connected, ConnectionState, Disconnected, NetworkInfo};
pub use units::format_ether;
