//! Chain client configuration.
//!
//! Defaults target a local development node (Hardhat or Anvil) on
//! `127.0.0.1:8545` with the artifact the deploy tooling writes to
//! `./contract-info.json`.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// Default JSON-RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// Default contract artifact path.
pub const DEFAULT_CONTRACT_INFO: &str = "./contract-info.json";

/// Configuration for connecting to the registry contract.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// JSON-RPC endpoint.
    pub rpc_url: Url,
    /// Path to `contract-info.json`.
    pub contract_info_path: PathBuf,
    /// Index into `eth_accounts` of the account that signs transactions.
    pub signer_index: usize,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Gas limit as a percentage of the node's estimate.
    pub gas_margin_percent: u64,
    /// Interval between `eth_getTransactionReceipt` polls, in milliseconds.
    pub receipt_poll_ms: u64,
    /// Give up waiting for a receipt after this many seconds.
    pub receipt_timeout_secs: u64,
}

impl ChainConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `CERTIFY_RPC_URL` (default: `http://127.0.0.1:8545`)
    /// - `CERTIFY_CONTRACT_INFO` (default: `./contract-info.json`)
    /// - `CERTIFY_SIGNER_INDEX` (default: 0)
    /// - `CERTIFY_RPC_TIMEOUT_SECS` (default: 30)
    /// - `CERTIFY_GAS_MARGIN_PERCENT` (default: 120)
    /// - `CERTIFY_RECEIPT_POLL_MS` (default: 500)
    /// - `CERTIFY_RECEIPT_TIMEOUT_SECS` (default: 60)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("CERTIFY_RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        let rpc_url = Url::parse(&raw_url)
            .map_err(|e| ConfigError::InvalidUrl("CERTIFY_RPC_URL".to_string(), e.to_string()))?;

        Ok(Self {
            rpc_url,
            contract_info_path: lookup("CERTIFY_CONTRACT_INFO")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTRACT_INFO)),
            signer_index: parse_number(&lookup, "CERTIFY_SIGNER_INDEX", 0)?,
            timeout_secs: parse_number(&lookup, "CERTIFY_RPC_TIMEOUT_SECS", 30)?,
            gas_margin_percent: parse_number(&lookup, "CERTIFY_GAS_MARGIN_PERCENT", 120)?,
            receipt_poll_ms: parse_number(&lookup, "CERTIFY_RECEIPT_POLL_MS", 500)?,
            receipt_timeout_secs: parse_number(&lookup, "CERTIFY_RECEIPT_TIMEOUT_SECS", 60)?,
        })
    }

    /// Configuration for a specific endpoint with default settings.
    ///
    /// Used by tests and by the CLI's `--rpc-url` override.
    pub fn for_endpoint(rpc_url: &str) -> Result<Self, ConfigError> {
        let rpc_url = Url::parse(rpc_url)
            .map_err(|e| ConfigError::InvalidUrl(rpc_url.to_string(), e.to_string()))?;
        Ok(Self::with_url(rpc_url))
    }

    fn with_url(rpc_url: Url) -> Self {
        Self {
            rpc_url,
            contract_info_path: PathBuf::from(DEFAULT_CONTRACT_INFO),
            signer_index: 0,
            timeout_secs: 30,
            gas_margin_percent: 120,
            receipt_poll_ms: 500,
            receipt_timeout_secs: 60,
        }
    }

    /// Point at a different artifact file.
    pub fn with_contract_info(mut self, path: impl Into<PathBuf>) -> Self {
        self.contract_info_path = path.into();
        self
    }

    /// Shorten receipt polling, e.g. for automining test nodes.
    pub fn with_receipt_polling(mut self, poll_ms: u64, timeout_secs: u64) -> Self {
        self.receipt_poll_ms = poll_ms;
        self.receipt_timeout_secs = timeout_secs;
        self
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Receipt polling interval.
    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_ms)
    }

    /// Receipt wait limit.
    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.receipt_timeout_secs)
    }
}

/// Parse the numeric variable `var`, or return `default` when it is unset.
///
/// Surrounding whitespace is ignored. Shared by every `from_lookup` loader
/// in the workspace so they report bad numbers the same way.
pub fn parse_number<F, T>(lookup: &F, var: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
            var: var.to_string(),
            value: raw,
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A URL variable does not parse.
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    /// A numeric variable does not parse.
    #[error("invalid value for {var}: \"{value}\" is not a non-negative integer")]
    InvalidNumber {
        /// Variable name.
        var: String,
        /// Raw value.
        value: String,
    },
}
