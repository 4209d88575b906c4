//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! The chain status is written once by bootstrap and read by every request.
//! The lock is `parking_lot`, never held across `.await`: handlers clone the
//! registry out and release the guard before calling the node.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use certify_chain::{parse_number, Address, CertificateRegistry, ConfigError, ConnectionState};

use crate::error::AppError;
use crate::middleware::metrics::ApiMetrics;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default directory for the web UI.
pub const DEFAULT_PUBLIC_DIR: &str = "public";

/// Default upload limit for `/api/verify-file`: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// HTTP server configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind on all interfaces.
    pub port: u16,
    /// Bearer token for write routes. `None` disables auth.
    pub auth_token: Option<String>,
    /// Static web UI directory.
    pub public_dir: PathBuf,
    /// Multipart body limit.
    pub max_upload_bytes: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("public_dir", &self.public_dir)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            auth_token: None,
            public_dir: PathBuf::from(DEFAULT_PUBLIC_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl AppConfig {
    /// Load from `PORT`, `AUTH_TOKEN`, `CERTIFY_PUBLIC_DIR` and
    /// `CERTIFY_MAX_UPLOAD_BYTES`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            port: parse_number(&lookup, "PORT", defaults.port)?,
            // An empty token would accept `Authorization: Bearer `.
            auth_token: lookup("AUTH_TOKEN").filter(|t| !t.is_empty()),
            public_dir: lookup("CERTIFY_PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.public_dir),
            max_upload_bytes: parse_number(&lookup, "CERTIFY_MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
        })
    }
}

/// How far chain bootstrap got.
#[derive(Debug, Clone)]
pub struct ChainStatus {
    state: ConnectionState,
    registry: Option<CertificateRegistry>,
}

impl ChainStatus {
    /// Nothing reachable.
    pub fn disconnected() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            registry: None,
        }
    }

    /// Node reachable, contract not bound.
    pub fn connected() -> Self {
        Self {
            state: ConnectionState::Connected,
            registry: None,
        }
    }

    /// Registry bound and answering.
    pub fn bound(registry: CertificateRegistry) -> Self {
        Self {
            state: ConnectionState::ContractBound,
            registry: Some(registry),
        }
    }

    /// Lifecycle state reached.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The bound registry, if any.
    pub fn registry(&self) -> Option<&CertificateRegistry> {
        self.registry.as_ref()
    }
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Settings loaded at startup. Read-only afterwards.
    pub config: Arc<AppConfig>,
    /// Response counters served at `/health/metrics`.
    pub metrics: ApiMetrics,
    /// Process start, reported as uptime by the health routes.
    pub started_at: DateTime<Utc>,
    chain: Arc<RwLock<ChainStatus>>,
}

impl AppState {
    /// State with no chain connection.
    pub fn new(config: AppConfig) -> Self {
        Self::with_chain(config, ChainStatus::disconnected())
    }

    /// State with a bootstrap result.
    pub fn with_chain(config: AppConfig, chain: ChainStatus) -> Self {
        Self {
            config: Arc::new(config),
            metrics: ApiMetrics::new(),
            started_at: Utc::now(),
            chain: Arc::new(RwLock::new(chain)),
        }
    }

    /// Replace the chain status.
    pub fn set_chain(&self, chain: ChainStatus) {
        tracing::info!(state = %chain.state(), "chain status updated");
        *self.chain.write() = chain;
    }

    /// Current lifecycle state.
    pub fn connection_state(&self) -> ConnectionState {
        self.chain.read().state()
    }

    /// Bound contract address, if any.
    pub fn contract_address(&self) -> Option<Address> {
        self.chain.read().registry().map(CertificateRegistry::address)
    }

    /// The bound registry, or 503 naming how far bootstrap got.
    pub fn registry(&self) -> Result<CertificateRegistry, AppError> {
        let chain = self.chain.read();
        match (chain.state(), chain.registry()) {
            (_, Some(registry)) => Ok(registry.clone()),
            (ConnectionState::Disconnected, None) => {
                Err(AppError::chain_unavailable("Blockchain not initialized"))
            }
            (_, None) => Err(AppError::chain_unavailable(
                "Smart contract not ready. Try again in a moment.",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn config_defaults() {
        let cfg = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg.port, 3000);
        assert!(cfg.auth_token.is_none());
        assert_eq!(cfg.public_dir, PathBuf::from("public"));
        assert_eq!(cfg.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn config_overrides() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("AUTH_TOKEN", "s3cret"),
            ("CERTIFY_PUBLIC_DIR", "/srv/www"),
            ("CERTIFY_MAX_UPLOAD_BYTES", "1024"),
        ]))
        .unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.auth_token.as_deref(), Some("s3cret"));
        assert_eq!(cfg.public_dir, PathBuf::from("/srv/www"));
        assert_eq!(cfg.max_upload_bytes, 1024);
    }

    #[test]
    fn empty_auth_token_disables_auth() {
        let cfg = AppConfig::from_lookup(lookup_from(&[("AUTH_TOKEN", "")])).unwrap();
        assert!(cfg.auth_token.is_none());
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("PORT", "http")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));

        let err = AppConfig::from_lookup(lookup_from(&[("CERTIFY_MAX_UPLOAD_BYTES", "10MB")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidNumber { var, .. } if var == "CERTIFY_MAX_UPLOAD_BYTES"
        ));
    }

    #[test]
    fn debug_redacts_token() {
        let cfg = AppConfig {
            auth_token: Some("s3cret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn registry_unavailable_messages() {
        let state = AppState::new(AppConfig::default());
        assert_eq!(state.connection_state(), ConnectionState::Disconnected);
        let err = state.registry().unwrap_err();
        assert_eq!(err.to_string(), "Blockchain not initialized");

        state.set_chain(ChainStatus::connected());
        assert_eq!(state.connection_state(), ConnectionState::Connected);
        let err = state.registry().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Smart contract not ready. Try again in a moment."
        );
        assert!(state.contract_address().is_none());
    }
}
