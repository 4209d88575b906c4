//! Contract artifact (`contract-info.json`) loading.
//!
//! The deploy tooling writes `{ "address": "0x…", "abi": … }` where `abi` is
//! either the ABI array itself or that array serialized into a string.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::abi::{Address, ContractInterface};
use crate::error::ArtifactError;

/// Address and ABI of a deployed registry contract.
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    /// Deployed contract address.
    pub address: Address,
    /// ABI entries.
    pub abi: Vec<Value>,
}

#[derive(Deserialize)]
struct RawArtifact {
    address: String,
    abi: Value,
}

impl ContractArtifact {
    /// Read and parse an artifact file.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let raw = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ArtifactError::NotFound(path.to_path_buf())
            } else {
                ArtifactError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let artifact = Self::from_json_str(&raw)?;
        tracing::debug!(
            path = %path.display(),
            address = %artifact.address,
            entries = artifact.abi.len(),
            "loaded contract artifact"
        );
        Ok(artifact)
    }

    /// Parse artifact JSON.
    pub fn from_json_str(raw: &str) -> Result<Self, ArtifactError> {
        let parsed: RawArtifact =
            serde_json::from_str(raw).map_err(|e| ArtifactError::Invalid(e.to_string()))?;
        let address = Address::parse(&parsed.address)?;

        let abi = match parsed.abi {
            Value::Array(entries) => entries,
            Value::String(encoded) => match serde_json::from_str::<Value>(&encoded) {
                Ok(Value::Array(entries)) => entries,
                Ok(_) => {
                    return Err(ArtifactError::Invalid(
                        "abi string does not contain a JSON array".to_string(),
                    ))
                }
                Err(e) => return Err(ArtifactError::Invalid(format!("abi string: {e}"))),
            },
            _ => {
                return Err(ArtifactError::Invalid(
                    "abi must be an array or a JSON string".to_string(),
                ))
            }
        };

        Ok(Self { address, abi })
    }

    /// Resolve the registry interface from this artifact's ABI.
    pub fn interface(&self) -> Result<ContractInterface, ArtifactError> {
        Ok(ContractInterface::from_abi(&self.abi)?)
    }
}
