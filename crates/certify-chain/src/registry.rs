//! # Certificate Registry Client
//!
//! Contract calls against a bound registry. Reads go through `eth_call`;
//! writes are estimated, sent through the node's signer, and awaited until
//! mined.
//!
//! Ownership, issuer authorization, duplicate detection, and revocation
//! rules are enforced by the contract. A rejected write surfaces as the
//! node's revert message in [`ChainError::Rpc`].

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use certify_core::{CertificateDetails, CertificateHash, RegistryEntry, Verification};

use crate::abi::{Address, BoundFunction, ContractInterface, Token};
use crate::config::ChainConfig;
use crate::error::{AbiError, ChainError};
use crate::rpc::{RpcClient, TransactionReceipt, TransactionRequest};
use crate::session::NetworkInfo;
use crate::units::format_ether;

/// Result of a successful `issueCertificate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueReceipt {
    /// Registry key that was issued.
    pub hash: CertificateHash,
    /// Transaction hash.
    pub transaction_hash: String,
    /// Block the transaction was mined in.
    pub block_number: u64,
    /// Gas consumed.
    pub gas_used: u64,
}

/// Result of a successful `revokeCertificate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeReceipt {
    /// Registry key that was revoked.
    pub hash: CertificateHash,
    /// Transaction hash.
    pub transaction_hash: String,
    /// Block the transaction was mined in.
    pub block_number: u64,
}

/// Summary of the bound contract and signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInfo {
    /// Registry contract address.
    pub contract_address: Address,
    /// Contract owner.
    pub contract_owner: Address,
    /// Account signing transactions.
    pub signer_address: Address,
    /// Signer balance in ether, e.g. `"10000.0"`.
    pub signer_balance: String,
    /// EIP-155 chain id.
    pub network_id: u64,
}

/// Client for one registry contract and one signer.
#[derive(Debug, Clone)]
pub struct CertificateRegistry {
    rpc: Arc<RpcClient>,
    interface: ContractInterface,
    address: Address,
    signer: Address,
    network: NetworkInfo,
    gas_margin_percent: u64,
    receipt_poll: Duration,
    receipt_timeout: Duration,
}

impl CertificateRegistry {
    pub(crate) fn new(
        rpc: Arc<RpcClient>,
        config: &ChainConfig,
        interface: ContractInterface,
        address: Address,
        signer: Address,
        network: NetworkInfo,
    ) -> Self {
        Self {
            rpc,
            interface,
            address,
            signer,
            network,
            gas_margin_percent: config.gas_margin_percent,
            receipt_poll: config.receipt_poll_interval(),
            receipt_timeout: config.receipt_timeout(),
        }
    }

    /// Contract address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Signing account.
    pub fn signer(&self) -> Address {
        self.signer
    }

    /// Network the contract lives on.
    pub fn network(&self) -> &NetworkInfo {
        &self.network
    }

    /// Resolved contract interface.
    pub fn interface(&self) -> &ContractInterface {
        &self.interface
    }

    async fn read(&self, function: &BoundFunction, args: &[Token]) -> Result<Vec<Token>, ChainError> {
        let tx = TransactionRequest::new(self.address, &function.encode(args)).from(self.signer);
        let data = self.rpc.call(&tx).await?;
        Ok(function.decode_output(&data)?)
    }

    async fn read_one(&self, function: &BoundFunction, args: &[Token]) -> Result<Token, ChainError> {
        self.read(function, args)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                AbiError::UnexpectedOutput {
                    function: function.signature.clone(),
                    expected: "one return value",
                }
                .into()
            })
    }

    async fn transact(
        &self,
        function: &BoundFunction,
        args: &[Token],
    ) -> Result<TransactionReceipt, ChainError> {
        let mut tx =
            TransactionRequest::new(self.address, &function.encode(args)).from(self.signer);

        match self.rpc.estimate_gas(&tx).await {
            Ok(estimate) => {
                let limit = estimate.saturating_mul(self.gas_margin_percent) / 100;
                tracing::debug!(function = %function.signature, estimate, limit, "gas estimated");
                tx = tx.gas(limit);
            }
            Err(e) => {
                tracing::warn!(
                    function = %function.signature,
                    "gas estimation failed, sending without a gas limit: {e}"
                );
            }
        }

        let tx_hash = self.rpc.send_transaction(&tx).await?;
        tracing::info!(function = %function.signature, %tx_hash, "transaction sent");

        let receipt = self
            .rpc
            .wait_for_receipt(&tx_hash, self.receipt_poll, self.receipt_timeout)
            .await?;
        tracing::info!(
            function = %function.signature,
            %tx_hash,
            block_number = receipt.block_number,
            gas_used = receipt.gas_used,
            "transaction mined"
        );
        Ok(receipt)
    }

    /// Register `hash` with on-chain metadata.
    pub async fn issue(
        &self,
        hash: &CertificateHash,
        metadata_json: &str,
    ) -> Result<IssueReceipt, ChainError> {
        let receipt = self
            .transact(
                &self.interface.issue_certificate,
                &[
                    Token::String(hash.to_hex()),
                    Token::String(metadata_json.to_string()),
                ],
            )
            .await?;
        Ok(IssueReceipt {
            hash: *hash,
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        })
    }

    /// Raw registry entry for `hash`.
    pub async fn verify(&self, hash: &CertificateHash) -> Result<RegistryEntry, ChainError> {
        let function = &self.interface.verify_certificate;
        let tokens = self.read(function, &[Token::String(hash.to_hex())]).await?;
        let unexpected = || AbiError::UnexpectedOutput {
            function: function.signature.clone(),
            expected: "(bool, address, uint256, bool, string)",
        };

        let mut it = tokens.into_iter();
        let (
            Some(Token::Bool(exists)),
            Some(Token::Address(issuer)),
            Some(Token::Uint(timestamp)),
            Some(Token::Bool(is_revoked)),
            Some(Token::String(metadata)),
        ) = (it.next(), it.next(), it.next(), it.next(), it.next())
        else {
            return Err(unexpected().into());
        };

        Ok(RegistryEntry {
            exists,
            issuer: issuer.to_checksum(),
            timestamp: u64::try_from(timestamp).map_err(|_| AbiError::Overflow)?,
            is_revoked,
            metadata,
        })
    }

    /// Registry entry for `hash`, mapped into a verification result.
    pub async fn verify_certificate(
        &self,
        hash: &CertificateHash,
    ) -> Result<Verification, ChainError> {
        let entry = self.verify(hash).await?;
        Ok(Verification::from_entry(*hash, entry)?)
    }

    /// Whether `hash` was ever issued.
    pub async fn exists(&self, hash: &CertificateHash) -> Result<bool, ChainError> {
        let function = &self.interface.certificate_exists;
        match self.read_one(function, &[Token::String(hash.to_hex())]).await? {
            Token::Bool(b) => Ok(b),
            _ => Err(AbiError::UnexpectedOutput {
                function: function.signature.clone(),
                expected: "bool",
            }
            .into()),
        }
    }

    /// Details for `hash`, or `None` when it was never issued.
    pub async fn lookup(
        &self,
        hash: &CertificateHash,
    ) -> Result<Option<CertificateDetails>, ChainError> {
        if !self.exists(hash).await? {
            return Ok(None);
        }
        Ok(self.verify_certificate(hash).await?.into_details())
    }

    /// Mark `hash` revoked.
    pub async fn revoke(&self, hash: &CertificateHash) -> Result<RevokeReceipt, ChainError> {
        let receipt = self
            .transact(
                &self.interface.revoke_certificate,
                &[Token::String(hash.to_hex())],
            )
            .await?;
        Ok(RevokeReceipt {
            hash: *hash,
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
        })
    }

    /// Contract owner.
    pub async fn owner(&self) -> Result<Address, ChainError> {
        let function = &self.interface.owner;
        match self.read_one(function, &[]).await? {
            Token::Address(a) => Ok(a),
            _ => Err(AbiError::UnexpectedOutput {
                function: function.signature.clone(),
                expected: "address",
            }
            .into()),
        }
    }

    /// Whether `issuer` may issue certificates.
    pub async fn is_authorized_issuer(&self, issuer: &Address) -> Result<bool, ChainError> {
        let function = self
            .interface
            .authorized_issuers
            .as_ref()
            .ok_or(ChainError::Unsupported("authorizedIssuers(address)"))?;
        match self.read_one(function, &[Token::Address(*issuer)]).await? {
            Token::Bool(b) => Ok(b),
            _ => Err(AbiError::UnexpectedOutput {
                function: function.signature.clone(),
                expected: "bool",
            }
            .into()),
        }
    }

    /// Grant issuing rights to `issuer`. Only the owner succeeds.
    pub async fn authorize_issuer(
        &self,
        issuer: &Address,
    ) -> Result<TransactionReceipt, ChainError> {
        let function = self
            .interface
            .authorize_issuer
            .as_ref()
            .ok_or(ChainError::Unsupported("authorizeIssuer(address)"))?;
        self.transact(function, &[Token::Address(*issuer)]).await
    }

    /// Signer balance in wei.
    pub async fn signer_balance(&self) -> Result<u128, ChainError> {
        self.rpc.balance(&self.signer).await
    }

    /// Contract, owner, signer, balance and network in one call.
    pub async fn contract_info(&self) -> Result<ContractInfo, ChainError> {
        let contract_owner = self.owner().await?;
        let balance = self.signer_balance().await?;
        Ok(ContractInfo {
            contract_address: self.address,
            contract_owner,
            signer_address: self.signer,
            signer_balance: format_ether(balance),
            network_id: self.network.chain_id,
        })
    }
}
