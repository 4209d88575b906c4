//! # JSON-RPC Transport
//!
//! Minimal Ethereum JSON-RPC 2.0 client over `reqwest`.
//!
//! Transactions go out through `eth_sendTransaction`, so the node signs them
//! with one of its unlocked accounts. This client never sees a private key.
//!
//! Reads ([`RpcClient::chain_id`], [`RpcClient::call`], ...) retry transport
//! failures. [`RpcClient::send_transaction`] is attempted exactly once: a
//! retried send after a timeout could submit the same transaction twice.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

use crate::abi::{from_hex_data, to_hex_data, Address};
use crate::error::ChainError;
use crate::retry::retry_read;

/// Transaction or call parameters.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRequest {
    /// Sender. Required for transactions; optional for calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    /// Contract address.
    pub to: Address,
    /// `0x`-prefixed call data.
    pub data: String,
    /// `0x`-prefixed gas limit; the node picks one when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<String>,
}

impl TransactionRequest {
    /// A request carrying `data` to `to`.
    pub fn new(to: Address, data: &[u8]) -> Self {
        Self {
            from: None,
            to,
            data: to_hex_data(data),
            gas: None,
        }
    }

    /// Set the sender.
    pub fn from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    /// Set an explicit gas limit.
    pub fn gas(mut self, gas: u64) -> Self {
        self.gas = Some(format!("{gas:#x}"));
        self
    }
}

/// A mined transaction's receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    /// Transaction hash.
    pub transaction_hash: String,
    /// Block the transaction was mined in.
    pub block_number: u64,
    /// Gas consumed.
    pub gas_used: u64,
    /// `true` for status `0x1`.
    pub success: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: String,
    block_number: Option<String>,
    gas_used: Option<String>,
    status: Option<String>,
}

/// Parse a `0x`-prefixed hex quantity.
pub fn parse_quantity(raw: &str) -> Option<u128> {
    let digits = raw.strip_prefix("0x")?;
    if digits.is_empty() {
        return Some(0);
    }
    u128::from_str_radix(digits, 16).ok()
}

fn quantity_u64(method: &str, field: &str, raw: &str) -> Result<u64, ChainError> {
    parse_quantity(raw)
        .and_then(|n| u64::try_from(n).ok())
        .ok_or_else(|| ChainError::MalformedResponse {
            method: method.to_string(),
            detail: format!("{field} is not a hex quantity: {raw}"),
        })
}

/// JSON-RPC client bound to one endpoint.
#[derive(Debug)]
pub struct RpcClient {
    client: reqwest::Client,
    url: Url,
    next_id: AtomicU64,
}

impl RpcClient {
    /// Build a client with the given per-request timeout.
    pub fn new(url: Url, timeout: Duration) -> Result<Self, ChainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ChainError::Client)?;
        Ok(Self {
            client,
            url,
            next_id: AtomicU64::new(1),
        })
    }

    /// Endpoint URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Send one JSON-RPC request and return its `result`.
    async fn request(&self, method: &str, params: &Value) -> Result<Value, ChainError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });

        let resp = self
            .client
            .post(self.url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|source| ChainError::Transport {
                method: method.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ChainError::HttpStatus {
                method: method.to_string(),
                status: status.as_u16(),
            });
        }

        let mut json: Value = resp.json().await.map_err(|e| ChainError::MalformedResponse {
            method: method.to_string(),
            detail: format!("invalid JSON: {e}"),
        })?;

        if let Some(error) = json.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown RPC error")
                .to_string();
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
            tracing::debug!(method, code, %message, "JSON-RPC error");
            return Err(ChainError::Rpc {
                method: method.to_string(),
                code,
                message,
            });
        }

        match json.get_mut("result") {
            Some(result) => Ok(result.take()),
            None => Err(ChainError::MalformedResponse {
                method: method.to_string(),
                detail: "response missing 'result' field".to_string(),
            }),
        }
    }

    /// Idempotent request, retried on transport failure.
    async fn read(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        retry_read(method, || self.request(method, &params)).await
    }

    async fn read_str(&self, method: &str, params: Value) -> Result<String, ChainError> {
        match self.read(method, params).await? {
            Value::String(s) => Ok(s),
            other => Err(ChainError::MalformedResponse {
                method: method.to_string(),
                detail: format!("expected a string result, got {other}"),
            }),
        }
    }

    /// `eth_chainId`
    pub async fn chain_id(&self) -> Result<u64, ChainError> {
        let raw = self.read_str("eth_chainId", json!([])).await?;
        quantity_u64("eth_chainId", "chain id", &raw)
    }

    /// `eth_accounts`
    pub async fn accounts(&self) -> Result<Vec<Address>, ChainError> {
        let result = self.read("eth_accounts", json!([])).await?;
        serde_json::from_value(result).map_err(|e| ChainError::MalformedResponse {
            method: "eth_accounts".to_string(),
            detail: e.to_string(),
        })
    }

    /// `eth_getBalance` at the latest block, in wei.
    pub async fn balance(&self, address: &Address) -> Result<u128, ChainError> {
        let raw = self
            .read_str("eth_getBalance", json!([address, "latest"]))
            .await?;
        parse_quantity(&raw).ok_or_else(|| ChainError::MalformedResponse {
            method: "eth_getBalance".to_string(),
            detail: format!("balance is not a hex quantity: {raw}"),
        })
    }

    /// `eth_call` at the latest block; returns the raw return data.
    pub async fn call(&self, tx: &TransactionRequest) -> Result<Vec<u8>, ChainError> {
        let raw = self.read_str("eth_call", json!([tx, "latest"])).await?;
        Ok(from_hex_data(&raw)?)
    }

    /// `eth_estimateGas`
    pub async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64, ChainError> {
        let raw = self.read_str("eth_estimateGas", json!([tx])).await?;
        quantity_u64("eth_estimateGas", "gas estimate", &raw)
    }

    /// `eth_sendTransaction`; returns the transaction hash. Never retried.
    pub async fn send_transaction(&self, tx: &TransactionRequest) -> Result<String, ChainError> {
        match self.request("eth_sendTransaction", &json!([tx])).await? {
            Value::String(hash) => Ok(hash),
            other => Err(ChainError::MalformedResponse {
                method: "eth_sendTransaction".to_string(),
                detail: format!("expected a transaction hash, got {other}"),
            }),
        }
    }

    /// `eth_getTransactionReceipt`; `None` while the transaction is pending.
    pub async fn transaction_receipt(
        &self,
        tx_hash: &str,
    ) -> Result<Option<TransactionReceipt>, ChainError> {
        const METHOD: &str = "eth_getTransactionReceipt";
        let result = self.read(METHOD, json!([tx_hash])).await?;
        if result.is_null() {
            return Ok(None);
        }
        let raw: RawReceipt =
            serde_json::from_value(result).map_err(|e| ChainError::MalformedResponse {
                method: METHOD.to_string(),
                detail: e.to_string(),
            })?;
        // Some nodes return a receipt shell before the block is sealed.
        let Some(block) = raw.block_number else {
            return Ok(None);
        };
        Ok(Some(TransactionReceipt {
            transaction_hash: raw.transaction_hash,
            block_number: quantity_u64(METHOD, "blockNumber", &block)?,
            gas_used: raw
                .gas_used
                .as_deref()
                .map(|g| quantity_u64(METHOD, "gasUsed", g))
                .transpose()?
                .unwrap_or(0),
            success: raw.status.as_deref() != Some("0x0"),
        }))
    }

    /// Poll for a receipt until it appears or `timeout` passes.
    ///
    /// A reverted transaction is an error.
    pub async fn wait_for_receipt(
        &self,
        tx_hash: &str,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<TransactionReceipt, ChainError> {
        let started = tokio::time::Instant::now();
        loop {
            if let Some(receipt) = self.transaction_receipt(tx_hash).await? {
                if !receipt.success {
                    return Err(ChainError::TransactionReverted {
                        tx_hash: tx_hash.to_string(),
                        block_number: receipt.block_number,
                    });
                }
                return Ok(receipt);
            }
            if started.elapsed() >= timeout {
                return Err(ChainError::ReceiptTimeout {
                    tx_hash: tx_hash.to_string(),
                    waited_secs: timeout.as_secs(),
                });
            }
            tracing::trace!(tx_hash, "receipt pending");
            tokio::time::sleep(poll_interval).await;
        }
    }
}
