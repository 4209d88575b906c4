//! Simulated JSON-RPC node for registry client tests.
//!
//! Each mock answers one JSON-RPC method. `eth_call`, `eth_estimateGas` and
//! `eth_sendTransaction` mocks can additionally be keyed on the call data
//! selector, so different contract functions get different answers.

#![allow(dead_code)]

use std::path::PathBuf;

use certify_chain::abi::{encode, function_selector, to_hex_data, Token};
use serde_json::{json, Value};
use wiremock::matchers::method;
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

pub const CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
pub const SIGNER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
pub const SECOND_ACCOUNT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
pub const TX_HASH: &str = "0x8a9f2f1c3b0e4d5a6b7c8d9e0f1a2b3c4d5e6f708192a3b4c5d6e7f8091a2b3c";
/// 10 000 ether in wei.
pub const TEN_THOUSAND_ETH: &str = "0x21e19e0c9bab2400000";

/// Matches a JSON-RPC request by method and, optionally, call data selector.
pub struct RpcRequest {
    method: &'static str,
    selector: Option<String>,
}

impl RpcRequest {
    pub fn method(method: &'static str) -> Self {
        Self {
            method,
            selector: None,
        }
    }

    pub fn calling(method: &'static str, signature: &str) -> Self {
        Self {
            method,
            selector: Some(to_hex_data(&function_selector(signature))),
        }
    }
}

impl Match for RpcRequest {
    fn matches(&self, request: &Request) -> bool {
        let Ok(body) = serde_json::from_slice::<Value>(&request.body) else {
            return false;
        };
        if body["method"] != self.method {
            return false;
        }
        match &self.selector {
            None => true,
            Some(selector) => body["params"][0]["data"]
                .as_str()
                .is_some_and(|data| data.starts_with(selector.as_str())),
        }
    }
}

pub fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": result}))
}

pub fn rpc_error(code: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": {"code": code, "message": message}
    }))
}

/// Return data for a call, as the node would hex-encode it.
pub fn return_data(tokens: &[Token]) -> Value {
    Value::String(to_hex_data(&encode(tokens)))
}

pub fn address(s: &str) -> certify_chain::Address {
    s.parse().unwrap()
}

pub fn registry_abi() -> Value {
    json!([
        {"type": "constructor", "inputs": [], "stateMutability": "nonpayable"},
        {"type": "event", "name": "CertificateIssued", "anonymous": false,
         "inputs": [{"indexed": false, "name": "certificateHash", "type": "string"},
                    {"indexed": true, "name": "issuer", "type": "address"}]},
        {"type": "function", "name": "authorizeIssuer", "stateMutability": "nonpayable",
         "inputs": [{"name": "issuer", "type": "address"}], "outputs": []},
        {"type": "function", "name": "authorizedIssuers", "stateMutability": "view",
         "inputs": [{"name": "", "type": "address"}], "outputs": [{"name": "", "type": "bool"}]},
        {"type": "function", "name": "certificateExists", "stateMutability": "view",
         "inputs": [{"name": "certificateHash", "type": "string"}],
         "outputs": [{"name": "", "type": "bool"}]},
        {"type": "function", "name": "issueCertificate", "stateMutability": "nonpayable",
         "inputs": [{"name": "certificateHash", "type": "string"}, {"name": "metadata", "type": "string"}],
         "outputs": []},
        {"type": "function", "name": "owner", "stateMutability": "view",
         "inputs": [], "outputs": [{"name": "", "type": "address"}]},
        {"type": "function", "name": "revokeCertificate", "stateMutability": "nonpayable",
         "inputs": [{"name": "certificateHash", "type": "string"}], "outputs": []},
        {"type": "function", "name": "verifyCertificate", "stateMutability": "view",
         "inputs": [{"name": "certificateHash", "type": "string"}],
         "outputs": [{"name": "exists", "type": "bool"}, {"name": "issuer", "type": "address"},
                     {"name": "timestamp", "type": "uint256"}, {"name": "isRevoked", "type": "bool"},
                     {"name": "metadata", "type": "string"}]}
    ])
}

/// Write a `contract-info.json` the way the deploy tooling does (ABI as a string).
pub fn write_artifact(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("contract-info.json");
    let body = json!({"address": CONTRACT, "abi": registry_abi().to_string()});
    std::fs::write(&path, body.to_string()).unwrap();
    path
}

pub struct MockNode {
    pub server: MockServer,
}

impl MockNode {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn url(&self) -> String {
        self.server.uri()
    }

    pub async fn respond(&self, matcher: RpcRequest, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(matcher)
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Respond once, then fall through to later mocks.
    pub async fn respond_once(&self, matcher: RpcRequest, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(matcher)
            .respond_with(response)
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    /// Hardhat-like node: chain 31337, two unlocked accounts, funded signer.
    pub async fn hardhat(&self) {
        self.respond(RpcRequest::method("eth_chainId"), rpc_result(json!("0x7a69")))
            .await;
        self.respond(
            RpcRequest::method("eth_accounts"),
            rpc_result(json!([SIGNER.to_lowercase(), SECOND_ACCOUNT.to_lowercase()])),
        )
        .await;
        self.respond(
            RpcRequest::method("eth_getBalance"),
            rpc_result(json!(TEN_THOUSAND_ETH)),
        )
        .await;
    }

    /// Registry contract deployed by the signer.
    pub async fn registry_owned_by_signer(&self) {
        self.respond(
            RpcRequest::calling("eth_call", "owner()"),
            rpc_result(return_data(&[Token::Address(address(SIGNER))])),
        )
        .await;
    }

    /// Transactions are accepted and mined immediately.
    pub async fn automine(&self, gas_estimate: Option<&str>) {
        match gas_estimate {
            Some(gas) => {
                self.respond(RpcRequest::method("eth_estimateGas"), rpc_result(json!(gas)))
                    .await
            }
            None => {
                self.respond(
                    RpcRequest::method("eth_estimateGas"),
                    rpc_error(-32000, "gas estimation unavailable"),
                )
                .await
            }
        }
        self.respond(
            RpcRequest::method("eth_sendTransaction"),
            rpc_result(json!(TX_HASH)),
        )
        .await;
        self.respond(
            RpcRequest::method("eth_getTransactionReceipt"),
            rpc_result(mined_receipt("0x1")),
        )
        .await;
    }

    /// JSON bodies of every request received for `rpc_method`.
    pub async fn requests_for(&self, rpc_method: &str) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter_map(|r| serde_json::from_slice::<Value>(&r.body).ok())
            .filter(|b| b["method"] == rpc_method)
            .collect()
    }
}

pub fn mined_receipt(status: &str) -> Value {
    json!({
        "transactionHash": TX_HASH,
        "blockNumber": "0x2",
        "gasUsed": "0x1d8a8",
        "status": status,
        "logs": []
    })
}
