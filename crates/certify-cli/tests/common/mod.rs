//! Simulated Hardhat node for CLI tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::method;
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

use certify_chain::abi::{encode, function_selector, to_hex_data, Token};
use certify_cli::ChainArgs;

pub const CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
pub const SIGNER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

pub const TX_HASH: &str = "0x8a9f2f1c3b0e4d5a6b7c8d9e0f1a2b3c4d5e6f708192a3b4c5d6e7f8091a2b3c";

/// Matches a JSON-RPC method, optionally narrowed to a call selector and
/// to call data carrying a given certificate hash.
pub struct Rpc {
    method: &'static str,
    selector: Option<String>,
    argument: Option<String>,
}

pub fn rpc(method: &'static str) -> Rpc {
    Rpc {
        method,
        selector: None,
        argument: None,
    }
}

pub fn call(signature: &str) -> Rpc {
    Rpc {
        method: "eth_call",
        selector: Some(to_hex_data(&function_selector(signature))),
        argument: None,
    }
}

/// Hex of the string bytes as they appear inside ABI-encoded call data.
pub fn encoded_hash(hash_hex: &str) -> String {
    hash_hex.bytes().map(|b| format!("{b:02x}")).collect()
}

impl Rpc {
    /// Only match calls whose string argument is `hash_hex`.
    pub fn with_hash(mut self, hash_hex: &str) -> Self {
        self.argument = Some(encoded_hash(hash_hex));
        self
    }
}

impl Match for Rpc {
    fn matches(&self, request: &Request) -> bool {
        let Ok(body) = serde_json::from_slice::<Value>(&request.body) else {
            return false;
        };
        let data = body["params"][0]["data"].as_str().unwrap_or_default();
        body["method"] == self.method
            && self
                .selector
                .as_ref()
                .map_or(true, |selector| data.starts_with(selector.as_str()))
            && self
                .argument
                .as_ref()
                .map_or(true, |argument| data.contains(argument.as_str()))
    }
}

pub fn result(value: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": value}))
}

pub fn returns(tokens: &[Token]) -> ResponseTemplate {
    result(Value::String(to_hex_data(&encode(tokens))))
}

pub async fn mount(server: &MockServer, matcher: Rpc, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(matcher)
        .respond_with(response)
        .mount(server)
        .await;
}

/// Node with one unlocked account that owns the registry.
pub async fn hardhat_node() -> MockServer {
    let server = MockServer::start().await;
    mount(&server, rpc("eth_chainId"), result(json!("0x7a69"))).await;
    mount(&server, rpc("eth_accounts"), result(json!([SIGNER.to_lowercase()]))).await;
    mount(
        &server,
        rpc("eth_getBalance"),
        result(json!("0x21e19e0c9bab2400000")),
    )
    .await;
    mount(
        &server,
        call("owner()"),
        returns(&[Token::Address(SIGNER.parse().unwrap())]),
    )
    .await;
    server
}

/// Answer `authorizedIssuers(address)` for any address.
pub async fn signer_authorized(server: &MockServer, authorized: bool) {
    mount(
        server,
        call("authorizedIssuers(address)"),
        returns(&[Token::Bool(authorized)]),
    )
    .await;
}

/// Registry state for whatever hash is asked about.
pub async fn registry_has(server: &MockServer, exists: bool, revoked: bool) {
    let issuer = if exists {
        SIGNER
    } else {
        "0x0000000000000000000000000000000000000000"
    };
    mount(
        server,
        call("verifyCertificate(string)"),
        returns(&[
            Token::Bool(exists),
            Token::Address(issuer.parse().unwrap()),
            Token::Uint(if exists { 1_705_312_800 } else { 0 }),
            Token::Bool(revoked),
            Token::String(if exists {
                r#"{"institution":"Blockchain Academy"}"#.to_string()
            } else {
                String::new()
            }),
        ]),
    )
    .await;
    mount(
        server,
        call("certificateExists(string)"),
        returns(&[Token::Bool(exists)]),
    )
    .await;
}

/// Only `hash_hex` is a valid certificate; every other hash is unknown.
pub async fn registry_issued(server: &MockServer, hash_hex: &str) {
    Mock::given(method("POST"))
        .and(call("verifyCertificate(string)").with_hash(hash_hex))
        .respond_with(returns(&[
            Token::Bool(true),
            Token::Address(SIGNER.parse().unwrap()),
            Token::Uint(1_705_312_800),
            Token::Bool(false),
            Token::String(r#"{"institution":"Blockchain Academy"}"#.to_string()),
        ]))
        .with_priority(1)
        .mount(server)
        .await;
    registry_has(server, false, false).await;
}

/// Mine every transaction immediately.
pub async fn accept_transactions(server: &MockServer) {
    mount(server, rpc("eth_estimateGas"), result(json!("0x186a0"))).await;
    mount(server, rpc("eth_sendTransaction"), result(json!(TX_HASH))).await;
    mount(
        server,
        rpc("eth_getTransactionReceipt"),
        result(json!({
            "transactionHash": TX_HASH,
            "blockNumber": "0x2",
            "gasUsed": "0x1d8a8",
            "status": "0x1"
        })),
    )
    .await;
}

/// Data field of every `eth_sendTransaction` received.
pub async fn sent_transaction_data(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter_map(|r| serde_json::from_slice::<Value>(&r.body).ok())
        .filter(|b| b["method"] == "eth_sendTransaction")
        .filter_map(|b| b["params"][0]["data"].as_str().map(str::to_string))
        .collect()
}

/// Contract owned by `owner` rather than the signer.
pub async fn owned_by(server: &MockServer, owner: &str) {
    Mock::given(method("POST"))
        .and(call("owner()"))
        .respond_with(returns(&[Token::Address(owner.parse().unwrap())]))
        .with_priority(1)
        .mount(server)
        .await;
}

fn function(name: &str, inputs: Value, outputs: Value) -> Value {
    json!({"type": "function", "name": name, "inputs": inputs, "outputs": outputs})
}

/// Registry ABI, with or without the issuer allow-list functions.
pub fn registry_abi(with_allow_list: bool) -> Value {
    let hash_in = json!([{"name": "certificateHash", "type": "string"}]);
    let mut abi = vec![
        function(
            "issueCertificate",
            json!([
                {"name": "certificateHash", "type": "string"},
                {"name": "metadata", "type": "string"}
            ]),
            json!([]),
        ),
        function(
            "verifyCertificate",
            hash_in.clone(),
            json!([
                {"name": "exists", "type": "bool"}, {"name": "issuer", "type": "address"},
                {"name": "timestamp", "type": "uint256"}, {"name": "isRevoked", "type": "bool"},
                {"name": "metadata", "type": "string"}
            ]),
        ),
        function("revokeCertificate", hash_in.clone(), json!([])),
        function("certificateExists", hash_in, json!([{"name": "", "type": "bool"}])),
        function("owner", json!([]), json!([{"name": "", "type": "address"}])),
    ];
    if with_allow_list {
        let issuer_in = json!([{"name": "issuer", "type": "address"}]);
        abi.push(function(
            "authorizedIssuers",
            issuer_in.clone(),
            json!([{"name": "", "type": "bool"}]),
        ));
        abi.push(function("authorizeIssuer", issuer_in, json!([])));
    }
    Value::Array(abi)
}

/// Temp dir holding `contract-info.json`, with the ABI stored as a string
/// the way the deploy script writes it.
pub fn artifact_dir(with_allow_list: bool) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let artifact = json!({
        "address": CONTRACT,
        "abi": registry_abi(with_allow_list).to_string(),
    });
    std::fs::write(dir.path().join("contract-info.json"), artifact.to_string()).unwrap();
    dir
}

pub fn chain_args(server: &MockServer, dir: &TempDir) -> ChainArgs {
    ChainArgs {
        rpc_url: Some(server.uri()),
        contract_info: Some(dir.path().join("contract-info.json")),
    }
}
