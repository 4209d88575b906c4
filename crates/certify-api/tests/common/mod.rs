//! Test harness: a simulated JSON-RPC node and app builders.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::method;
use wiremock::{Match, Mock, MockServer, Request as MockRequest, ResponseTemplate};

use certify_api::bootstrap::initialize_chain;
use certify_api::state::{AppConfig, AppState, ChainStatus};
use certify_chain::abi::{encode, function_selector, to_hex_data, Token};
use certify_chain::{ChainConfig, ConnectionState};

pub const CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
pub const SIGNER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
pub const TX_HASH: &str = "0x8a9f2f1c3b0e4d5a6b7c8d9e0f1a2b3c4d5e6f708192a3b4c5d6e7f8091a2b3c";
pub const INDEX_HTML: &str = "<html><body>certificate verifier</body></html>";

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
    fn matches(&self, request: &MockRequest) -> bool {
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

pub fn return_data(tokens: &[Token]) -> Value {
    Value::String(to_hex_data(&encode(tokens)))
}

fn registry_abi() -> Value {
    let function = |name: &str, inputs: Value, outputs: Value| {
        json!({"type": "function", "name": name, "inputs": inputs, "outputs": outputs})
    };
    let hash_in = json!([{"name": "certificateHash", "type": "string"}]);
    json!([
        function("issueCertificate", json!([
            {"name": "certificateHash", "type": "string"},
            {"name": "metadata", "type": "string"}
        ]), json!([])),
        function("verifyCertificate", hash_in.clone(), json!([
            {"name": "exists", "type": "bool"}, {"name": "issuer", "type": "address"},
            {"name": "timestamp", "type": "uint256"}, {"name": "isRevoked", "type": "bool"},
            {"name": "metadata", "type": "string"}
        ])),
        function("revokeCertificate", hash_in.clone(), json!([])),
        function("certificateExists", hash_in, json!([{"name": "", "type": "bool"}])),
        function("owner", json!([]), json!([{"name": "", "type": "address"}])),
    ])
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

    pub async fn respond(&self, matcher: RpcRequest, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(matcher)
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Hardhat-like node with the registry deployed by the signer and
    /// transactions mined immediately.
    pub async fn hardhat_with_registry(&self) {
        self.respond(RpcRequest::method("eth_chainId"), rpc_result(json!("0x7a69")))
            .await;
        self.respond(
            RpcRequest::method("eth_accounts"),
            rpc_result(json!([SIGNER.to_lowercase()])),
        )
        .await;
        self.respond(
            RpcRequest::method("eth_getBalance"),
            rpc_result(json!("0x21e19e0c9bab2400000")),
        )
        .await;
        self.respond(
            RpcRequest::calling("eth_call", "owner()"),
            rpc_result(return_data(&[Token::Address(SIGNER.parse().unwrap())])),
        )
        .await;
        self.respond(RpcRequest::method("eth_estimateGas"), rpc_result(json!("0x186a0")))
            .await;
        self.respond(
            RpcRequest::method("eth_getTransactionReceipt"),
            rpc_result(json!({
                "transactionHash": TX_HASH,
                "blockNumber": "0x2",
                "gasUsed": "0x1d8a8",
                "status": "0x1"
            })),
        )
        .await;
    }

    /// Accept every transaction.
    pub async fn accept_transactions(&self) {
        self.respond(
            RpcRequest::method("eth_sendTransaction"),
            rpc_result(json!(TX_HASH)),
        )
        .await;
    }

    /// Registry state for whatever hash is asked about.
    pub async fn registry_has(&self, exists: bool, revoked: bool, metadata: &str) {
        let issuer = if exists {
            SIGNER
        } else {
            "0x0000000000000000000000000000000000000000"
        };
        self.respond(
            RpcRequest::calling("eth_call", "verifyCertificate(string)"),
            rpc_result(return_data(&[
                Token::Bool(exists),
                Token::Address(issuer.parse().unwrap()),
                Token::Uint(if exists { 1_705_312_800 } else { 0 }),
                Token::Bool(revoked),
                Token::String(metadata.to_string()),
            ])),
        )
        .await;
        self.respond(
            RpcRequest::calling("eth_call", "certificateExists(string)"),
            rpc_result(return_data(&[Token::Bool(exists)])),
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

/// Temp dir with a web root and an artifact pointing at [`CONTRACT`].
pub fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let public = dir.path().join("public");
    std::fs::create_dir(&public).unwrap();
    std::fs::write(public.join("index.simple.html"), INDEX_HTML).unwrap();
    std::fs::write(public.join("app.css"), "body{}").unwrap();
    let artifact = json!({"address": CONTRACT, "abi": registry_abi()});
    std::fs::write(dir.path().join("contract-info.json"), artifact.to_string()).unwrap();
    dir
}

pub fn app_config(dir: &TempDir, auth_token: Option<&str>) -> AppConfig {
    AppConfig {
        auth_token: auth_token.map(String::from),
        public_dir: dir.path().join("public"),
        ..AppConfig::default()
    }
}

/// App in a given chain state, without any node.
pub fn app_without_chain(dir: &TempDir, chain: ChainStatus) -> Router {
    certify_api::app(AppState::with_chain(app_config(dir, None), chain))
}

/// App bootstrapped against `node`.
pub async fn bound_app(node: &MockNode, dir: &TempDir, auth_token: Option<&str>) -> Router {
    bound_app_with(node, app_config(dir, auth_token), dir).await
}

pub async fn bound_app_with(node: &MockNode, config: AppConfig, dir: &TempDir) -> Router {
    let chain_config = ChainConfig::for_endpoint(&node.server.uri())
        .unwrap()
        .with_contract_info(dir.path().join("contract-info.json"))
        .with_receipt_polling(10, 2);
    let outcome = initialize_chain(chain_config).await;
    assert_eq!(outcome.status.state(), ConnectionState::ContractBound);
    certify_api::app(AppState::with_chain(config, outcome.status))
}

// -- Request helpers ------------------------------------------------------

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

const BOUNDARY: &str = "certify-test-boundary";

pub fn post_file(uri: &str, field: &str, file_name: &str, content: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn json_response(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = send(app, request).await;
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
