//! # Contract Info Route

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::state::AppState;

/// Build the contract-info router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/contract-info", get(contract_info))
}

/// Contract and signer summary for the web UI.
///
/// Fields other than `contractAddress` are `null` when the node could not
/// be queried. `networkId` is a decimal string.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContractInfoResponse {
    pub success: bool,
    pub contract_address: String,
    pub contract_owner: Option<String>,
    pub signer_address: Option<String>,
    /// Ether, e.g. `"10000.0"`.
    pub signer_balance: Option<String>,
    pub network_id: Option<String>,
}

/// GET /api/contract-info
#[utoipa::path(
    get,
    path = "/api/contract-info",
    responses(
        (status = 200, description = "Contract summary", body = ContractInfoResponse),
        (status = 503, description = "Registry contract not bound", body = crate::error::ErrorBody),
    ),
    tag = "contract"
)]
pub(crate) async fn contract_info(
    State(state): State<AppState>,
) -> Result<Json<ContractInfoResponse>, AppError> {
    let registry = state.registry()?;

    let response = match registry.contract_info().await {
        Ok(info) => ContractInfoResponse {
            success: true,
            contract_address: info.contract_address.to_string(),
            contract_owner: Some(info.contract_owner.to_string()),
            signer_address: Some(info.signer_address.to_string()),
            signer_balance: Some(info.signer_balance),
            network_id: Some(info.network_id.to_string()),
        },
        Err(e) => {
            tracing::warn!("contract info query failed: {e}");
            ContractInfoResponse {
                success: true,
                contract_address: registry.address().to_string(),
                contract_owner: None,
                signer_address: None,
                signer_balance: None,
                network_id: None,
            }
        }
    };
    Ok(Json(response))
}
