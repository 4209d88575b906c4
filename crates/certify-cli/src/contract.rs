//! # Contract Subcommands
//!
//! `certify info` prints what the registry and node report about the
//! deployment. `certify authorize-issuer` grants issuing rights; the
//! contract rejects the call unless the signer is its owner.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use certify_chain::{Address, ContractInfo};

use crate::{connect, ChainArgs};

/// Arguments for `certify info`.
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `certify authorize-issuer`.
#[derive(Args, Debug)]
pub struct AuthorizeIssuerArgs {
    /// Address to authorize.
    pub address: String,
}

/// Execute `certify info`.
pub async fn run_info(args: &InfoArgs, chain: &ChainArgs) -> Result<u8> {
    let registry = connect(chain.config()?).await?;
    let info = registry
        .contract_info()
        .await
        .context("cannot read contract info")?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&info_json(&info))?);
    } else {
        print!("{}", render_info(&info, &registry.network().name));
    }
    Ok(0)
}

/// Execute `certify authorize-issuer`.
pub async fn run_authorize_issuer(args: &AuthorizeIssuerArgs, chain: &ChainArgs) -> Result<u8> {
    let issuer: Address = args
        .address
        .parse()
        .with_context(|| format!("invalid address: {}", args.address))?;
    let registry = connect(chain.config()?).await?;

    let owner = registry.owner().await?;
    if owner != registry.signer() {
        tracing::warn!(
            %owner,
            signer = %registry.signer(),
            "signer is not the contract owner; the transaction will likely revert"
        );
    }

    let receipt = registry
        .authorize_issuer(&issuer)
        .await
        .context("authorizeIssuer failed")?;
    println!("OK: {issuer} authorized to issue certificates");
    println!("  transaction:  {}", receipt.transaction_hash);
    println!("  block:        {}", receipt.block_number);
    Ok(0)
}

/// JSON form of contract info, using the same field names as the HTTP API.
pub fn info_json(info: &ContractInfo) -> serde_json::Value {
    json!({
        "contractAddress": info.contract_address.to_string(),
        "contractOwner": info.contract_owner.to_string(),
        "signerAddress": info.signer_address.to_string(),
        "signerBalance": info.signer_balance,
        "networkId": info.network_id.to_string(),
    })
}

/// Human-readable contract info.
pub fn render_info(info: &ContractInfo, network_name: &str) -> String {
    format!(
        "contract:       {}\nowner:          {}\nsigner:         {}\nbalance:        {} ETH\nnetwork:        {} (chain id {})\n",
        info.contract_address,
        info.contract_owner,
        info.signer_address,
        info.signer_balance,
        network_name,
        info.network_id,
    )
}
