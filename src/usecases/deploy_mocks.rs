//! Mock Deployment - Price Feed Aggregator for Local Chains
//!
//! Live chains have a Chainlink ETH/USD feed; development chains do
//! not, so a `MockV3Aggregator` answering a fixed price is deployed
//! first and FundMe is wired to it.

use alloy::primitives::{I256, U256};
use alloy::sol_types::SolValue;
use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::domain::contracts::MOCK_V3_AGGREGATOR;
use crate::domain::deployment::{DeploymentRecord, NamedAccount};
use crate::domain::network::{DECIMALS, DEFAULT_BLOCK_CONFIRMATIONS, INITIAL_ANSWER};
use crate::ports::chain_client::DeployRequest;

use super::context::DeployContext;

/// Deploy `MockV3Aggregator(DECIMALS, INITIAL_ANSWER)` on development chains.
///
/// Returns `None` (and does nothing) on any other network.
#[instrument(skip(ctx), fields(network = %ctx.network))]
pub async fn deploy_mocks(ctx: &DeployContext) -> Result<Option<DeploymentRecord>> {
    if !ctx.is_development() {
        return Ok(None);
    }

    info!("Local network detected! Deploying mocks...");

    let deployer = ctx.account(NamedAccount::Deployer)?;
    let args = constructor_args().abi_encode_params();

    let record = ctx
        .chain
        .deploy(DeployRequest {
            contract: MOCK_V3_AGGREGATOR.to_string(),
            from: deployer,
            args: args.into(),
            confirmations: DEFAULT_BLOCK_CONFIRMATIONS,
        })
        .await
        .context("Mock price feed deployment failed")?;

    ctx.deployments.save(&record).await?;

    info!("Mocks deployed!");
    info!("----------------------------------------------------");

    Ok(Some(record))
}

/// `(uint8 decimals, int256 initialAnswer)`; a `uint8` encodes as a full word.
fn constructor_args() -> (U256, I256) {
    (U256::from(DECIMALS), I256::unchecked_from(INITIAL_ANSWER))
}
