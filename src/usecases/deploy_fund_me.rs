//! FundMe Deployment - Price Feed Resolution, Deploy, Verify
//!
//! Deployment flow:
//! 1. Resolve the price feed (mock on development chains, configured
//!    or fallback feed elsewhere) and the confirmation count
//! 2. Deploy `FundMe(priceFeed)` from the deployer account
//! 3. Record the deployment
//! 4. On live chains with an explorer key, submit source verification

use alloy::sol_types::SolValue;
use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use crate::domain::contracts::{FUND_ME, MOCK_V3_AGGREGATOR};
use crate::domain::deployment::{DeploymentRecord, NamedAccount};
use crate::domain::network::{DeploymentParams, PriceFeedSource};
use crate::ports::chain_client::DeployRequest;
use crate::ports::verifier::{VerificationRequest, VerificationStatus};

use super::context::DeployContext;

/// Resolve deployment parameters for the context's network.
pub async fn resolve_params(ctx: &DeployContext) -> Result<DeploymentParams> {
    let chain_id = ctx.chain.chain_id().await?;

    let mock = if ctx.is_development() {
        ctx.deployments
            .get(MOCK_V3_AGGREGATOR)
            .await?
            .map(|record| record.address)
    } else {
        None
    };

    let params = DeploymentParams::resolve(&ctx.network, chain_id, mock)?;
    if params.source == PriceFeedSource::Fallback {
        info!(chain_id, price_feed = %params.price_feed, "No feed configured for chain, using fallback");
    }
    Ok(params)
}

/// Deploy FundMe and, on live chains, verify it.
#[instrument(skip(ctx), fields(network = %ctx.network))]
pub async fn deploy_fund_me(ctx: &DeployContext) -> Result<DeploymentRecord> {
    let params = resolve_params(ctx).await?;
    let deployer = ctx.account(NamedAccount::Deployer)?;

    let record = ctx
        .chain
        .deploy(DeployRequest {
            contract: FUND_ME.to_string(),
            from: deployer,
            args: params.price_feed.abi_encode().into(),
            confirmations: params.block_confirmations,
        })
        .await
        .context("FundMe deployment failed")?;

    ctx.deployments.save(&record).await?;
    info!("FundMe deployed at {}", record.address);

    if !ctx.is_development() {
        verify(ctx, &record).await;
    }

    Ok(record)
}

/// Submit `record` for verification. Never fails the deployment.
async fn verify(ctx: &DeployContext, record: &DeploymentRecord) {
    let Some(verifier) = &ctx.verifier else {
        return;
    };

    let request = VerificationRequest {
        contract: record.contract_name.clone(),
        address: record.address,
        constructor_args: record.args.clone(),
    };

    match verifier.verify(&request).await {
        Ok(VerificationStatus::Verified) => info!(address = %record.address, "Contract verified"),
        Ok(VerificationStatus::AlreadyVerified) => info!("Already verified!"),
        Err(e) => warn!("Verification failed: {e:#}"),
    }
}
