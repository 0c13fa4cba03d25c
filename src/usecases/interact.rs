//! Interaction Scripts - Fund and Withdraw a Deployed FundMe
//!
//! Both scripts act as the deployer against the FundMe recorded for
//! the current network and wait for one confirmation.

use alloy::primitives::utils::parse_ether;
use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::domain::contracts::FUND_ME;
use crate::domain::deployment::{NamedAccount, TxOptions, TxOutcome};

use super::context::DeployContext;

/// Amount sent by the `fund` script.
pub const FUND_AMOUNT_ETH: &str = "1";

#[instrument(skip(ctx), fields(network = %ctx.network))]
pub async fn fund(ctx: &DeployContext) -> Result<TxOutcome> {
    let deployer = ctx.account(NamedAccount::Deployer)?;
    let record = ctx.deployment(FUND_ME).await?;
    let fund_me = ctx.chain.fund_me(record.address);

    info!("Funding contract.....");
    let value = parse_ether(FUND_AMOUNT_ETH).context("Invalid fund amount")?;
    let outcome = fund_me
        .fund(&TxOptions::sender(deployer).with_value(value))
        .await
        .context("fund() failed")?;
    info!("Funded!");

    Ok(outcome)
}

#[instrument(skip(ctx), fields(network = %ctx.network))]
pub async fn withdraw(ctx: &DeployContext) -> Result<TxOutcome> {
    let deployer = ctx.account(NamedAccount::Deployer)?;
    let record = ctx.deployment(FUND_ME).await?;
    let fund_me = ctx.chain.fund_me(record.address);

    info!("Withdrawing from contract.....");
    let outcome = fund_me
        .withdraw(&TxOptions::sender(deployer))
        .await
        .context("withdraw() failed")?;
    info!("Got it back!");

    Ok(outcome)
}
