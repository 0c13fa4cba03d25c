//! Storage Inspector - FunWithStorage Layout Dump
//!
//! Diagnostic step: deploys `FunWithStorage` and prints the first ten
//! raw storage words plus the slot holding the first element of the
//! dynamic array declared at slot 2. Nothing is asserted.

use alloy::primitives::{B256, Bytes, U256};
use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::domain::contracts::FUN_WITH_STORAGE;
use crate::domain::deployment::NamedAccount;
use crate::domain::network::block_confirmations;
use crate::domain::storage::{FUN_WITH_STORAGE_ARRAY_SLOT, INSPECTED_SLOTS, array_element_slot};
use crate::ports::chain_client::DeployRequest;

use super::context::DeployContext;

/// Storage words read by the inspector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageDump {
    /// Words at slots `0..INSPECTED_SLOTS`.
    pub slots: Vec<B256>,
    /// Location of the array's first element (a keccak hash) and the
    /// word stored there.
    pub array_element: (B256, B256),
}

#[instrument(skip(ctx), fields(network = %ctx.network))]
pub async fn deploy_storage(ctx: &DeployContext) -> Result<StorageDump> {
    let chain_id = ctx.chain.chain_id().await?;
    let deployer = ctx.account(NamedAccount::Deployer)?;

    info!("----------------------------------------------------");
    info!("Deploying FunWithStorage and waiting for confirmations...");
    let record = ctx
        .chain
        .deploy(DeployRequest {
            contract: FUN_WITH_STORAGE.to_string(),
            from: deployer,
            args: Bytes::new(),
            confirmations: block_confirmations(chain_id),
        })
        .await
        .context("FunWithStorage deployment failed")?;

    ctx.deployments.save(&record).await?;

    info!("Logging storage...");
    let mut slots = Vec::new();
    for i in 0..INSPECTED_SLOTS {
        let word = ctx.chain.storage_at(record.address, U256::from(i)).await?;
        info!("Location {i}: {word}");
        slots.push(word);
    }

    let element_slot = array_element_slot(U256::from(FUN_WITH_STORAGE_ARRAY_SLOT), U256::ZERO);
    let word = ctx.chain.storage_at(record.address, element_slot).await?;
    let location = B256::from(element_slot);
    info!("Location {location}: {word}");

    Ok(StorageDump {
        slots,
        array_element: (location, word),
    })
}
