//! Chain Client Port - On-chain Interaction Interface
//!
//! Defines the trait for deploying contracts and reading chain state
//! on the selected network. Implemented over alloy-rs; mocked in tests.

use std::sync::Arc;

use alloy::primitives::{Address, B256, Bytes, U256};
use async_trait::async_trait;

use crate::domain::contracts::RevertReason;
use crate::domain::deployment::DeploymentRecord;

use super::fund_me::FundMeContract;

/// Failure of a chain call or transaction.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// The EVM reverted the call.
    #[error("transaction {0}")]
    Reverted(RevertReason),
    /// The node rejected the request for a non-revert reason.
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChainError {
    /// The revert reason, if this error is a revert.
    pub fn revert_reason(&self) -> Option<&RevertReason> {
        match self {
            Self::Reverted(reason) => Some(reason),
            _ => None,
        }
    }
}

/// A contract creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    /// Artifact name; bytecode and ABI are looked up by this name.
    pub contract: String,
    /// Deploying account.
    pub from: Address,
    /// ABI-encoded constructor arguments appended to the bytecode.
    pub args: Bytes,
    /// Confirmations to wait for before the deployment counts as done.
    pub confirmations: u64,
}

/// Trait for on-chain interactions via alloy-rs.
#[async_trait]
pub trait ChainClient: Send + Sync + 'static {
    /// Chain ID reported by the node.
    async fn chain_id(&self) -> Result<u64, ChainError>;

    /// Signer addresses available to this client, in named-account order.
    fn accounts(&self) -> Vec<Address>;

    /// Deploy a contract and wait for the requested confirmations.
    async fn deploy(&self, request: DeployRequest) -> Result<DeploymentRecord, ChainError>;

    /// Raw 32-byte storage word at `slot` of `address`.
    async fn storage_at(&self, address: Address, slot: U256) -> Result<B256, ChainError>;

    /// Native balance of `address` in wei.
    async fn balance_of(&self, address: Address) -> Result<U256, ChainError>;

    /// Handle to a FundMe contract deployed at `address`.
    fn fund_me(&self, address: Address) -> Arc<dyn FundMeContract>;

    /// Check if the chain client connection is healthy.
    async fn is_healthy(&self) -> bool;
}
