//! Chain Client - Deployments and Raw Reads via alloy-rs
//!
//! Implements the `ChainClient` port on top of a [`NetworkProvider`].
//! Creation bytecode comes from the [`ArtifactStore`]; constructor
//! arguments are appended to it as the EVM expects.

use std::sync::Arc;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, B256, Bytes, U256};
use alloy::rpc::types::TransactionRequest;
use anyhow::{Context, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, instrument};

use crate::adapters::artifacts::ArtifactStore;
use crate::adapters::gas_reporter::GasRecorder;
use crate::domain::deployment::DeploymentRecord;
use crate::ports::chain_client::{ChainClient, ChainError, DeployRequest};
use crate::ports::fund_me::FundMeContract;

use super::fund_me::AlloyFundMe;
use super::provider::NetworkProvider;
use super::transactions::{classify_rpc_error, outcome_of, send_and_confirm};

/// alloy-backed implementation of the `ChainClient` port.
pub struct AlloyChainClient {
    /// Shared network provider.
    provider: Arc<NetworkProvider>,
    /// Compiled contracts by name.
    artifacts: ArtifactStore,
    /// Gas usage sink, when reporting is enabled.
    gas: Option<Arc<GasRecorder>>,
}

impl AlloyChainClient {
    pub fn new(
        provider: Arc<NetworkProvider>,
        artifacts: ArtifactStore,
        gas: Option<Arc<GasRecorder>>,
    ) -> Self {
        Self {
            provider,
            artifacts,
            gas,
        }
    }
}

#[async_trait]
impl ChainClient for AlloyChainClient {
    async fn chain_id(&self) -> Result<u64, ChainError> {
        Ok(self.provider.chain_id())
    }

    fn accounts(&self) -> Vec<Address> {
        self.provider.accounts().to_vec()
    }

    #[instrument(skip(self, request), fields(contract = %request.contract, from = %request.from))]
    async fn deploy(&self, request: DeployRequest) -> Result<DeploymentRecord, ChainError> {
        let artifact = self
            .artifacts
            .load(&request.contract)
            .await
            .with_context(|| format!("Cannot deploy {}", request.contract))?;

        let mut code = artifact.bytecode.to_vec();
        code.extend_from_slice(&request.args);

        let tx = TransactionRequest::default()
            .from(request.from)
            .with_deploy_code(Bytes::from(code));

        let receipt = send_and_confirm(&*self.provider.inner(), tx, request.confirmations).await?;
        let outcome = outcome_of(&receipt);

        let address = receipt
            .contract_address
            .ok_or_else(|| anyhow!("Receipt for {} has no contract address", request.contract))?;

        if let Some(gas) = &self.gas {
            gas.record_deployment(&request.contract, &outcome);
        }

        info!(
            contract = %request.contract,
            %address,
            tx_hash = %outcome.tx_hash,
            gas_used = outcome.gas_used,
            "deploying \"{}\" (tx: {}) ... deployed at {} with {} gas",
            request.contract,
            outcome.tx_hash,
            address,
            outcome.gas_used
        );

        Ok(DeploymentRecord {
            contract_name: request.contract,
            address,
            transaction_hash: outcome.tx_hash,
            block_number: outcome.block_number,
            args: request.args,
            gas_used: outcome.gas_used,
            abi: artifact.abi,
            deployed_at: Utc::now(),
        })
    }

    async fn storage_at(&self, address: Address, slot: U256) -> Result<B256, ChainError> {
        let word = self
            .provider
            .inner()
            .get_storage_at(address, slot)
            .await
            .map_err(classify_rpc_error)?;
        Ok(B256::from(word))
    }

    async fn balance_of(&self, address: Address) -> Result<U256, ChainError> {
        self.provider
            .inner()
            .get_balance(address)
            .await
            .map_err(classify_rpc_error)
    }

    fn fund_me(&self, address: Address) -> Arc<dyn FundMeContract> {
        Arc::new(AlloyFundMe::new(self.provider.inner(), address, self.gas.clone()))
    }

    async fn is_healthy(&self) -> bool {
        self.provider.is_healthy().await
    }
}
