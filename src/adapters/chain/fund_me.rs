//! FundMe Contract Adapter - ABI-encoded Calls via alloy-rs
//!
//! Implements the `FundMeContract` port. Transactions go through the
//! wallet provider (so `from` must be a wallet signer); views are plain
//! `eth_call`s decoded with the `sol!` bindings.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::adapters::gas_reporter::GasRecorder;
use crate::domain::contracts::{FUND_ME, FundMe};
use crate::domain::deployment::{TxOptions, TxOutcome};
use crate::ports::chain_client::ChainError;
use crate::ports::fund_me::FundMeContract;

use super::transactions::{classify_rpc_error, outcome_of, send_and_confirm, with_optional_gas_limit};

/// A deployed FundMe reached through an alloy provider.
pub struct AlloyFundMe {
    provider: Arc<dyn Provider + Send + Sync>,
    address: Address,
    gas: Option<Arc<GasRecorder>>,
}

impl AlloyFundMe {
    pub fn new(
        provider: Arc<dyn Provider + Send + Sync>,
        address: Address,
        gas: Option<Arc<GasRecorder>>,
    ) -> Self {
        Self {
            provider,
            address,
            gas,
        }
    }

    async fn transact<C: SolCall>(
        &self,
        call: C,
        method: &str,
        opts: &TxOptions,
    ) -> Result<TxOutcome, ChainError> {
        let tx = TransactionRequest::default()
            .from(opts.from)
            .to(self.address)
            .value(opts.value)
            .input(Bytes::from(call.abi_encode()).into());
        let tx = with_optional_gas_limit(tx, opts.gas_limit);

        let receipt = send_and_confirm(&*self.provider, tx, opts.confirmations).await?;
        let outcome = outcome_of(&receipt);

        if let Some(gas) = &self.gas {
            gas.record_call(FUND_ME, method, &outcome);
        }

        debug!(method, tx_hash = %outcome.tx_hash, gas_used = outcome.gas_used, "FundMe call confirmed");
        Ok(outcome)
    }

    async fn view<C: SolCall>(&self, call: C) -> Result<C::Return, ChainError> {
        let tx = TransactionRequest::default()
            .to(self.address)
            .input(Bytes::from(call.abi_encode()).into());

        let output = self
            .provider
            .call(&tx)
            .await
            .map_err(classify_rpc_error)?;

        C::abi_decode_returns(&output, true).map_err(|e| {
            ChainError::Other(anyhow::anyhow!("Failed to decode {} output: {e}", C::SIGNATURE))
        })
    }
}

#[async_trait]
impl FundMeContract for AlloyFundMe {
    fn address(&self) -> Address {
        self.address
    }

    #[instrument(skip(self, opts), fields(from = %opts.from, value = %opts.value))]
    async fn fund(&self, opts: &TxOptions) -> Result<TxOutcome, ChainError> {
        self.transact(FundMe::fundCall {}, "fund", opts).await
    }

    #[instrument(skip(self, opts), fields(from = %opts.from))]
    async fn withdraw(&self, opts: &TxOptions) -> Result<TxOutcome, ChainError> {
        self.transact(FundMe::withdrawCall {}, "withdraw", opts).await
    }

    async fn price_feed(&self) -> Result<Address, ChainError> {
        Ok(self.view(FundMe::getPriceFeedCall {}).await?._0)
    }

    async fn funder(&self, index: U256) -> Result<Address, ChainError> {
        Ok(self.view(FundMe::getFunderCall { index }).await?._0)
    }

    async fn amount_funded(&self, funder: Address) -> Result<U256, ChainError> {
        Ok(self
            .view(FundMe::getAddressToAmountFundedCall { funder })
            .await?
            ._0)
    }
}
