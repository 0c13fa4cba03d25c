//! FundMe Port - Crowdfunding Contract Interface
//!
//! The calls this crate makes against a deployed FundMe. The funder
//! ledger lives in the contract; this trait only reads it and sends
//! `fund` / `withdraw` transactions.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use crate::domain::deployment::{TxOptions, TxOutcome};

use super::chain_client::ChainError;

#[async_trait]
pub trait FundMeContract: Send + Sync {
    /// Address of the contract.
    fn address(&self) -> Address;

    /// Send `fund()` with `opts.value` attached.
    async fn fund(&self, opts: &TxOptions) -> Result<TxOutcome, ChainError>;

    /// Send `withdraw()`; only the owner may call it.
    async fn withdraw(&self, opts: &TxOptions) -> Result<TxOutcome, ChainError>;

    /// Price feed passed to the constructor.
    async fn price_feed(&self) -> Result<Address, ChainError>;

    /// Funder at `index`; reverts past the end of the list.
    async fn funder(&self, index: U256) -> Result<Address, ChainError>;

    /// Wei recorded for `funder` since the last withdrawal.
    async fn amount_funded(&self, funder: Address) -> Result<U256, ChainError>;
}
