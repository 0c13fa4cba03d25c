//! Transaction Helpers - Send, Confirm, and Classify Failures
//!
//! Shared by the chain client and the FundMe adapter: submits a
//! request through the wallet provider, waits for confirmations, and
//! turns node errors into [`ChainError`] with a decoded revert reason.

use alloy::network::TransactionBuilder;
use alloy::providers::Provider;
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::transports::{RpcError, TransportErrorKind};
use anyhow::Context;
use tracing::debug;

use crate::domain::contracts::RevertReason;
use crate::domain::deployment::TxOutcome;
use crate::ports::chain_client::ChainError;

/// Classify an RPC failure, decoding revert data when present.
pub(crate) fn classify_rpc_error(err: RpcError<TransportErrorKind>) -> ChainError {
    if let Some(payload) = err.as_error_resp() {
        if let Some(data) = payload.as_revert_data() {
            return ChainError::Reverted(RevertReason::decode(&data));
        }
        if let Some(reason) = RevertReason::from_node_message(&payload.message) {
            return ChainError::Reverted(reason);
        }
        return ChainError::Rpc(payload.to_string());
    }

    ChainError::Other(anyhow::Error::new(err))
}

/// Send `tx`, wait for `confirmations`, and return the receipt.
///
/// A mined but failed transaction (only possible with an explicit gas
/// limit, which skips estimation) is reported as
/// `ChainError::Reverted(RevertReason::Unknown)`.
pub(crate) async fn send_and_confirm(
    provider: &(dyn Provider + Send + Sync),
    tx: TransactionRequest,
    confirmations: u64,
) -> Result<TransactionReceipt, ChainError> {
    let pending = provider
        .send_transaction(tx)
        .await
        .map_err(classify_rpc_error)?;

    let tx_hash = *pending.tx_hash();
    debug!(%tx_hash, confirmations, "Transaction submitted");

    let receipt = pending
        .with_required_confirmations(confirmations)
        .get_receipt()
        .await
        .with_context(|| format!("Failed waiting for receipt of {tx_hash}"))?;

    if !receipt.status() {
        return Err(ChainError::Reverted(RevertReason::Unknown));
    }

    Ok(receipt)
}

/// Attach an explicit gas limit when one is given.
pub(crate) fn with_optional_gas_limit(tx: TransactionRequest, gas_limit: Option<u64>) -> TransactionRequest {
    match gas_limit {
        Some(limit) => tx.with_gas_limit(limit),
        None => tx,
    }
}

/// Extract the fields the harness and gas reporter use.
pub(crate) fn outcome_of(receipt: &TransactionReceipt) -> TxOutcome {
    TxOutcome {
        tx_hash: receipt.transaction_hash,
        block_number: receipt.block_number,
        gas_used: u64::try_from(receipt.gas_used).unwrap_or(u64::MAX),
        effective_gas_price: u128::from(receipt.effective_gas_price),
    }
}
