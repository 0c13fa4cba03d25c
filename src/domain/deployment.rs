//! Deployment Records and Transaction Outcomes
//!
//! Data produced by deployments and transactions. Records are
//! serialized to `deployments/<network>/<Name>.json` so later runs
//! (interaction scripts, staging tests) can find deployed contracts.

use std::fmt;

use alloy::primitives::{Address, B256, Bytes, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A contract deployed by this crate on one network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    /// Artifact name, e.g. `FundMe`.
    pub contract_name: String,
    /// Deployed contract address.
    pub address: Address,
    /// Hash of the creation transaction.
    pub transaction_hash: B256,
    /// Block the creation transaction was mined in.
    pub block_number: Option<u64>,
    /// ABI-encoded constructor arguments.
    pub args: Bytes,
    /// Gas consumed by the creation transaction.
    pub gas_used: u64,
    /// Contract ABI copied from the artifact.
    #[serde(default)]
    pub abi: serde_json::Value,
    /// When the deployment was recorded.
    pub deployed_at: DateTime<Utc>,
}

/// Receipt data the harness and gas reporter care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxOutcome {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    /// Effective gas price in wei.
    pub effective_gas_price: u128,
}

impl TxOutcome {
    /// Wei paid for gas: `gas_used * effective_gas_price`.
    pub fn gas_cost(&self) -> U256 {
        U256::from(self.gas_used) * U256::from(self.effective_gas_price)
    }
}

/// Options attached to a state-changing contract call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxOptions {
    /// Sending account; must be one of the wallet's signers.
    pub from: Address,
    /// Wei attached to the call.
    pub value: U256,
    /// Explicit gas limit; estimated by the node when absent.
    pub gas_limit: Option<u64>,
    /// Confirmations to wait for before returning.
    pub confirmations: u64,
}

impl TxOptions {
    /// Call from `from` with no value, waiting for one confirmation.
    pub fn sender(from: Address) -> Self {
        Self {
            from,
            value: U256::ZERO,
            gas_limit: None,
            confirmations: 1,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }
}

/// Accounts referenced by role rather than by address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedAccount {
    /// Deploys contracts and owns FundMe.
    Deployer,
    /// Secondary account used by tests.
    User,
}

impl fmt::Display for NamedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deployer => write!(f, "deployer"),
            Self::User => write!(f, "user"),
        }
    }
}
