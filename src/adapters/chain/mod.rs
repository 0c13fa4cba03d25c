//! Chain Adapters - EVM Interaction Layer
//!
//! Provides on-chain access via alloy-rs 0.9 for:
//! - Network connection (HTTP endpoint or a spawned Anvil)
//! - Contract deployment from compiled artifacts
//! - FundMe calls with decoded revert reasons
//! - Raw storage and balance reads

pub mod client;
pub mod fund_me;
pub mod provider;
mod transactions;

pub use client::AlloyChainClient;
pub use fund_me::AlloyFundMe;
pub use provider::NetworkProvider;
