//! Domain layer - Network table, contract ABIs, and deployment data.
//!
//! Pure types and computations: nothing here talks to a node, reads a
//! file, or logs. Adapters and use cases build on these.

pub mod contracts;
pub mod deployment;
pub mod gas;
pub mod network;
pub mod storage;

// Re-export core types for convenience
pub use contracts::RevertReason;
pub use deployment::{DeploymentRecord, NamedAccount, TxOptions, TxOutcome};
pub use gas::{GasPricing, GasReport};
pub use network::{DeploymentParams, PriceFeedSource, is_development_chain};
