//! Persistence Adapters - Deployment Records
//!
//! Implements the `DeploymentRepository` port. Persistent networks keep
//! one JSON file per contract under `deployments/<network>/`; the
//! ephemeral `hardhat` network keeps records in memory, since its chain
//! disappears with the process.

pub mod deployments;
pub mod memory;

pub use deployments::JsonDeploymentStore;
pub use memory::MemoryDeploymentStore;
