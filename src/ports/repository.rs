//! Repository Port - Deployment Bookkeeping Interface
//!
//! Stores one [`DeploymentRecord`] per contract name for a network so
//! later runs can find what an earlier deploy produced.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::deployment::DeploymentRecord;

#[async_trait]
pub trait DeploymentRepository: Send + Sync + 'static {
    /// Save (or replace) the record for `record.contract_name`.
    async fn save(&self, record: &DeploymentRecord) -> Result<()>;

    /// Load the record for `contract`, if one exists.
    async fn get(&self, contract: &str) -> Result<Option<DeploymentRecord>>;
}
