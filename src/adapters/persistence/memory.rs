//! In-memory deployment records for the ephemeral `hardhat` network.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::deployment::DeploymentRecord;
use crate::ports::repository::DeploymentRepository;

#[derive(Debug, Default)]
pub struct MemoryDeploymentStore {
    records: RwLock<BTreeMap<String, DeploymentRecord>>,
}

impl MemoryDeploymentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeploymentRepository for MemoryDeploymentStore {
    async fn save(&self, record: &DeploymentRecord) -> Result<()> {
        self.records
            .write()
            .await
            .insert(record.contract_name.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, contract: &str) -> Result<Option<DeploymentRecord>> {
        Ok(self.records.read().await.get(contract).cloned())
    }
}
