//! Deployment Store - Atomic JSON Files per Contract
//!
//! Layout:
//!
//! ```text
//! deployments/
//!   rinkeby/
//!     .chainId          "4"
//!     FundMe.json       DeploymentRecord
//! ```
//!
//! Records are written to a temporary file first and renamed into
//! place, so a crash never leaves a half-written record behind.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info, instrument};

use crate::domain::deployment::DeploymentRecord;
use crate::ports::repository::DeploymentRepository;

/// File-backed deployment records for one network.
pub struct JsonDeploymentStore {
    /// `deployments/<network>`.
    dir: PathBuf,
}

impl JsonDeploymentStore {
    /// Open (creating if needed) the record directory for `network`.
    ///
    /// # Errors
    /// Fails if the directory already holds records for a different
    /// chain ID, which means the network was re-pointed at another chain.
    pub async fn open(root: impl AsRef<Path>, network: &str, chain_id: u64) -> Result<Self> {
        let dir = root.as_ref().join(network);
        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        let chain_file = dir.join(".chainId");
        match fs::read_to_string(&chain_file).await {
            Ok(existing) => {
                let existing = existing.trim();
                if existing != chain_id.to_string() {
                    bail!(
                        "{} holds deployments for chain {existing}, but {network} is chain {chain_id}",
                        dir.display()
                    );
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                fs::write(&chain_file, chain_id.to_string())
                    .await
                    .context("Failed to write .chainId")?;
            }
            Err(e) => return Err(e).context("Failed to read .chainId"),
        }

        Ok(Self { dir })
    }

    fn record_path(&self, contract: &str) -> PathBuf {
        self.dir.join(format!("{contract}.json"))
    }
}

#[async_trait]
impl DeploymentRepository for JsonDeploymentStore {
    #[instrument(skip(self, record), fields(contract = %record.contract_name))]
    async fn save(&self, record: &DeploymentRecord) -> Result<()> {
        let json =
            serde_json::to_string_pretty(record).context("Failed to serialize deployment")?;

        let path = self.record_path(&record.contract_name);
        let tmp_path = path.with_extension("json.tmp");

        fs::write(&tmp_path, &json)
            .await
            .context("Failed to write tmp deployment file")?;

        // Atomic rename
        fs::rename(&tmp_path, &path)
            .await
            .context("Failed to rename deployment file")?;

        info!(path = %path.display(), address = %record.address, "Deployment saved");
        Ok(())
    }

    async fn get(&self, contract: &str) -> Result<Option<DeploymentRecord>> {
        let path = self.record_path(contract);
        let json = match fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(contract, "No deployment recorded");
                return Ok(None);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        let record = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, B256, Bytes};
    use chrono::Utc;

    fn record(name: &str, byte: u8) -> DeploymentRecord {
        DeploymentRecord {
            contract_name: name.to_string(),
            address: Address::repeat_byte(byte),
            transaction_hash: B256::repeat_byte(byte),
            block_number: Some(u64::from(byte)),
            args: Bytes::new(),
            gas_used: 21_000,
            abi: serde_json::json!([]),
            deployed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_get_and_replace() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDeploymentStore::open(dir.path(), "localhost", 31337).await.unwrap();

        assert!(store.get("FundMe").await.unwrap().is_none());

        store.save(&record("FundMe", 1)).await.unwrap();
        store.save(&record("FundMe", 2)).await.unwrap();
        store.save(&record("MockV3Aggregator", 3)).await.unwrap();

        let fund_me = store.get("FundMe").await.unwrap().unwrap();
        assert_eq!(fund_me.address, Address::repeat_byte(2));
        assert!(dir.path().join("localhost/MockV3Aggregator.json").exists());
        assert!(!dir.path().join("localhost/FundMe.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = JsonDeploymentStore::open(dir.path(), "rinkeby", 4).await.unwrap();
            store.save(&record("FundMe", 7)).await.unwrap();
        }

        let store = JsonDeploymentStore::open(dir.path(), "rinkeby", 4).await.unwrap();
        assert_eq!(
            store.get("FundMe").await.unwrap().unwrap().address,
            Address::repeat_byte(7)
        );
    }

    #[tokio::test]
    async fn test_chain_id_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        JsonDeploymentStore::open(dir.path(), "localhost", 31337).await.unwrap();

        let err = JsonDeploymentStore::open(dir.path(), "localhost", 1337)
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("chain 31337"));
    }
}
