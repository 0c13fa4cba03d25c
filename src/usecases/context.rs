//! Deploy Context - What Every Workflow Runs Against
//!
//! Bundles the selected network's name, the chain client, the
//! deployment records and the named-account mapping so each use case
//! takes one argument instead of four.

use std::sync::Arc;

use alloy::primitives::Address;
use anyhow::{Context, Result, ensure};

use crate::config::NamedAccountsConfig;
use crate::domain::deployment::{DeploymentRecord, NamedAccount};
use crate::domain::network::is_development_chain;
use crate::ports::chain_client::ChainClient;
use crate::ports::repository::DeploymentRepository;
use crate::ports::verifier::SourceVerifier;

/// Everything a deploy step, script or scenario needs from the outside.
#[derive(Clone)]
pub struct DeployContext {
    /// Network name from config (`hardhat`, `localhost`, `rinkeby`, ...).
    pub network: String,
    pub chain: Arc<dyn ChainClient>,
    pub deployments: Arc<dyn DeploymentRepository>,
    /// Explorer verifier; `None` when no API key is configured.
    pub verifier: Option<Arc<dyn SourceVerifier>>,
    pub named_accounts: NamedAccountsConfig,
}

impl DeployContext {
    pub fn is_development(&self) -> bool {
        is_development_chain(&self.network)
    }

    /// Fail fast when the node stops answering.
    pub async fn ensure_healthy(&self) -> Result<()> {
        ensure!(
            self.chain.is_healthy().await,
            "Node for {} is not responding",
            self.network
        );
        Ok(())
    }

    /// Address of a named account.
    pub fn account(&self, role: NamedAccount) -> Result<Address> {
        let index = match role {
            NamedAccount::Deployer => self.named_accounts.deployer,
            NamedAccount::User => self.named_accounts.user,
        };
        self.chain
            .accounts()
            .get(index)
            .copied()
            .with_context(|| {
                format!(
                    "Named account {role} is signer #{index}, but {} has only {} signer(s)",
                    self.network,
                    self.chain.accounts().len()
                )
            })
    }

    /// The recorded deployment of `contract`, or an error naming the network.
    pub async fn deployment(&self, contract: &str) -> Result<DeploymentRecord> {
        self.deployments
            .get(contract)
            .await?
            .with_context(|| format!("No deployment found for: {contract} on {}", self.network))
    }
}
