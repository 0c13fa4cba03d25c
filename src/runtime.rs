//! Runtime - Adapter Wiring per Network
//!
//! Turns a validated [`AppConfig`] plus environment secrets into
//! connected sessions: a provider for the selected network, the chain
//! client, the deployment store and (on live networks with an explorer
//! key) the verifier. The CLI commands are thin calls into this type.
//!
//! Wiring sequence for a session:
//! 1. Connect the provider (spawning Anvil for the `hardhat` network)
//! 2. Create the chain client over the artifact store
//! 3. Open the deployment store (files, or memory for `hardhat`)
//! 4. Create the Etherscan verifier when a key and endpoint exist

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::adapters::artifacts::ArtifactStore;
use crate::adapters::chain::{AlloyChainClient, NetworkProvider};
use crate::adapters::etherscan::{EtherscanConfig, EtherscanVerifier};
use crate::adapters::gas_reporter::{GasRecorder, write_report};
use crate::adapters::persistence::{JsonDeploymentStore, MemoryDeploymentStore};
use crate::config::{AppConfig, NetworkConfig, Secrets};
use crate::domain::contracts::FUND_ME;
use crate::domain::deployment::{NamedAccount, TxOutcome};
use crate::ports::chain_client::ChainClient;
use crate::ports::repository::DeploymentRepository;
use crate::ports::verifier::SourceVerifier;
use crate::usecases::context::DeployContext;
use crate::usecases::interact;
use crate::usecases::pipeline::{DeployTag, PipelineReport, run_pipeline};
use crate::usecases::scenarios::{FundMeFixture, SuiteReport, UnitCheck, staging_fund_and_withdraw};

/// A connected network: the context use cases run against. The chain
/// client inside owns the node connection (and the Anvil process).
pub struct Session {
    pub ctx: DeployContext,
}

/// Configuration, secrets and the selected network for one CLI run.
pub struct Runtime {
    config: AppConfig,
    secrets: Secrets,
    network_name: String,
    network: NetworkConfig,
    gas: Option<Arc<GasRecorder>>,
}

impl Runtime {
    /// Select `network` (or the configured default).
    pub fn new(config: AppConfig, secrets: Secrets, network: Option<String>) -> Result<Self> {
        let network_name = network.unwrap_or_else(|| config.project.default_network.clone());
        let network = config.network(&network_name)?.clone();
        let gas = config
            .gas_reporter
            .enabled
            .then(|| Arc::new(GasRecorder::new()));

        Ok(Self {
            config,
            secrets,
            network_name,
            network,
            gas,
        })
    }

    pub fn network_name(&self) -> &str {
        &self.network_name
    }

    pub fn is_development(&self) -> bool {
        crate::domain::network::is_development_chain(&self.network_name)
    }

    /// Connect to the selected network and wire the adapters.
    #[instrument(skip(self), fields(network = %self.network_name))]
    pub async fn connect(&self) -> Result<Session> {
        let provider = Arc::new(
            NetworkProvider::connect(&self.network_name, &self.network, &self.secrets).await?,
        );

        let artifacts = ArtifactStore::new(&self.config.paths.artifacts);
        let chain: Arc<dyn ChainClient> = Arc::new(AlloyChainClient::new(
            Arc::clone(&provider),
            artifacts.clone(),
            self.gas.clone(),
        ));

        let deployments: Arc<dyn DeploymentRepository> = if self.network.is_ephemeral() {
            Arc::new(MemoryDeploymentStore::new())
        } else {
            Arc::new(
                JsonDeploymentStore::open(
                    &self.config.paths.deployments,
                    &self.network_name,
                    provider.chain_id(),
                )
                .await?,
            )
        };

        let verifier = self.verifier(artifacts)?;

        let ctx = DeployContext {
            network: self.network_name.clone(),
            chain,
            deployments,
            verifier,
            named_accounts: self.config.named_accounts,
        };
        ctx.ensure_healthy().await?;

        Ok(Session { ctx })
    }

    fn verifier(&self, artifacts: ArtifactStore) -> Result<Option<Arc<dyn SourceVerifier>>> {
        let Some(api_key) = self.secrets.etherscan_api_key.as_deref() else {
            return Ok(None);
        };
        let Some(api_url) = self.network.verify_url.as_deref() else {
            debug!("ETHERSCAN_API_KEY set but network has no verify_url");
            return Ok(None);
        };

        let verifier = EtherscanVerifier::new(artifacts, EtherscanConfig::new(api_url, api_key))
            .context("Failed to create Etherscan verifier")?;
        Ok(Some(Arc::new(verifier)))
    }

    /// Run the deploy pipeline for `tags`.
    pub async fn deploy(&self, tags: &[DeployTag]) -> Result<PipelineReport> {
        let session = self.connect().await?;
        run_pipeline(&session.ctx, tags).await
    }

    /// Fund the recorded FundMe with 1 ETH from the deployer.
    pub async fn fund(&self) -> Result<TxOutcome> {
        let session = self.session_with_deployments().await?;
        interact::fund(&session.ctx).await
    }

    /// Withdraw the recorded FundMe's balance to the deployer.
    pub async fn withdraw(&self) -> Result<TxOutcome> {
        let session = self.session_with_deployments().await?;
        interact::withdraw(&session.ctx).await
    }

    /// A session whose store holds a FundMe. A freshly spawned chain
    /// has none, so the `all` pipeline runs first there.
    async fn session_with_deployments(&self) -> Result<Session> {
        let session = self.connect().await?;
        if self.network.is_ephemeral() {
            run_pipeline(&session.ctx, &[DeployTag::All]).await?;
        }
        Ok(session)
    }

    /// A freshly deployed FundMe and its mock on a development network.
    ///
    /// Every call yields an independent deployment: `hardhat` spawns a
    /// new Anvil, `localhost` redeploys on the running node.
    pub async fn unit_fixture(&self) -> Result<(Session, FundMeFixture)> {
        let session = self.connect().await?;
        let report = run_pipeline(&session.ctx, &[DeployTag::All]).await?;

        let mock = report.mock.context("Fixture deployed no price feed mock")?;
        let fund_me = report.fund_me.context("Fixture deployed no FundMe")?;

        let fixture = FundMeFixture {
            chain: Arc::clone(&session.ctx.chain),
            fund_me: session.ctx.chain.fund_me(fund_me.address),
            price_feed: mock.address,
            deployer: session.ctx.account(NamedAccount::Deployer)?,
            accounts: session.ctx.chain.accounts(),
        };
        Ok((session, fixture))
    }

    /// The recorded FundMe on a live network.
    pub async fn staging_fixture(&self) -> Result<(Session, FundMeFixture)> {
        let session = self.connect().await?;
        let record = session.ctx.deployment(FUND_ME).await?;
        let fund_me = session.ctx.chain.fund_me(record.address);
        let price_feed = fund_me.price_feed().await?;

        let fixture = FundMeFixture {
            chain: Arc::clone(&session.ctx.chain),
            fund_me,
            price_feed,
            deployer: session.ctx.account(NamedAccount::Deployer)?,
            accounts: session.ctx.chain.accounts(),
        };
        Ok((session, fixture))
    }

    /// Run the unit suite on development networks, the staging suite elsewhere.
    #[instrument(skip(self), fields(network = %self.network_name))]
    pub async fn run_tests(&self) -> Result<SuiteReport> {
        let mut report = SuiteReport::default();

        if self.is_development() {
            info!("FundMe");
            for check in UnitCheck::ALL {
                // Fresh deployment per check.
                let (_session, fixture) = self
                    .unit_fixture()
                    .await
                    .with_context(|| format!("Fixture for '{check}' failed"))?;
                report.record(check.name(), check.run(&fixture).await);
            }
        } else {
            info!("FundMe Staging Tests");
            let (_session, fixture) = self.staging_fixture().await?;
            report.record(
                "allows people to fund and withdraw",
                staging_fund_and_withdraw(&fixture).await,
            );
        }

        info!("{}", report.summary());
        Ok(report)
    }

    /// Write the gas report if anything was recorded. Failures are logged.
    pub async fn finish(&self) {
        let Some(gas) = &self.gas else {
            return;
        };
        if let Err(e) = write_report(&self.config.gas_reporter, &self.secrets, gas).await {
            warn!("Gas report failed: {e:#}");
        }
    }
}
