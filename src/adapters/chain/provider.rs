//! Network Provider - alloy-rs 0.9 Connection Management
//!
//! Connects to the selected network via alloy-rs with a wallet holding
//! every named-account signer. The in-process `hardhat` network is an
//! Anvil instance spawned here and killed when the provider is dropped.
//!
//! The provider runs over a boxed transport so the filler stack can be
//! stored as a type-erased `dyn Provider` across the adapter layer.

use std::sync::Arc;

use alloy::network::EthereumWallet;
use alloy::node_bindings::{Anvil, AnvilInstance};
use alloy::primitives::{Address, B256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::client::RpcClient;
use alloy::signers::local::coins_bip39::English;
use alloy::signers::local::{MnemonicBuilder, PrivateKeySigner};
use anyhow::{Context, Result, bail};
use tracing::{info, instrument};

use crate::config::{AccountSource, NetworkConfig, Secrets};

/// Mnemonic Anvil and Hardhat derive their default accounts from.
pub const DEV_MNEMONIC: &str = "test test test test test test test test test test test junk";

/// Number of development accounts derived for non-ephemeral dev nodes.
pub const DEV_ACCOUNT_COUNT: u32 = 10;

/// Shared RPC provider for one network, backed by alloy-rs 0.9.
///
/// All chain adapters share a single provider instance to avoid
/// redundant connections and enable connection pooling.
pub struct NetworkProvider {
    /// The alloy HTTP provider with wallet (type-erased).
    provider: Arc<dyn Provider + Send + Sync>,
    /// Signer addresses, in named-account index order.
    accounts: Vec<Address>,
    /// Chain ID confirmed at connect time.
    chain_id: u64,
    /// Spawned node for the ephemeral network; killed on drop.
    _anvil: Option<AnvilInstance>,
}

impl NetworkProvider {
    /// Connect to `network` and validate its chain ID.
    ///
    /// Ephemeral networks (no `url` / `url_env`) spawn a fresh Anvil
    /// and use its unlocked keys. Others connect over HTTP with keys
    /// from the configured account source.
    #[instrument(skip_all, fields(network = %name))]
    pub async fn connect(name: &str, network: &NetworkConfig, secrets: &Secrets) -> Result<Self> {
        let (url, signers, anvil) = if network.is_ephemeral() {
            let anvil = Anvil::new()
                .chain_id(network.chain_id)
                .try_spawn()
                .context("Failed to spawn anvil (is Foundry installed and on PATH?)")?;

            let signers = anvil
                .keys()
                .iter()
                .map(|key| PrivateKeySigner::from_bytes(&B256::from_slice(&key.to_bytes())))
                .collect::<Result<Vec<_>, _>>()
                .context("Invalid anvil key")?;

            info!(endpoint = %anvil.endpoint(), "Spawned local anvil node");
            (anvil.endpoint_url(), signers, Some(anvil))
        } else {
            let url = network
                .rpc_url()
                .with_context(|| format!("No RPC URL for network {name} (set url or url_env)"))?;
            let url = url.parse().context("Invalid RPC URL")?;

            let signers = match network.accounts {
                AccountSource::DevMnemonic => dev_signers(DEV_ACCOUNT_COUNT)?,
                AccountSource::PrivateKey => {
                    let key = secrets
                        .private_key
                        .as_deref()
                        .context("PRIVATE_KEY not set")?;
                    vec![key.parse::<PrivateKeySigner>().context("Invalid PRIVATE_KEY")?]
                }
            };

            (url, signers, None)
        };

        let accounts: Vec<Address> = signers.iter().map(|s| s.address()).collect();

        let mut signers = signers.into_iter();
        let first = signers.next().context("Network has no signing accounts")?;
        let mut wallet = EthereumWallet::from(first);
        for signer in signers {
            wallet.register_signer(signer);
        }

        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_client(RpcClient::new_http(url).boxed());

        // Wrap in Arc<dyn Provider> for type erasure
        let provider: Arc<dyn Provider + Send + Sync> = Arc::new(provider);

        // Validate chain ID at startup
        let chain_id = provider
            .get_chain_id()
            .await
            .context("Failed to query chain ID")?;

        if chain_id != network.chain_id {
            bail!(
                "Network {name} expects chain_id={}, node reports {chain_id}",
                network.chain_id
            );
        }

        info!(chain_id, accounts = accounts.len(), "Connected to network");

        Ok(Self {
            provider,
            accounts,
            chain_id,
            _anvil: anvil,
        })
    }

    /// Get a shared reference to the alloy provider (type-erased).
    pub fn inner(&self) -> Arc<dyn Provider + Send + Sync> {
        Arc::clone(&self.provider)
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn accounts(&self) -> &[Address] {
        &self.accounts
    }

    /// Check if the RPC connection is healthy via a lightweight call.
    pub async fn is_healthy(&self) -> bool {
        self.provider.get_block_number().await.is_ok()
    }
}

/// Derive the first `count` accounts of the development mnemonic.
fn dev_signers(count: u32) -> Result<Vec<PrivateKeySigner>> {
    (0..count)
        .map(|index| {
            MnemonicBuilder::<English>::default()
                .phrase(DEV_MNEMONIC)
                .index(index)
                .and_then(|builder| builder.build())
                .with_context(|| format!("Failed to derive dev account {index}"))
        })
        .collect()
}
