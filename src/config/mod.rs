//! Configuration Module - TOML-based Project Configuration
//!
//! Loads and validates configuration from `config.toml` with secrets
//! taken from the environment (optionally populated from a `.env`
//! file). Network endpoints, artifact locations and gas-report
//! settings live here; the per-chain deployment table does not (see
//! `domain::network`).

pub mod loader;

use std::collections::BTreeMap;

use serde::Deserialize;

/// Top-level project configuration.
///
/// Loaded from `config.toml` at startup and validated before any
/// network is touched.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Project identity and logging.
  pub project: ProjectConfig,
  /// Artifact and deployment directories.
  #[serde(default)]
  pub paths: PathsConfig,
  /// Role → signer index mapping.
  #[serde(default)]
  pub named_accounts: NamedAccountsConfig,
  /// Networks by name (`hardhat`, `localhost`, `rinkeby`, ...).
  pub networks: BTreeMap<String, NetworkConfig>,
  /// Gas reporter settings.
  #[serde(default)]
  pub gas_reporter: GasReporterConfig,
}

impl AppConfig {
  /// Look up a network by name.
  pub fn network(&self, name: &str) -> anyhow::Result<&NetworkConfig> {
    self
      .networks
      .get(name)
      .ok_or_else(|| anyhow::anyhow!("Unknown network '{name}' (not in config.toml)"))
  }
}

/// Project identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
  /// Human-readable project name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Network used when `--network` is not given.
  #[serde(default = "default_network")]
  pub default_network: String,
  /// Emit JSON log lines instead of plain text.
  #[serde(default)]
  pub json_logs: bool,
}

/// Filesystem locations.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
  /// Compiled contract artifacts (Hardhat `artifacts/` or Foundry `out/`).
  #[serde(default = "default_artifacts_dir")]
  pub artifacts: String,
  /// Deployment records, one sub-directory per network.
  #[serde(default = "default_deployments_dir")]
  pub deployments: String,
}

impl Default for PathsConfig {
  fn default() -> Self {
    Self {
      artifacts: default_artifacts_dir(),
      deployments: default_deployments_dir(),
    }
  }
}

/// Signer indices of the named accounts.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct NamedAccountsConfig {
  #[serde(default)]
  pub deployer: usize,
  #[serde(default = "default_user_index")]
  pub user: usize,
}

impl Default for NamedAccountsConfig {
  fn default() -> Self {
    Self {
      deployer: 0,
      user: default_user_index(),
    }
  }
}

/// Where a network's signing keys come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountSource {
  /// The well-known development mnemonic shared by Anvil and Hardhat.
  #[default]
  DevMnemonic,
  /// A single key from the `PRIVATE_KEY` environment variable.
  PrivateKey,
}

/// A single network definition.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
  /// Expected chain ID.
  pub chain_id: u64,
  /// RPC endpoint. Absent for the in-process `hardhat` network,
  /// which spawns a local Anvil instead.
  pub url: Option<String>,
  /// Environment variable holding the RPC endpoint (e.g. `RPC_URL`).
  pub url_env: Option<String>,
  /// Signing key source.
  #[serde(default)]
  pub accounts: AccountSource,
  /// Block explorer verification API (Etherscan-compatible).
  pub verify_url: Option<String>,
}

impl NetworkConfig {
  /// RPC endpoint, reading `url_env` when `url` is not set.
  pub fn rpc_url(&self) -> Option<String> {
    self.url.clone().or_else(|| {
      self
        .url_env
        .as_deref()
        .and_then(|var| std::env::var(var).ok())
        .filter(|url| !url.is_empty())
    })
  }

  /// Whether this network is served by a spawned Anvil.
  pub fn is_ephemeral(&self) -> bool {
    self.url.is_none() && self.url_env.is_none()
  }
}

/// Gas reporter configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GasReporterConfig {
  /// Record gas and write the report.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Report file path.
  #[serde(default = "default_gas_report_file")]
  pub output_file: String,
  /// Fiat currency for costs.
  #[serde(default = "default_currency")]
  pub currency: String,
  /// Native token symbol priced in `currency`.
  #[serde(default = "default_token")]
  pub token: String,
  /// Price API endpoint (CoinMarketCap compatible).
  #[serde(default = "default_price_api")]
  pub price_api_url: String,
}

impl Default for GasReporterConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      output_file: default_gas_report_file(),
      currency: default_currency(),
      token: default_token(),
      price_api_url: default_price_api(),
    }
  }
}

/// Secrets read from the environment.
///
/// Never written to config.toml and never logged.
#[derive(Clone, Default)]
pub struct Secrets {
  /// Hex private key for live networks (`PRIVATE_KEY`).
  pub private_key: Option<String>,
  /// Etherscan API key (`ETHERSCAN_API_KEY`).
  pub etherscan_api_key: Option<String>,
  /// CoinMarketCap API key (`COINMARKETCAP_API_KEY`).
  pub coinmarketcap_api_key: Option<String>,
}

impl Secrets {
  /// Read secrets from the process environment. Empty values count as unset.
  pub fn from_env() -> Self {
    let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
    Self {
      private_key: var("PRIVATE_KEY"),
      etherscan_api_key: var("ETHERSCAN_API_KEY"),
      coinmarketcap_api_key: var("COINMARKETCAP_API_KEY"),
    }
  }
}

impl std::fmt::Debug for Secrets {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Secrets")
      .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
      .field("etherscan_api_key", &self.etherscan_api_key.is_some())
      .field("coinmarketcap_api_key", &self.coinmarketcap_api_key.is_some())
      .finish()
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_network() -> String {
  "hardhat".to_string()
}

fn default_true() -> bool {
  true
}

fn default_user_index() -> usize {
  1
}

fn default_artifacts_dir() -> String {
  "artifacts".to_string()
}

fn default_deployments_dir() -> String {
  "deployments".to_string()
}

fn default_gas_report_file() -> String {
  "gas-report.txt".to_string()
}

fn default_currency() -> String {
  "USD".to_string()
}

fn default_token() -> String {
  "ETH".to_string()
}

fn default_price_api() -> String {
  "https://pro-api.coinmarketcap.com/v1/cryptocurrency/quotes/latest".to_string()
}
