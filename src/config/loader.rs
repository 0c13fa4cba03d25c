//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig = toml::from_str(content)
    .with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;

  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - At least one network, including the default one
/// - Non-zero chain IDs
/// - Private-key networks that know where their RPC endpoint is
/// - Distinct named-account indices
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    !config.networks.is_empty(),
    "At least one network must be configured"
  );

  anyhow::ensure!(
    config.networks.contains_key(&config.project.default_network),
    "default_network '{}' is not a configured network",
    config.project.default_network
  );

  for (name, network) in &config.networks {
    anyhow::ensure!(
      network.chain_id > 0,
      "Network {} has chain_id 0",
      name
    );
    anyhow::ensure!(
      network.url.is_none() || network.url_env.is_none(),
      "Network {} sets both url and url_env",
      name
    );
    if network.accounts == super::AccountSource::PrivateKey {
      anyhow::ensure!(
        !network.is_ephemeral(),
        "Network {} uses private_key accounts but has no url or url_env",
        name
      );
    }
  }

  anyhow::ensure!(
    config.named_accounts.deployer != config.named_accounts.user,
    "Named accounts deployer and user must use different signer indices"
  );

  if config.gas_reporter.enabled {
    anyhow::ensure!(
      !config.gas_reporter.output_file.is_empty(),
      "gas_reporter.output_file must not be empty"
    );
  }

  Ok(())
}
