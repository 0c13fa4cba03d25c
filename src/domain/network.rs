//! Network Configuration Table - Per-chain Deployment Parameters
//!
//! Static mapping from chain ID to price-feed address and confirmation
//! count, plus the set of network names treated as local development
//! chains. Resolution is permissive: unknown chains fall back to the
//! defaults instead of failing.

use alloy::primitives::{Address, address};

/// Network names that are local, ephemeral development chains.
pub const DEVELOPMENT_CHAINS: [&str; 2] = ["localhost", "hardhat"];

/// Decimals the mock price feed reports.
pub const DECIMALS: u8 = 8;

/// Initial ETH/USD answer of the mock price feed (2000.00000000).
pub const INITIAL_ANSWER: i64 = 200_000_000_000;

/// Price feed used on live chains that have no configured feed.
pub const FALLBACK_PRICE_FEED: Address = address!("8A753747A1Fa494EC906cE90E9f37563A8AF630e");

/// Confirmations waited for when a chain does not configure any.
pub const DEFAULT_BLOCK_CONFIRMATIONS: u64 = 1;

/// Per-chain deployment parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainConfigEntry {
    /// Display name of the chain.
    pub name: Option<&'static str>,
    /// Chainlink ETH/USD aggregator on this chain.
    pub eth_usd_price_feed: Option<Address>,
    /// Confirmations to wait for after each deployment.
    pub block_confirmations: Option<u64>,
}

/// Look up the table entry for a chain ID.
///
/// Unknown chains yield an empty entry, never an error.
pub fn network_config(chain_id: u64) -> ChainConfigEntry {
    match chain_id {
        31337 => ChainConfigEntry::default(),
        4 => ChainConfigEntry {
            name: Some("rinkeby"),
            eth_usd_price_feed: Some(FALLBACK_PRICE_FEED),
            block_confirmations: Some(6),
        },
        _ => ChainConfigEntry::default(),
    }
}

/// Whether `network` names a local development chain.
pub fn is_development_chain(network: &str) -> bool {
    DEVELOPMENT_CHAINS.contains(&network)
}

/// Where the resolved price feed came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceFeedSource {
    /// Freshly deployed mock aggregator.
    Mock,
    /// Address configured for the chain.
    Configured,
    /// Hard-coded fallback constant.
    Fallback,
}

/// Resolved parameters for deploying FundMe on one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeploymentParams {
    pub price_feed: Address,
    pub source: PriceFeedSource,
    pub block_confirmations: u64,
}

/// Errors raised while resolving deployment parameters.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResolveError {
    /// A development network was targeted before the mock was deployed.
    #[error("no MockV3Aggregator deployment found on development network {0}")]
    MissingMock(String),
}

impl DeploymentParams {
    /// Resolve price feed and confirmations for `network` / `chain_id`.
    ///
    /// `mock` is the address of the deployed mock aggregator, if any. It
    /// is only consulted on development networks.
    pub fn resolve(
        network: &str,
        chain_id: u64,
        mock: Option<Address>,
    ) -> Result<Self, ResolveError> {
        let entry = network_config(chain_id);

        if is_development_chain(network) {
            let price_feed = mock.ok_or_else(|| ResolveError::MissingMock(network.to_string()))?;
            return Ok(Self {
                price_feed,
                source: PriceFeedSource::Mock,
                block_confirmations: DEFAULT_BLOCK_CONFIRMATIONS,
            });
        }

        let (price_feed, source) = match entry.eth_usd_price_feed {
            Some(feed) => (feed, PriceFeedSource::Configured),
            None => (FALLBACK_PRICE_FEED, PriceFeedSource::Fallback),
        };

        Ok(Self {
            price_feed,
            source,
            block_confirmations: entry
                .block_confirmations
                .unwrap_or(DEFAULT_BLOCK_CONFIRMATIONS),
        })
    }
}

/// Confirmations to wait for on `chain_id`, regardless of network kind.
pub fn block_confirmations(chain_id: u64) -> u64 {
    network_config(chain_id)
        .block_confirmations
        .unwrap_or(DEFAULT_BLOCK_CONFIRMATIONS)
}
