//! Gas Reporter - Records Gas Usage and Writes `gas-report.txt`
//!
//! Chain adapters feed every confirmed transaction into a shared
//! [`GasRecorder`]. At the end of a run the report is priced (token
//! price from CoinMarketCap when `COINMARKETCAP_API_KEY` is set) and
//! written to the configured output file.

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tracing::{info, instrument, warn};

use crate::config::{GasReporterConfig, Secrets};
use crate::domain::deployment::TxOutcome;
use crate::domain::gas::{GasPricing, GasReport};

/// Thread-safe collector of gas usage for one run.
#[derive(Debug, Default)]
pub struct GasRecorder {
    report: Mutex<GasReport>,
    /// Sum and count of effective gas prices seen, in wei.
    prices: Mutex<(u128, u64)>,
}

impl GasRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a confirmed contract call.
    pub fn record_call(&self, contract: &str, method: &str, outcome: &TxOutcome) {
        self.lock_report().record_call(contract, method, outcome.gas_used);
        self.observe_price(outcome.effective_gas_price);
    }

    /// Record a confirmed deployment.
    pub fn record_deployment(&self, contract: &str, outcome: &TxOutcome) {
        self.lock_report().record_deployment(contract, outcome.gas_used);
        self.observe_price(outcome.effective_gas_price);
    }

    /// Copy of the report collected so far.
    pub fn snapshot(&self) -> GasReport {
        self.lock_report().clone()
    }

    /// Mean effective gas price over recorded transactions, in gwei.
    pub fn average_gas_price_gwei(&self) -> Decimal {
        let (sum, count) = *self.prices.lock().unwrap_or_else(|e| e.into_inner());
        if count == 0 {
            return Decimal::ZERO;
        }
        let avg_wei = Decimal::from_u128(sum / u128::from(count)).unwrap_or(Decimal::MAX);
        (avg_wei / Decimal::from(1_000_000_000u64)).round_dp(4)
    }

    fn observe_price(&self, price_wei: u128) {
        let mut prices = self.prices.lock().unwrap_or_else(|e| e.into_inner());
        prices.0 = prices.0.saturating_add(price_wei);
        prices.1 += 1;
    }

    fn lock_report(&self) -> std::sync::MutexGuard<'_, GasReport> {
        self.report.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Price the recorded gas and write the report file.
///
/// Returns the path written, or `None` when reporting is disabled or
/// nothing was recorded. A failed price lookup only drops the fiat
/// column; it never fails the report.
#[instrument(skip_all)]
pub async fn write_report(
    config: &GasReporterConfig,
    secrets: &Secrets,
    recorder: &GasRecorder,
) -> Result<Option<PathBuf>> {
    if !config.enabled {
        return Ok(None);
    }

    let report = recorder.snapshot();
    if report.is_empty() {
        info!("No transactions recorded, gas report skipped");
        return Ok(None);
    }

    let token_price = match secrets.coinmarketcap_api_key.as_deref() {
        Some(key) => match fetch_token_price(config, key).await {
            Ok(price) => Some(price),
            Err(e) => {
                warn!(error = %e, "Token price lookup failed, reporting gas only");
                None
            }
        },
        None => None,
    };

    let pricing = GasPricing {
        gas_price_gwei: recorder.average_gas_price_gwei(),
        token_price,
        currency: config.currency.clone(),
        token: config.token.clone(),
    };

    let path = PathBuf::from(&config.output_file);
    tokio::fs::write(&path, report.render(&pricing))
        .await
        .with_context(|| format!("Failed to write gas report {}", path.display()))?;

    info!(path = %path.display(), "Gas report written");
    Ok(Some(path))
}

/// Query the token's price in the configured currency.
async fn fetch_token_price(config: &GasReporterConfig, api_key: &str) -> Result<Decimal> {
    let http = Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .context("Failed to build HTTP client")?;

    let body: serde_json::Value = http
        .get(&config.price_api_url)
        .header("X-CMC_PRO_API_KEY", api_key)
        .query(&[("symbol", config.token.as_str()), ("convert", config.currency.as_str())])
        .send()
        .await
        .context("Price request failed")?
        .error_for_status()
        .context("Price API returned an error")?
        .json()
        .await
        .context("Failed to parse price response")?;

    parse_price(&body, &config.token, &config.currency)
}

/// Extract `data.<TOKEN>.quote.<CURRENCY>.price` from a quotes response.
fn parse_price(body: &serde_json::Value, token: &str, currency: &str) -> Result<Decimal> {
    let price = body["data"][token]["quote"][currency]["price"]
        .as_f64()
        .with_context(|| format!("No {token}/{currency} price in response"))?;

    Decimal::try_from(price).context("Price is not a finite number")
}
