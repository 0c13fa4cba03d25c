//! Gas Report - Per-method Gas Usage Aggregation
//!
//! Aggregates gas used by contract calls and deployments and renders a
//! plain-text table, optionally priced in a fiat currency. The output
//! mirrors what `gas-report.txt` holds after a test run.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Min / max / total gas over a series of calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasStats {
    pub min: u64,
    pub max: u64,
    pub total: u128,
    pub calls: u64,
}

impl GasStats {
    fn new(gas_used: u64) -> Self {
        Self {
            min: gas_used,
            max: gas_used,
            total: u128::from(gas_used),
            calls: 1,
        }
    }

    fn add(&mut self, gas_used: u64) {
        self.min = self.min.min(gas_used);
        self.max = self.max.max(gas_used);
        self.total += u128::from(gas_used);
        self.calls += 1;
    }

    /// Average gas per call, rounded down.
    pub fn avg(&self) -> u64 {
        u64::try_from(self.total / u128::from(self.calls.max(1))).unwrap_or(u64::MAX)
    }
}

/// Prices used to convert gas into fiat.
#[derive(Debug, Clone, PartialEq)]
pub struct GasPricing {
    /// Gas price in gwei.
    pub gas_price_gwei: Decimal,
    /// Price of one native token in `currency`, when known.
    pub token_price: Option<Decimal>,
    /// Fiat currency code, e.g. `USD`.
    pub currency: String,
    /// Native token symbol, e.g. `ETH`.
    pub token: String,
}

impl GasPricing {
    /// Fiat cost of `gas` units, if a token price is known.
    pub fn cost(&self, gas: u64) -> Option<Decimal> {
        let price = self.token_price?;
        let native = Decimal::from(gas) * self.gas_price_gwei * dec!(0.000000001);
        Some((native * price).round_dp(2))
    }
}

/// Gas usage collected over a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GasReport {
    methods: BTreeMap<(String, String), GasStats>,
    deployments: BTreeMap<String, GasStats>,
}

impl GasReport {
    pub fn record_call(&mut self, contract: &str, method: &str, gas_used: u64) {
        self.methods
            .entry((contract.to_string(), method.to_string()))
            .and_modify(|s| s.add(gas_used))
            .or_insert_with(|| GasStats::new(gas_used));
    }

    pub fn record_deployment(&mut self, contract: &str, gas_used: u64) {
        self.deployments
            .entry(contract.to_string())
            .and_modify(|s| s.add(gas_used))
            .or_insert_with(|| GasStats::new(gas_used));
    }

    pub fn method(&self, contract: &str, method: &str) -> Option<&GasStats> {
        self.methods.get(&(contract.to_string(), method.to_string()))
    }

    pub fn deployment(&self, contract: &str) -> Option<&GasStats> {
        self.deployments.get(contract)
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty() && self.deployments.is_empty()
    }

    /// Render the report as a plain-text table.
    pub fn render(&self, pricing: &GasPricing) -> String {
        let mut out = String::new();
        let cost_header = format!("{} (avg)", pricing.currency);

        let _ = writeln!(
            out,
            "Gas report | gas price: {} gwei | {}: {}",
            pricing.gas_price_gwei,
            pricing.token,
            pricing
                .token_price
                .map(|p| format!("{} {}", p.round_dp(2), pricing.currency))
                .unwrap_or_else(|| "price unavailable".to_string()),
        );
        let _ = writeln!(out, "{}", "-".repeat(96));
        let _ = writeln!(
            out,
            "{:<20} {:<24} {:>10} {:>10} {:>10} {:>8} {:>10}",
            "Contract", "Method", "Min", "Max", "Avg", "# calls", cost_header
        );
        let _ = writeln!(out, "{}", "-".repeat(96));

        for ((contract, method), stats) in &self.methods {
            let _ = writeln!(
                out,
                "{:<20} {:<24} {:>10} {:>10} {:>10} {:>8} {:>10}",
                contract,
                method,
                stats.min,
                stats.max,
                stats.avg(),
                stats.calls,
                format_cost(pricing.cost(stats.avg())),
            );
        }

        let _ = writeln!(out, "{}", "-".repeat(96));
        let _ = writeln!(out, "Deployments");
        for (contract, stats) in &self.deployments {
            let _ = writeln!(
                out,
                "{:<20} {:<24} {:>10} {:>10} {:>10} {:>8} {:>10}",
                contract,
                "",
                stats.min,
                stats.max,
                stats.avg(),
                stats.calls,
                format_cost(pricing.cost(stats.avg())),
            );
        }
        let _ = writeln!(out, "{}", "-".repeat(96));

        out
    }
}

fn format_cost(cost: Option<Decimal>) -> String {
    cost.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pricing(token_price: Option<Decimal>) -> GasPricing {
        GasPricing {
            gas_price_gwei: dec!(20),
            token_price,
            currency: "USD".into(),
            token: "ETH".into(),
        }
    }

    #[test]
    fn test_stats_aggregate() {
        let mut report = GasReport::default();
        report.record_call("FundMe", "fund", 90_000);
        report.record_call("FundMe", "fund", 70_000);
        report.record_call("FundMe", "fund", 80_000);

        let stats = report.method("FundMe", "fund").unwrap();
        assert_eq!(stats.min, 70_000);
        assert_eq!(stats.max, 90_000);
        assert_eq!(stats.avg(), 80_000);
        assert_eq!(stats.calls, 3);
    }

    #[test]
    fn test_cost_in_fiat() {
        // 100_000 gas * 20 gwei = 0.002 ETH; at 2000 USD = 4.00 USD
        let cost = pricing(Some(dec!(2000))).cost(100_000);
        assert_eq!(cost, Some(dec!(4.00)));
        assert_eq!(pricing(None).cost(100_000), None);
    }

    #[test]
    fn test_render_lists_methods_and_deployments() {
        let mut report = GasReport::default();
        report.record_call("FundMe", "withdraw", 45_000);
        report.record_deployment("FundMe", 850_000);

        let text = report.render(&pricing(None));
        assert!(text.contains("withdraw"));
        assert!(text.contains("850000"));
        assert!(text.contains("price unavailable"));
    }
}
