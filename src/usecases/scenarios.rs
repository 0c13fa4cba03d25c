//! Scenario Checks - FundMe Behaviour Against a Live Deployment
//!
//! Each check drives a deployed FundMe through the ports and reports a
//! typed [`ScenarioError`] on the first mismatch. The unit checks expect
//! a fresh deployment per check (the runtime builds one); the staging
//! check runs against whatever is recorded on a live network.

use std::fmt;
use std::sync::Arc;

use alloy::primitives::utils::parse_ether;
use alloy::primitives::{Address, U256};
use tracing::{error, info, instrument};

use crate::domain::contracts::{FUND_TOO_SMALL_MESSAGE, NOT_OWNER_ERROR, RevertReason};
use crate::domain::deployment::TxOptions;
use crate::ports::chain_client::{ChainClient, ChainError};
use crate::ports::fund_me::FundMeContract;

/// Value sent by the unit checks (1 ETH).
pub const SEND_VALUE_ETH: &str = "1";
/// Value sent by the staging check.
pub const STAGING_SEND_VALUE_ETH: &str = "0.001";
/// Gas limit for the staging withdrawal.
pub const STAGING_WITHDRAW_GAS_LIMIT: u64 = 100_000;
/// Signer indices funding in the multi-funder check.
pub const EXTRA_FUNDERS: std::ops::RangeInclusive<usize> = 1..=5;

/// A failed scenario check.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("{check}: expected {expected}, got {actual}")]
    Assertion {
        check: &'static str,
        expected: String,
        actual: String,
    },
    #[error("{check}: expected the call to revert ({expected}), but it succeeded")]
    ExpectedRevert {
        check: &'static str,
        expected: String,
    },
    #[error("{check}: expected {expected}, but {actual}")]
    WrongRevert {
        check: &'static str,
        expected: String,
        actual: RevertReason,
    },
    #[error("{check}: {source}")]
    Chain {
        check: &'static str,
        #[source]
        source: ChainError,
    },
    #[error("{check}: {reason}")]
    Setup { check: &'static str, reason: String },
}

fn ensure_eq<T: PartialEq + fmt::Display>(
    check: &'static str,
    expected: T,
    actual: T,
) -> Result<(), ScenarioError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ScenarioError::Assertion {
            check,
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }
}

/// Require that `result` is a revert accepted by `matches`.
fn expect_revert<T>(
    check: &'static str,
    result: Result<T, ChainError>,
    expected: &str,
    matches: impl Fn(&RevertReason) -> bool,
) -> Result<(), ScenarioError> {
    match result {
        Ok(_) => Err(ScenarioError::ExpectedRevert {
            check,
            expected: expected.to_string(),
        }),
        Err(ChainError::Reverted(reason)) if matches(&reason) => Ok(()),
        Err(ChainError::Reverted(reason)) => Err(ScenarioError::WrongRevert {
            check,
            expected: expected.to_string(),
            actual: reason,
        }),
        Err(source) => Err(ScenarioError::Chain { check, source }),
    }
}

trait CheckContext<T> {
    fn during(self, check: &'static str) -> Result<T, ScenarioError>;
}

impl<T> CheckContext<T> for Result<T, ChainError> {
    fn during(self, check: &'static str) -> Result<T, ScenarioError> {
        self.map_err(|source| ScenarioError::Chain { check, source })
    }
}

fn ether(amount: &str) -> U256 {
    // Only called with the constants above.
    parse_ether(amount).unwrap_or_default()
}

/// A deployed FundMe plus the accounts driving it.
#[derive(Clone)]
pub struct FundMeFixture {
    pub chain: Arc<dyn ChainClient>,
    pub fund_me: Arc<dyn FundMeContract>,
    /// Price feed FundMe was constructed with (the mock on dev chains).
    pub price_feed: Address,
    /// Owner of the contract.
    pub deployer: Address,
    /// Every available signer, deployer included.
    pub accounts: Vec<Address>,
}

impl FundMeFixture {
    fn signer(&self, check: &'static str, index: usize) -> Result<Address, ScenarioError> {
        self.accounts.get(index).copied().ok_or_else(|| ScenarioError::Setup {
            check,
            reason: format!("needs signer #{index}, only {} available", self.accounts.len()),
        })
    }

    async fn balances(&self, check: &'static str) -> Result<(U256, U256), ScenarioError> {
        let contract = self.chain.balance_of(self.fund_me.address()).await.during(check)?;
        let owner = self.chain.balance_of(self.deployer).await.during(check)?;
        Ok((contract, owner))
    }
}

/// Checks run against a fresh development deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitCheck {
    ConstructorSetsPriceFeed,
    FundRequiresMinimum,
    FundRecordsAmount,
    FundAppendsFunder,
    WithdrawSingleFunder,
    WithdrawMultipleFunders,
    OnlyOwnerWithdraws,
}

impl UnitCheck {
    pub const ALL: [UnitCheck; 7] = [
        Self::ConstructorSetsPriceFeed,
        Self::FundRequiresMinimum,
        Self::FundRecordsAmount,
        Self::FundAppendsFunder,
        Self::WithdrawSingleFunder,
        Self::WithdrawMultipleFunders,
        Self::OnlyOwnerWithdraws,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::ConstructorSetsPriceFeed => "constructor sets the aggregator address",
            Self::FundRequiresMinimum => "fund fails without enough ETH",
            Self::FundRecordsAmount => "fund updates the amount funded",
            Self::FundAppendsFunder => "fund adds the funder to the funders list",
            Self::WithdrawSingleFunder => "withdraw from a single funder",
            Self::WithdrawMultipleFunders => "withdraw with multiple funders",
            Self::OnlyOwnerWithdraws => "only the owner can withdraw",
        }
    }

    pub async fn run(self, fixture: &FundMeFixture) -> Result<(), ScenarioError> {
        match self {
            Self::ConstructorSetsPriceFeed => constructor_sets_price_feed(fixture).await,
            Self::FundRequiresMinimum => fund_requires_minimum(fixture).await,
            Self::FundRecordsAmount => fund_records_amount(fixture).await,
            Self::FundAppendsFunder => fund_appends_funder(fixture).await,
            Self::WithdrawSingleFunder => withdraw_single_funder(fixture).await,
            Self::WithdrawMultipleFunders => withdraw_multiple_funders(fixture).await,
            Self::OnlyOwnerWithdraws => only_owner_withdraws(fixture).await,
        }
    }
}

impl fmt::Display for UnitCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub async fn constructor_sets_price_feed(fx: &FundMeFixture) -> Result<(), ScenarioError> {
    const CHECK: &str = "constructor";
    let feed = fx.fund_me.price_feed().await.during(CHECK)?;
    ensure_eq(CHECK, fx.price_feed, feed)
}

pub async fn fund_requires_minimum(fx: &FundMeFixture) -> Result<(), ScenarioError> {
    const CHECK: &str = "fund minimum";
    let result = fx.fund_me.fund(&TxOptions::sender(fx.deployer)).await;
    expect_revert(
        CHECK,
        result,
        &RevertReason::Message(FUND_TOO_SMALL_MESSAGE.to_string()).to_string(),
        |reason| matches!(reason, RevertReason::Message(msg) if msg == FUND_TOO_SMALL_MESSAGE),
    )
}

pub async fn fund_records_amount(fx: &FundMeFixture) -> Result<(), ScenarioError> {
    const CHECK: &str = "fund amount";
    let value = ether(SEND_VALUE_ETH);
    fx.fund_me
        .fund(&TxOptions::sender(fx.deployer).with_value(value))
        .await
        .during(CHECK)?;

    let funded = fx.fund_me.amount_funded(fx.deployer).await.during(CHECK)?;
    ensure_eq(CHECK, value, funded)
}

pub async fn fund_appends_funder(fx: &FundMeFixture) -> Result<(), ScenarioError> {
    const CHECK: &str = "fund funders";
    fx.fund_me
        .fund(&TxOptions::sender(fx.deployer).with_value(ether(SEND_VALUE_ETH)))
        .await
        .during(CHECK)?;

    let funder = fx.fund_me.funder(U256::ZERO).await.during(CHECK)?;
    ensure_eq(CHECK, fx.deployer, funder)
}

pub async fn withdraw_single_funder(fx: &FundMeFixture) -> Result<(), ScenarioError> {
    const CHECK: &str = "withdraw single funder";
    fx.fund_me
        .fund(&TxOptions::sender(fx.deployer).with_value(ether(SEND_VALUE_ETH)))
        .await
        .during(CHECK)?;

    owner_withdraw_settles(CHECK, fx).await
}

pub async fn withdraw_multiple_funders(fx: &FundMeFixture) -> Result<(), ScenarioError> {
    const CHECK: &str = "withdraw multiple funders";
    let value = ether(SEND_VALUE_ETH);
    fx.fund_me
        .fund(&TxOptions::sender(fx.deployer).with_value(value))
        .await
        .during(CHECK)?;

    let mut funders = Vec::new();
    for index in EXTRA_FUNDERS {
        let funder = fx.signer(CHECK, index)?;
        fx.fund_me
            .fund(&TxOptions::sender(funder).with_value(value))
            .await
            .during(CHECK)?;
        funders.push(funder);
    }

    owner_withdraw_settles(CHECK, fx).await?;

    expect_revert(
        CHECK,
        fx.fund_me.funder(U256::ZERO).await,
        "getFunder(0) to revert on the empty list",
        |_| true,
    )?;

    for funder in funders {
        let amount = fx.fund_me.amount_funded(funder).await.during(CHECK)?;
        ensure_eq(CHECK, U256::ZERO, amount)?;
    }
    Ok(())
}

/// Withdraw as owner; the contract empties into the owner net of gas.
async fn owner_withdraw_settles(check: &'static str, fx: &FundMeFixture) -> Result<(), ScenarioError> {
    let (start_contract, start_owner) = fx.balances(check).await?;

    let outcome = fx
        .fund_me
        .withdraw(&TxOptions::sender(fx.deployer))
        .await
        .during(check)?;

    let (end_contract, end_owner) = fx.balances(check).await?;

    ensure_eq(check, U256::ZERO, end_contract)?;
    ensure_eq(
        check,
        start_contract + start_owner,
        end_owner + outcome.gas_cost(),
    )
}

pub async fn only_owner_withdraws(fx: &FundMeFixture) -> Result<(), ScenarioError> {
    const CHECK: &str = "only owner";
    fx.fund_me
        .fund(&TxOptions::sender(fx.deployer).with_value(ether(SEND_VALUE_ETH)))
        .await
        .during(CHECK)?;

    let attacker = fx.signer(CHECK, 1)?;
    let result = fx.fund_me.withdraw(&TxOptions::sender(attacker)).await;
    expect_revert(
        CHECK,
        result,
        &RevertReason::CustomError(NOT_OWNER_ERROR.to_string()).to_string(),
        |reason| matches!(reason, RevertReason::CustomError(name) if name == NOT_OWNER_ERROR),
    )
}

/// Fund a small amount, withdraw with a fixed gas limit, expect an empty contract.
#[instrument(skip(fx), fields(fund_me = %fx.fund_me.address()))]
pub async fn staging_fund_and_withdraw(fx: &FundMeFixture) -> Result<(), ScenarioError> {
    const CHECK: &str = "staging fund and withdraw";

    fx.fund_me
        .fund(&TxOptions::sender(fx.deployer).with_value(ether(STAGING_SEND_VALUE_ETH)))
        .await
        .during(CHECK)?;

    fx.fund_me
        .withdraw(&TxOptions::sender(fx.deployer).with_gas_limit(STAGING_WITHDRAW_GAS_LIMIT))
        .await
        .during(CHECK)?;

    let balance = fx.chain.balance_of(fx.fund_me.address()).await.during(CHECK)?;
    ensure_eq(CHECK, U256::ZERO, balance)
}

/// Outcome of a suite run.
#[derive(Debug, Default)]
pub struct SuiteReport {
    pub passed: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl SuiteReport {
    pub fn record(&mut self, name: &str, result: Result<(), ScenarioError>) {
        match result {
            Ok(()) => {
                info!("  ✔ {name}");
                self.passed.push(name.to_string());
            }
            Err(e) => {
                error!("  ✘ {name}: {e}");
                self.failed.push((name.to_string(), e.to_string()));
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn summary(&self) -> String {
        format!("{} passing, {} failing", self.passed.len(), self.failed.len())
    }
}
