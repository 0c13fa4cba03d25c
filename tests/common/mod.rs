//! In-memory chain for integration tests.
//!
//! `FakeChain` implements the `ChainClient` port and hands out
//! `FakeFundMe` handles implementing `FundMeContract`. The FundMe model
//! follows the deployed contract: a 50 USD minimum (adjustable with
//! `with_minimum_usd`) priced through the
//! mock feed (2000 USD/ETH), an owner-only withdraw that empties the
//! contract and resets the funder ledger, and out-of-bounds panics on
//! `getFunder`. Reverted calls cost nothing (the node rejects them at
//! estimation); mined calls cost `gas_used * GAS_PRICE`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use alloy::primitives::{Address, B256, I256, U256, keccak256};
use alloy::sol_types::SolValue;
use async_trait::async_trait;
use chrono::Utc;

use fund_me_deploy::domain::contracts::{
    FUN_WITH_STORAGE, FUND_ME, FUND_TOO_SMALL_MESSAGE, MOCK_V3_AGGREGATOR, NOT_OWNER_ERROR,
    PANIC_ARRAY_OUT_OF_BOUNDS, RevertReason,
};
use fund_me_deploy::domain::deployment::{DeploymentRecord, TxOptions, TxOutcome};
use fund_me_deploy::ports::chain_client::{ChainClient, ChainError, DeployRequest};
use fund_me_deploy::ports::fund_me::FundMeContract;

pub const GAS_PRICE: u128 = 1_000_000_000;
pub const FUND_GAS: u64 = 70_000;
pub const WITHDRAW_GAS: u64 = 45_000;
pub const DEPLOY_GAS: u64 = 800_000;
pub const ACCOUNT_COUNT: usize = 10;
pub const MINIMUM_USD: u128 = 50;

/// Deliberate contract bugs, used to prove the checks catch them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// `withdraw` leaves the funder list and amounts untouched.
    KeepsFunders,
    /// `withdraw` skips the owner check.
    AnyoneWithdraws,
    /// `fund` accepts any value.
    NoMinimum,
}

#[derive(Debug, Clone)]
enum Contract {
    Aggregator {
        decimals: u8,
        answer: I256,
    },
    FundMe {
        owner: Address,
        price_feed: Address,
        funders: Vec<Address>,
        amounts: HashMap<Address, U256>,
    },
    Storage {
        slots: HashMap<U256, B256>,
    },
}

#[derive(Debug, Default)]
struct Ledger {
    chain_id: u64,
    accounts: Vec<Address>,
    balances: HashMap<Address, U256>,
    contracts: HashMap<Address, Contract>,
    block: u64,
    tx_count: u64,
    minimum_usd: u128,
    fault: Option<Fault>,
}

impl Ledger {
    fn mine(&mut self, from: Address, gas_used: u64) -> TxOutcome {
        self.block += 1;
        self.tx_count += 1;
        let outcome = TxOutcome {
            tx_hash: keccak256(self.tx_count.to_be_bytes()),
            block_number: Some(self.block),
            gas_used,
            effective_gas_price: GAS_PRICE,
        };
        let balance = self.balances.entry(from).or_default();
        *balance -= outcome.gas_cost();
        outcome
    }

    fn balance(&self, address: Address) -> U256 {
        self.balances.get(&address).copied().unwrap_or_default()
    }

    fn eth_price(&self, feed: Address) -> (I256, u8) {
        match self.contracts.get(&feed) {
            Some(Contract::Aggregator { decimals, answer }) => (*answer, *decimals),
            _ => (I256::ZERO, 8),
        }
    }
}

/// Shared handle to the in-memory chain.
#[derive(Clone)]
pub struct FakeChain {
    ledger: Arc<Mutex<Ledger>>,
}

impl FakeChain {
    pub fn new(chain_id: u64) -> Self {
        let accounts: Vec<Address> = (1..=ACCOUNT_COUNT as u8).map(Address::repeat_byte).collect();
        let balances = accounts
            .iter()
            .map(|a| (*a, U256::from(10_000u64) * U256::from(10u64).pow(U256::from(18u64))))
            .collect();

        Self {
            ledger: Arc::new(Mutex::new(Ledger {
                chain_id,
                accounts,
                balances,
                minimum_usd: MINIMUM_USD,
                ..Ledger::default()
            })),
        }
    }

    /// Lower (or raise) the USD minimum every FundMe on this chain enforces.
    pub fn with_minimum_usd(self, minimum_usd: u128) -> Self {
        self.lock().minimum_usd = minimum_usd;
        self
    }

    pub fn with_fault(self, fault: Fault) -> Self {
        self.lock().fault = Some(fault);
        self
    }

    fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap()
    }

    /// Number of contracts deployed so far.
    pub fn deployed_count(&self) -> usize {
        self.lock().contracts.len()
    }
}

#[async_trait]
impl ChainClient for FakeChain {
    async fn chain_id(&self) -> Result<u64, ChainError> {
        Ok(self.lock().chain_id)
    }

    fn accounts(&self) -> Vec<Address> {
        self.lock().accounts.clone()
    }

    async fn deploy(&self, request: DeployRequest) -> Result<DeploymentRecord, ChainError> {
        let mut ledger = self.lock();

        let contract = match request.contract.as_str() {
            MOCK_V3_AGGREGATOR => {
                let (decimals, answer) = <(U256, I256)>::abi_decode_params(&request.args, true)
                    .map_err(|e| ChainError::Other(e.into()))?;
                Contract::Aggregator {
                    decimals: decimals.to::<u8>(),
                    answer,
                }
            }
            FUND_ME => {
                let price_feed = Address::abi_decode(&request.args, true)
                    .map_err(|e| ChainError::Other(e.into()))?;
                Contract::FundMe {
                    owner: request.from,
                    price_feed,
                    funders: Vec::new(),
                    amounts: HashMap::new(),
                }
            }
            FUN_WITH_STORAGE => {
                let mut slots = HashMap::new();
                slots.insert(U256::ZERO, B256::from(U256::from(25u64)));
                slots.insert(U256::from(2u64), B256::from(U256::from(1u64)));
                slots.insert(
                    U256::from_be_bytes(keccak256(U256::from(2u64).to_be_bytes::<32>()).0),
                    B256::from(U256::from(222u64)),
                );
                Contract::Storage { slots }
            }
            other => {
                return Err(ChainError::Other(anyhow::anyhow!("No artifact for {other}")));
            }
        };

        let outcome = ledger.mine(request.from, DEPLOY_GAS);
        let address = request.from.create(ledger.tx_count);
        ledger.contracts.insert(address, contract);

        Ok(DeploymentRecord {
            contract_name: request.contract,
            address,
            transaction_hash: outcome.tx_hash,
            block_number: outcome.block_number,
            args: request.args,
            gas_used: outcome.gas_used,
            abi: serde_json::json!([]),
            deployed_at: Utc::now(),
        })
    }

    async fn storage_at(&self, address: Address, slot: U256) -> Result<B256, ChainError> {
        match self.lock().contracts.get(&address) {
            Some(Contract::Storage { slots }) => Ok(slots.get(&slot).copied().unwrap_or_default()),
            _ => Ok(B256::ZERO),
        }
    }

    async fn balance_of(&self, address: Address) -> Result<U256, ChainError> {
        Ok(self.lock().balance(address))
    }

    fn fund_me(&self, address: Address) -> Arc<dyn FundMeContract> {
        Arc::new(FakeFundMe {
            chain: self.clone(),
            address,
        })
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}

/// FundMe handle on a [`FakeChain`].
pub struct FakeFundMe {
    chain: FakeChain,
    address: Address,
}

impl FakeFundMe {
    fn with_contract<T>(
        &self,
        f: impl FnOnce(&mut Ledger, Address) -> Result<T, ChainError>,
    ) -> Result<T, ChainError> {
        let mut ledger = self.chain.lock();
        if !matches!(ledger.contracts.get(&self.address), Some(Contract::FundMe { .. })) {
            return Err(ChainError::Rpc(format!("no FundMe at {}", self.address)));
        }
        f(&mut ledger, self.address)
    }
}

fn fund_me_state(
    ledger: &mut Ledger,
    address: Address,
) -> (&mut Address, &mut Address, &mut Vec<Address>, &mut HashMap<Address, U256>) {
    match ledger.contracts.get_mut(&address) {
        Some(Contract::FundMe {
            owner,
            price_feed,
            funders,
            amounts,
        }) => (owner, price_feed, funders, amounts),
        _ => unreachable!("checked by with_contract"),
    }
}

fn fund_me_view(ledger: &Ledger, address: Address) -> (Address, Address, Vec<Address>, HashMap<Address, U256>) {
    match ledger.contracts.get(&address) {
        Some(Contract::FundMe {
            owner,
            price_feed,
            funders,
            amounts,
        }) => (*owner, *price_feed, funders.clone(), amounts.clone()),
        _ => unreachable!("checked by with_contract"),
    }
}

#[async_trait]
impl FundMeContract for FakeFundMe {
    fn address(&self) -> Address {
        self.address
    }

    async fn fund(&self, opts: &TxOptions) -> Result<TxOutcome, ChainError> {
        self.with_contract(|ledger, address| {
            let (_, feed, _, _) = fund_me_view(ledger, address);
            let (answer, decimals) = ledger.eth_price(feed);

            // value (wei) * price / 10^decimals >= MINIMUM_USD * 10^18
            let usd = opts.value * answer.into_raw() / U256::from(10u64).pow(U256::from(decimals));
            let minimum = U256::from(ledger.minimum_usd) * U256::from(10u64).pow(U256::from(18u64));
            if usd < minimum && ledger.fault != Some(Fault::NoMinimum) {
                return Err(ChainError::Reverted(RevertReason::Message(
                    FUND_TOO_SMALL_MESSAGE.to_string(),
                )));
            }

            let outcome = ledger.mine(opts.from, FUND_GAS);
            *ledger.balances.entry(opts.from).or_default() -= opts.value;
            *ledger.balances.entry(address).or_default() += opts.value;

            let (_, _, funders, amounts) = fund_me_state(ledger, address);
            funders.push(opts.from);
            *amounts.entry(opts.from).or_default() += opts.value;
            Ok(outcome)
        })
    }

    async fn withdraw(&self, opts: &TxOptions) -> Result<TxOutcome, ChainError> {
        self.with_contract(|ledger, address| {
            let (owner, _, _, _) = fund_me_view(ledger, address);
            if opts.from != owner && ledger.fault != Some(Fault::AnyoneWithdraws) {
                return Err(ChainError::Reverted(RevertReason::CustomError(
                    NOT_OWNER_ERROR.to_string(),
                )));
            }
            if let Some(limit) = opts.gas_limit {
                if limit < WITHDRAW_GAS {
                    return Err(ChainError::Reverted(RevertReason::Unknown));
                }
            }

            let keep_funders = ledger.fault == Some(Fault::KeepsFunders);
            let outcome = ledger.mine(opts.from, WITHDRAW_GAS);
            let balance = ledger.balance(address);
            ledger.balances.insert(address, U256::ZERO);
            *ledger.balances.entry(opts.from).or_default() += balance;

            if !keep_funders {
                let (_, _, funders, amounts) = fund_me_state(ledger, address);
                for funder in funders.drain(..) {
                    amounts.insert(funder, U256::ZERO);
                }
            }
            Ok(outcome)
        })
    }

    async fn price_feed(&self) -> Result<Address, ChainError> {
        self.with_contract(|ledger, address| Ok(fund_me_view(ledger, address).1))
    }

    async fn funder(&self, index: U256) -> Result<Address, ChainError> {
        self.with_contract(|ledger, address| {
            let (_, _, funders, _) = fund_me_view(ledger, address);
            usize::try_from(index)
                .ok()
                .and_then(|i| funders.get(i).copied())
                .ok_or(ChainError::Reverted(RevertReason::Panic(U256::from(
                    PANIC_ARRAY_OUT_OF_BOUNDS,
                ))))
        })
    }

    async fn amount_funded(&self, funder: Address) -> Result<U256, ChainError> {
        self.with_contract(|ledger, address| {
            Ok(fund_me_view(ledger, address)
                .3
                .get(&funder)
                .copied()
                .unwrap_or_default())
        })
    }
}
