//! Integration Tests - Deploy Pipeline and Scripts Against Port Mocks
//!
//! Uses mockall for the chain, repository and verifier ports and
//! tokio::test for the async use cases.

use std::sync::Arc;

use alloy::primitives::{Address, B256, Bytes, I256, U256, address, b256};
use alloy::sol_types::SolValue;
use chrono::Utc;
use mockall::mock;
use mockall::predicate::*;

use fund_me_deploy::config::NamedAccountsConfig;
use fund_me_deploy::domain::deployment::{DeploymentRecord, TxOptions, TxOutcome};
use fund_me_deploy::domain::network::{FALLBACK_PRICE_FEED, ResolveError};
use fund_me_deploy::domain::storage::array_element_slot;
use fund_me_deploy::ports::chain_client::{ChainError, DeployRequest};
use fund_me_deploy::ports::fund_me::FundMeContract;
use fund_me_deploy::ports::verifier::{VerificationRequest, VerificationStatus};
use fund_me_deploy::usecases::pipeline::{DeployStep, DeployTag, run_pipeline};
use fund_me_deploy::usecases::{DeployContext, interact};

// ---- Mock Definitions ----

mock! {
    pub Chain {}

    #[async_trait::async_trait]
    impl fund_me_deploy::ports::chain_client::ChainClient for Chain {
        async fn chain_id(&self) -> Result<u64, ChainError>;
        fn accounts(&self) -> Vec<Address>;
        async fn deploy(&self, request: DeployRequest) -> Result<DeploymentRecord, ChainError>;
        async fn storage_at(&self, address: Address, slot: U256) -> Result<B256, ChainError>;
        async fn balance_of(&self, address: Address) -> Result<U256, ChainError>;
        fn fund_me(&self, address: Address) -> Arc<dyn FundMeContract>;
        async fn is_healthy(&self) -> bool;
    }
}

mock! {
    pub Repo {}

    #[async_trait::async_trait]
    impl fund_me_deploy::ports::repository::DeploymentRepository for Repo {
        async fn save(&self, record: &DeploymentRecord) -> anyhow::Result<()>;
        async fn get(&self, contract: &str) -> anyhow::Result<Option<DeploymentRecord>>;
    }
}

mock! {
    pub Verifier {}

    #[async_trait::async_trait]
    impl fund_me_deploy::ports::verifier::SourceVerifier for Verifier {
        async fn verify(&self, request: &VerificationRequest) -> anyhow::Result<VerificationStatus>;
    }
}

mock! {
    pub FundMe {}

    #[async_trait::async_trait]
    impl FundMeContract for FundMe {
        fn address(&self) -> Address;
        async fn fund(&self, opts: &TxOptions) -> Result<TxOutcome, ChainError>;
        async fn withdraw(&self, opts: &TxOptions) -> Result<TxOutcome, ChainError>;
        async fn price_feed(&self) -> Result<Address, ChainError>;
        async fn funder(&self, index: U256) -> Result<Address, ChainError>;
        async fn amount_funded(&self, funder: Address) -> Result<U256, ChainError>;
    }
}

// ---- Helpers ----

const DEPLOYER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
const USER: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
const MOCK_ADDR: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
const FUND_ME_ADDR: Address = address!("e7f1725E7734CE288F8367e1Bb143E90bb3F0512");
const RINKEBY_FEED: Address = address!("8A753747A1Fa494EC906cE90E9f37563A8AF630e");

fn record(name: &str, address: Address, args: Bytes) -> DeploymentRecord {
    DeploymentRecord {
        contract_name: name.to_string(),
        address,
        transaction_hash: B256::repeat_byte(0xab),
        block_number: Some(1),
        args,
        gas_used: 500_000,
        abi: serde_json::json!([]),
        deployed_at: Utc::now(),
    }
}

fn outcome() -> TxOutcome {
    TxOutcome {
        tx_hash: B256::repeat_byte(0xcd),
        block_number: Some(2),
        gas_used: 60_000,
        effective_gas_price: 1_000_000_000,
    }
}

fn context(
    network: &str,
    chain: MockChain,
    repo: MockRepo,
    verifier: Option<MockVerifier>,
) -> DeployContext {
    DeployContext {
        network: network.to_string(),
        chain: Arc::new(chain),
        deployments: Arc::new(repo),
        verifier: verifier.map(|v| Arc::new(v) as Arc<dyn fund_me_deploy::ports::SourceVerifier>),
        named_accounts: NamedAccountsConfig::default(),
    }
}

fn chain_with(chain_id: u64) -> MockChain {
    let mut chain = MockChain::new();
    chain.expect_chain_id().returning(move || Ok(chain_id));
    chain.expect_accounts().returning(|| vec![DEPLOYER, USER]);
    chain
}

// ---- Integration Tests ----

#[tokio::test]
async fn test_all_on_development_deploys_mock_then_fund_me() {
    let mut chain = chain_with(31337);
    let mut seq = mockall::Sequence::new();

    chain
        .expect_deploy()
        .withf(|req| req.contract == "MockV3Aggregator" && req.from == DEPLOYER && req.confirmations == 1)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|req| Ok(record("MockV3Aggregator", MOCK_ADDR, req.args)));

    chain
        .expect_deploy()
        .withf(|req| {
            req.contract == "FundMe"
                && req.args == Bytes::from(MOCK_ADDR.abi_encode())
                && req.confirmations == 1
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|req| Ok(record("FundMe", FUND_ME_ADDR, req.args)));

    let mut repo = MockRepo::new();
    repo.expect_save().times(2).returning(|_| Ok(()));
    repo.expect_get()
        .with(eq("MockV3Aggregator"))
        .returning(|_| Ok(Some(record("MockV3Aggregator", MOCK_ADDR, Bytes::new()))));

    // Development networks are never verified, even with a verifier present.
    let mut verifier = MockVerifier::new();
    verifier.expect_verify().never();

    let ctx = context("hardhat", chain, repo, Some(verifier));
    let report = run_pipeline(&ctx, &[DeployTag::All]).await.unwrap();

    assert_eq!(report.steps, vec![DeployStep::Mocks, DeployStep::FundMe]);
    assert_eq!(report.mock.unwrap().address, MOCK_ADDR);
    assert_eq!(report.fund_me.unwrap().address, FUND_ME_ADDR);
    assert!(report.storage.is_none());
}

#[tokio::test]
async fn test_mock_constructor_args_are_decimals_and_initial_answer() {
    let mut chain = chain_with(31337);
    chain
        .expect_deploy()
        .withf(|req| {
            let decoded = <(U256, I256)>::abi_decode_params(&req.args, true);
            matches!(decoded, Ok((decimals, answer))
                if decimals == U256::from(8) && answer == I256::unchecked_from(200_000_000_000i64))
        })
        .times(1)
        .returning(|req| Ok(record("MockV3Aggregator", MOCK_ADDR, req.args)));

    let mut repo = MockRepo::new();
    repo.expect_save().times(1).returning(|_| Ok(()));

    let ctx = context("localhost", chain, repo, None);
    let report = run_pipeline(&ctx, &[DeployTag::Mocks]).await.unwrap();
    assert_eq!(report.steps, vec![DeployStep::Mocks]);
}

#[tokio::test]
async fn test_fund_me_alone_on_development_needs_the_mock() {
    let chain = chain_with(31337);
    let mut repo = MockRepo::new();
    repo.expect_get().returning(|_| Ok(None));

    let ctx = context("hardhat", chain, repo, None);
    let err = run_pipeline(&ctx, &[DeployTag::FundMe]).await.unwrap_err();

    assert_eq!(
        err.downcast_ref::<ResolveError>(),
        Some(&ResolveError::MissingMock("hardhat".into()))
    );
}

#[tokio::test]
async fn test_unknown_live_chain_uses_fallback_feed_and_one_confirmation() {
    let mut chain = chain_with(5);
    chain
        .expect_deploy()
        .withf(|req| {
            req.contract == "FundMe"
                && req.args == Bytes::from(FALLBACK_PRICE_FEED.abi_encode())
                && req.confirmations == 1
        })
        .times(1)
        .returning(|req| Ok(record("FundMe", FUND_ME_ADDR, req.args)));

    let mut repo = MockRepo::new();
    repo.expect_get().never();
    repo.expect_save().times(1).returning(|_| Ok(()));

    // No mocks on a live network, and no verifier means no verification.
    let ctx = context("goerli", chain, repo, None);
    let report = run_pipeline(&ctx, &[DeployTag::All]).await.unwrap();

    assert!(report.mock.is_none());
    assert_eq!(report.fund_me.unwrap().address, FUND_ME_ADDR);
}

#[tokio::test]
async fn test_rinkeby_waits_six_confirmations_and_verifies() {
    let mut chain = chain_with(4);
    chain
        .expect_deploy()
        .withf(|req| req.args == Bytes::from(RINKEBY_FEED.abi_encode()) && req.confirmations == 6)
        .times(1)
        .returning(|req| Ok(record("FundMe", FUND_ME_ADDR, req.args)));

    let mut repo = MockRepo::new();
    repo.expect_save().times(1).returning(|_| Ok(()));

    let mut verifier = MockVerifier::new();
    verifier
        .expect_verify()
        .withf(|req| {
            req.contract == "FundMe"
                && req.address == FUND_ME_ADDR
                && req.constructor_args == Bytes::from(RINKEBY_FEED.abi_encode())
        })
        .times(1)
        .returning(|_| Ok(VerificationStatus::Verified));

    let ctx = context("rinkeby", chain, repo, Some(verifier));
    run_pipeline(&ctx, &[DeployTag::FundMe]).await.unwrap();
}

#[tokio::test]
async fn test_verification_failure_does_not_fail_deployment() {
    let mut chain = chain_with(4);
    chain
        .expect_deploy()
        .returning(|req| Ok(record("FundMe", FUND_ME_ADDR, req.args)));

    let mut repo = MockRepo::new();
    repo.expect_save().returning(|_| Ok(()));

    let mut verifier = MockVerifier::new();
    verifier
        .expect_verify()
        .times(1)
        .returning(|_| Err(anyhow::anyhow!("Verification rejected: Invalid API Key")));

    let ctx = context("rinkeby", chain, repo, Some(verifier));
    let report = run_pipeline(&ctx, &[DeployTag::All]).await.unwrap();
    assert!(report.fund_me.is_some());
}

#[tokio::test]
async fn test_deploy_revert_propagates() {
    let mut chain = chain_with(31337);
    chain
        .expect_deploy()
        .returning(|_| Err(ChainError::Rpc("insufficient funds for gas".into())));

    let repo = MockRepo::new();
    let ctx = context("hardhat", chain, repo, None);
    let err = run_pipeline(&ctx, &[DeployTag::All]).await.unwrap_err();

    assert!(format!("{err:#}").contains("insufficient funds"));
}

#[tokio::test]
async fn test_storage_step_reads_ten_slots_and_array_element() {
    let storage_addr = Address::repeat_byte(0x77);
    let element_slot = array_element_slot(U256::from(2), U256::ZERO);

    let mut chain = chain_with(31337);
    chain
        .expect_deploy()
        .withf(|req| req.contract == "FunWithStorage" && req.args.is_empty())
        .times(1)
        .returning(move |req| Ok(record("FunWithStorage", storage_addr, req.args)));
    chain
        .expect_storage_at()
        .with(eq(storage_addr), always())
        .times(11)
        .returning(|_, slot| Ok(B256::from(slot)));

    let mut repo = MockRepo::new();
    repo.expect_save().returning(|_| Ok(()));

    // `all` does not include the storage inspector.
    let ctx = context("hardhat", chain, repo, None);
    let report = run_pipeline(&ctx, &[DeployTag::Storage]).await.unwrap();

    let dump = report.storage.unwrap();
    assert_eq!(dump.slots.len(), 10);
    assert_eq!(dump.slots[3], B256::from(U256::from(3)));
    assert_eq!(
        dump.array_element,
        (
            b256!("405787fa12a823e0f2b7631cc41b3ba8828b3321ca811111fa75cd3aa3bb5ace"),
            B256::from(element_slot)
        )
    );
}

// ---- Interaction Scripts ----

#[tokio::test]
async fn test_fund_sends_one_ether_from_deployer() {
    let mut fund_me = MockFundMe::new();
    fund_me
        .expect_fund()
        .withf(|opts| {
            opts.from == DEPLOYER
                && opts.value == U256::from(10u128.pow(18))
                && opts.confirmations == 1
        })
        .times(1)
        .returning(|_| Ok(outcome()));
    let fund_me: Arc<dyn FundMeContract> = Arc::new(fund_me);

    let mut chain = chain_with(31337);
    chain
        .expect_fund_me()
        .with(eq(FUND_ME_ADDR))
        .returning(move |_| Arc::clone(&fund_me));

    let mut repo = MockRepo::new();
    repo.expect_get()
        .with(eq("FundMe"))
        .returning(|_| Ok(Some(record("FundMe", FUND_ME_ADDR, Bytes::new()))));

    let ctx = context("localhost", chain, repo, None);
    assert_eq!(interact::fund(&ctx).await.unwrap(), outcome());
}

#[tokio::test]
async fn test_withdraw_reports_revert() {
    let mut fund_me = MockFundMe::new();
    fund_me.expect_withdraw().returning(|_| {
        Err(ChainError::Reverted(
            fund_me_deploy::domain::contracts::RevertReason::CustomError("FundMe__NotOwner".into()),
        ))
    });
    let fund_me: Arc<dyn FundMeContract> = Arc::new(fund_me);

    let mut chain = chain_with(31337);
    chain.expect_fund_me().returning(move |_| Arc::clone(&fund_me));

    let mut repo = MockRepo::new();
    repo.expect_get()
        .returning(|_| Ok(Some(record("FundMe", FUND_ME_ADDR, Bytes::new()))));

    let ctx = context("localhost", chain, repo, None);
    let err = interact::withdraw(&ctx).await.unwrap_err();
    assert!(format!("{err:#}").contains("FundMe__NotOwner"));
}

#[tokio::test]
async fn test_scripts_fail_without_a_recorded_deployment() {
    let chain = chain_with(31337);
    let mut repo = MockRepo::new();
    repo.expect_get().returning(|_| Ok(None));

    let ctx = context("localhost", chain, repo, None);
    let err = interact::fund(&ctx).await.unwrap_err();
    assert_eq!(err.to_string(), "No deployment found for: FundMe on localhost");
}

// ---- Connection Health ----

#[tokio::test]
async fn test_unresponsive_node_is_reported() {
    let mut chain = MockChain::new();
    chain.expect_is_healthy().times(1).returning(|| false);

    let ctx = context("rinkeby", chain, MockRepo::new(), None);
    let err = ctx.ensure_healthy().await.unwrap_err();
    assert!(err.to_string().contains("Node for rinkeby is not responding"));
}

#[tokio::test]
async fn test_healthy_node_passes() {
    let mut chain = MockChain::new();
    chain.expect_is_healthy().times(1).returning(|| true);

    let ctx = context("localhost", chain, MockRepo::new(), None);
    ctx.ensure_healthy().await.unwrap();
}
