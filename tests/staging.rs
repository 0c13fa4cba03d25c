//! Staging Test - Fund and Withdraw on a Live Network
//!
//! Runs against the FundMe recorded under `deployments/<network>/`.
//! Needs `RPC_URL` and `PRIVATE_KEY` (a funded account) in the
//! environment and `STAGING_NETWORK` naming a network in config.toml.

use fund_me_deploy::config::Secrets;
use fund_me_deploy::config::loader::load_config;
use fund_me_deploy::runtime::Runtime;
use fund_me_deploy::usecases::scenarios::staging_fund_and_withdraw;

#[tokio::test]
#[ignore = "spends testnet ETH; needs RPC_URL, PRIVATE_KEY and a recorded deployment"]
async fn test_allows_people_to_fund_and_withdraw() {
    let _ = dotenvy::dotenv();
    let network = std::env::var("STAGING_NETWORK").unwrap_or_else(|_| "rinkeby".to_string());

    let config = load_config("config.toml").unwrap();
    let rt = Runtime::new(config, Secrets::from_env(), Some(network)).unwrap();
    assert!(!rt.is_development(), "staging runs on live networks only");

    let (_session, fixture) = rt.staging_fixture().await.unwrap();
    staging_fund_and_withdraw(&fixture).await.unwrap();
}
