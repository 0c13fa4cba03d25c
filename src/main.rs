//! FundMe Deploy - Entry Point
//!
//! Wiring sequence:
//! 1. Parse CLI arguments, load `.env`
//! 2. Load config.toml + validate
//! 3. Init tracing (plain text, or JSON when `project.json_logs`)
//! 4. Build the runtime for the selected network
//! 5. Run the command, then write the gas report
//!
//! Exits 0 on success and 1 on any error.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use fund_me_deploy::cli::{Args, Command};
use fund_me_deploy::config::{self, AppConfig, Secrets};
use fund_me_deploy::runtime::Runtime;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Missing .env is fine; the environment may already be set.
    let _ = dotenvy::dotenv();

    let config = match config::loader::load_config(&args.config.to_string_lossy()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config);
    info!(
        path = %args.config.display(),
        project = %config.project.name,
        networks = config.networks.len(),
        default_network = %config.project.default_network,
        "Configuration loaded successfully"
    );

    match run(args, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.project.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.project.json_logs {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
}

async fn run(args: Args, config: AppConfig) -> Result<()> {
    let runtime = Runtime::new(config, Secrets::from_env(), args.network)
        .context("Failed to select network")?;

    info!(
        network = runtime.network_name(),
        version = env!("CARGO_PKG_VERSION"),
        "Starting fund-me"
    );

    let result = match args.command {
        Command::Deploy { tags } => runtime.deploy(&tags).await.map(|_| ()),
        Command::Fund => runtime.fund().await.map(|_| ()),
        Command::Withdraw => runtime.withdraw().await.map(|_| ()),
        Command::Test => match runtime.run_tests().await {
            Ok(report) if report.is_success() => Ok(()),
            Ok(report) => Err(anyhow::anyhow!("{} check(s) failed", report.failed.len())),
            Err(e) => Err(e),
        },
    };

    runtime.finish().await;
    result
}
