//! Command-line interface of the `fund-me` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::usecases::pipeline::DeployTag;

#[derive(Debug, Parser)]
#[clap(author, version, about = "Deploy, fund and test the FundMe contract", long_about = None)]
pub struct Args {
    /// Project configuration file.
    #[clap(short, long, default_value = "config.toml")]
    pub config: PathBuf,
    /// Network from config.toml; defaults to `project.default_network`.
    #[clap(short, long)]
    pub network: Option<String>,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the deploy pipeline.
    Deploy {
        /// Comma-separated tags: all, mocks, fundme, storage.
        #[clap(long, value_delimiter = ',', default_value = "all")]
        tags: Vec<DeployTag>,
    },
    /// Fund the deployed FundMe with 1 ETH from the deployer.
    Fund,
    /// Withdraw the deployed FundMe's balance to the deployer.
    Withdraw,
    /// Run the unit suite (development networks) or the staging suite.
    Test,
}
