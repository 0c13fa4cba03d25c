//! Use Cases Layer - Deployment and Interaction Workflows
//!
//! Orchestrates domain logic with port interfaces to implement the
//! project's workflows. Each use case is a self-contained operation
//! against a [`DeployContext`].
//!
//! Use cases:
//! - `deploy_mocks`: Price feed mock on development chains
//! - `deploy_fund_me`: FundMe deployment and verification
//! - `deploy_storage`: FunWithStorage storage layout dump
//! - `pipeline`: Tagged, ordered deploy steps
//! - `interact`: Fund and withdraw scripts
//! - `scenarios`: Behaviour checks for the unit and staging suites

pub mod context;
pub mod deploy_fund_me;
pub mod deploy_mocks;
pub mod deploy_storage;
pub mod interact;
pub mod pipeline;
pub mod scenarios;

pub use context::DeployContext;
pub use pipeline::{DeployStep, DeployTag, PipelineReport, run_pipeline};
pub use scenarios::{FundMeFixture, ScenarioError, SuiteReport, UnitCheck};
