//! Deployment Pipeline - Tagged, Ordered Deploy Steps
//!
//! Three steps run in a fixed order: mocks, FundMe, storage inspector.
//! Each step carries tags; a run executes every step sharing at least
//! one tag with the request. `all` covers mocks and FundMe only, the
//! storage inspector must be asked for explicitly.

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use tracing::{debug, info, instrument};

use crate::domain::deployment::DeploymentRecord;

use super::context::DeployContext;
use super::deploy_fund_me::deploy_fund_me;
use super::deploy_mocks::deploy_mocks;
use super::deploy_storage::{StorageDump, deploy_storage};

/// Label selecting deploy steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeployTag {
    All,
    Mocks,
    FundMe,
    Storage,
}

impl FromStr for DeployTag {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "mocks" => Ok(Self::Mocks),
            "fundme" => Ok(Self::FundMe),
            "storage" => Ok(Self::Storage),
            other => bail!("Unknown deploy tag '{other}' (expected all, mocks, fundme or storage)"),
        }
    }
}

impl fmt::Display for DeployTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::All => "all",
            Self::Mocks => "mocks",
            Self::FundMe => "fundme",
            Self::Storage => "storage",
        };
        f.write_str(name)
    }
}

/// One deploy step, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DeployStep {
    Mocks,
    FundMe,
    Storage,
}

impl DeployStep {
    pub const ORDER: [DeployStep; 3] = [Self::Mocks, Self::FundMe, Self::Storage];

    pub fn tags(self) -> &'static [DeployTag] {
        match self {
            Self::Mocks => &[DeployTag::All, DeployTag::Mocks],
            Self::FundMe => &[DeployTag::All, DeployTag::FundMe],
            Self::Storage => &[DeployTag::Storage],
        }
    }
}

/// Steps selected by `tags`, in execution order.
pub fn select_steps(tags: &[DeployTag]) -> Vec<DeployStep> {
    DeployStep::ORDER
        .into_iter()
        .filter(|step| step.tags().iter().any(|tag| tags.contains(tag)))
        .collect()
}

/// What a pipeline run produced.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub steps: Vec<DeployStep>,
    pub mock: Option<DeploymentRecord>,
    pub fund_me: Option<DeploymentRecord>,
    pub storage: Option<StorageDump>,
}

/// Run every step selected by `tags`. The first failing step aborts the run.
#[instrument(skip(ctx), fields(network = %ctx.network))]
pub async fn run_pipeline(ctx: &DeployContext, tags: &[DeployTag]) -> Result<PipelineReport> {
    let steps = select_steps(tags);
    if steps.is_empty() {
        info!(?tags, "No deploy steps match the requested tags");
    }

    let mut report = PipelineReport::default();
    for step in steps {
        debug!(?step, "Running deploy step");
        match step {
            DeployStep::Mocks => report.mock = deploy_mocks(ctx).await?,
            DeployStep::FundMe => report.fund_me = Some(deploy_fund_me(ctx).await?),
            DeployStep::Storage => report.storage = Some(deploy_storage(ctx).await?),
        }
        report.steps.push(step);
    }

    Ok(report)
}
