//! Etherscan Verifier - Source Verification over the Explorer API
//!
//! Submits the standard JSON compiler input recorded in the Hardhat
//! build info, then polls until the explorer reaches a verdict. A
//! freshly deployed contract is often not indexed yet, so submission
//! is retried with exponential backoff while the explorer reports it
//! cannot find the bytecode.

use std::time::Duration;

use alloy::hex;
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::adapters::artifacts::ArtifactStore;
use crate::ports::verifier::{SourceVerifier, VerificationRequest, VerificationStatus};

/// Configuration for the explorer client.
#[derive(Debug, Clone)]
pub struct EtherscanConfig {
    /// API endpoint, e.g. `https://api-rinkeby.etherscan.io/api`.
    pub api_url: String,
    pub api_key: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum submission retries while the contract is not indexed.
    pub max_retries: u32,
    /// Base delay between submission retries (exponential backoff).
    pub retry_base_delay: Duration,
    /// Delay between status polls.
    pub poll_interval: Duration,
    /// Status polls before giving up.
    pub max_polls: u32,
}

impl EtherscanConfig {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(30),
            max_retries: 5,
            retry_base_delay: Duration::from_secs(3),
            poll_interval: Duration::from_secs(3),
            max_polls: 20,
        }
    }
}

/// Envelope of every Etherscan API response.
#[derive(Debug, Clone, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: String,
}

/// What to do after a submission response.
#[derive(Debug, PartialEq, Eq)]
enum Submission {
    /// Accepted; poll with this GUID.
    Accepted(String),
    AlreadyVerified,
    /// Explorer has not indexed the bytecode yet.
    NotIndexed,
    Rejected(String),
}

/// What to do after a status poll.
#[derive(Debug, PartialEq, Eq)]
enum Poll {
    Pending,
    Done(VerificationStatus),
    Failed(String),
}

/// Explorers word this several ways, e.g. "Contract source code already
/// verified" on submission and "Already Verified" on status checks.
fn is_already_verified(result: &str) -> bool {
    result.to_ascii_lowercase().contains("already verified")
}

fn classify_submission(response: &ApiResponse) -> Submission {
    let result = response.result.as_str();
    if response.status == "1" {
        return Submission::Accepted(result.to_string());
    }
    if is_already_verified(result) {
        Submission::AlreadyVerified
    } else if result.contains("Unable to locate ContractCode") {
        Submission::NotIndexed
    } else if result.is_empty() {
        Submission::Rejected(response.message.clone())
    } else {
        Submission::Rejected(result.to_string())
    }
}

fn classify_poll(response: &ApiResponse) -> Poll {
    let result = response.result.as_str();
    if result.contains("Pending in queue") {
        Poll::Pending
    } else if is_already_verified(result) {
        Poll::Done(VerificationStatus::AlreadyVerified)
    } else if response.status == "1" || result.contains("Pass - Verified") {
        Poll::Done(VerificationStatus::Verified)
    } else {
        Poll::Failed(result.to_string())
    }
}

/// Explorer client implementing the `SourceVerifier` port.
pub struct EtherscanVerifier {
    http: Client,
    artifacts: ArtifactStore,
    config: EtherscanConfig,
}

impl EtherscanVerifier {
    pub fn new(artifacts: ArtifactStore, config: EtherscanConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            artifacts,
            config,
        })
    }

    async fn submit(&self, form: &[(&str, String)]) -> Result<ApiResponse> {
        self.http
            .post(&self.config.api_url)
            .form(form)
            .send()
            .await
            .context("Verification request failed")?
            .error_for_status()
            .context("Explorer returned an error status")?
            .json()
            .await
            .context("Failed to parse explorer response")
    }

    async fn check_status(&self, guid: &str) -> Result<ApiResponse> {
        self.http
            .get(&self.config.api_url)
            .query(&[
                ("module", "contract"),
                ("action", "checkverifystatus"),
                ("guid", guid),
                ("apikey", self.config.api_key.as_str()),
            ])
            .send()
            .await
            .context("Status request failed")?
            .error_for_status()
            .context("Explorer returned an error status")?
            .json()
            .await
            .context("Failed to parse explorer response")
    }

    async fn poll(&self, guid: &str) -> Result<VerificationStatus> {
        for attempt in 1..=self.config.max_polls {
            sleep(self.config.poll_interval).await;
            let response = self.check_status(guid).await?;
            match classify_poll(&response) {
                Poll::Pending => debug!(attempt, "Verification pending"),
                Poll::Done(status) => return Ok(status),
                Poll::Failed(reason) => bail!("Verification failed: {reason}"),
            }
        }
        bail!("Verification still pending after {} polls", self.config.max_polls)
    }
}

#[async_trait]
impl SourceVerifier for EtherscanVerifier {
    #[instrument(skip(self, request), fields(contract = %request.contract, address = %request.address))]
    async fn verify(&self, request: &VerificationRequest) -> Result<VerificationStatus> {
        info!("Verifying contract...");

        let artifact = self.artifacts.load(&request.contract).await?;
        let build = self.artifacts.build_info(&artifact).await?;
        let source_code =
            serde_json::to_string(&build.input).context("Failed to encode compiler input")?;

        let form = [
            ("apikey", self.config.api_key.clone()),
            ("module", "contract".to_string()),
            ("action", "verifysourcecode".to_string()),
            ("contractaddress", request.address.to_string()),
            ("sourceCode", source_code),
            ("codeformat", "solidity-standard-json-input".to_string()),
            ("contractname", artifact.fully_qualified_name()),
            ("compilerversion", format!("v{}", build.solc_long_version)),
            // Misspelling is part of the Etherscan API.
            ("constructorArguements", hex::encode(&request.constructor_args)),
        ];

        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay = self.config.retry_base_delay * 2u32.pow(attempt - 1);
                debug!(attempt, delay_ms = delay.as_millis(), "Retrying verification");
                sleep(delay).await;
            }

            let response = match self.submit(&form).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(error = %e, attempt, "Verification submission failed");
                    last_error = Some(e);
                    continue;
                }
            };

            match classify_submission(&response) {
                Submission::Accepted(guid) => {
                    debug!(%guid, "Verification submitted");
                    return self.poll(&guid).await;
                }
                Submission::AlreadyVerified => return Ok(VerificationStatus::AlreadyVerified),
                Submission::NotIndexed => {
                    debug!("Explorer has not indexed the contract yet");
                    last_error = Some(anyhow!("Unable to locate ContractCode at {}", request.address));
                }
                Submission::Rejected(reason) => bail!("Verification rejected: {reason}"),
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow!("Max retries exceeded")))
    }
}
