//! Source Verifier Port - Block Explorer Verification
//!
//! Submits a deployed contract's source for verification on a block
//! explorer. Only used on live networks.

use alloy::primitives::{Address, Bytes};
use anyhow::Result;
use async_trait::async_trait;

/// What to verify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest {
    /// Artifact name of the contract.
    pub contract: String,
    /// Deployed address.
    pub address: Address,
    /// ABI-encoded constructor arguments used at deployment.
    pub constructor_args: Bytes,
}

/// Terminal state of a verification submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStatus {
    Verified,
    AlreadyVerified,
}

#[async_trait]
pub trait SourceVerifier: Send + Sync {
    /// Submit and wait for the explorer's verdict.
    async fn verify(&self, request: &VerificationRequest) -> Result<VerificationStatus>;
}
