//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the use cases require from the
//! outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `ChainClient`: Deployments and raw chain reads
//! - `FundMeContract`: Calls against a deployed FundMe
//! - `DeploymentRepository`: Deployment bookkeeping
//! - `SourceVerifier`: Block explorer verification

pub mod chain_client;
pub mod fund_me;
pub mod repository;
pub mod verifier;

pub use chain_client::{ChainClient, ChainError, DeployRequest};
pub use fund_me::FundMeContract;
pub use repository::DeploymentRepository;
pub use verifier::{SourceVerifier, VerificationRequest, VerificationStatus};
