//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (blockchain RPC, HTTP APIs, file I/O). Each
//! sub-module groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `artifacts`: compiled contract loading (Hardhat and Foundry layouts)
//! - `chain`: EVM interaction via alloy-rs
//! - `etherscan`: block explorer source verification
//! - `gas_reporter`: per-method gas usage and the report file
//! - `persistence`: deployment records on disk or in memory

pub mod artifacts;
pub mod chain;
pub mod etherscan;
pub mod gas_reporter;
pub mod persistence;
