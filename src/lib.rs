//! FundMe Deploy - Library Root
//!
//! Re-exports all modules for the binary and integration tests.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod ports;
pub mod runtime;
pub mod usecases;
