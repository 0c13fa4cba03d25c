//! Contract Bindings - FundMe, MockV3Aggregator and FunWithStorage
//!
//! ABI declarations for the contracts this crate deploys and drives,
//! plus decoding of revert payloads into a [`RevertReason`]. Bytecode
//! is never embedded here; it is read from compiled artifacts.

use std::fmt;

use alloy::primitives::U256;
use alloy::sol;
use alloy::sol_types::{Panic, Revert, SolError, SolInterface};

/// Artifact name of the crowdfunding contract.
pub const FUND_ME: &str = "FundMe";
/// Artifact name of the price-feed mock.
pub const MOCK_V3_AGGREGATOR: &str = "MockV3Aggregator";
/// Artifact name of the storage-layout demo contract.
pub const FUN_WITH_STORAGE: &str = "FunWithStorage";

/// Custom error raised by FundMe when a non-owner withdraws.
pub const NOT_OWNER_ERROR: &str = "FundMe__NotOwner";

/// Revert message raised by `fund()` below the USD minimum.
pub const FUND_TOO_SMALL_MESSAGE: &str = "You need to spend more ETH";

/// Solidity panic code for an out-of-bounds array access.
pub const PANIC_ARRAY_OUT_OF_BOUNDS: u64 = 0x32;

sol! {
    contract FundMe {
        error FundMe__NotOwner();

        function fund() external payable;
        function withdraw() external;
        function getPriceFeed() external view returns (address);
        function getOwner() external view returns (address);
        function getFunder(uint256 index) external view returns (address);
        function getAddressToAmountFunded(address funder) external view returns (uint256);
    }
}

/// Why a call or transaction reverted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevertReason {
    /// `require`/`revert` with a string message.
    Message(String),
    /// A named custom error, e.g. `FundMe__NotOwner`.
    CustomError(String),
    /// A compiler-inserted panic with its code.
    Panic(U256),
    /// Revert without decodable data (e.g. a mined, failed transaction).
    Unknown,
}

impl RevertReason {
    /// Decode ABI revert data.
    pub fn decode(data: &[u8]) -> Self {
        if data.is_empty() {
            return Self::Unknown;
        }

        if let Ok(revert) = Revert::abi_decode(data, true) {
            return Self::Message(revert.reason);
        }

        if let Ok(panic) = Panic::abi_decode(data, true) {
            return Self::Panic(panic.code);
        }

        match FundMe::FundMeErrors::abi_decode(data, true) {
            Ok(FundMe::FundMeErrors::FundMe__NotOwner(_)) => {
                Self::CustomError(NOT_OWNER_ERROR.to_string())
            }
            Err(_) => Self::Unknown,
        }
    }

    /// Recover a reason from a node's error message when it carries no data.
    ///
    /// Nodes phrase this as `execution reverted: <reason>` (geth, anvil)
    /// or `reverted with reason string '<reason>'` (hardhat).
    pub fn from_node_message(message: &str) -> Option<Self> {
        if let Some((_, reason)) = message.split_once("reverted with reason string '") {
            return Some(Self::Message(reason.trim_end_matches('\'').to_string()));
        }

        if let Some((_, reason)) = message.split_once("reverted with custom error '") {
            let name = reason.split('(').next().unwrap_or_default();
            return Some(Self::CustomError(name.to_string()));
        }

        if let Some((_, reason)) = message.split_once("execution reverted: ") {
            return Some(Self::Message(reason.trim().to_string()));
        }

        message
            .contains("execution reverted")
            .then_some(Self::Unknown)
    }

    /// Whether this is the panic raised for an out-of-bounds index.
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, Self::Panic(code) if *code == U256::from(PANIC_ARRAY_OUT_OF_BOUNDS))
    }
}

impl fmt::Display for RevertReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(msg) => write!(f, "reverted with reason string '{msg}'"),
            Self::CustomError(name) => write!(f, "reverted with custom error '{name}()'"),
            Self::Panic(code) => write!(f, "reverted with panic code {code:#x}"),
            Self::Unknown => write!(f, "reverted without a reason"),
        }
    }
}
