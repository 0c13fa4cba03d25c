//! Storage Slot Layout - Solidity Storage Location Math
//!
//! Computes where Solidity places dynamic data: array elements live at
//! `keccak256(slot) + index`, mapping values at `keccak256(key . slot)`.

use alloy::primitives::{Address, B256, U256, keccak256};

/// Number of sequential slots the storage inspector dumps.
pub const INSPECTED_SLOTS: u64 = 10;

/// Slot holding the length of `FunWithStorage.myArray`.
pub const FUN_WITH_STORAGE_ARRAY_SLOT: u64 = 2;

/// Location of element `index` of the dynamic array declared at `slot`.
pub fn array_element_slot(slot: U256, index: U256) -> U256 {
    let base = U256::from_be_bytes(keccak256(B256::from(slot)).0);
    base.wrapping_add(index)
}

/// Location of `mapping[key]` for a mapping declared at `slot`.
pub fn mapping_value_slot(key: B256, slot: U256) -> U256 {
    let mut preimage = [0u8; 64];
    preimage[..32].copy_from_slice(key.as_slice());
    preimage[32..].copy_from_slice(B256::from(slot).as_slice());
    U256::from_be_bytes(keccak256(preimage).0)
}

/// Location of `mapping[address]` for a mapping declared at `slot`.
pub fn address_mapping_slot(key: Address, slot: U256) -> U256 {
    mapping_value_slot(key.into_word(), slot)
}
