//! Keccak-256 hashing and signature digests

use calldata_primitives::{H256, SELECTOR_LEN};
use sha3::{Digest, Keccak256};

/// Compute Keccak-256 hash of the input data
pub fn keccak256(data: &[u8]) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    H256::from_bytes(result.into())
}

/// Compute the 4-byte function selector for a canonical signature string,
/// e.g. `"transfer(address,uint256)"`.
pub fn function_selector(signature: &str) -> [u8; SELECTOR_LEN] {
    let hash = keccak256(signature.as_bytes());
    let mut selector = [0u8; SELECTOR_LEN];
    selector.copy_from_slice(&hash.as_bytes()[..SELECTOR_LEN]);
    selector
}

/// Compute the 32-byte event topic for a canonical signature string,
/// e.g. `"Transfer(address,address,uint256)"`.
pub fn event_topic(signature: &str) -> H256 {
    keccak256(signature.as_bytes())
}
