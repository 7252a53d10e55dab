//! # calldata-crypto
//!
//! Keccak-256 hashing for the calldata ABI codec.
//!
//! - Keccak-256 digests
//! - 4-byte function selectors from canonical signature strings
//! - 32-byte event topics from canonical signature strings

#![warn(missing_docs)]
#![warn(clippy::all)]

mod hash;

pub use hash::{event_topic, function_selector, keccak256};
