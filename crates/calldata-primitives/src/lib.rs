//! # calldata-primitives
//!
//! Primitive types for the calldata ABI codec.
//!
//! Provides the 20-byte [`Address`] and 32-byte [`H256`] types used by the
//! encoder and decoder, together with the word-padding conversions the ABI
//! layout is built on (every scalar occupies one 32-byte slot).

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod error;
mod hash;

pub use address::{Address, AddressError};
pub use error::PrimitiveError;
pub use hash::{H256, HashError};

// Re-export primitive-types for U256
pub use primitive_types::U256;

/// Width of an ABI word in bytes. Every head slot and every scalar value
/// occupies exactly one word.
pub const WORD_LEN: usize = 32;

/// Width of a function selector in bytes.
pub const SELECTOR_LEN: usize = 4;
