//! # calldata-abi
//!
//! Ethereum ABI calldata encoding and decoding.
//!
//! This crate translates typed value trees into the flat, word-aligned
//! binary layout contract calls use, and back:
//!
//! - **Signature parsing**: `"(address,uint256[])[3]"` into a [`DataItem`]
//!   type tree
//! - **Encoding**: head/tail layout with region-relative pointer words,
//!   byte-exact with the on-chain format
//! - **Decoding**: bounds-checked reconstruction of the value tree
//! - **Dispatch**: an explicit [`AbiRegistry`] matching calldata and event
//!   logs against registered contract ABIs by selector/topic
//!
//! # Example
//!
//! ```rust
//! use calldata_abi::{decode, encode, Token};
//! use calldata_primitives::Address;
//!
//! let values = vec![
//!     Token::Address(Address::ZERO),
//!     Token::Bytes(vec![0xde, 0xad, 0xbe, 0xef]),
//! ];
//! let data = encode("(address,bytes)", &values).unwrap();
//! assert_eq!(decode("(address,bytes)", &data).unwrap(), values);
//! ```
//!
//! # Dispatching calldata
//!
//! ```rust
//! use calldata_abi::{AbiRegistry, DataItem, Token};
//! use calldata_abi::encode_function_call;
//! use calldata_primitives::Address;
//!
//! let mut registry = AbiRegistry::new();
//! registry.add_abi_json(
//!     r#"[{
//!         "name": "foobar",
//!         "type": "function",
//!         "inputs": [{"name": "testAddress", "type": "address"}],
//!         "outputs": [{"name": "butter", "type": "string"}]
//!     }]"#,
//!     "newContract",
//! ).unwrap();
//!
//! let selector = calldata_crypto::function_selector("foobar(address)");
//! let calldata = encode_function_call(
//!     selector,
//!     &[DataItem::new("address")],
//!     &[Token::Address(Address::ZERO)],
//! ).unwrap();
//!
//! let call = registry.decode_calldata(&calldata, Some("newContract")).unwrap();
//! assert_eq!(call.function_name, "foobar");
//! assert_eq!(call.arguments[0].0, "testAddress");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod blocks;
pub mod classify;
pub mod contract;
mod dataitem;
mod decode;
mod encode;
mod error;
mod parser;
mod registry;
mod token;

pub use dataitem::{canonical_signature, parse_abi_json, AbiEntry, AbiParam, DataItem};
pub use decode::{decode_params, decode_return, ReturnData};
pub use encode::{encode_function_call, encode_params};
pub use error::AbiError;
pub use parser::{parse, parse_with, ParserConfig};
pub use registry::{AbiRegistry, DecodedCall, DecodedLog};
pub use token::{I256, Token};

/// Encode values against a type signature string.
///
/// A tuple signature (`"(address,uint256)"`) takes one value per component;
/// any other signature is a single parameter.
pub fn encode(signature: &str, values: &[Token]) -> Result<Vec<u8>, AbiError> {
    let root = parse(signature)?;
    encode_params(&signature_params(root), values)
}

/// Decode a buffer against a type signature string; the inverse of
/// [`encode`].
pub fn decode(signature: &str, data: &[u8]) -> Result<Vec<Token>, AbiError> {
    let root = parse(signature)?;
    decode_params(&signature_params(root), data)
}

/// A bare tuple signature is a parameter list; everything else (including
/// arrays of tuple) is one parameter.
fn signature_params(root: DataItem) -> Vec<DataItem> {
    if root.ty == "tuple" {
        root.components
    } else {
        vec![root]
    }
}
