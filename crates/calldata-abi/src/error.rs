//! ABI codec error types

use thiserror::Error;

/// ABI codec error type.
///
/// Every failure in this crate is surfaced synchronously through this enum;
/// the codec either fully succeeds or fully fails, never partially.
#[derive(Debug, Error)]
pub enum AbiError {
    /// An empty signature string was given to the parser
    #[error("empty signature")]
    EmptySignature,

    /// Signature string is not well-formed (unbalanced parentheses,
    /// empty components, trailing garbage)
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    /// A value's runtime shape does not match the declared type
    #[error("value does not match type `{expected}`: got {got}")]
    ValueTypeMismatch {
        /// The declared type token
        expected: String,
        /// A description of the value that was supplied
        got: String,
    },

    /// A fixed-size array value has the wrong number of elements
    #[error("fixed array length mismatch: expected {expected} elements, got {got}")]
    ArrayLengthMismatch {
        /// Declared element count
        expected: usize,
        /// Supplied element count
        got: usize,
    },

    /// A numeric or fixed-bytes value does not fit the declared width
    #[error("value out of range for `{ty}`: {value}")]
    ValueOutOfRange {
        /// The declared type token
        ty: String,
        /// A description of the offending value
        value: String,
    },

    /// A type token the classifier does not recognize
    #[error("unsupported type token: `{0}`")]
    UnsupportedType(String),

    /// The buffer is shorter than the decode position requires
    #[error("insufficient calldata: need {needed} bytes, have {available}")]
    InsufficientData {
        /// Minimum byte count required to continue decoding
        needed: usize,
        /// Bytes actually available
        available: usize,
    },

    /// A pointer word resolved outside the buffer
    #[error("invalid offset {offset} in buffer of {len} bytes")]
    InvalidOffset {
        /// The resolved offset value
        offset: usize,
        /// Total buffer length
        len: usize,
    },

    /// No registered template matches the calldata's 4-byte selector
    /// (or an event log's topic hash)
    #[error("unknown selector: 0x{0}")]
    UnknownSelector(String),

    /// A `string` value decoded to invalid UTF-8
    #[error("invalid utf-8 in string value: {0}")]
    InvalidUtf8(String),

    /// ABI JSON could not be parsed
    #[error("invalid ABI json: {0}")]
    InvalidJson(#[from] serde_json::Error),
}
