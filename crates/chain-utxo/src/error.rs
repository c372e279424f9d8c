use thiserror::Error;

use crate::types::AddressType;

/// Address, script and transaction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UtxoError {
    #[error("unknown address type: {0}")]
    UnknownAddressType(String),

    #[error("address not recognised by any decoder: {0}")]
    UnrecognizedAddress(String),

    #[error("invalid {address_type} address: {reason}")]
    InvalidAddress {
        address_type: AddressType,
        reason: String,
    },

    #[error("address type {address_type} not supported for {coin}: {reason}")]
    UnsupportedAddressType {
        address_type: AddressType,
        coin: String,
        reason: String,
    },

    #[error("{0} is not built from a bare public key")]
    NotKeyHashTemplate(AddressType),

    #[error("script does not match the {expected} template: {script}")]
    MalformedScript {
        expected: AddressType,
        script: String,
    },

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("transaction has no {0}")]
    EmptyTransaction(&'static str),

    #[error("input {index} is missing {field}")]
    MissingInputData { index: usize, field: &'static str },

    #[error("input {index} is invalid: {reason}")]
    InvalidInput { index: usize, reason: String },

    #[error("input index {index} out of range ({count} inputs)")]
    InputOutOfRange { index: usize, count: usize },

    #[error("input {index} spends an unsupported script: {reason}")]
    UnsupportedScript { index: usize, reason: String },

    #[error("signature for input {index} rejected: {reason}")]
    SignatureInvalid { index: usize, reason: String },

    #[error("inputs without a signature: {0:?}")]
    IncompleteSignatures(Vec<usize>),

    #[error("transaction decode error: {0}")]
    InvalidTransaction(String),
}
