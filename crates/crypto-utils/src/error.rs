use thiserror::Error;

/// Primitive encoding and hashing errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    #[error("base58check checksum mismatch")]
    InvalidChecksum,

    #[error("invalid input: {0}")]
    InvalidInput(String),
}
