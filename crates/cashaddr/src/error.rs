use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CashAddrError {
    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("unsupported prefix: {0:?}")]
    UnsupportedPrefix(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}
