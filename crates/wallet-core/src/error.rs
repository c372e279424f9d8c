use cashaddr::CashAddrError;
use chain_utxo::UtxoError;
use coin_params::ParamsError;
use crypto_utils::CryptoError;
use hd_keys::KeyError;
use thiserror::Error;

/// Coarse classification of a [`WalletError`].
///
/// Nothing is retryable: every operation is a pure function of its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown coin, or a purpose/address type the coin does not support.
    Configuration,
    /// Bad checksum, malformed script or key, unrecognised address.
    Format,
    /// Missing input data, rejected signature, incomplete signing.
    Validation,
    /// Hardened derivation or signing attempted with a public-only key.
    PrivateKeyRequired,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    CashAddr(#[from] CashAddrError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Utxo(#[from] UtxoError),

    #[error("malformed message signature: {0}")]
    MalformedSignature(String),

    #[error("message signature does not match {0}")]
    SignatureMismatch(String),

    #[error("fee rate undefined for weight {weight}")]
    InvalidWeight { weight: u64 },

    #[error("outputs exceed inputs by {0}")]
    NegativeFee(u64),
}

impl WalletError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WalletError::Params(_) => ErrorKind::Configuration,
            WalletError::Crypto(_) | WalletError::CashAddr(_) => ErrorKind::Format,
            WalletError::Key(err) => match err {
                KeyError::PrivateKeyRequired(_) => ErrorKind::PrivateKeyRequired,
                KeyError::Params(_) => ErrorKind::Configuration,
                KeyError::InvalidChecksum(_)
                | KeyError::VersionMismatch { .. }
                | KeyError::InvalidPath { .. }
                | KeyError::Malformed { .. } => ErrorKind::Format,
                KeyError::InvalidSeed(_) | KeyError::InvalidChild(_) => ErrorKind::Validation,
            },
            WalletError::Utxo(err) => match err {
                UtxoError::UnsupportedAddressType { .. } | UtxoError::NotKeyHashTemplate(_) => {
                    ErrorKind::Configuration
                }
                UtxoError::UnknownAddressType(_)
                | UtxoError::UnrecognizedAddress(_)
                | UtxoError::InvalidAddress { .. }
                | UtxoError::MalformedScript { .. }
                | UtxoError::InvalidPublicKey(_)
                | UtxoError::InvalidPrivateKey(_)
                | UtxoError::InvalidTransaction(_) => ErrorKind::Format,
                UtxoError::EmptyTransaction(_)
                | UtxoError::MissingInputData { .. }
                | UtxoError::InvalidInput { .. }
                | UtxoError::InputOutOfRange { .. }
                | UtxoError::UnsupportedScript { .. }
                | UtxoError::SignatureInvalid { .. }
                | UtxoError::IncompleteSignatures(_) => ErrorKind::Validation,
            },
            WalletError::MalformedSignature(_) => ErrorKind::Format,
            WalletError::SignatureMismatch(_)
            | WalletError::InvalidWeight { .. }
            | WalletError::NegativeFee(_) => ErrorKind::Validation,
        }
    }

    /// Always `false`; retrying with the same input gives the same error.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
