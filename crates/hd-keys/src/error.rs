use coin_params::ParamsError;
use crypto_utils::CryptoError;
use thiserror::Error;

/// Key derivation and key serialization errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("private key required: {0}")]
    PrivateKeyRequired(String),

    #[error("invalid checksum in {0}")]
    InvalidChecksum(&'static str),

    #[error("version bytes {found} do not match {expected}")]
    VersionMismatch { found: String, expected: String },

    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error("invalid derivation path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    #[error("invalid {field}: {reason}")]
    Malformed { field: &'static str, reason: String },

    #[error("derivation produced an invalid key at index {0}, use the next index")]
    InvalidChild(u32),
}

impl KeyError {
    pub(crate) fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        KeyError::Malformed {
            field,
            reason: reason.into(),
        }
    }

    /// Maps a Base58Check failure in `field` to the matching key error.
    pub(crate) fn from_base58(field: &'static str, err: CryptoError) -> Self {
        match err {
            CryptoError::InvalidChecksum => KeyError::InvalidChecksum(field),
            other => KeyError::malformed(field, other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coin_params::{DerivationPurpose, Network};

    #[test]
    fn display_private_key_required() {
        let err = KeyError::PrivateKeyRequired("hardened child 0'".into());
        assert_eq!(err.to_string(), "private key required: hardened child 0'");
    }

    #[test]
    fn display_version_mismatch() {
        let err = KeyError::VersionMismatch {
            found: "04b24746".into(),
            expected: "BTC mainnet legacy".into(),
        };
        assert_eq!(
            err.to_string(),
            "version bytes 04b24746 do not match BTC mainnet legacy"
        );
    }

    #[test]
    fn params_error_is_transparent() {
        let err: KeyError = ParamsError::UnsupportedPurpose {
            coin: "DOGE".into(),
            network: Network::Mainnet,
            purpose: DerivationPurpose::Witness,
        }
        .into();
        assert!(err.to_string().contains("DOGE"));
    }

    #[test]
    fn base58_checksum_maps_to_invalid_checksum() {
        let err = KeyError::from_base58("extended key", CryptoError::InvalidChecksum);
        assert_eq!(err, KeyError::InvalidChecksum("extended key"));
        let err = KeyError::from_base58("wif", CryptoError::InvalidBase58("bad char".into()));
        assert!(matches!(err, KeyError::Malformed { field: "wif", .. }));
    }
}
