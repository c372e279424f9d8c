use thiserror::Error;

use crate::network::Network;
use crate::params::DerivationPurpose;

/// Coin table lookup and loading errors. All are configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParamsError {
    #[error("unknown coin: {0}")]
    UnknownCoin(String),

    #[error("coin {coin} ({network}) has no extended-key versions for the {purpose} purpose")]
    UnsupportedPurpose {
        coin: String,
        network: Network,
        purpose: DerivationPurpose,
    },

    #[error("unknown network: {0}")]
    UnknownNetwork(String),

    #[error("invalid coin table: {0}")]
    InvalidTable(String),
}
