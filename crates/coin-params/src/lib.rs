//! Per-coin, per-network version bytes and prefixes.
//!
//! The table is an explicitly constructed, immutable value. Components that
//! need version bytes take a `&CoinNetworkParams` (or a `&CoinTable`) instead
//! of reaching for ambient state.

pub mod error;
pub mod network;
pub mod params;
pub mod table;

pub use error::ParamsError;
pub use network::Network;
pub use params::{CoinNetworkParams, DerivationPurpose, KeyVersions};
pub use table::CoinTable;
