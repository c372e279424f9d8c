//! UTXO-chain scripts, addresses and transactions.
//!
//! Converts between address text, locking scripts and committed hashes for
//! every supported address template, and assembles and signs transactions
//! spending those templates. Version bytes and prefixes come from
//! [`coin_params::CoinNetworkParams`], so the same code serves every coin in
//! the table.

pub mod address;
pub mod error;
pub mod input;
pub mod script;
pub mod transaction;
pub mod types;

pub use error::UtxoError;
pub use types::{AddressType, Destination, PubkeyScripts};
