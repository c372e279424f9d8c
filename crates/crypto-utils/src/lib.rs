//! # crypto-utils
//!
//! Hash primitives, Base58Check and zeroize-on-drop secret containers shared
//! by the key derivation, address and transaction crates.

pub mod base58;
pub mod error;
pub mod hash;
pub mod secret;

pub use error::CryptoError;
pub use secret::{PrivateKeyBytes, SecretBytes};
