//! # hd-keys
//!
//! BIP-32 hierarchical key derivation over secp256k1.
//!
//! Nodes ([`ExtendedKey`]) carry no version bytes: the purpose, coin and
//! network are supplied at the serialization boundary, so the same node can
//! be exported under any registered prefix.

pub mod error;
pub mod keypair;
pub mod path;
pub mod serialization;
pub mod xkey;

pub use error::KeyError;
pub use keypair::{leaf_key_pair, KeyPair};
pub use path::{ChildNumber, DerivationPath};
pub use serialization::{parse_extended, parse_extended_any, serialize_extended};
pub use xkey::ExtendedKey;
