//! Checksummed `prefix:payload` address encoding with a 40-bit BCH checksum.
//!
//! The codec only knows about (type tag, hash) pairs. Which prefix belongs to
//! which coin and network lives in the coin table.

pub mod codec;
pub mod error;

pub use codec::{decode, encode, Decoded, HashKind};
pub use error::CashAddrError;
