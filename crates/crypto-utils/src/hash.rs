use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Single SHA-256.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Double SHA-256, used for Base58Check checksums, txids and signed-message digests.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    Sha256::digest(Sha256::digest(data)).into()
}

/// HASH160 = RIPEMD-160(SHA-256(data)).
///
/// Commits public keys in pubkeyhash templates and redeem scripts in
/// scripthash templates.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(Sha256::digest(data)).into()
}
