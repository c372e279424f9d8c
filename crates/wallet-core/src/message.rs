//! Compact recoverable signatures over prefixed messages.
//!
//! The signed digest is `sha256d(prefix || compact_size(len) || message)`,
//! where the prefix is the coin's message magic (length byte included).
//! Signatures are 65 bytes: a header byte followed by `r || s`, base64
//! encoded.

use chain_utxo::address::detect_address_type;
use chain_utxo::script;
use chain_utxo::AddressType;
use coin_params::CoinNetworkParams;
use crypto_utils::hash::{hash160, sha256d};
use hd_keys::KeyPair;
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use tracing::debug;

use crate::error::WalletError;

const SIGNATURE_LEN: usize = 65;
/// Header base; recovery id and key-format flags are added to it.
const HEADER_BASE: u8 = 27;
const HEADER_COMPRESSED: u8 = 4;
/// Highest header in use (witness-pubkeyhash, recovery id 3).
const HEADER_MAX: u8 = 42;

/// Digest that gets signed for `message` on this coin.
pub fn message_hash(message: &[u8], params: &CoinNetworkParams) -> [u8; 32] {
    let mut data = Vec::with_capacity(params.message_prefix.len() + 9 + message.len());
    data.extend_from_slice(params.message_prefix.as_bytes());
    write_compact_size(&mut data, message.len() as u64);
    data.extend_from_slice(message);
    sha256d(&data)
}

/// Signs `message` with the pair's private key.
///
/// The header marks a compressed key (31..=34), which verifiers accept for
/// every keyhash address type.
pub fn sign_message(
    pair: &KeyPair,
    message: &[u8],
    params: &CoinNetworkParams,
) -> Result<String, WalletError> {
    let private = pair.require_private()?;
    let signing_key = SigningKey::from_slice(private.as_bytes())
        .map_err(|e| chain_utxo::UtxoError::InvalidPrivateKey(e.to_string()))?;
    let hash = message_hash(message, params);

    let (signature, recovery_id): (Signature, RecoveryId) = signing_key
        .sign_prehash(&hash)
        .map_err(|e| WalletError::MalformedSignature(e.to_string()))?;

    let mut sig = Vec::with_capacity(SIGNATURE_LEN);
    sig.push(HEADER_BASE + HEADER_COMPRESSED + recovery_id.to_byte());
    sig.extend_from_slice(&signature.to_bytes());
    debug!(coin = %params.coin, len = message.len(), "signed message");
    Ok(base64::encode(sig))
}

/// Checks `signature` over `message` against `address`.
///
/// Returns `Ok(false)` when the signature is well formed but was made by a
/// different key. Malformed signatures and unrecognised addresses are
/// errors.
pub fn verify_message(
    address: &str,
    signature: &str,
    message: &[u8],
    params: &CoinNetworkParams,
) -> Result<bool, WalletError> {
    let destination = detect_address_type(address, params)?;
    let (public_key, compressed) = recover_public_key(signature, message, params)?;
    let key_hash = hash160(&public_key);

    let expected = match destination.address_type {
        AddressType::PubKeyHash | AddressType::AltPubKeyHash => script::p2pkh(&key_hash),
        AddressType::WitnessPubKeyHash if compressed => script::p2wpkh(&key_hash),
        AddressType::ScriptHash if compressed => script::p2sh_of(&script::p2wpkh(&key_hash)),
        other => {
            debug!(address_type = %other, compressed, "no single-key template to verify against");
            return Ok(false);
        }
    };
    Ok(expected == destination.locking_script)
}

/// Recovers the signer's public key in the format the header declares.
pub fn recover_public_key(
    signature: &str,
    message: &[u8],
    params: &CoinNetworkParams,
) -> Result<(Vec<u8>, bool), WalletError> {
    let raw = base64::decode(signature.trim())
        .map_err(|e| WalletError::MalformedSignature(format!("base64: {e}")))?;
    if raw.len() != SIGNATURE_LEN {
        return Err(WalletError::MalformedSignature(format!(
            "expected {SIGNATURE_LEN} bytes, got {}",
            raw.len()
        )));
    }
    let header = raw[0];
    if !(HEADER_BASE..=HEADER_MAX).contains(&header) {
        return Err(WalletError::MalformedSignature(format!("header byte {header}")));
    }
    let offset = header - HEADER_BASE;
    let compressed = offset >= HEADER_COMPRESSED;
    let recovery_id = RecoveryId::from_byte(offset % 4)
        .ok_or_else(|| WalletError::MalformedSignature(format!("header byte {header}")))?;
    let sig = Signature::from_slice(&raw[1..])
        .map_err(|e| WalletError::MalformedSignature(e.to_string()))?;

    let hash = message_hash(message, params);
    let key = VerifyingKey::recover_from_prehash(&hash, &sig, recovery_id)
        .map_err(|e| WalletError::SignatureMismatch(format!("key recovery failed: {e}")))?;
    let encoded = key.to_encoded_point(compressed);
    Ok((encoded.as_bytes().to_vec(), compressed))
}

fn write_compact_size(out: &mut Vec<u8>, n: u64) {
    match n {
        0..=0xfc => out.push(n as u8),
        0xfd..=0xffff => {
            out.push(0xfd);
            out.extend_from_slice(&(n as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            out.push(0xfe);
            out.extend_from_slice(&(n as u32).to_le_bytes());
        }
        _ => {
            out.push(0xff);
            out.extend_from_slice(&n.to_le_bytes());
        }
    }
}
