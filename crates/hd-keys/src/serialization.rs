//! 78-byte extended key serialization with per-coin version bytes.

use coin_params::{CoinNetworkParams, DerivationPurpose};
use crypto_utils::base58;
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::KeyError;
use crate::path::ChildNumber;
use crate::xkey::ExtendedKey;

const PAYLOAD_LEN: usize = 78;

/// Base58Check-encodes `node` with the version pair registered for
/// `purpose` on this coin/network.
///
/// A coin without versions for `purpose` is an error, never a fallback to
/// another purpose's bytes.
pub fn serialize_extended(
    node: &ExtendedKey,
    purpose: DerivationPurpose,
    params: &CoinNetworkParams,
    is_private: bool,
) -> Result<String, KeyError> {
    let versions = params.key_versions(purpose)?;

    let mut payload = Zeroizing::new(Vec::with_capacity(PAYLOAD_LEN));
    payload.extend_from_slice(&versions.select(is_private));
    payload.push(node.depth());
    payload.extend_from_slice(&node.parent_fingerprint());
    payload.extend_from_slice(&node.child_number().to_u32().to_be_bytes());
    payload.extend_from_slice(node.chain_code());
    if is_private {
        let private = node.private_key().ok_or_else(|| {
            KeyError::PrivateKeyRequired("serializing a public-only node as private".into())
        })?;
        payload.push(0x00);
        payload.extend_from_slice(private.as_bytes());
    } else {
        payload.extend_from_slice(node.public_key());
    }

    Ok(base58::encode_check(&payload))
}

/// Parses a key serialized under `purpose` for this coin/network.
pub fn parse_extended(
    text: &str,
    purpose: DerivationPurpose,
    params: &CoinNetworkParams,
) -> Result<ExtendedKey, KeyError> {
    let versions = params.key_versions(purpose)?;
    let payload = decode_payload(text)?;
    let version = version_of(&payload);
    let is_private = versions
        .matches(version)
        .ok_or_else(|| KeyError::VersionMismatch {
            found: hex::encode(version),
            expected: format!("{} {} {purpose}", params.coin, params.network),
        })?;
    decode_body(&payload, is_private)
}

/// Parses a key under whichever registered purpose its version bytes name.
///
/// Returns the node with the purpose and privacy read from the prefix.
pub fn parse_extended_any(
    text: &str,
    params: &CoinNetworkParams,
) -> Result<(ExtendedKey, DerivationPurpose, bool), KeyError> {
    let payload = decode_payload(text)?;
    let version = version_of(&payload);
    let (purpose, is_private) =
        params
            .purpose_for_version(version)
            .ok_or_else(|| KeyError::VersionMismatch {
                found: hex::encode(version),
                expected: format!("any {} {} purpose", params.coin, params.network),
            })?;
    debug!(coin = %params.coin, %purpose, is_private, "extended key prefix recognised");
    Ok((decode_body(&payload, is_private)?, purpose, is_private))
}

fn decode_payload(text: &str) -> Result<Zeroizing<Vec<u8>>, KeyError> {
    let payload = Zeroizing::new(
        base58::decode_check(text).map_err(|e| KeyError::from_base58("extended key", e))?,
    );
    if payload.len() != PAYLOAD_LEN {
        return Err(KeyError::malformed(
            "extended key",
            format!("{} bytes, expected {PAYLOAD_LEN}", payload.len()),
        ));
    }
    Ok(payload)
}

fn version_of(payload: &[u8]) -> [u8; 4] {
    [payload[0], payload[1], payload[2], payload[3]]
}

fn decode_body(payload: &[u8], is_private: bool) -> Result<ExtendedKey, KeyError> {
    let depth = payload[4];
    let mut parent_fingerprint = [0u8; 4];
    parent_fingerprint.copy_from_slice(&payload[5..9]);
    let mut index = [0u8; 4];
    index.copy_from_slice(&payload[9..13]);
    let child_number = ChildNumber::from_u32(u32::from_be_bytes(index));
    let mut chain_code = [0u8; 32];
    chain_code.copy_from_slice(&payload[13..45]);
    let key = &payload[45..78];

    if depth == 0 && (parent_fingerprint != [0u8; 4] || child_number.to_u32() != 0) {
        return Err(KeyError::malformed(
            "extended key",
            "depth 0 with a parent fingerprint or child index",
        ));
    }

    if is_private {
        if key[0] != 0x00 {
            return Err(KeyError::malformed(
                "private key",
                format!("leading byte {:#04x}, expected 0x00", key[0]),
            ));
        }
        let mut scalar = Zeroizing::new([0u8; 32]);
        scalar.copy_from_slice(&key[1..]);
        ExtendedKey::from_private_bytes(
            &scalar,
            chain_code,
            depth,
            parent_fingerprint,
            child_number,
        )
    } else {
        let mut public = [0u8; 33];
        public.copy_from_slice(key);
        ExtendedKey::from_public_bytes(public, chain_code, depth, parent_fingerprint, child_number)
    }
}
