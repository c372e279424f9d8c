//! Address text ↔ locking script translation.

use bech32::{segwit, Hrp};
use bitcoin::secp256k1::PublicKey;
use cashaddr::HashKind;
use coin_params::CoinNetworkParams;
use crypto_utils::base58;
use crypto_utils::hash::hash160;
use tracing::{debug, trace};

use crate::error::UtxoError;
use crate::script::{self, Template};
use crate::types::{AddressType, Destination, PubkeyScripts};

/// Locking script for `address`.
///
/// With a type hint only that decoder runs. Without one, decoders are tried
/// in [`AddressType::DETECTION_ORDER`] and the first success wins.
pub fn script_from_address(
    address: &str,
    address_type: Option<AddressType>,
    params: &CoinNetworkParams,
) -> Result<Vec<u8>, UtxoError> {
    match address_type {
        Some(kind) => decode_as(address, kind, params),
        None => detect_address_type(address, params).map(|dest| dest.locking_script),
    }
}

/// Runs the ordered decoder list and reports which template matched.
pub fn detect_address_type(
    address: &str,
    params: &CoinNetworkParams,
) -> Result<Destination, UtxoError> {
    for kind in AddressType::DETECTION_ORDER {
        let attempt = if kind.is_alt() {
            decode_alt(address, params)
        } else {
            decode_as(address, kind, params).map(|script| (kind, script))
        };
        match attempt {
            Ok((address_type, locking_script)) => {
                debug!(coin = %params.coin, %address_type, "address decoded");
                return Ok(Destination {
                    address_type,
                    locking_script,
                });
            }
            Err(e) => trace!(%kind, error = %e, "decoder rejected address"),
        }
    }
    Err(UtxoError::UnrecognizedAddress(address.to_string()))
}

/// Renders `script` as an address of `address_type`.
pub fn address_from_script(
    script: &[u8],
    address_type: AddressType,
    params: &CoinNetworkParams,
) -> Result<String, UtxoError> {
    let template = committed_template(script, address_type)?;
    match template {
        Template::PubKeyHash(hash) | Template::ScriptHash(hash) if address_type.is_alt() => {
            let prefix = alt_prefix(address_type, params)?;
            let kind = if matches!(template, Template::PubKeyHash(_)) {
                HashKind::PubKeyHash
            } else {
                HashKind::ScriptHash
            };
            cashaddr::encode(prefix, kind, &hash).map_err(|e| UtxoError::InvalidAddress {
                address_type,
                reason: e.to_string(),
            })
        }
        Template::PubKeyHash(hash) => Ok(base58_address(params.pubkey_hash, &hash)),
        Template::ScriptHash(hash) => Ok(base58_address(params.script_hash, &hash)),
        Template::WitnessPubKeyHash(_) | Template::WitnessScriptHash(_) => {
            let hrp = witness_hrp(address_type, params)?;
            segwit::encode(hrp, segwit::VERSION_0, template.hash()).map_err(|e| {
                UtxoError::InvalidAddress {
                    address_type,
                    reason: e.to_string(),
                }
            })
        }
    }
}

/// The hash a locking script of `address_type` commits to.
pub fn script_hash_from_script(
    script: &[u8],
    address_type: AddressType,
) -> Result<Vec<u8>, UtxoError> {
    Ok(committed_template(script, address_type)?.hash().to_vec())
}

/// Locking script, and redeem script where the template wraps one, for a
/// raw public key.
///
/// Only the keyhash families are built here; scripthash templates need
/// their script, not just a key.
pub fn script_from_pubkey(
    pubkey_hex: &str,
    address_type: AddressType,
) -> Result<PubkeyScripts, UtxoError> {
    let pubkey = hex::decode(pubkey_hex)
        .map_err(|e| UtxoError::InvalidPublicKey(format!("pubkey hex: {e}")))?;
    PublicKey::from_slice(&pubkey)
        .map_err(|e| UtxoError::InvalidPublicKey(format!("pubkey: {e}")))?;
    if address_type.is_witness() && pubkey.len() != 33 {
        return Err(UtxoError::InvalidPublicKey(format!(
            "{address_type} requires a compressed key, got {} bytes",
            pubkey.len()
        )));
    }

    let key_hash = hash160(&pubkey);
    let scripts = match address_type {
        AddressType::PubKeyHash | AddressType::AltPubKeyHash => PubkeyScripts {
            locking_script: script::p2pkh(&key_hash),
            redeem_script: None,
        },
        AddressType::WitnessPubKeyHash => PubkeyScripts {
            locking_script: script::p2wpkh(&key_hash),
            redeem_script: None,
        },
        AddressType::WrappedWitnessPubKeyHash => {
            let redeem = script::p2wpkh(&key_hash);
            PubkeyScripts {
                locking_script: script::p2sh_of(&redeem),
                redeem_script: Some(redeem),
            }
        }
        AddressType::ScriptHash
        | AddressType::WitnessScriptHash
        | AddressType::WrappedWitnessScriptHash
        | AddressType::AltScriptHash => {
            return Err(UtxoError::NotKeyHashTemplate(address_type))
        }
    };
    Ok(scripts)
}

fn decode_as(
    address: &str,
    address_type: AddressType,
    params: &CoinNetworkParams,
) -> Result<Vec<u8>, UtxoError> {
    match address_type {
        AddressType::PubKeyHash => {
            let hash = decode_base58(address, params.pubkey_hash, address_type)?;
            Ok(script::p2pkh(&hash))
        }
        AddressType::ScriptHash
        | AddressType::WrappedWitnessPubKeyHash
        | AddressType::WrappedWitnessScriptHash => {
            let hash = decode_base58(address, params.script_hash, address_type)?;
            Ok(script::p2sh(&hash))
        }
        AddressType::WitnessPubKeyHash | AddressType::WitnessScriptHash => {
            decode_witness(address, address_type, params)
        }
        AddressType::AltPubKeyHash | AddressType::AltScriptHash => {
            let (found, script) = decode_alt(address, params)?;
            if found != address_type {
                return Err(UtxoError::InvalidAddress {
                    address_type,
                    reason: format!("address encodes a {found} hash"),
                });
            }
            Ok(script)
        }
    }
}

fn decode_base58(
    address: &str,
    version: u8,
    address_type: AddressType,
) -> Result<[u8; 20], UtxoError> {
    let invalid = |reason: String| UtxoError::InvalidAddress {
        address_type,
        reason,
    };
    let payload = base58::decode_check(address).map_err(|e| invalid(e.to_string()))?;
    let (found, hash) = match payload.split_first() {
        Some((found, hash)) if hash.len() == 20 => (*found, hash),
        _ => return Err(invalid(format!("payload is {} bytes, expected 21", payload.len()))),
    };
    if found != version {
        return Err(invalid(format!(
            "version byte {found:#04x}, expected {version:#04x}"
        )));
    }
    hash.try_into()
        .map_err(|_| invalid("hash is not 20 bytes".into()))
}

fn decode_witness(
    address: &str,
    address_type: AddressType,
    params: &CoinNetworkParams,
) -> Result<Vec<u8>, UtxoError> {
    let expected_hrp = witness_hrp(address_type, params)?;
    let invalid = |reason: String| UtxoError::InvalidAddress {
        address_type,
        reason,
    };
    let (hrp, version, program) = segwit::decode(address).map_err(|e| invalid(e.to_string()))?;
    if hrp != expected_hrp {
        return Err(invalid(format!("prefix {hrp}, expected {expected_hrp}")));
    }
    if version != segwit::VERSION_0 {
        return Err(invalid(format!("witness version {}", version.to_u8())));
    }
    let template = match address_type {
        AddressType::WitnessPubKeyHash => {
            <[u8; 20]>::try_from(program.as_slice()).map(Template::WitnessPubKeyHash)
        }
        _ => <[u8; 32]>::try_from(program.as_slice()).map(Template::WitnessScriptHash),
    }
    .map_err(|_| invalid(format!("program is {} bytes", program.len())))?;
    Ok(template.to_script())
}

fn decode_alt(
    address: &str,
    params: &CoinNetworkParams,
) -> Result<(AddressType, Vec<u8>), UtxoError> {
    let prefix = alt_prefix(AddressType::AltPubKeyHash, params)?;
    let invalid = |reason: String| UtxoError::InvalidAddress {
        address_type: AddressType::AltPubKeyHash,
        reason,
    };
    let decoded = cashaddr::decode(address, prefix).map_err(|e| invalid(e.to_string()))?;
    if decoded.prefix != prefix {
        return Err(invalid(format!("prefix {}, expected {prefix}", decoded.prefix)));
    }
    let hash: [u8; 20] = decoded
        .hash
        .as_slice()
        .try_into()
        .map_err(|_| invalid(format!("{}-byte hash, expected 20", decoded.hash.len())))?;
    Ok(match decoded.kind {
        HashKind::PubKeyHash => (AddressType::AltPubKeyHash, script::p2pkh(&hash)),
        HashKind::ScriptHash => (AddressType::AltScriptHash, script::p2sh(&hash)),
    })
}

/// Classifies `script` and checks it is the template `address_type` uses.
fn committed_template(script: &[u8], address_type: AddressType) -> Result<Template, UtxoError> {
    let template = Template::classify(script);
    let fits = match (address_type, template) {
        (AddressType::PubKeyHash | AddressType::AltPubKeyHash, Some(Template::PubKeyHash(_))) => {
            true
        }
        (
            AddressType::ScriptHash
            | AddressType::WrappedWitnessPubKeyHash
            | AddressType::WrappedWitnessScriptHash
            | AddressType::AltScriptHash,
            Some(Template::ScriptHash(_)),
        ) => true,
        (AddressType::WitnessPubKeyHash, Some(Template::WitnessPubKeyHash(_))) => true,
        (AddressType::WitnessScriptHash, Some(Template::WitnessScriptHash(_))) => true,
        _ => false,
    };
    match template {
        Some(template) if fits => Ok(template),
        _ => Err(UtxoError::MalformedScript {
            expected: address_type,
            script: hex::encode(script),
        }),
    }
}

fn base58_address(version: u8, hash: &[u8; 20]) -> String {
    let mut payload = Vec::with_capacity(21);
    payload.push(version);
    payload.extend_from_slice(hash);
    base58::encode_check(&payload)
}

fn witness_hrp(address_type: AddressType, params: &CoinNetworkParams) -> Result<Hrp, UtxoError> {
    let hrp = params
        .witness_hrp()
        .ok_or_else(|| UtxoError::UnsupportedAddressType {
            address_type,
            coin: params.coin.clone(),
            reason: "coin has no witness address prefix".into(),
        })?;
    Hrp::parse(hrp).map_err(|e| UtxoError::UnsupportedAddressType {
        address_type,
        coin: params.coin.clone(),
        reason: format!("witness prefix {hrp:?}: {e}"),
    })
}

fn alt_prefix<'a>(
    address_type: AddressType,
    params: &'a CoinNetworkParams,
) -> Result<&'a str, UtxoError> {
    params
        .alt_prefix()
        .ok_or_else(|| UtxoError::UnsupportedAddressType {
            address_type,
            coin: params.coin.clone(),
            reason: "coin has no alternative address prefix".into(),
        })
}
