use chain_utxo::address::{address_from_script, script_from_pubkey};
use chain_utxo::script::Template;
use chain_utxo::{AddressType, UtxoError};
use coin_params::{CoinNetworkParams, DerivationPurpose};
use hd_keys::{leaf_key_pair, ExtendedKey, KeyPair};
use tracing::debug;

use crate::error::WalletError;
use crate::hd_derivation::account_path;
use crate::types::DerivedAddress;

/// Keyhash template conventionally paired with a derivation purpose.
pub fn address_type_for_purpose(purpose: DerivationPurpose) -> AddressType {
    match purpose {
        DerivationPurpose::Legacy => AddressType::PubKeyHash,
        DerivationPurpose::Witness => AddressType::WitnessPubKeyHash,
        DerivationPurpose::WrappedWitness => AddressType::WrappedWitnessPubKeyHash,
    }
}

/// Like [`address_type_for_purpose`], but legacy keys on a coin with a
/// cashaddr prefix render in that encoding.
pub fn preferred_address_type(
    purpose: DerivationPurpose,
    params: &CoinNetworkParams,
) -> AddressType {
    match address_type_for_purpose(purpose) {
        AddressType::PubKeyHash if params.alt_prefix().is_some() => AddressType::AltPubKeyHash,
        other => other,
    }
}

/// Address of `pair` under a keyhash template.
pub fn address_for_key(
    pair: &KeyPair,
    address_type: AddressType,
    params: &CoinNetworkParams,
) -> Result<String, WalletError> {
    let scripts = script_from_pubkey(&pair.public_key_hex(), address_type)?;
    Ok(address_from_script(&scripts.locking_script, address_type, params)?)
}

/// Derives `account_node/change/index` and renders its address.
///
/// `account` is only used to report the full path; `account_node` must
/// already sit at `m/purpose'/coin_type'/account'`.
pub fn derive_address(
    account_node: &ExtendedKey,
    purpose: DerivationPurpose,
    params: &CoinNetworkParams,
    account: u32,
    change: u32,
    index: u32,
) -> Result<DerivedAddress, WalletError> {
    let pair = leaf_key_pair(account_node, change, index)?;
    let address_type = preferred_address_type(purpose, params);
    let address = address_for_key(&pair, address_type, params)?;
    let derivation_path = format!("{}/{change}/{index}", account_path(purpose, params, account));
    debug!(coin = %params.coin, %derivation_path, %address_type, "derived address");

    Ok(DerivedAddress {
        coin: params.coin.clone(),
        network: params.network,
        address,
        address_type,
        purpose,
        derivation_path,
        public_key: pair.public_key_hex(),
    })
}

/// `count` consecutive addresses starting at `start` on one branch.
pub fn derive_addresses(
    account_node: &ExtendedKey,
    purpose: DerivationPurpose,
    params: &CoinNetworkParams,
    account: u32,
    change: u32,
    start: u32,
    count: u32,
) -> Result<Vec<DerivedAddress>, WalletError> {
    let end = start.checked_add(count).ok_or_else(|| hd_keys::KeyError::InvalidPath {
        path: format!("{change}/{start}+{count}"),
        reason: "address range overflows".into(),
    })?;
    (start..end)
        .map(|index| derive_address(account_node, purpose, params, account, change, index))
        .collect()
}

/// Template to render a wallet-owned output with.
///
/// The path purpose decides, except for a scripthash output found on a
/// legacy path: those are replay-protected outputs and render as
/// scripthash-wrapped witness-pubkeyhash.
pub fn display_address_type(
    script: &[u8],
    purpose: DerivationPurpose,
) -> Result<AddressType, WalletError> {
    let by_purpose = address_type_for_purpose(purpose);
    let template = Template::classify(script).ok_or_else(|| UtxoError::MalformedScript {
        expected: by_purpose,
        script: hex::encode(script),
    })?;
    Ok(match (template, purpose) {
        (Template::ScriptHash(_), DerivationPurpose::Legacy) => {
            AddressType::WrappedWitnessPubKeyHash
        }
        _ => by_purpose,
    })
}

/// Address text for a wallet-owned output script.
pub fn display_address(
    script: &[u8],
    purpose: DerivationPurpose,
    params: &CoinNetworkParams,
) -> Result<String, WalletError> {
    let address_type = match display_address_type(script, purpose)? {
        AddressType::PubKeyHash if params.alt_prefix().is_some() => AddressType::AltPubKeyHash,
        other => other,
    };
    Ok(address_from_script(script, address_type, params)?)
}
