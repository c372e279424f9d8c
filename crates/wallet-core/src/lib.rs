//! # wallet-core
//!
//! Facade over the key, address and transaction crates: one error type
//! with a coarse [`ErrorKind`], account and address derivation from a
//! seed, display-template resolution for wallet-owned outputs, fee rates
//! and signed messages.
//!
//! Every entry point takes the [`CoinTable`] it should read version bytes
//! from; [`CoinTable::default_table`] is the built-in one.

pub mod address;
pub mod error;
pub mod fee;
pub mod hd_derivation;
pub mod message;
pub mod types;

use zeroize::Zeroizing;

pub use cashaddr::HashKind;
pub use chain_utxo::input::{LegacyInput, TransactionInput, TransactionOutput, WitnessInput};
pub use chain_utxo::transaction::{create_draft, Draft, DraftState, SignedTransaction};
pub use chain_utxo::{AddressType, Destination, PubkeyScripts};
pub use coin_params::{CoinNetworkParams, CoinTable, DerivationPurpose, KeyVersions, Network};
pub use crypto_utils::PrivateKeyBytes;
pub use error::{ErrorKind, WalletError};
pub use hd_keys::{leaf_key_pair, ChildNumber, DerivationPath, ExtendedKey, KeyPair};
pub use types::{DerivedAddress, ExtendedKeyInfo};

// ─── Keys ────────────────────────────────────────────────────────────
// Seeds are taken by value and wiped when the call returns.

/// Master node for `seed`.
pub fn seed_to_root(seed: Vec<u8>) -> Result<ExtendedKey, WalletError> {
    let seed = Zeroizing::new(seed);
    Ok(ExtendedKey::from_seed(&seed)?)
}

/// Derives `path` from the seed's master node.
pub fn derive_path(seed: Vec<u8>, path: &str) -> Result<ExtendedKey, WalletError> {
    let root = seed_to_root(seed)?;
    Ok(root.derive_path(path)?)
}

/// Serializes `node` under `purpose` for `coin` on `network`.
pub fn serialize_extended(
    table: &CoinTable,
    node: &ExtendedKey,
    coin: &str,
    network: Network,
    purpose: DerivationPurpose,
    is_private: bool,
) -> Result<String, WalletError> {
    let params = table.lookup(coin, network)?;
    Ok(hd_keys::serialize_extended(node, purpose, params, is_private)?)
}

/// Parses an extended key under one specific purpose.
pub fn parse_extended(
    table: &CoinTable,
    text: &str,
    coin: &str,
    network: Network,
    purpose: DerivationPurpose,
) -> Result<ExtendedKey, WalletError> {
    let params = table.lookup(coin, network)?;
    Ok(hd_keys::parse_extended(text, purpose, params)?)
}

/// Parses an extended key under whichever of the coin's version pairs it
/// carries, and reports which one that was.
pub fn parse_extended_any(
    table: &CoinTable,
    text: &str,
    coin: &str,
    network: Network,
) -> Result<(ExtendedKey, ExtendedKeyInfo), WalletError> {
    let params = table.lookup(coin, network)?;
    let (node, purpose, is_private) = hd_keys::parse_extended_any(text, params)?;
    let info = ExtendedKeyInfo {
        purpose,
        is_private,
        depth: node.depth(),
        fingerprint: hex::encode(node.fingerprint()),
    };
    Ok((node, info))
}

/// Account-level public key, e.g. the `zpub` for `m/84'/0'/0'`.
pub fn account_xpub(
    table: &CoinTable,
    seed: Vec<u8>,
    coin: &str,
    network: Network,
    purpose: DerivationPurpose,
    account: u32,
) -> Result<String, WalletError> {
    let params = table.lookup(coin, network)?;
    let root = seed_to_root(seed)?;
    hd_derivation::account_xpub(&root, purpose, params, account)
}

// ─── Addresses ───────────────────────────────────────────────────────

/// Derives the address at `m/purpose'/coin_type'/account'/change/index`.
#[allow(clippy::too_many_arguments)]
pub fn derive_address_from_seed(
    table: &CoinTable,
    seed: Vec<u8>,
    coin: &str,
    network: Network,
    purpose: DerivationPurpose,
    account: u32,
    change: u32,
    index: u32,
) -> Result<DerivedAddress, WalletError> {
    let params = table.lookup(coin, network)?;
    let root = seed_to_root(seed)?;
    let account_node = hd_derivation::derive_account(&root, purpose, params, account)?;
    address::derive_address(&account_node, purpose, params, account, change, index)
}

/// Derives an address from an account-level extended public key, so a
/// watch-only wallet can hand out receive addresses.
pub fn derive_address_from_xpub(
    table: &CoinTable,
    xpub: &str,
    coin: &str,
    network: Network,
    account: u32,
    change: u32,
    index: u32,
) -> Result<DerivedAddress, WalletError> {
    let params = table.lookup(coin, network)?;
    let (node, purpose, _) = hd_keys::parse_extended_any(xpub, params)?;
    address::derive_address(&node, purpose, params, account, change, index)
}

/// Which template `address` decodes as, with its locking script.
pub fn detect_address_type(
    table: &CoinTable,
    address: &str,
    coin: &str,
    network: Network,
) -> Result<Destination, WalletError> {
    let params = table.lookup(coin, network)?;
    Ok(chain_utxo::address::detect_address_type(address, params)?)
}

/// `true` if any decoder accepts `address` for this coin and network.
pub fn validate_address(
    table: &CoinTable,
    address: &str,
    coin: &str,
    network: Network,
) -> Result<bool, WalletError> {
    let params = table.lookup(coin, network)?;
    Ok(chain_utxo::address::detect_address_type(address, params).is_ok())
}

/// Locking script for an address, optionally forcing the template.
pub fn script_from_address(
    table: &CoinTable,
    address: &str,
    address_type: Option<AddressType>,
    coin: &str,
    network: Network,
) -> Result<Vec<u8>, WalletError> {
    let params = table.lookup(coin, network)?;
    Ok(chain_utxo::address::script_from_address(address, address_type, params)?)
}

pub fn address_from_script(
    table: &CoinTable,
    script: &[u8],
    address_type: AddressType,
    coin: &str,
    network: Network,
) -> Result<String, WalletError> {
    let params = table.lookup(coin, network)?;
    Ok(chain_utxo::address::address_from_script(script, address_type, params)?)
}

/// Hash the script commits to: the key hash for keyhash templates, the
/// script hash otherwise.
pub fn script_hash_from_script(script: &[u8], address_type: AddressType) -> Result<Vec<u8>, WalletError> {
    Ok(chain_utxo::address::script_hash_from_script(script, address_type)?)
}

// ─── Messages ────────────────────────────────────────────────────────

/// Signs `message` with a WIF private key.
pub fn sign_message_with_wif(
    table: &CoinTable,
    wif: &str,
    coin: &str,
    network: Network,
    message: &str,
) -> Result<String, WalletError> {
    let params = table.lookup(coin, network)?;
    let pair = KeyPair::from_wif(wif, params)?;
    message::sign_message(&pair, message.as_bytes(), params)
}

pub fn verify_message(
    table: &CoinTable,
    address: &str,
    signature: &str,
    coin: &str,
    network: Network,
    message: &str,
) -> Result<bool, WalletError> {
    let params = table.lookup(coin, network)?;
    message::verify_message(address, signature, message.as_bytes(), params)
}
