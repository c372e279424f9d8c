use coin_params::{CoinNetworkParams, DerivationPurpose};
use hd_keys::{serialize_extended, ExtendedKey};
use tracing::debug;

use crate::error::WalletError;

/// Derives the conventional account node `m/purpose'/coin_type'/account'`.
///
/// The coin must register versions for `purpose`; this is checked before
/// any derivation work so an unsupported purpose never yields a node.
pub fn derive_account(
    root: &ExtendedKey,
    purpose: DerivationPurpose,
    params: &CoinNetworkParams,
    account: u32,
) -> Result<ExtendedKey, WalletError> {
    params.key_versions(purpose)?;
    if account >= 0x8000_0000 {
        return Err(hd_keys::KeyError::InvalidPath {
            path: format!("{account}'"),
            reason: "account index must be below 2^31".into(),
        }
        .into());
    }
    let path = account_path(purpose, params, account);
    let node = root.derive_path(&path)?;
    debug!(
        coin = %params.coin,
        network = %params.network,
        %path,
        fingerprint = %hex::encode(node.fingerprint()),
        "derived account node"
    );
    Ok(node)
}

pub fn account_path(purpose: DerivationPurpose, params: &CoinNetworkParams, account: u32) -> String {
    purpose.account_path(params.coin_type, account)
}

/// Public extended key of the account, under the purpose's own prefix.
pub fn account_xpub(
    root: &ExtendedKey,
    purpose: DerivationPurpose,
    params: &CoinNetworkParams,
    account: u32,
) -> Result<String, WalletError> {
    let node = derive_account(root, purpose, params, account)?;
    Ok(serialize_extended(&node, purpose, params, false)?)
}

/// Private extended key of the account.
pub fn account_xprv(
    root: &ExtendedKey,
    purpose: DerivationPurpose,
    params: &CoinNetworkParams,
    account: u32,
) -> Result<String, WalletError> {
    let node = derive_account(root, purpose, params, account)?;
    Ok(serialize_extended(&node, purpose, params, true)?)
}
