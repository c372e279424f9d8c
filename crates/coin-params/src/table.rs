use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::ParamsError;
use crate::network::Network;
use crate::params::{CoinNetworkParams, KeyVersions};

const BITCOIN_MESSAGE_PREFIX: &str = "\x18Bitcoin Signed Message:\n";
const LITECOIN_MESSAGE_PREFIX: &str = "\x19Litecoin Signed Message:\n";
const DOGECOIN_MESSAGE_PREFIX: &str = "\x19Dogecoin Signed Message:\n";

// SLIP-132 extended key versions
const XPUB: KeyVersions = KeyVersions::new(0x0488b21e, 0x0488ade4);
const YPUB: KeyVersions = KeyVersions::new(0x049d7cb2, 0x049d7878);
const ZPUB: KeyVersions = KeyVersions::new(0x04b24746, 0x04b2430c);
const TPUB: KeyVersions = KeyVersions::new(0x043587cf, 0x04358394);
const UPUB: KeyVersions = KeyVersions::new(0x044a5262, 0x044a4e28);
const VPUB: KeyVersions = KeyVersions::new(0x045f1cf6, 0x045f18bc);

/// Immutable lookup from `(coin, network)` to [`CoinNetworkParams`].
///
/// Built once and then only read, so a shared reference can be handed to
/// any number of threads.
#[derive(Debug, Clone)]
pub struct CoinTable {
    entries: HashMap<(String, Network), CoinNetworkParams>,
}

impl CoinTable {
    /// Builds a table from records, validating each and rejecting duplicates.
    pub fn from_params(records: Vec<CoinNetworkParams>) -> Result<Self, ParamsError> {
        let mut entries = HashMap::with_capacity(records.len());
        for record in records {
            record.validate()?;
            let key = (normalize(&record.coin), record.network);
            if entries.contains_key(&key) {
                return Err(ParamsError::InvalidTable(format!(
                    "duplicate entry for {} {}",
                    key.0, key.1
                )));
            }
            entries.insert(key, record);
        }
        tracing::debug!(entries = entries.len(), "coin table loaded");
        Ok(Self { entries })
    }

    /// Loads a table from a JSON array of [`CoinNetworkParams`] records.
    pub fn from_json(json: &str) -> Result<Self, ParamsError> {
        let records: Vec<CoinNetworkParams> =
            serde_json::from_str(json).map_err(|e| ParamsError::InvalidTable(e.to_string()))?;
        Self::from_params(records)
    }

    /// The coins shipped with the crate: BTC, LTC, BCH, DOGE.
    pub fn builtin() -> Self {
        let entries = builtin_records()
            .into_iter()
            .map(|record| ((normalize(&record.coin), record.network), record))
            .collect();
        Self { entries }
    }

    /// Process-wide builtin table, initialised on first use.
    pub fn default_table() -> &'static CoinTable {
        static TABLE: OnceLock<CoinTable> = OnceLock::new();
        TABLE.get_or_init(CoinTable::builtin)
    }

    /// Looks up `coin` (case-insensitive) on `network`.
    pub fn lookup(&self, coin: &str, network: Network) -> Result<&CoinNetworkParams, ParamsError> {
        self.entries
            .get(&(normalize(coin), network))
            .ok_or_else(|| ParamsError::UnknownCoin(coin.to_string()))
    }

    /// Registered coin identifiers, sorted and de-duplicated.
    pub fn coins(&self) -> Vec<&str> {
        let mut coins: Vec<&str> = self.entries.keys().map(|(coin, _)| coin.as_str()).collect();
        coins.sort_unstable();
        coins.dedup();
        coins
    }

    pub fn to_json(&self) -> Result<String, ParamsError> {
        let mut records: Vec<&CoinNetworkParams> = self.entries.values().collect();
        records.sort_by(|a, b| (&a.coin, a.network.is_testnet()).cmp(&(&b.coin, b.network.is_testnet())));
        serde_json::to_string_pretty(&records).map_err(|e| ParamsError::InvalidTable(e.to_string()))
    }
}

fn normalize(coin: &str) -> String {
    coin.trim().to_ascii_uppercase()
}

fn builtin_records() -> Vec<CoinNetworkParams> {
    vec![
        CoinNetworkParams {
            coin: "BTC".into(),
            network: Network::Mainnet,
            coin_type: 0,
            wif: 0x80,
            message_prefix: BITCOIN_MESSAGE_PREFIX.into(),
            legacy: XPUB,
            witness: Some(ZPUB),
            wrapped_witness: Some(YPUB),
            pubkey_hash: 0x00,
            script_hash: 0x05,
            bech32_hrp: Some("bc".into()),
            cashaddr_prefix: None,
        },
        CoinNetworkParams {
            coin: "BTC".into(),
            network: Network::Testnet,
            coin_type: 1,
            wif: 0xef,
            message_prefix: BITCOIN_MESSAGE_PREFIX.into(),
            legacy: TPUB,
            witness: Some(VPUB),
            wrapped_witness: Some(UPUB),
            pubkey_hash: 0x6f,
            script_hash: 0xc4,
            bech32_hrp: Some("tb".into()),
            cashaddr_prefix: None,
        },
        CoinNetworkParams {
            coin: "LTC".into(),
            network: Network::Mainnet,
            coin_type: 2,
            wif: 0xb0,
            message_prefix: LITECOIN_MESSAGE_PREFIX.into(),
            legacy: KeyVersions::new(0x019da462, 0x019d9cfe),
            witness: Some(ZPUB),
            wrapped_witness: Some(KeyVersions::new(0x01b26ef6, 0x01b26792)),
            pubkey_hash: 0x30,
            script_hash: 0x32,
            bech32_hrp: Some("ltc".into()),
            cashaddr_prefix: None,
        },
        CoinNetworkParams {
            coin: "LTC".into(),
            network: Network::Testnet,
            coin_type: 1,
            wif: 0xef,
            message_prefix: LITECOIN_MESSAGE_PREFIX.into(),
            legacy: KeyVersions::new(0x0436f6e1, 0x0436ef7d),
            witness: Some(VPUB),
            wrapped_witness: Some(UPUB),
            pubkey_hash: 0x6f,
            script_hash: 0x3a,
            bech32_hrp: Some("tltc".into()),
            cashaddr_prefix: None,
        },
        CoinNetworkParams {
            coin: "BCH".into(),
            network: Network::Mainnet,
            coin_type: 145,
            wif: 0x80,
            message_prefix: BITCOIN_MESSAGE_PREFIX.into(),
            legacy: XPUB,
            witness: None,
            wrapped_witness: None,
            pubkey_hash: 0x00,
            script_hash: 0x05,
            bech32_hrp: None,
            cashaddr_prefix: Some("bitcoincash".into()),
        },
        CoinNetworkParams {
            coin: "BCH".into(),
            network: Network::Testnet,
            coin_type: 1,
            wif: 0xef,
            message_prefix: BITCOIN_MESSAGE_PREFIX.into(),
            legacy: TPUB,
            witness: None,
            wrapped_witness: None,
            pubkey_hash: 0x6f,
            script_hash: 0xc4,
            bech32_hrp: None,
            cashaddr_prefix: Some("bchtest".into()),
        },
        CoinNetworkParams {
            coin: "DOGE".into(),
            network: Network::Mainnet,
            coin_type: 3,
            wif: 0x9e,
            message_prefix: DOGECOIN_MESSAGE_PREFIX.into(),
            legacy: KeyVersions::new(0x02facafd, 0x02fac398),
            witness: None,
            wrapped_witness: None,
            pubkey_hash: 0x1e,
            script_hash: 0x16,
            bech32_hrp: None,
            cashaddr_prefix: None,
        },
        CoinNetworkParams {
            coin: "DOGE".into(),
            network: Network::Testnet,
            coin_type: 1,
            wif: 0xf1,
            message_prefix: DOGECOIN_MESSAGE_PREFIX.into(),
            legacy: TPUB,
            witness: None,
            wrapped_witness: None,
            pubkey_hash: 0x71,
            script_hash: 0xc4,
            bech32_hrp: None,
            cashaddr_prefix: None,
        },
    ]
}
