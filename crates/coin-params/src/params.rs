use serde::{Deserialize, Serialize};

use crate::error::ParamsError;
use crate::network::Network;

/// Which extended-key version pair is used at serialization time, and which
/// BIP-43 purpose constant the conventional derivation path starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivationPurpose {
    /// BIP-44, pubkeyhash outputs.
    Legacy,
    /// BIP-84, native witness-pubkeyhash outputs.
    Witness,
    /// BIP-49, witness-pubkeyhash wrapped in scripthash.
    WrappedWitness,
}

impl DerivationPurpose {
    pub const ALL: [DerivationPurpose; 3] = [
        DerivationPurpose::Legacy,
        DerivationPurpose::Witness,
        DerivationPurpose::WrappedWitness,
    ];

    /// BIP-43 purpose number.
    pub fn number(self) -> u32 {
        match self {
            DerivationPurpose::Legacy => 44,
            DerivationPurpose::Witness => 84,
            DerivationPurpose::WrappedWitness => 49,
        }
    }

    /// Conventional account path: `m/purpose'/coin_type'/account'`
    pub fn account_path(self, coin_type: u32, account: u32) -> String {
        format!("m/{}'/{}'/{}'", self.number(), coin_type, account)
    }
}

impl std::fmt::Display for DerivationPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DerivationPurpose::Legacy => write!(f, "legacy"),
            DerivationPurpose::Witness => write!(f, "witness"),
            DerivationPurpose::WrappedWitness => write!(f, "wrapped-witness"),
        }
    }
}

/// Public/private extended-key version bytes for one purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyVersions {
    pub public: u32,
    pub private: u32,
}

impl KeyVersions {
    pub const fn new(public: u32, private: u32) -> Self {
        Self { public, private }
    }

    /// The 4 version bytes that prefix the serialized key.
    pub fn select(&self, is_private: bool) -> [u8; 4] {
        if is_private {
            self.private.to_be_bytes()
        } else {
            self.public.to_be_bytes()
        }
    }

    /// `Some(is_private)` when `version` is one of this pair.
    pub fn matches(&self, version: [u8; 4]) -> Option<bool> {
        let version = u32::from_be_bytes(version);
        if version == self.private {
            Some(true)
        } else if version == self.public {
            Some(false)
        } else {
            None
        }
    }
}

/// Version bytes and prefixes for one coin on one network.
///
/// Witness and wrapped-witness extended-key versions are only present for
/// coins that support those purposes; asking for them on any other coin is
/// a [`ParamsError::UnsupportedPurpose`], never a silent fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinNetworkParams {
    /// Ticker-style identifier, e.g. `BTC`.
    pub coin: String,
    pub network: Network,
    /// SLIP-44 coin type.
    pub coin_type: u32,
    /// WIF private-key version byte.
    pub wif: u8,
    /// Signed-message magic, length byte included.
    pub message_prefix: String,
    pub legacy: KeyVersions,
    #[serde(default)]
    pub witness: Option<KeyVersions>,
    #[serde(default)]
    pub wrapped_witness: Option<KeyVersions>,
    pub pubkey_hash: u8,
    pub script_hash: u8,
    /// Human-readable part of witness addresses.
    #[serde(default)]
    pub bech32_hrp: Option<String>,
    /// Prefix of the checksummed alternative address encoding.
    #[serde(default)]
    pub cashaddr_prefix: Option<String>,
}

impl CoinNetworkParams {
    /// Extended-key versions for `purpose`.
    pub fn key_versions(&self, purpose: DerivationPurpose) -> Result<KeyVersions, ParamsError> {
        let versions = match purpose {
            DerivationPurpose::Legacy => Some(self.legacy),
            DerivationPurpose::Witness => self.witness,
            DerivationPurpose::WrappedWitness => self.wrapped_witness,
        };
        versions.ok_or_else(|| ParamsError::UnsupportedPurpose {
            coin: self.coin.clone(),
            network: self.network,
            purpose,
        })
    }

    pub fn supports(&self, purpose: DerivationPurpose) -> bool {
        self.key_versions(purpose).is_ok()
    }

    /// Finds which registered purpose (and privacy) a 4-byte version belongs to.
    pub fn purpose_for_version(&self, version: [u8; 4]) -> Option<(DerivationPurpose, bool)> {
        DerivationPurpose::ALL.into_iter().find_map(|purpose| {
            self.key_versions(purpose)
                .ok()
                .and_then(|pair| pair.matches(version))
                .map(|is_private| (purpose, is_private))
        })
    }

    pub fn witness_hrp(&self) -> Option<&str> {
        self.bech32_hrp.as_deref()
    }

    pub fn alt_prefix(&self) -> Option<&str> {
        self.cashaddr_prefix.as_deref()
    }

    /// Structural checks applied when a table is loaded.
    pub fn validate(&self) -> Result<(), ParamsError> {
        let invalid = |msg: String| ParamsError::InvalidTable(format!("{} {}: {msg}", self.coin, self.network));

        if self.coin.trim().is_empty() {
            return Err(ParamsError::InvalidTable("empty coin id".into()));
        }
        for purpose in DerivationPurpose::ALL {
            if let Ok(pair) = self.key_versions(purpose) {
                if pair.public == pair.private {
                    return Err(invalid(format!(
                        "{purpose} public and private versions are identical"
                    )));
                }
            }
        }
        if (self.witness.is_some() || self.wrapped_witness.is_some()) && self.bech32_hrp.is_none() {
            return Err(invalid("witness versions present without a bech32 prefix".into()));
        }
        if self.pubkey_hash == self.script_hash {
            return Err(invalid("pubkeyhash and scripthash versions collide".into()));
        }
        if let Some(prefix) = &self.cashaddr_prefix {
            if prefix.is_empty() || prefix.chars().any(|c| !c.is_ascii_lowercase() && !c.is_ascii_digit()) {
                return Err(invalid(format!("invalid alternate address prefix {prefix:?}")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CoinNetworkParams {
        CoinNetworkParams {
            coin: "BTC".into(),
            network: Network::Mainnet,
            coin_type: 0,
            wif: 0x80,
            message_prefix: "\x18Bitcoin Signed Message:\n".into(),
            legacy: KeyVersions::new(0x0488b21e, 0x0488ade4),
            witness: Some(KeyVersions::new(0x04b24746, 0x04b2430c)),
            wrapped_witness: None,
            pubkey_hash: 0x00,
            script_hash: 0x05,
            bech32_hrp: Some("bc".into()),
            cashaddr_prefix: None,
        }
    }

    #[test]
    fn purpose_numbers() {
        assert_eq!(DerivationPurpose::Legacy.number(), 44);
        assert_eq!(DerivationPurpose::Witness.number(), 84);
        assert_eq!(DerivationPurpose::WrappedWitness.number(), 49);
    }

    #[test]
    fn account_path_is_hardened() {
        assert_eq!(DerivationPurpose::Witness.account_path(2, 1), "m/84'/2'/1'");
    }

    #[test]
    fn select_returns_big_endian_bytes() {
        let pair = KeyVersions::new(0x0488b21e, 0x0488ade4);
        assert_eq!(pair.select(false), [0x04, 0x88, 0xb2, 0x1e]);
        assert_eq!(pair.select(true), [0x04, 0x88, 0xad, 0xe4]);
    }

    #[test]
    fn missing_purpose_is_an_error_not_a_fallback() {
        let params = sample();
        let err = params.key_versions(DerivationPurpose::WrappedWitness).unwrap_err();
        assert_eq!(
            err,
            ParamsError::UnsupportedPurpose {
                coin: "BTC".into(),
                network: Network::Mainnet,
                purpose: DerivationPurpose::WrappedWitness,
            }
        );
        assert!(!params.supports(DerivationPurpose::WrappedWitness));
        assert!(params.supports(DerivationPurpose::Witness));
    }

    #[test]
    fn purpose_for_version_detects_pair_and_privacy() {
        let params = sample();
        assert_eq!(
            params.purpose_for_version([0x04, 0xb2, 0x43, 0x0c]),
            Some((DerivationPurpose::Witness, true))
        );
        assert_eq!(
            params.purpose_for_version([0x04, 0x88, 0xb2, 0x1e]),
            Some((DerivationPurpose::Legacy, false))
        );
        assert_eq!(params.purpose_for_version([0, 0, 0, 0]), None);
    }

    #[test]
    fn validate_accepts_sample() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn validate_rejects_witness_without_hrp() {
        let mut params = sample();
        params.bech32_hrp = None;
        assert!(matches!(params.validate(), Err(ParamsError::InvalidTable(_))));
    }

    #[test]
    fn validate_rejects_colliding_address_versions() {
        let mut params = sample();
        params.script_hash = params.pubkey_hash;
        assert!(params.validate().is_err());
    }

    #[test]
    fn validate_rejects_uppercase_alt_prefix() {
        let mut params = sample();
        params.cashaddr_prefix = Some("BitcoinCash".into());
        assert!(params.validate().is_err());
    }
}
