use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UtxoError;

/// Output template an address (and its locking script) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressType {
    /// Base58Check, pubkey-hash version byte.
    #[serde(rename = "p2pkh")]
    PubKeyHash,
    /// Base58Check, script-hash version byte.
    #[serde(rename = "p2sh")]
    ScriptHash,
    /// Bech32 witness v0, 20-byte program.
    #[serde(rename = "p2wpkh")]
    WitnessPubKeyHash,
    /// Bech32 witness v0, 32-byte program.
    #[serde(rename = "p2wsh")]
    WitnessScriptHash,
    /// Scripthash wrapping a witness-pubkeyhash program.
    #[serde(rename = "p2sh-p2wpkh")]
    WrappedWitnessPubKeyHash,
    /// Scripthash wrapping a witness-scripthash program.
    #[serde(rename = "p2sh-p2wsh")]
    WrappedWitnessScriptHash,
    /// CashAddr-encoded pubkey-hash.
    #[serde(rename = "cashaddr-p2pkh")]
    AltPubKeyHash,
    /// CashAddr-encoded script-hash.
    #[serde(rename = "cashaddr-p2sh")]
    AltScriptHash,
}

impl AddressType {
    pub const ALL: [AddressType; 8] = [
        AddressType::PubKeyHash,
        AddressType::ScriptHash,
        AddressType::WitnessPubKeyHash,
        AddressType::WitnessScriptHash,
        AddressType::WrappedWitnessPubKeyHash,
        AddressType::WrappedWitnessScriptHash,
        AddressType::AltPubKeyHash,
        AddressType::AltScriptHash,
    ];

    /// Decoders tried, in order, when no type hint is supplied.
    pub const DETECTION_ORDER: [AddressType; 5] = [
        AddressType::PubKeyHash,
        AddressType::ScriptHash,
        AddressType::WitnessScriptHash,
        AddressType::WitnessPubKeyHash,
        AddressType::AltPubKeyHash,
    ];

    pub fn is_witness(self) -> bool {
        matches!(
            self,
            AddressType::WitnessPubKeyHash
                | AddressType::WitnessScriptHash
                | AddressType::WrappedWitnessPubKeyHash
                | AddressType::WrappedWitnessScriptHash
        )
    }

    pub fn is_alt(self) -> bool {
        matches!(self, AddressType::AltPubKeyHash | AddressType::AltScriptHash)
    }

    fn as_str(self) -> &'static str {
        match self {
            AddressType::PubKeyHash => "p2pkh",
            AddressType::ScriptHash => "p2sh",
            AddressType::WitnessPubKeyHash => "p2wpkh",
            AddressType::WitnessScriptHash => "p2wsh",
            AddressType::WrappedWitnessPubKeyHash => "p2sh-p2wpkh",
            AddressType::WrappedWitnessScriptHash => "p2sh-p2wsh",
            AddressType::AltPubKeyHash => "cashaddr-p2pkh",
            AddressType::AltScriptHash => "cashaddr-p2sh",
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddressType {
    type Err = UtxoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        AddressType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lower)
            .ok_or_else(|| UtxoError::UnknownAddressType(s.to_string()))
    }
}

/// Locking script produced from a public key, plus the redeem script a
/// wrapped template needs at spend time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PubkeyScripts {
    pub locking_script: Vec<u8>,
    pub redeem_script: Option<Vec<u8>>,
}

/// An address resolved to its template and locking script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub address_type: AddressType,
    pub locking_script: Vec<u8>,
}
