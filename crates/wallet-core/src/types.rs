use chain_utxo::AddressType;
use coin_params::{DerivationPurpose, Network};
use serde::{Deserialize, Serialize};

/// A derived receive or change address with its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedAddress {
    pub coin: String,
    pub network: Network,
    pub address: String,
    pub address_type: AddressType,
    pub purpose: DerivationPurpose,
    /// Full path from the root, e.g. `m/84'/0'/0'/0/3`.
    pub derivation_path: String,
    /// Compressed public key, hex encoded.
    pub public_key: String,
}

/// Extended key text together with what its version bytes say about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedKeyInfo {
    pub purpose: DerivationPurpose,
    pub is_private: bool,
    pub depth: u8,
    /// Hex of the key's own fingerprint.
    pub fingerprint: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_address_serializes_type_as_its_short_name() {
        let derived = DerivedAddress {
            coin: "BTC".into(),
            network: Network::Mainnet,
            address: "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4".into(),
            address_type: AddressType::WitnessPubKeyHash,
            purpose: DerivationPurpose::Witness,
            derivation_path: "m/84'/0'/0'/0/0".into(),
            public_key: "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798".into(),
        };
        let json = serde_json::to_string(&derived).unwrap();
        assert!(json.contains("\"address_type\":\"p2wpkh\""));
        assert!(json.contains("\"purpose\":\"witness\""));
        let back: DerivedAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, derived);
    }
}
