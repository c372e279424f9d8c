use std::fmt;

use coin_params::CoinNetworkParams;
use crypto_utils::hash::hash160;
use crypto_utils::{base58, PrivateKeyBytes};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::SecretKey;
use zeroize::Zeroizing;

use crate::error::KeyError;
use crate::path::ChildNumber;
use crate::xkey::ExtendedKey;

/// WIF suffix marking a compressed public key.
const WIF_COMPRESSED: u8 = 0x01;

/// A leaf key: compressed public key plus, when derived from a private
/// node, the signing scalar.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    public_key: [u8; 33],
    private_key: Option<PrivateKeyBytes>,
}

/// Derives `node/change/index`, both steps non-hardened.
///
/// A public-only `node` yields a public-only pair that cannot sign.
pub fn leaf_key_pair(node: &ExtendedKey, change: u32, index: u32) -> Result<KeyPair, KeyError> {
    if change > 1 {
        return Err(KeyError::InvalidPath {
            path: format!("{change}/{index}"),
            reason: "change index must be 0 (receive) or 1 (change)".into(),
        });
    }
    if index >= 0x8000_0000 {
        return Err(KeyError::InvalidPath {
            path: format!("{change}/{index}"),
            reason: "address index must be below 2^31".into(),
        });
    }
    let leaf = node
        .derive_child(ChildNumber::Normal(change))?
        .derive_child(ChildNumber::Normal(index))?;
    Ok(KeyPair::from(&leaf))
}

impl KeyPair {
    pub fn from_private_key(private_key: PrivateKeyBytes) -> Result<Self, KeyError> {
        let secret = SecretKey::from_slice(private_key.as_bytes())
            .map_err(|_| KeyError::malformed("private key", "scalar out of range"))?;
        let mut public_key = [0u8; 33];
        public_key.copy_from_slice(secret.public_key().to_encoded_point(true).as_bytes());
        Ok(Self {
            public_key,
            private_key: Some(private_key),
        })
    }

    pub fn public_key(&self) -> &[u8; 33] {
        &self.public_key
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key)
    }

    /// HASH160 of the compressed public key.
    pub fn pubkey_hash(&self) -> [u8; 20] {
        hash160(&self.public_key)
    }

    pub fn private_key(&self) -> Option<&PrivateKeyBytes> {
        self.private_key.as_ref()
    }

    pub fn can_sign(&self) -> bool {
        self.private_key.is_some()
    }

    /// The signing scalar, or `PrivateKeyRequired` for watch-only pairs.
    pub fn require_private(&self) -> Result<&PrivateKeyBytes, KeyError> {
        self.private_key
            .as_ref()
            .ok_or_else(|| KeyError::PrivateKeyRequired("key pair is public-only".into()))
    }

    /// Wallet Import Format with the coin's WIF version and the compressed flag.
    pub fn to_wif(&self, params: &CoinNetworkParams) -> Result<String, KeyError> {
        let private = self.require_private()?;
        let mut payload = Zeroizing::new(Vec::with_capacity(34));
        payload.push(params.wif);
        payload.extend_from_slice(private.as_bytes());
        payload.push(WIF_COMPRESSED);
        Ok(base58::encode_check(&payload))
    }

    /// Imports a compressed-key WIF string issued for this coin/network.
    pub fn from_wif(text: &str, params: &CoinNetworkParams) -> Result<Self, KeyError> {
        let payload = Zeroizing::new(
            base58::decode_check(text).map_err(|e| KeyError::from_base58("wif", e))?,
        );
        match payload.as_slice() {
            [version, scalar @ .., WIF_COMPRESSED] if scalar.len() == 32 => {
                if *version != params.wif {
                    return Err(KeyError::VersionMismatch {
                        found: format!("{version:#04x}"),
                        expected: format!("{} {} wif {:#04x}", params.coin, params.network, params.wif),
                    });
                }
                let private = PrivateKeyBytes::from_slice(scalar)
                    .ok_or_else(|| KeyError::malformed("wif", "scalar is not 32 bytes"))?;
                Self::from_private_key(private)
            }
            [_, scalar @ ..] if scalar.len() == 32 => Err(KeyError::malformed(
                "wif",
                "uncompressed-key WIF is not supported",
            )),
            _ => Err(KeyError::malformed(
                "wif",
                format!("{} bytes, expected 34", payload.len()),
            )),
        }
    }
}

impl From<&ExtendedKey> for KeyPair {
    fn from(node: &ExtendedKey) -> Self {
        Self {
            public_key: *node.public_key(),
            private_key: node.private_key().cloned(),
        }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key_hex())
            .field("can_sign", &self.can_sign())
            .finish()
    }
}
