//! Extended key nodes and child derivation.

use std::fmt;

use crypto_utils::hash::hash160;
use crypto_utils::PrivateKeyBytes;
use hmac::{Hmac, Mac};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{PublicKey, SecretKey};
use sha2::Sha512;
use tracing::{debug, trace};
use zeroize::Zeroize;

use crate::error::KeyError;
use crate::path::{ChildNumber, DerivationPath};

type HmacSha512 = Hmac<Sha512>;

const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

/// A node of the key tree: chain code, compressed public key and, for
/// private nodes, the secret scalar.
///
/// Nodes are purpose-agnostic. Version bytes are chosen when serializing.
#[derive(Clone, PartialEq, Eq)]
pub struct ExtendedKey {
    private_key: Option<PrivateKeyBytes>,
    public_key: [u8; 33],
    chain_code: [u8; 32],
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: ChildNumber,
}

/// Root node for `seed`.
pub fn seed_to_root(seed: &[u8]) -> Result<ExtendedKey, KeyError> {
    ExtendedKey::from_seed(seed)
}

impl ExtendedKey {
    /// Master node: `HMAC-SHA512("Bitcoin seed", seed)`, left half the
    /// scalar, right half the chain code.
    pub fn from_seed(seed: &[u8]) -> Result<Self, KeyError> {
        if seed.is_empty() {
            return Err(KeyError::InvalidSeed("seed is empty".into()));
        }

        let mut mac = HmacSha512::new_from_slice(MASTER_HMAC_KEY)
            .map_err(|e| KeyError::InvalidSeed(e.to_string()))?;
        mac.update(seed);
        let mut output = mac.finalize().into_bytes();
        let (il, ir) = output.split_at(32);

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(ir);
        let secret = SecretKey::from_slice(il);
        output.as_mut_slice().zeroize();
        let secret = secret
            .map_err(|_| KeyError::InvalidSeed("master scalar out of range".into()))?;

        let root = Self::from_secret(
            &secret,
            chain_code,
            0,
            [0u8; 4],
            ChildNumber::Normal(0),
        );
        chain_code.zeroize();
        debug!(fingerprint = %hex::encode(root.fingerprint()), "root key created");
        Ok(root)
    }

    pub(crate) fn from_private_bytes(
        private_key: &[u8; 32],
        chain_code: [u8; 32],
        depth: u8,
        parent_fingerprint: [u8; 4],
        child_number: ChildNumber,
    ) -> Result<Self, KeyError> {
        let secret = SecretKey::from_slice(private_key)
            .map_err(|_| KeyError::malformed("private key", "scalar out of range"))?;
        Ok(Self::from_secret(
            &secret,
            chain_code,
            depth,
            parent_fingerprint,
            child_number,
        ))
    }

    pub(crate) fn from_public_bytes(
        public_key: [u8; 33],
        chain_code: [u8; 32],
        depth: u8,
        parent_fingerprint: [u8; 4],
        child_number: ChildNumber,
    ) -> Result<Self, KeyError> {
        PublicKey::from_sec1_bytes(&public_key)
            .map_err(|_| KeyError::malformed("public key", "not a point on secp256k1"))?;
        Ok(Self {
            private_key: None,
            public_key,
            chain_code,
            depth,
            parent_fingerprint,
            child_number,
        })
    }

    fn from_secret(
        secret: &SecretKey,
        chain_code: [u8; 32],
        depth: u8,
        parent_fingerprint: [u8; 4],
        child_number: ChildNumber,
    ) -> Self {
        let scalar: [u8; 32] = secret.to_bytes().into();
        Self {
            private_key: Some(PrivateKeyBytes::new(scalar)),
            public_key: compress(&secret.public_key()),
            chain_code,
            depth,
            parent_fingerprint,
            child_number,
        }
    }

    pub fn public_key(&self) -> &[u8; 33] {
        &self.public_key
    }

    pub fn private_key(&self) -> Option<&PrivateKeyBytes> {
        self.private_key.as_ref()
    }

    pub fn is_private(&self) -> bool {
        self.private_key.is_some()
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.parent_fingerprint
    }

    pub fn child_number(&self) -> ChildNumber {
        self.child_number
    }

    /// HASH160 of the compressed public key.
    pub fn identifier(&self) -> [u8; 20] {
        hash160(&self.public_key)
    }

    /// First four bytes of [`identifier`](Self::identifier).
    pub fn fingerprint(&self) -> [u8; 4] {
        let id = self.identifier();
        [id[0], id[1], id[2], id[3]]
    }

    /// Public-only copy with the same chain code and public key.
    pub fn neuter(&self) -> Self {
        Self {
            private_key: None,
            ..self.clone()
        }
    }

    /// Derives along `path`, e.g. `m/0'/0'/0`.
    pub fn derive_path(&self, path: &str) -> Result<Self, KeyError> {
        let path: DerivationPath = path.parse()?;
        self.derive(&path)
    }

    pub fn derive(&self, path: &DerivationPath) -> Result<Self, KeyError> {
        path.iter()
            .try_fold(self.clone(), |node, child| node.derive_child(child))
    }

    /// One CKD step, computed by `bip32`. Hardened steps need the private
    /// scalar.
    pub fn derive_child(&self, child: ChildNumber) -> Result<Self, KeyError> {
        let depth = self.depth.checked_add(1).ok_or_else(|| KeyError::InvalidPath {
            path: child.to_string(),
            reason: "maximum depth of 255 exceeded".into(),
        })?;
        let index = child.to_u32();
        let step = bip32::ChildNumber(index);
        let parent_fingerprint = self.fingerprint();

        let node = match &self.private_key {
            Some(private) => {
                let derived = self
                    .to_xprv(private)?
                    .derive_child(step)
                    .map_err(|_| KeyError::InvalidChild(index))?;
                let mut scalar: [u8; 32] = derived.to_bytes().into();
                let node = Self::from_private_bytes(
                    &scalar,
                    derived.attrs().chain_code,
                    depth,
                    parent_fingerprint,
                    child,
                );
                scalar.zeroize();
                node?
            }
            None => {
                if child.is_hardened() {
                    return Err(KeyError::PrivateKeyRequired(format!(
                        "hardened child {child} of a public key"
                    )));
                }
                let derived = self
                    .to_xpub()?
                    .derive_child(step)
                    .map_err(|_| KeyError::InvalidChild(index))?;
                Self::from_public_bytes(
                    derived.to_bytes(),
                    derived.attrs().chain_code,
                    depth,
                    parent_fingerprint,
                    child,
                )?
            }
        };

        debug!(depth, %child, private = node.is_private(), "derived child key");
        trace!(
            fingerprint = %hex::encode(node.fingerprint()),
            parent = %hex::encode(parent_fingerprint),
            "child key identity"
        );
        Ok(node)
    }

    fn bip32_node(&self, prefix: bip32::Prefix, key_bytes: [u8; 33]) -> bip32::ExtendedKey {
        bip32::ExtendedKey {
            prefix,
            attrs: bip32::ExtendedKeyAttrs {
                depth: self.depth,
                parent_fingerprint: self.parent_fingerprint,
                child_number: bip32::ChildNumber(self.child_number.to_u32()),
                chain_code: self.chain_code,
            },
            key_bytes,
        }
    }

    fn to_xprv(&self, private: &PrivateKeyBytes) -> Result<bip32::XPrv, KeyError> {
        let mut key_bytes = [0u8; 33];
        key_bytes[1..].copy_from_slice(private.as_bytes());
        let xprv = bip32::XPrv::try_from(self.bip32_node(bip32::Prefix::XPRV, key_bytes));
        key_bytes.zeroize();
        xprv.map_err(|e| KeyError::malformed("private key", e.to_string()))
    }

    fn to_xpub(&self) -> Result<bip32::XPub, KeyError> {
        bip32::XPub::try_from(self.bip32_node(bip32::Prefix::XPUB, self.public_key))
            .map_err(|e| KeyError::malformed("public key", e.to_string()))
    }
}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("public_key", &hex::encode(self.public_key))
            .field("private", &self.is_private())
            .field("depth", &self.depth)
            .field("parent_fingerprint", &hex::encode(self.parent_fingerprint))
            .field("child_number", &self.child_number)
            .finish_non_exhaustive()
    }
}

fn compress(public: &PublicKey) -> [u8; 33] {
    let point = public.to_encoded_point(true);
    let mut out = [0u8; 33];
    out.copy_from_slice(point.as_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const VECTOR1_SEED: &str = "000102030405060708090a0b0c0d0e0f";

    fn vector1_root() -> ExtendedKey {
        seed_to_root(&hex::decode(VECTOR1_SEED).unwrap()).unwrap()
    }

    #[test]
    fn root_has_no_parent() {
        let root = vector1_root();
        assert_eq!(root.depth(), 0);
        assert_eq!(root.parent_fingerprint(), [0u8; 4]);
        assert_eq!(root.child_number(), ChildNumber::Normal(0));
        assert!(root.is_private());
        assert_eq!(hex::encode(root.fingerprint()), "3442193e");
    }

    #[test]
    fn root_chain_code_vector1() {
        assert_eq!(
            hex::encode(vector1_root().chain_code()),
            "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508"
        );
    }

    #[test]
    fn empty_seed_rejected() {
        assert!(matches!(seed_to_root(&[]), Err(KeyError::InvalidSeed(_))));
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = vector1_root().derive_path("m/0'/1/2'").unwrap();
        let b = vector1_root().derive_path("m/0'/1/2'").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.depth(), 3);
        assert_eq!(a.child_number(), ChildNumber::Hardened(2));
    }

    #[test]
    fn child_records_parent_fingerprint() {
        let root = vector1_root();
        let child = root.derive_child(ChildNumber::Hardened(0)).unwrap();
        assert_eq!(child.parent_fingerprint(), root.fingerprint());
        assert_eq!(hex::encode(child.fingerprint()), "5c1bd648");
    }

    #[test]
    fn hardened_from_public_requires_private() {
        let public = vector1_root().neuter();
        let err = public.derive_path("m/0'").unwrap_err();
        assert!(matches!(err, KeyError::PrivateKeyRequired(_)));
    }

    #[test]
    fn public_derivation_matches_neutered_private() {
        let account = vector1_root().derive_path("m/0'").unwrap();
        let via_private = account.derive_path("m/1/7").unwrap().neuter();
        let via_public = account.neuter().derive_path("m/1/7").unwrap();
        assert_eq!(via_private, via_public);
        assert!(!via_public.is_private());
    }

    #[test]
    fn neuter_keeps_public_material() {
        let node = vector1_root().derive_path("m/0'/1").unwrap();
        let public = node.neuter();
        assert_eq!(public.public_key(), node.public_key());
        assert_eq!(public.chain_code(), node.chain_code());
        assert!(public.private_key().is_none());
    }

    #[test]
    fn debug_hides_private_key() {
        let root = vector1_root();
        let secret_hex = hex::encode(root.private_key().unwrap().as_bytes());
        let debug = format!("{root:?}");
        assert!(!debug.contains(&secret_hex));
        assert!(debug.contains("private: true"));
    }

    #[test]
    fn matches_bip32_crate() {
        let seed = hex::decode(VECTOR1_SEED).unwrap();
        let path = "m/44'/0'/0'/1/9";
        let ours = seed_to_root(&seed).unwrap().derive_path(path).unwrap();
        let reference =
            bip32::XPrv::derive_from_path(&seed, &path.parse::<bip32::DerivationPath>().unwrap())
                .unwrap();
        let reference_bytes: [u8; 32] = reference.to_bytes().into();
        assert_eq!(ours.private_key().unwrap().as_bytes(), &reference_bytes);
        assert_eq!(ours.public_key(), &reference.public_key().to_bytes());
        assert_eq!(ours.chain_code(), &reference.attrs().chain_code);
    }

    #[test]
    fn public_child_matches_bip32_xpub() {
        let seed = hex::decode(VECTOR1_SEED).unwrap();
        let account = seed_to_root(&seed).unwrap().derive_path("m/44'/0'/0'").unwrap();
        let ours = account.neuter().derive_path("m/0/5").unwrap();
        let reference = bip32::XPrv::derive_from_path(
            &seed,
            &"m/44'/0'/0'/0/5".parse::<bip32::DerivationPath>().unwrap(),
        )
        .unwrap()
        .public_key();
        assert_eq!(ours.public_key(), &reference.to_bytes());
        assert_eq!(ours.chain_code(), &reference.attrs().chain_code);
        assert_eq!(ours.parent_fingerprint(), reference.attrs().parent_fingerprint);
        assert_eq!(ours.depth(), reference.attrs().depth);
    }

    #[test]
    fn depth_overflow_is_rejected() {
        let mut node = vector1_root();
        node.depth = u8::MAX;
        let err = node.derive_child(ChildNumber::Normal(0)).unwrap_err();
        assert!(matches!(err, KeyError::InvalidPath { .. }));
    }
}
