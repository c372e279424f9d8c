//! Locking script templates, built and recognised with `bitcoin::Script`.

use bitcoin::hashes::Hash;
use bitcoin::opcodes::all::OP_CHECKSIG;
use bitcoin::script::{Builder, Script, ScriptBuf};
use bitcoin::{PubkeyHash, ScriptHash, WPubkeyHash, WScriptHash};

/// A recognised locking script and the hash it commits to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    PubKeyHash([u8; 20]),
    ScriptHash([u8; 20]),
    WitnessPubKeyHash([u8; 20]),
    WitnessScriptHash([u8; 32]),
}

impl Template {
    /// Matches `script` against the four standard templates.
    pub fn classify(script: &[u8]) -> Option<Self> {
        let script = Script::from_bytes(script);
        let bytes = script.as_bytes();
        if script.is_p2pkh() {
            Some(Template::PubKeyHash(bytes[3..23].try_into().ok()?))
        } else if script.is_p2sh() {
            Some(Template::ScriptHash(bytes[2..22].try_into().ok()?))
        } else if script.is_p2wpkh() {
            Some(Template::WitnessPubKeyHash(bytes[2..22].try_into().ok()?))
        } else if script.is_p2wsh() {
            Some(Template::WitnessScriptHash(bytes[2..34].try_into().ok()?))
        } else {
            None
        }
    }

    /// The committed hash bytes.
    pub fn hash(&self) -> &[u8] {
        match self {
            Template::PubKeyHash(h) | Template::ScriptHash(h) | Template::WitnessPubKeyHash(h) => h.as_slice(),
            Template::WitnessScriptHash(h) => h.as_slice(),
        }
    }

    pub fn to_script(&self) -> Vec<u8> {
        match self {
            Template::PubKeyHash(h) => p2pkh(h),
            Template::ScriptHash(h) => p2sh(h),
            Template::WitnessPubKeyHash(h) => p2wpkh(h),
            Template::WitnessScriptHash(h) => p2wsh(h),
        }
    }
}

/// `DUP HASH160 <20> EQUALVERIFY CHECKSIG`
pub fn p2pkh(pubkey_hash: &[u8; 20]) -> Vec<u8> {
    ScriptBuf::new_p2pkh(&PubkeyHash::from_byte_array(*pubkey_hash)).into_bytes()
}

/// `HASH160 <20> EQUAL`
pub fn p2sh(script_hash: &[u8; 20]) -> Vec<u8> {
    ScriptBuf::new_p2sh(&ScriptHash::from_byte_array(*script_hash)).into_bytes()
}

/// Witness v0 keyhash program.
pub fn p2wpkh(pubkey_hash: &[u8; 20]) -> Vec<u8> {
    ScriptBuf::new_p2wpkh(&WPubkeyHash::from_byte_array(*pubkey_hash)).into_bytes()
}

/// Witness v0 scripthash program.
pub fn p2wsh(script_sha256: &[u8; 32]) -> Vec<u8> {
    ScriptBuf::new_p2wsh(&WScriptHash::from_byte_array(*script_sha256)).into_bytes()
}

/// Scripthash wrapper committing to `redeem_script`.
pub fn p2sh_of(redeem_script: &[u8]) -> Vec<u8> {
    Script::from_bytes(redeem_script).to_p2sh().into_bytes()
}

/// Witness scripthash program committing to `witness_script`.
pub fn p2wsh_of(witness_script: &[u8]) -> Vec<u8> {
    Script::from_bytes(witness_script).to_p2wsh().into_bytes()
}

/// `<pubkey> CHECKSIG`, the single-key redeem/witness script.
pub fn p2pk(pubkey: &[u8; 33]) -> Vec<u8> {
    Builder::new()
        .push_slice(pubkey)
        .push_opcode(OP_CHECKSIG)
        .into_script()
        .into_bytes()
}

/// Public key of a `<compressed pubkey> CHECKSIG` script.
pub fn parse_p2pk(script: &[u8]) -> Option<[u8; 33]> {
    let pubkey = Script::from_bytes(script).p2pk_public_key()?;
    pubkey.compressed.then(|| pubkey.inner.serialize())
}
