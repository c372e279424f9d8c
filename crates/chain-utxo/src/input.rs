//! Caller-supplied inputs and outputs, and their validated spend plans.

use bitcoin::consensus::deserialize;
use bitcoin::{Amount, OutPoint, ScriptBuf, Transaction, Txid};
use crypto_utils::hash::{hash160, sha256};

use crate::error::UtxoError;
use crate::script::{self, Template};

/// An outpoint to spend, tagged by how its signature hash is computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionInput {
    Legacy(LegacyInput),
    Witness(WitnessInput),
}

/// Legacy inputs carry the whole previous transaction; the spent output
/// and its value are read out of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyInput {
    /// Serialized previous transaction.
    pub prev_tx: Option<Vec<u8>>,
    pub vout: u32,
    /// Required when the spent output is scripthash.
    pub redeem_script: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WitnessInput {
    /// Previous txid, display (big-endian) hex.
    pub txid: String,
    pub vout: u32,
    /// Locking script of the spent output.
    pub prev_script: Option<Vec<u8>>,
    /// Value of the spent output in base units.
    pub value: Option<u64>,
    /// Witness-pubkeyhash program for scripthash-wrapped keyhash outputs,
    /// or the witness script for witness-scripthash outputs (wrapped or
    /// native).
    pub redeem_script: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutput {
    pub script: Vec<u8>,
    pub value: u64,
}

impl TransactionOutput {
    pub fn new(script: Vec<u8>, value: u64) -> Self {
        Self { script, value }
    }
}

/// How a single-key input is unlocked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SpendTemplate {
    PubKeyHash {
        key_hash: [u8; 20],
    },
    ScriptHashPubKey {
        redeem_script: Vec<u8>,
        pubkey: [u8; 33],
    },
    WitnessPubKeyHash {
        key_hash: [u8; 20],
    },
    WitnessScriptHashPubKey {
        witness_script: Vec<u8>,
        pubkey: [u8; 33],
    },
    WrappedWitnessPubKeyHash {
        redeem_script: Vec<u8>,
        key_hash: [u8; 20],
    },
    WrappedWitnessScriptHashPubKey {
        witness_script: Vec<u8>,
        pubkey: [u8; 33],
    },
}

impl SpendTemplate {
    pub(crate) fn is_legacy(&self) -> bool {
        matches!(
            self,
            SpendTemplate::PubKeyHash { .. } | SpendTemplate::ScriptHashPubKey { .. }
        )
    }

    /// Whether `pubkey` (compressed SEC1) is the key this template commits to.
    pub(crate) fn commits_to(&self, pubkey: &[u8; 33]) -> bool {
        match self {
            SpendTemplate::PubKeyHash { key_hash }
            | SpendTemplate::WitnessPubKeyHash { key_hash }
            | SpendTemplate::WrappedWitnessPubKeyHash { key_hash, .. } => {
                hash160(pubkey) == *key_hash
            }
            SpendTemplate::ScriptHashPubKey { pubkey: committed, .. }
            | SpendTemplate::WitnessScriptHashPubKey { pubkey: committed, .. }
            | SpendTemplate::WrappedWitnessScriptHashPubKey { pubkey: committed, .. } => {
                committed == pubkey
            }
        }
    }
}

/// A validated input: everything signing and finalization need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PreparedInput {
    pub outpoint: OutPoint,
    pub prev_script: ScriptBuf,
    pub value: Amount,
    pub template: SpendTemplate,
}

impl PreparedInput {
    pub(crate) fn prepare(index: usize, input: &TransactionInput) -> Result<Self, UtxoError> {
        match input {
            TransactionInput::Legacy(legacy) => Self::prepare_legacy(index, legacy),
            TransactionInput::Witness(witness) => Self::prepare_witness(index, witness),
        }
    }

    fn prepare_legacy(index: usize, input: &LegacyInput) -> Result<Self, UtxoError> {
        let prev_bytes = input
            .prev_tx
            .as_deref()
            .filter(|bytes| !bytes.is_empty())
            .ok_or(UtxoError::MissingInputData {
                index,
                field: "prev_tx",
            })?;
        let prev_tx: Transaction = deserialize(prev_bytes).map_err(|e| UtxoError::InvalidInput {
            index,
            reason: format!("previous transaction: {e}"),
        })?;
        let spent = prev_tx
            .output
            .get(input.vout as usize)
            .ok_or_else(|| UtxoError::InvalidInput {
                index,
                reason: format!(
                    "vout {} out of range ({} outputs)",
                    input.vout,
                    prev_tx.output.len()
                ),
            })?;

        let template = classify_spend(
            index,
            spent.script_pubkey.as_bytes(),
            input.redeem_script.as_deref(),
        )?;
        Ok(Self {
            outpoint: OutPoint::new(prev_tx.compute_txid(), input.vout),
            prev_script: spent.script_pubkey.clone(),
            value: spent.value,
            template,
        })
    }

    fn prepare_witness(index: usize, input: &WitnessInput) -> Result<Self, UtxoError> {
        if input.txid.is_empty() {
            return Err(UtxoError::MissingInputData {
                index,
                field: "txid",
            });
        }
        let txid: Txid = input.txid.parse().map_err(|e| UtxoError::InvalidInput {
            index,
            reason: format!("txid: {e}"),
        })?;
        let prev_script = input
            .prev_script
            .as_deref()
            .filter(|script| !script.is_empty())
            .ok_or(UtxoError::MissingInputData {
                index,
                field: "prev_script",
            })?;
        let value = input.value.ok_or(UtxoError::MissingInputData {
            index,
            field: "value",
        })?;

        let template = classify_spend(index, prev_script, input.redeem_script.as_deref())?;
        if template.is_legacy() {
            return Err(UtxoError::MissingInputData {
                index,
                field: "prev_tx",
            });
        }
        Ok(Self {
            outpoint: OutPoint::new(txid, input.vout),
            prev_script: ScriptBuf::from(prev_script.to_vec()),
            value: Amount::from_sat(value),
            template,
        })
    }
}

/// Matches the spent script (and redeem script, if any) against the
/// single-key templates the signer handles.
fn classify_spend(
    index: usize,
    prev_script: &[u8],
    redeem_script: Option<&[u8]>,
) -> Result<SpendTemplate, UtxoError> {
    let unsupported = |reason: String| UtxoError::UnsupportedScript { index, reason };
    let missing_redeem = UtxoError::MissingInputData {
        index,
        field: "redeem_script",
    };

    match Template::classify(prev_script) {
        Some(Template::PubKeyHash(key_hash)) => Ok(SpendTemplate::PubKeyHash { key_hash }),
        Some(Template::WitnessPubKeyHash(key_hash)) => {
            Ok(SpendTemplate::WitnessPubKeyHash { key_hash })
        }
        Some(Template::WitnessScriptHash(committed)) => {
            let witness_script = redeem_script.ok_or(missing_redeem)?;
            if sha256(witness_script) != committed {
                return Err(UtxoError::InvalidInput {
                    index,
                    reason: "witness script does not hash to the committed program".into(),
                });
            }
            let pubkey = script::parse_p2pk(witness_script)
                .ok_or_else(|| unsupported("witness script is not <pubkey> CHECKSIG".into()))?;
            Ok(SpendTemplate::WitnessScriptHashPubKey {
                witness_script: witness_script.to_vec(),
                pubkey,
            })
        }
        Some(Template::ScriptHash(committed)) => {
            let redeem = redeem_script.ok_or(missing_redeem)?;
            if hash160(redeem) == committed {
                match Template::classify(redeem) {
                    Some(Template::WitnessPubKeyHash(key_hash)) => {
                        Ok(SpendTemplate::WrappedWitnessPubKeyHash {
                            redeem_script: redeem.to_vec(),
                            key_hash,
                        })
                    }
                    Some(Template::WitnessScriptHash(_)) => Err(unsupported(
                        "wrapped witness-scripthash needs the witness script as redeem script"
                            .into(),
                    )),
                    _ => {
                        let pubkey = script::parse_p2pk(redeem).ok_or_else(|| {
                            unsupported("redeem script is not <pubkey> CHECKSIG".into())
                        })?;
                        Ok(SpendTemplate::ScriptHashPubKey {
                            redeem_script: redeem.to_vec(),
                            pubkey,
                        })
                    }
                }
            } else if hash160(&script::p2wsh_of(redeem)) == committed {
                let pubkey = script::parse_p2pk(redeem).ok_or_else(|| {
                    unsupported("witness script is not <pubkey> CHECKSIG".into())
                })?;
                Ok(SpendTemplate::WrappedWitnessScriptHashPubKey {
                    witness_script: redeem.to_vec(),
                    pubkey,
                })
            } else {
                Err(UtxoError::InvalidInput {
                    index,
                    reason: "redeem script does not hash to the committed script hash".into(),
                })
            }
        }
        None => Err(unsupported(format!(
            "unrecognised locking script {}",
            hex::encode(prev_script)
        ))),
    }
}
