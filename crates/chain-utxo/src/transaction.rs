use bitcoin::absolute::LockTime;
use bitcoin::consensus;
use bitcoin::hashes::Hash;
use bitcoin::script::{Builder, PushBytesBuf, Script, ScriptBuf};
use bitcoin::secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::transaction::Version;
use bitcoin::{Amount, Sequence, Transaction, TxIn, TxOut, Witness};
use crypto_utils::PrivateKeyBytes;
use tracing::debug;

use crate::error::UtxoError;
use crate::input::{PreparedInput, SpendTemplate, TransactionInput, TransactionOutput};
use crate::script;

/// Sequence for inputs when replace-by-fee is not requested.
pub const SEQUENCE_FINAL: Sequence = Sequence::MAX;

/// Sequence signalling replaceability: the maximum with its two low bits
/// cleared.
pub const SEQUENCE_RBF: Sequence = Sequence(0xFFFF_FFFC);

/// Where a [`Draft`] is in the signing lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftState {
    Unsigned,
    PartiallySigned,
    FullySigned,
}

#[derive(Clone)]
struct InputSignature {
    /// DER signature with the sighash byte appended.
    signature: Vec<u8>,
    pubkey: PublicKey,
}

impl std::fmt::Debug for InputSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputSignature")
            .field("signature", &hex::encode(&self.signature))
            .field("pubkey", &self.pubkey.to_string())
            .finish()
    }
}

/// An unsigned or partially signed transaction.
///
/// Input and output order is fixed at creation. Signing an input either
/// attaches a verified signature or fails without touching the draft.
#[derive(Debug, Clone)]
pub struct Draft {
    tx: Transaction,
    inputs: Vec<PreparedInput>,
    signatures: Vec<Option<InputSignature>>,
}

/// A finalized transaction. Immutable; build a new [`Draft`] to change it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    tx: Transaction,
}

/// Validates every input and builds the unsigned transaction.
pub fn create_draft(
    inputs: &[TransactionInput],
    outputs: &[TransactionOutput],
    rbf: bool,
) -> Result<Draft, UtxoError> {
    Draft::new(inputs, outputs, rbf)
}

impl Draft {
    pub fn new(
        inputs: &[TransactionInput],
        outputs: &[TransactionOutput],
        rbf: bool,
    ) -> Result<Self, UtxoError> {
        if inputs.is_empty() {
            return Err(UtxoError::EmptyTransaction("inputs"));
        }
        if outputs.is_empty() {
            return Err(UtxoError::EmptyTransaction("outputs"));
        }

        let prepared = inputs
            .iter()
            .enumerate()
            .map(|(index, input)| PreparedInput::prepare(index, input))
            .collect::<Result<Vec<_>, _>>()?;

        let sequence = if rbf { SEQUENCE_RBF } else { SEQUENCE_FINAL };
        let tx = Transaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input: prepared
                .iter()
                .map(|input| TxIn {
                    previous_output: input.outpoint,
                    script_sig: ScriptBuf::new(),
                    sequence,
                    witness: Witness::default(),
                })
                .collect(),
            output: outputs
                .iter()
                .map(|output| TxOut {
                    value: Amount::from_sat(output.value),
                    script_pubkey: ScriptBuf::from(output.script.clone()),
                })
                .collect(),
        };

        debug!(
            inputs = prepared.len(),
            outputs = outputs.len(),
            rbf,
            "draft created"
        );
        Ok(Self {
            tx,
            signatures: vec![None; prepared.len()],
            inputs: prepared,
        })
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.tx.output.len()
    }

    pub fn state(&self) -> DraftState {
        let signed = self.signatures.iter().filter(|sig| sig.is_some()).count();
        if signed == 0 {
            DraftState::Unsigned
        } else if signed < self.signatures.len() {
            DraftState::PartiallySigned
        } else {
            DraftState::FullySigned
        }
    }

    pub fn is_signed(&self, index: usize) -> bool {
        matches!(self.signatures.get(index), Some(Some(_)))
    }

    /// Indices of inputs still lacking a signature.
    pub fn unsigned_inputs(&self) -> Vec<usize> {
        self.signatures
            .iter()
            .enumerate()
            .filter_map(|(index, sig)| sig.is_none().then_some(index))
            .collect()
    }

    pub fn sequence(&self, index: usize) -> Option<u32> {
        self.tx.input.get(index).map(|input| input.sequence.0)
    }

    /// Sum of spent output values.
    pub fn total_input(&self) -> u64 {
        self.inputs.iter().map(|input| input.value.to_sat()).sum()
    }

    pub fn total_output(&self) -> u64 {
        self.tx.output.iter().map(|output| output.value.to_sat()).sum()
    }

    /// Inputs minus outputs; `None` if the outputs overspend.
    pub fn fee(&self) -> Option<u64> {
        self.total_input().checked_sub(self.total_output())
    }

    /// Signs input `index` with `private_key` (SIGHASH_ALL).
    ///
    /// The key must be the one the spent script commits to and the signature
    /// must verify before it is attached; on any failure the draft is left
    /// as it was.
    pub fn sign_input(
        &mut self,
        index: usize,
        private_key: &PrivateKeyBytes,
    ) -> Result<(), UtxoError> {
        let input = self.inputs.get(index).ok_or(UtxoError::InputOutOfRange {
            index,
            count: self.inputs.len(),
        })?;

        let secp = Secp256k1::new();
        let secret_key = SecretKey::from_slice(private_key.as_bytes())
            .map_err(|e| UtxoError::InvalidPrivateKey(format!("invalid secret key: {e}")))?;
        let pubkey = PublicKey::from_secret_key(&secp, &secret_key);
        if !input.template.commits_to(&pubkey.serialize()) {
            return Err(UtxoError::SignatureInvalid {
                index,
                reason: "key does not match the script being spent".into(),
            });
        }

        let msg = Message::from_digest(self.sighash(index, input)?);
        let signature = secp.sign_ecdsa(&msg, &secret_key);
        secp.verify_ecdsa(&msg, &signature, &pubkey)
            .map_err(|e| UtxoError::SignatureInvalid {
                index,
                reason: e.to_string(),
            })?;

        let mut sig_bytes = signature.serialize_der().to_vec();
        sig_bytes.push(EcdsaSighashType::All as u8);

        self.signatures[index] = Some(InputSignature {
            signature: sig_bytes,
            pubkey,
        });
        debug!(index, state = ?self.state(), "input signed");
        Ok(())
    }

    /// Assembles unlocking data for every input.
    ///
    /// Fails with [`UtxoError::IncompleteSignatures`] if any input is
    /// unsigned; the draft stays usable either way.
    pub fn finalize(&self) -> Result<SignedTransaction, UtxoError> {
        let missing = self.unsigned_inputs();
        if !missing.is_empty() {
            return Err(UtxoError::IncompleteSignatures(missing));
        }

        let mut tx = self.tx.clone();
        for (index, (input, signature)) in self.inputs.iter().zip(&self.signatures).enumerate() {
            let Some(signature) = signature else {
                return Err(UtxoError::IncompleteSignatures(vec![index]));
            };
            let (script_sig, witness) = unlocking_data(index, &input.template, signature)?;
            tx.input[index].script_sig = script_sig;
            tx.input[index].witness = witness;
        }

        debug!(txid = %tx.compute_txid(), "transaction finalized");
        Ok(SignedTransaction { tx })
    }

    fn sighash(&self, index: usize, input: &PreparedInput) -> Result<[u8; 32], UtxoError> {
        let failed = |e: String| UtxoError::InvalidInput {
            index,
            reason: format!("sighash computation failed: {e}"),
        };
        let mut cache = SighashCache::new(&self.tx);
        let sighash_all = EcdsaSighashType::All;

        let digest = match &input.template {
            SpendTemplate::PubKeyHash { .. } => cache
                .legacy_signature_hash(index, &input.prev_script, sighash_all.to_u32())
                .map_err(|e| failed(e.to_string()))?
                .to_byte_array(),
            SpendTemplate::ScriptHashPubKey { redeem_script, .. } => cache
                .legacy_signature_hash(index, Script::from_bytes(redeem_script), sighash_all.to_u32())
                .map_err(|e| failed(e.to_string()))?
                .to_byte_array(),
            SpendTemplate::WitnessPubKeyHash { .. } => cache
                .p2wpkh_signature_hash(index, &input.prev_script, input.value, sighash_all)
                .map_err(|e| failed(e.to_string()))?
                .to_byte_array(),
            SpendTemplate::WrappedWitnessPubKeyHash { redeem_script, .. } => cache
                .p2wpkh_signature_hash(
                    index,
                    Script::from_bytes(redeem_script),
                    input.value,
                    sighash_all,
                )
                .map_err(|e| failed(e.to_string()))?
                .to_byte_array(),
            SpendTemplate::WitnessScriptHashPubKey { witness_script, .. }
            | SpendTemplate::WrappedWitnessScriptHashPubKey { witness_script, .. } => cache
                .p2wsh_signature_hash(
                    index,
                    Script::from_bytes(witness_script),
                    input.value,
                    sighash_all,
                )
                .map_err(|e| failed(e.to_string()))?
                .to_byte_array(),
        };
        Ok(digest)
    }
}

fn unlocking_data(
    index: usize,
    template: &SpendTemplate,
    signature: &InputSignature,
) -> Result<(ScriptBuf, Witness), UtxoError> {
    let push = |builder: Builder, data: &[u8]| -> Result<Builder, UtxoError> {
        let bytes = PushBytesBuf::try_from(data.to_vec()).map_err(|e| UtxoError::InvalidInput {
            index,
            reason: format!("unlocking push too large: {e}"),
        })?;
        Ok(builder.push_slice(bytes))
    };
    let pubkey = signature.pubkey.serialize();
    let mut script_sig = Builder::new();
    let mut witness = Witness::new();

    match template {
        SpendTemplate::PubKeyHash { .. } => {
            script_sig = push(script_sig, &signature.signature)?;
            script_sig = push(script_sig, &pubkey)?;
        }
        SpendTemplate::ScriptHashPubKey { redeem_script, .. } => {
            script_sig = push(script_sig, &signature.signature)?;
            script_sig = push(script_sig, redeem_script)?;
        }
        SpendTemplate::WitnessPubKeyHash { .. } => {
            witness.push(&signature.signature);
            witness.push(pubkey);
        }
        SpendTemplate::WitnessScriptHashPubKey { witness_script, .. } => {
            witness.push(&signature.signature);
            witness.push(witness_script);
        }
        SpendTemplate::WrappedWitnessPubKeyHash { redeem_script, .. } => {
            script_sig = push(script_sig, redeem_script)?;
            witness.push(&signature.signature);
            witness.push(pubkey);
        }
        SpendTemplate::WrappedWitnessScriptHashPubKey { witness_script, .. } => {
            script_sig = push(script_sig, &script::p2wsh_of(witness_script))?;
            witness.push(&signature.signature);
            witness.push(witness_script);
        }
    }
    Ok((script_sig.into_script(), witness))
}

impl SignedTransaction {
    /// Parses a serialized transaction. Trailing bytes are rejected.
    pub fn parse(bytes: &[u8]) -> Result<Self, UtxoError> {
        let tx: Transaction = consensus::deserialize(bytes)
            .map_err(|e| UtxoError::InvalidTransaction(e.to_string()))?;
        Ok(Self { tx })
    }

    pub fn serialize(&self) -> Vec<u8> {
        consensus::serialize(&self.tx)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.serialize())
    }

    /// Display-order txid.
    pub fn txid(&self) -> String {
        self.tx.compute_txid().to_string()
    }

    pub fn weight(&self) -> u64 {
        self.tx.weight().to_wu()
    }

    pub fn vsize(&self) -> u64 {
        self.tx.vsize() as u64
    }

    pub fn total_output(&self) -> u64 {
        self.tx.output.iter().map(|output| output.value.to_sat()).sum()
    }

    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{LegacyInput, WitnessInput};
    use bitcoin::OutPoint;
    use crypto_utils::hash::hash160;

    const PREV_TXID: &str = "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b";

    fn key(byte: u8) -> PrivateKeyBytes {
        PrivateKeyBytes::new([byte; 32])
    }

    fn pubkey(byte: u8) -> [u8; 33] {
        let secp = Secp256k1::new();
        let sk = SecretKey::from_slice(&[byte; 32]).unwrap();
        PublicKey::from_secret_key(&secp, &sk).serialize()
    }

    fn witness_input(prev_script: Vec<u8>, redeem: Option<Vec<u8>>) -> TransactionInput {
        TransactionInput::Witness(WitnessInput {
            txid: PREV_TXID.into(),
            vout: 0,
            prev_script: Some(prev_script),
            value: Some(50_000),
            redeem_script: redeem,
        })
    }

    /// A serialized one-output transaction paying `value` to `script`.
    fn funding_tx(script: Vec<u8>, value: u64) -> Vec<u8> {
        let tx = Transaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input: vec![TxIn {
                previous_output: OutPoint::null(),
                script_sig: ScriptBuf::from(vec![0x51]),
                sequence: Sequence::MAX,
                witness: Witness::default(),
            }],
            output: vec![TxOut {
                value: Amount::from_sat(value),
                script_pubkey: ScriptBuf::from(script),
            }],
        };
        consensus::serialize(&tx)
    }

    fn pay_out() -> Vec<TransactionOutput> {
        vec![TransactionOutput::new(script::p2pkh(&[0x33; 20]), 49_000)]
    }

    #[test]
    fn sequence_follows_rbf_flag() {
        let input = witness_input(script::p2wpkh(&hash160(&pubkey(1))), None);
        let final_draft = create_draft(&[input.clone()], &pay_out(), false).unwrap();
        assert_eq!(final_draft.sequence(0), Some(0xFFFF_FFFF));
        let rbf_draft = create_draft(&[input], &pay_out(), true).unwrap();
        assert_eq!(rbf_draft.sequence(0), Some(0xFFFF_FFFC));
        assert!(SEQUENCE_RBF.is_rbf());
        assert!(!SEQUENCE_FINAL.is_rbf());
    }

    #[test]
    fn empty_inputs_or_outputs_rejected() {
        let input = witness_input(script::p2wpkh(&[1u8; 20]), None);
        assert_eq!(
            create_draft(&[], &pay_out(), false).unwrap_err(),
            UtxoError::EmptyTransaction("inputs")
        );
        assert_eq!(
            create_draft(&[input], &[], false).unwrap_err(),
            UtxoError::EmptyTransaction("outputs")
        );
    }

    #[test]
    fn missing_value_names_field_and_index() {
        let good = witness_input(script::p2wpkh(&[1u8; 20]), None);
        let bad = TransactionInput::Witness(WitnessInput {
            txid: PREV_TXID.into(),
            vout: 1,
            prev_script: Some(script::p2wpkh(&[1u8; 20])),
            value: None,
            redeem_script: None,
        });
        let err = create_draft(&[good, bad], &pay_out(), false).unwrap_err();
        assert_eq!(err, UtxoError::MissingInputData { index: 1, field: "value" });
    }

    #[test]
    fn p2wpkh_sign_and_finalize() {
        let input = witness_input(script::p2wpkh(&hash160(&pubkey(1))), None);
        let mut draft = create_draft(&[input], &pay_out(), true).unwrap();
        assert_eq!(draft.state(), DraftState::Unsigned);
        assert_eq!(draft.fee(), Some(1_000));

        draft.sign_input(0, &key(1)).unwrap();
        assert_eq!(draft.state(), DraftState::FullySigned);

        let signed = draft.finalize().unwrap();
        let tx = signed.transaction();
        assert!(tx.input[0].script_sig.is_empty());
        assert_eq!(tx.input[0].witness.len(), 2);
        assert_eq!(tx.input[0].witness.nth(1).unwrap(), pubkey(1).as_slice());
        let sig = tx.input[0].witness.nth(0).unwrap();
        assert_eq!(*sig.last().unwrap(), 0x01);
        assert_eq!(signed.total_output(), 49_000);
        assert!(signed.vsize() < signed.weight());
    }

    #[test]
    fn wrong_key_leaves_draft_untouched() {
        let input = witness_input(script::p2wpkh(&hash160(&pubkey(1))), None);
        let mut draft = create_draft(&[input], &pay_out(), false).unwrap();
        let err = draft.sign_input(0, &key(2)).unwrap_err();
        assert!(matches!(err, UtxoError::SignatureInvalid { index: 0, .. }));
        assert_eq!(draft.state(), DraftState::Unsigned);
        assert!(!draft.is_signed(0));
    }

    #[test]
    fn sign_out_of_range() {
        let input = witness_input(script::p2wpkh(&hash160(&pubkey(1))), None);
        let mut draft = create_draft(&[input], &pay_out(), false).unwrap();
        assert_eq!(
            draft.sign_input(1, &key(1)).unwrap_err(),
            UtxoError::InputOutOfRange { index: 1, count: 1 }
        );
    }

    #[test]
    fn invalid_scalar_rejected() {
        let input = witness_input(script::p2wpkh(&hash160(&pubkey(1))), None);
        let mut draft = create_draft(&[input], &pay_out(), false).unwrap();
        let err = draft.sign_input(0, &PrivateKeyBytes::new([0u8; 32])).unwrap_err();
        assert!(matches!(err, UtxoError::InvalidPrivateKey(_)));
    }

    #[test]
    fn finalize_requires_every_signature() {
        let inputs = vec![
            witness_input(script::p2wpkh(&hash160(&pubkey(1))), None),
            witness_input(script::p2wpkh(&hash160(&pubkey(2))), None),
        ];
        let mut draft = create_draft(&inputs, &pay_out(), false).unwrap();
        draft.sign_input(1, &key(2)).unwrap();
        assert_eq!(draft.state(), DraftState::PartiallySigned);
        assert_eq!(
            draft.finalize().unwrap_err(),
            UtxoError::IncompleteSignatures(vec![0])
        );

        draft.sign_input(0, &key(1)).unwrap();
        assert!(draft.finalize().is_ok());
    }

    #[test]
    fn legacy_p2pkh_script_sig() {
        let prev = funding_tx(script::p2pkh(&hash160(&pubkey(3))), 20_000);
        let input = TransactionInput::Legacy(LegacyInput {
            prev_tx: Some(prev.clone()),
            vout: 0,
            redeem_script: None,
        });
        let mut draft = create_draft(&[input], &pay_out(), false).unwrap();
        assert_eq!(draft.total_input(), 20_000);
        assert_eq!(draft.fee(), None);
        draft.sign_input(0, &key(3)).unwrap();
        let signed = draft.finalize().unwrap();

        let tx = signed.transaction();
        let prev_tx: Transaction = consensus::deserialize(&prev).unwrap();
        assert_eq!(tx.input[0].previous_output.txid, prev_tx.compute_txid());
        assert!(tx.input[0].witness.is_empty());
        let script_sig = tx.input[0].script_sig.as_bytes();
        assert!(script_sig.ends_with(&pubkey(3)));
        assert_eq!(script_sig[script_sig.len() - 34], 33);
        assert_eq!(signed.weight(), 4 * signed.serialize().len() as u64);
    }

    #[test]
    fn legacy_scripthash_over_pubkey() {
        let redeem = script::p2pk(&pubkey(4));
        let prev = funding_tx(script::p2sh_of(&redeem), 60_000);
        let input = TransactionInput::Legacy(LegacyInput {
            prev_tx: Some(prev),
            vout: 0,
            redeem_script: Some(redeem.clone()),
        });
        let mut draft = create_draft(&[input], &pay_out(), false).unwrap();
        draft.sign_input(0, &key(4)).unwrap();
        let signed = draft.finalize().unwrap();
        let script_sig = signed.transaction().input[0].script_sig.as_bytes();
        assert!(script_sig.ends_with(&redeem));
    }

    #[test]
    fn script_sig_uses_minimal_push_opcodes() {
        let secp = Secp256k1::new();
        let sk = SecretKey::from_slice(&[8u8; 32]).unwrap();
        let signature = InputSignature {
            signature: vec![0x30; 72],
            pubkey: PublicKey::from_secret_key(&secp, &sk),
        };
        let redeem_script = vec![0x51; 300];
        let template = SpendTemplate::ScriptHashPubKey {
            redeem_script: redeem_script.clone(),
            pubkey: pubkey(8),
        };
        let (script_sig, witness) = unlocking_data(0, &template, &signature).unwrap();
        assert!(witness.is_empty());

        let bytes = script_sig.as_bytes();
        assert_eq!(bytes[0], 72);
        // OP_PUSHDATA2 with a little-endian length of 300.
        assert_eq!(&bytes[73..76], &[0x4d, 0x2c, 0x01]);
        assert_eq!(&bytes[76..], redeem_script.as_slice());
    }

    #[test]
    fn legacy_vout_out_of_range() {
        let prev = funding_tx(script::p2pkh(&[1u8; 20]), 1_000);
        let input = TransactionInput::Legacy(LegacyInput {
            prev_tx: Some(prev),
            vout: 3,
            redeem_script: None,
        });
        let err = create_draft(&[input], &pay_out(), false).unwrap_err();
        assert!(matches!(err, UtxoError::InvalidInput { index: 0, .. }));
    }

    #[test]
    fn wrapped_witness_pubkeyhash_unlocking() {
        let redeem = script::p2wpkh(&hash160(&pubkey(5)));
        let input = witness_input(script::p2sh_of(&redeem), Some(redeem.clone()));
        let mut draft = create_draft(&[input], &pay_out(), false).unwrap();
        draft.sign_input(0, &key(5)).unwrap();
        let signed = draft.finalize().unwrap();
        let tx_in = &signed.transaction().input[0];

        let mut expected_sig = vec![redeem.len() as u8];
        expected_sig.extend_from_slice(&redeem);
        assert_eq!(tx_in.script_sig.as_bytes(), expected_sig.as_slice());
        assert_eq!(tx_in.witness.nth(1).unwrap(), pubkey(5).as_slice());
    }

    #[test]
    fn witness_scripthash_unlocking() {
        let witness_script = script::p2pk(&pubkey(6));
        let input = witness_input(script::p2wsh_of(&witness_script), Some(witness_script.clone()));
        let mut draft = create_draft(&[input], &pay_out(), false).unwrap();
        draft.sign_input(0, &key(6)).unwrap();
        let signed = draft.finalize().unwrap();
        let tx_in = &signed.transaction().input[0];
        assert!(tx_in.script_sig.is_empty());
        assert_eq!(tx_in.witness.nth(1).unwrap(), witness_script.as_slice());
    }

    #[test]
    fn wrapped_witness_scripthash_unlocking() {
        let witness_script = script::p2pk(&pubkey(7));
        let program = script::p2wsh_of(&witness_script);
        let input = witness_input(script::p2sh_of(&program), Some(witness_script.clone()));
        let mut draft = create_draft(&[input], &pay_out(), false).unwrap();
        draft.sign_input(0, &key(7)).unwrap();
        let signed = draft.finalize().unwrap();
        let tx_in = &signed.transaction().input[0];
        assert_eq!(&tx_in.script_sig.as_bytes()[1..], program.as_slice());
        assert_eq!(tx_in.witness.nth(1).unwrap(), witness_script.as_slice());
    }

    #[test]
    fn output_order_is_preserved() {
        let outputs = vec![
            TransactionOutput::new(script::p2pkh(&[0x01; 20]), 300),
            TransactionOutput::new(script::p2wpkh(&[0x02; 20]), 100),
            TransactionOutput::new(script::p2sh(&[0x03; 20]), 200),
        ];
        let input = witness_input(script::p2wpkh(&hash160(&pubkey(1))), None);
        let mut draft = create_draft(&[input], &outputs, false).unwrap();
        draft.sign_input(0, &key(1)).unwrap();
        let signed = draft.finalize().unwrap();
        let values: Vec<u64> = signed
            .transaction()
            .output
            .iter()
            .map(|o| o.value.to_sat())
            .collect();
        assert_eq!(values, vec![300, 100, 200]);
    }

    #[test]
    fn signing_is_deterministic() {
        let input = witness_input(script::p2wpkh(&hash160(&pubkey(1))), None);
        let sign = || {
            let mut draft = create_draft(&[input.clone()], &pay_out(), true).unwrap();
            draft.sign_input(0, &key(1)).unwrap();
            draft.finalize().unwrap()
        };
        assert_eq!(sign().serialize(), sign().serialize());
    }

    #[test]
    fn parse_roundtrip_and_trailing_bytes() {
        let input = witness_input(script::p2wpkh(&hash160(&pubkey(1))), None);
        let mut draft = create_draft(&[input], &pay_out(), false).unwrap();
        draft.sign_input(0, &key(1)).unwrap();
        let signed = draft.finalize().unwrap();

        let bytes = signed.serialize();
        let parsed = SignedTransaction::parse(&bytes).unwrap();
        assert_eq!(parsed, signed);
        assert_eq!(parsed.txid(), signed.txid());
        assert_eq!(parsed.to_hex(), hex::encode(&bytes));

        let mut extended = bytes;
        extended.push(0);
        assert!(matches!(
            SignedTransaction::parse(&extended),
            Err(UtxoError::InvalidTransaction(_))
        ));
    }
}
