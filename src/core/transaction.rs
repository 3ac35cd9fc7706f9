//! Transaction model and canonical byte encoding
//!
//! Transactions are read once from the pending pool, validated once, and
//! either included in the candidate block or dropped. The canonical
//! encoding defined here is the single source of truth for transaction
//! ids, signature messages, and size accounting, so the validator and the
//! block assembler always agree on what a transaction weighs.

use crate::core::script::ScriptType;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum canonical size of a single transaction in bytes (standardness
/// cap, independent of the block size budget)
pub const MAX_TX_SIZE: usize = 100_000;

/// Maximum total coin supply in satoshis (21 million coins)
pub const MAX_MONEY: u64 = 2_100_000_000_000_000;

/// Sequence number marking an input as final
pub const SEQUENCE_FINAL: u32 = 0xFFFFFFFF;

// =============================================================================
// Error Types
// =============================================================================

/// Errors raised while decoding raw transaction records into the model.
/// A decoding failure drops the record; it is never a silent zero-fill.
#[derive(Error, Debug)]
pub enum DecodingError {
    #[error("invalid hex in {0}")]
    InvalidHex(&'static str),
    #[error("invalid txid length: {0} bytes (expected 32)")]
    BadTxidLength(usize),
}

/// A 32-byte transaction id in natural byte order
pub type TxId = [u8; 32];

// =============================================================================
// Transaction Output
// =============================================================================

/// Transaction output: a value locked behind a spending condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    /// Locking script (scriptPubKey) bytes
    pub locking_script: Vec<u8>,
    /// Structural classification of the locking script
    pub script_type: ScriptType,
    /// Amount in satoshis
    pub value: u64,
}

impl TxOutput {
    pub fn new(locking_script: Vec<u8>, value: u64) -> Self {
        let script_type = ScriptType::classify(&locking_script);
        Self {
            locking_script,
            script_type,
            value,
        }
    }
}

// =============================================================================
// Transaction Input
// =============================================================================

/// Transaction input. Since no UTXO set is maintained, each input carries
/// an embedded copy of the output it spends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxInput {
    /// Id of the transaction that created the spent output
    pub previous_txid: TxId,
    /// Index of the spent output in that transaction
    pub previous_index: u32,
    /// The spent output itself, as supplied by the record
    pub previous_output: TxOutput,
    /// Legacy unlocking script (scriptSig); empty for witness-only spends
    pub unlocking_script: Vec<u8>,
    /// Segregated witness stack; empty for legacy spends
    pub witness: Vec<Vec<u8>>,
    /// Sequence number
    pub sequence: u32,
    /// Whether the record claims to be a coinbase input
    pub is_coinbase: bool,
}

// =============================================================================
// Transaction
// =============================================================================

/// A transaction with its derived id.
///
/// The id is computed from the canonical encoding at construction time and
/// is not recomputed afterwards; downstream stages only reorder and
/// reference transactions, never mutate them.
#[derive(Debug, Clone)]
pub struct Transaction {
    /// Transaction version
    pub version: i32,
    /// Locktime (raw, uninterpreted by this tool)
    pub locktime: u32,
    /// Inputs
    pub vin: Vec<TxInput>,
    /// Outputs
    pub vout: Vec<TxOutput>,
    /// Derived id: double SHA-256 of the canonical encoding
    pub id: TxId,
}

impl Transaction {
    /// Create a transaction and derive its id
    pub fn new(version: i32, locktime: u32, vin: Vec<TxInput>, vout: Vec<TxOutput>) -> Self {
        let mut tx = Self {
            version,
            locktime,
            vin,
            vout,
            id: [0u8; 32],
        };
        tx.id = crate::crypto::double_sha256(&tx.serialize());
        tx
    }

    /// The transaction id as a hex string (natural byte order)
    pub fn id_hex(&self) -> String {
        hex::encode(self.id)
    }

    /// Canonical byte encoding: big-endian 4-byte version, 1-byte input
    /// count, per input the previous output's locking script followed by
    /// the unlocking script and the concatenated witness items, 1-byte
    /// output count, per output the locking script followed by the
    /// little-endian 8-byte value, and a big-endian 4-byte locktime.
    pub fn serialize(&self) -> Vec<u8> {
        self.serialize_with_proofs(true)
    }

    /// The byte payload a signer commits to: the canonical encoding with
    /// every input's unlocking proof (scriptSig and witness) left out.
    /// Verifiers hash this same payload, so signatures are checkable
    /// against data that existed before the proofs were attached.
    pub fn signing_payload(&self) -> Vec<u8> {
        self.serialize_with_proofs(false)
    }

    fn serialize_with_proofs(&self, include_proofs: bool) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.size_hint());

        buf.extend_from_slice(&self.version.to_be_bytes());

        buf.push(self.vin.len() as u8);
        for input in &self.vin {
            buf.extend_from_slice(&input.previous_output.locking_script);
            if include_proofs {
                buf.extend_from_slice(&input.unlocking_script);
                for item in &input.witness {
                    buf.extend_from_slice(item);
                }
            }
        }

        buf.push(self.vout.len() as u8);
        for output in &self.vout {
            buf.extend_from_slice(&output.locking_script);
            buf.extend_from_slice(&output.value.to_le_bytes());
        }

        buf.extend_from_slice(&self.locktime.to_be_bytes());

        buf
    }

    fn size_hint(&self) -> usize {
        let vin: usize = self
            .vin
            .iter()
            .map(|i| {
                i.previous_output.locking_script.len()
                    + i.unlocking_script.len()
                    + i.witness.iter().map(Vec::len).sum::<usize>()
            })
            .sum();
        let vout: usize = self.vout.iter().map(|o| o.locking_script.len() + 8).sum();
        10 + vin + vout
    }

    /// Canonical encoding length in bytes; the size used for both the
    /// standardness cap and the block byte budget
    pub fn size(&self) -> usize {
        self.serialize().len()
    }

    /// Sum of the embedded previous-output values
    pub fn total_input_value(&self) -> u64 {
        self.vin.iter().map(|i| i.previous_output.value).sum()
    }

    /// Sum of the output values
    pub fn total_output_value(&self) -> u64 {
        self.vout.iter().map(|o| o.value).sum()
    }

    /// Fee in satoshis, or `None` when the outputs exceed the inputs
    pub fn fee(&self) -> Option<u64> {
        self.total_input_value()
            .checked_sub(self.total_output_value())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testutil::{dummy_input, p2wpkh_script};

    #[test]
    fn test_serialization_layout() {
        let output = TxOutput::new(p2wpkh_script(&[0x11; 20]), 0x0102030405060708);
        let tx = Transaction::new(2, 7, vec![dummy_input(output.clone(), vec![], vec![])], vec![
            output,
        ]);

        let bytes = tx.serialize();
        // version, big-endian
        assert_eq!(&bytes[0..4], &[0, 0, 0, 2]);
        // one input: just the embedded prevout script (no proofs attached)
        assert_eq!(bytes[4], 1);
        assert_eq!(&bytes[5..27], &tx.vin[0].previous_output.locking_script[..]);
        // one output: script then little-endian value
        assert_eq!(bytes[27], 1);
        assert_eq!(&bytes[28..50], &tx.vout[0].locking_script[..]);
        assert_eq!(&bytes[50..58], &0x0102030405060708u64.to_le_bytes());
        // locktime, big-endian
        assert_eq!(&bytes[58..62], &[0, 0, 0, 7]);
    }

    #[test]
    fn test_id_changes_with_content() {
        let output = TxOutput::new(p2wpkh_script(&[0x11; 20]), 1_000);
        let tx1 = Transaction::new(1, 0, vec![dummy_input(output.clone(), vec![], vec![])], vec![
            output.clone(),
        ]);
        let tx2 = Transaction::new(2, 0, vec![dummy_input(output.clone(), vec![], vec![])], vec![
            output,
        ]);
        assert_ne!(tx1.id, tx2.id);
        assert_eq!(tx1.id, crate::crypto::double_sha256(&tx1.serialize()));
    }

    #[test]
    fn test_signing_payload_excludes_proofs() {
        let output = TxOutput::new(p2wpkh_script(&[0x22; 20]), 5_000);
        let unsigned = Transaction::new(
            1,
            0,
            vec![dummy_input(output.clone(), vec![], vec![])],
            vec![output.clone()],
        );
        let signed = Transaction::new(
            1,
            0,
            vec![dummy_input(output.clone(), vec![0xaa; 70], vec![vec![0xbb; 64]])],
            vec![output],
        );

        // Attaching proofs changes the id but not the signed payload.
        assert_ne!(unsigned.id, signed.id);
        assert_eq!(unsigned.signing_payload(), signed.signing_payload());
    }

    #[test]
    fn test_fee() {
        let prevout = TxOutput::new(p2wpkh_script(&[0x33; 20]), 10_000);
        let spend = TxOutput::new(p2wpkh_script(&[0x44; 20]), 9_000);
        let tx = Transaction::new(1, 0, vec![dummy_input(prevout, vec![], vec![])], vec![spend]);
        assert_eq!(tx.fee(), Some(1_000));

        let prevout = TxOutput::new(p2wpkh_script(&[0x33; 20]), 1_000);
        let spend = TxOutput::new(p2wpkh_script(&[0x44; 20]), 9_000);
        let tx = Transaction::new(1, 0, vec![dummy_input(prevout, vec![], vec![])], vec![spend]);
        assert_eq!(tx.fee(), None);
    }
}
