//! Transaction validation
//!
//! Applies the acceptance rules to one raw transaction at a time, in a
//! fixed order with short-circuiting. Every failure here is recoverable:
//! the transaction is dropped from the candidate set and the batch
//! continues. Nothing in this module panics or propagates an error past
//! the `ValidationOutcome` boundary.

use crate::core::transaction::{Transaction, TxId, MAX_MONEY, MAX_TX_SIZE};
use crate::crypto::signature::{verify_input, SignatureError};
use std::collections::HashSet;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Minimum fee a pool transaction must pay, in satoshis
pub const MIN_TX_FEE: u64 = 1_000;

// =============================================================================
// Outcome Types
// =============================================================================

/// Why a transaction was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    #[error("transaction too large: {size} bytes (max: {max})")]
    TooLarge { size: usize, max: usize },
    #[error("duplicate txid: {0}")]
    DuplicateTxid(String),
    #[error("unsupported version: {0}")]
    BadVersion(i32),
    #[error("transaction has no inputs")]
    NoInputs,
    #[error("transaction has no outputs")]
    NoOutputs,
    #[error("coinbase input in a pool transaction")]
    CoinbaseInPool,
    #[error("unsupported script type on input {index}: {reason}")]
    UnsupportedScriptType { index: usize, reason: String },
    #[error("invalid script on input {index}: {reason}")]
    InvalidScript { index: usize, reason: String },
    #[error("invalid signature on input {index}: {reason}")]
    InvalidSignature { index: usize, reason: String },
    #[error("outputs exceed inputs")]
    NegativeFee,
    #[error("fee {fee} below minimum {min}")]
    FeeTooLow { fee: u64, min: u64 },
    #[error("output {index} value out of range: {value}")]
    OutputValueOutOfRange { index: usize, value: u64 },
}

/// Result of validating one transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Invalid(ValidationFailure),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }
}

/// Read-only reference sets for the uniqueness check. Both are snapshots
/// for the duration of a validation pass; nothing inserts into them
/// concurrently.
#[derive(Debug)]
pub struct ValidationContext<'a> {
    /// Ids already accepted into the mempool snapshot
    pub mempool_ids: &'a HashSet<TxId>,
    /// Ids already committed to the in-progress block
    pub committed_ids: &'a HashSet<TxId>,
}

// =============================================================================
// Validation
// =============================================================================

/// Validate a transaction against the fixed rule set, in order:
/// size cap, txid uniqueness, structure, per-input scripts/signatures,
/// minimum fee, output value range.
pub fn validate_transaction(tx: &Transaction, ctx: &ValidationContext) -> ValidationOutcome {
    use ValidationFailure::*;

    // 1. Standardness size cap (independent of the block budget)
    let size = tx.size();
    if size > MAX_TX_SIZE {
        return ValidationOutcome::Invalid(TooLarge {
            size,
            max: MAX_TX_SIZE,
        });
    }

    // 2. Uniqueness against the snapshot sets
    if ctx.mempool_ids.contains(&tx.id) || ctx.committed_ids.contains(&tx.id) {
        return ValidationOutcome::Invalid(DuplicateTxid(tx.id_hex()));
    }

    // 3. Structure
    if tx.version != 1 && tx.version != 2 {
        return ValidationOutcome::Invalid(BadVersion(tx.version));
    }
    if tx.vin.is_empty() {
        return ValidationOutcome::Invalid(NoInputs);
    }
    if tx.vout.is_empty() {
        return ValidationOutcome::Invalid(NoOutputs);
    }
    // Coinbase is synthesized at assembly time, never accepted from the pool
    if tx.vin.iter().any(|input| input.is_coinbase) {
        return ValidationOutcome::Invalid(CoinbaseInPool);
    }

    // 4. Per-input unlocking proofs
    for (index, input) in tx.vin.iter().enumerate() {
        if let Err(err) = verify_input(tx, input) {
            return ValidationOutcome::Invalid(match err {
                SignatureError::UnsupportedScriptType(_)
                | SignatureError::TaprootScriptPathUnsupported => UnsupportedScriptType {
                    index,
                    reason: err.to_string(),
                },
                SignatureError::Script(_) => InvalidScript {
                    index,
                    reason: err.to_string(),
                },
                other => InvalidSignature {
                    index,
                    reason: other.to_string(),
                },
            });
        }
    }

    // 5. Minimum fee
    match tx.fee() {
        None => return ValidationOutcome::Invalid(NegativeFee),
        Some(fee) if fee < MIN_TX_FEE => {
            return ValidationOutcome::Invalid(FeeTooLow {
                fee,
                min: MIN_TX_FEE,
            })
        }
        Some(_) => {}
    }

    // 6. Output value range: (0, MAX_MONEY]
    for (index, output) in tx.vout.iter().enumerate() {
        if output.value == 0 || output.value > MAX_MONEY {
            return ValidationOutcome::Invalid(OutputValueOutOfRange {
                index,
                value: output.value,
            });
        }
    }

    ValidationOutcome::Valid
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testutil::{dummy_input, p2wpkh_script, signed_p2wpkh_tx};
    use crate::core::transaction::TxOutput;
    use crate::crypto::KeyPair;

    fn empty_ctx() -> ValidationContext<'static> {
        static EMPTY: std::sync::OnceLock<HashSet<TxId>> = std::sync::OnceLock::new();
        let empty = EMPTY.get_or_init(HashSet::new);
        ValidationContext {
            mempool_ids: empty,
            committed_ids: empty,
        }
    }

    #[test]
    fn test_valid_p2wpkh_transaction_passes() {
        let key = KeyPair::generate();
        let tx = signed_p2wpkh_tx(&key, 20_000, 18_000);
        assert_eq!(validate_transaction(&tx, &empty_ctx()), ValidationOutcome::Valid);
    }

    #[test]
    fn test_oversize_transaction_rejected() {
        let key = KeyPair::generate();
        let mut tx = signed_p2wpkh_tx(&key, 20_000, 18_000);
        tx.vout.push(TxOutput::new(vec![0u8; MAX_TX_SIZE], 1));

        let outcome = validate_transaction(&tx, &empty_ctx());
        assert!(matches!(
            outcome,
            ValidationOutcome::Invalid(ValidationFailure::TooLarge { .. })
        ));
    }

    #[test]
    fn test_duplicate_txid_rejected() {
        let key = KeyPair::generate();
        let tx = signed_p2wpkh_tx(&key, 20_000, 18_000);

        let mut mempool = HashSet::new();
        mempool.insert(tx.id);
        let empty = HashSet::new();
        let ctx = ValidationContext {
            mempool_ids: &mempool,
            committed_ids: &empty,
        };
        assert!(matches!(
            validate_transaction(&tx, &ctx),
            ValidationOutcome::Invalid(ValidationFailure::DuplicateTxid(_))
        ));

        // Also rejected when already committed to the block in progress
        let ctx = ValidationContext {
            mempool_ids: &empty,
            committed_ids: &mempool,
        };
        assert!(matches!(
            validate_transaction(&tx, &ctx),
            ValidationOutcome::Invalid(ValidationFailure::DuplicateTxid(_))
        ));
    }

    #[test]
    fn test_bad_version_rejected() {
        let key = KeyPair::generate();
        let good = signed_p2wpkh_tx(&key, 20_000, 18_000);
        let tx = crate::core::transaction::Transaction::new(3, 0, good.vin, good.vout);
        assert!(matches!(
            validate_transaction(&tx, &empty_ctx()),
            ValidationOutcome::Invalid(ValidationFailure::BadVersion(3))
        ));
    }

    #[test]
    fn test_coinbase_input_rejected() {
        let key = KeyPair::generate();
        let mut tx = signed_p2wpkh_tx(&key, 20_000, 18_000);
        tx.vin[0].is_coinbase = true;
        assert!(matches!(
            validate_transaction(&tx, &empty_ctx()),
            ValidationOutcome::Invalid(ValidationFailure::CoinbaseInPool)
        ));
    }

    #[test]
    fn test_unsupported_script_type_rejected() {
        let prevout = TxOutput::new(vec![0x6a, 0x01, 0xff], 20_000);
        let spend = TxOutput::new(p2wpkh_script(&[9; 20]), 18_000);
        let tx = crate::core::transaction::Transaction::new(
            1,
            0,
            vec![dummy_input(prevout, vec![], vec![])],
            vec![spend],
        );
        assert!(matches!(
            validate_transaction(&tx, &empty_ctx()),
            ValidationOutcome::Invalid(ValidationFailure::UnsupportedScriptType { .. })
        ));
    }

    #[test]
    fn test_fee_below_minimum_rejected() {
        let key = KeyPair::generate();
        let tx = signed_p2wpkh_tx(&key, 20_000, 19_500);
        assert_eq!(
            validate_transaction(&tx, &empty_ctx()),
            ValidationOutcome::Invalid(ValidationFailure::FeeTooLow {
                fee: 500,
                min: MIN_TX_FEE
            })
        );
    }

    #[test]
    fn test_negative_fee_rejected() {
        let key = KeyPair::generate();
        let tx = signed_p2wpkh_tx(&key, 10_000, 12_000);
        assert_eq!(
            validate_transaction(&tx, &empty_ctx()),
            ValidationOutcome::Invalid(ValidationFailure::NegativeFee)
        );
    }

    #[test]
    fn test_zero_value_output_rejected() {
        let key = KeyPair::generate();
        let tx = signed_p2wpkh_tx(&key, 20_000, 0);
        assert!(matches!(
            validate_transaction(&tx, &empty_ctx()),
            ValidationOutcome::Invalid(ValidationFailure::OutputValueOutOfRange { index: 0, value: 0 })
        ));
    }

    #[test]
    fn test_invalid_signature_rejected() {
        let key = KeyPair::generate();
        let mut tx = signed_p2wpkh_tx(&key, 20_000, 18_000);
        tx.vin[0].witness[0][7] ^= 0x01;
        assert!(matches!(
            validate_transaction(&tx, &empty_ctx()),
            ValidationOutcome::Invalid(ValidationFailure::InvalidSignature { index: 0, .. })
        ));
    }
}
