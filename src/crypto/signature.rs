//! Per-input signature verification
//!
//! Checks an input's unlocking proof against the output type it spends.
//! Each supported spending path defines which bytes carry the proof and
//! which hash of the canonical transaction encoding the signature commits
//! to: legacy paths sign the single SHA-256, witness paths the double
//! SHA-256.

use crate::core::interpreter::{ExecContext, Interpreter};
use crate::core::script::{decode_script, ScriptError, ScriptOp, ScriptType};
use crate::core::transaction::{Transaction, TxInput};
use crate::crypto::hash::{double_sha256, hash160, sha256};
use crate::crypto::keys::{strip_sighash_byte, verify_ecdsa, verify_schnorr};
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Why an input's proof was rejected
#[derive(Error, Debug)]
pub enum SignatureError {
    #[error("unsupported script type: {0}")]
    UnsupportedScriptType(ScriptType),
    #[error("taproot script-path spends are not supported")]
    TaprootScriptPathUnsupported,
    #[error("malformed unlocking proof: {0}")]
    MalformedProof(&'static str),
    #[error("invalid public key length: {0} bytes (expected 33 or 65)")]
    InvalidPublicKeyLength(usize),
    #[error("signature verification failed")]
    VerificationFailed,
    #[error("script hash does not match committed hash")]
    ScriptHashMismatch,
    #[error("public key does not match committed hash")]
    PublicKeyHashMismatch,
    #[error("script execution failed: {0}")]
    Script(#[from] ScriptError),
}

// =============================================================================
// Verification
// =============================================================================

/// Verify one input's unlocking proof against the output it spends.
///
/// The spending type is taken from the structural classification of the
/// embedded previous output's locking script; unrecognized patterns are
/// rejected, never accepted by default.
pub fn verify_input(tx: &Transaction, input: &TxInput) -> Result<(), SignatureError> {
    let locking_script = &input.previous_output.locking_script;
    let script_type = ScriptType::classify(locking_script);

    match script_type {
        ScriptType::P2pkh => verify_p2pkh(tx, input),
        ScriptType::P2wpkh => verify_p2wpkh(tx, input),
        ScriptType::P2sh => verify_p2sh(tx, input),
        ScriptType::P2wsh => verify_p2wsh(tx, input),
        ScriptType::P2tr => verify_p2tr(tx, input),
        ScriptType::Unknown => Err(SignatureError::UnsupportedScriptType(script_type)),
    }
}

/// Legacy key-hash spend. The scriptSig carries a length-prefixed
/// signature followed by a length-prefixed public key; the signature
/// commits to the single SHA-256 of the canonical encoding.
fn verify_p2pkh(tx: &Transaction, input: &TxInput) -> Result<(), SignatureError> {
    let script_sig = &input.unlocking_script;
    if script_sig.is_empty() {
        return Err(SignatureError::MalformedProof("empty scriptSig"));
    }

    let sig_len = script_sig[0] as usize;
    let key_len_at = 1 + sig_len;
    if key_len_at >= script_sig.len() {
        return Err(SignatureError::MalformedProof("truncated signature"));
    }
    let signature = &script_sig[1..key_len_at];

    let key_len = script_sig[key_len_at] as usize;
    let key_end = key_len_at + 1 + key_len;
    if key_end > script_sig.len() {
        return Err(SignatureError::MalformedProof("truncated public key"));
    }
    let public_key = &script_sig[key_len_at + 1..key_end];

    if public_key.len() != 33 && public_key.len() != 65 {
        return Err(SignatureError::InvalidPublicKeyLength(public_key.len()));
    }

    check_key_hash_commitment(&input.previous_output.locking_script, public_key)?;

    let message = sha256(&tx.signing_payload());
    if verify_ecdsa(public_key, &message, signature) {
        Ok(())
    } else {
        Err(SignatureError::VerificationFailed)
    }
}

/// Native witness key-hash spend: witness is [signature, public key], the
/// signature commits to the double SHA-256 of the canonical encoding.
fn verify_p2wpkh(tx: &Transaction, input: &TxInput) -> Result<(), SignatureError> {
    let [signature, public_key] = input.witness.as_slice() else {
        return Err(SignatureError::MalformedProof(
            "p2wpkh witness must be [signature, public key]",
        ));
    };

    if public_key.len() != 33 && public_key.len() != 65 {
        return Err(SignatureError::InvalidPublicKeyLength(public_key.len()));
    }

    check_key_hash_commitment(&input.previous_output.locking_script, public_key)?;

    let message = double_sha256(&tx.signing_payload());
    if verify_ecdsa(public_key, &message, signature) {
        Ok(())
    } else {
        Err(SignatureError::VerificationFailed)
    }
}

/// Legacy script-hash spend. The scriptSig is push-only; the final push is
/// the redeem script, which must hash to the committed HASH160 and then
/// execute to a single truthy item with the preceding pushes as its stack.
fn verify_p2sh(tx: &Transaction, input: &TxInput) -> Result<(), SignatureError> {
    let mut pushes = push_only_items(&input.unlocking_script)?;
    let redeem_script = pushes
        .pop()
        .ok_or(SignatureError::MalformedProof("scriptSig has no redeem script"))?;

    let committed = ScriptType::committed_payload(&input.previous_output.locking_script)
        .expect("classified p2sh script commits to a hash");
    if hash160(&redeem_script).as_slice() != committed {
        return Err(SignatureError::ScriptHashMismatch);
    }

    execute_embedded_script(&redeem_script, pushes, sha256(&tx.signing_payload()))
}

/// Native witness script-hash spend: the final witness item is the witness
/// script, committed as its SHA-256; the rest seed the stack.
fn verify_p2wsh(tx: &Transaction, input: &TxInput) -> Result<(), SignatureError> {
    let mut items = input.witness.clone();
    let witness_script = items
        .pop()
        .ok_or(SignatureError::MalformedProof("empty p2wsh witness"))?;

    let committed = ScriptType::committed_payload(&input.previous_output.locking_script)
        .expect("classified p2wsh script commits to a hash");
    if sha256(&witness_script).as_slice() != committed {
        return Err(SignatureError::ScriptHashMismatch);
    }

    execute_embedded_script(&witness_script, items, double_sha256(&tx.signing_payload()))
}

/// Taproot spend. The key path ([signature] witness) is verified as a
/// BIP340 Schnorr signature against the committed x-only key; script-path
/// spends are rejected as unsupported rather than guessed at.
fn verify_p2tr(tx: &Transaction, input: &TxInput) -> Result<(), SignatureError> {
    match input.witness.as_slice() {
        [] => Err(SignatureError::MalformedProof("empty p2tr witness")),
        [signature] => {
            if strip_sighash_byte(signature).is_none() {
                return Err(SignatureError::MalformedProof("bad schnorr signature length"));
            }
            let x_only = ScriptType::committed_payload(&input.previous_output.locking_script)
                .expect("classified p2tr script commits to a key");

            let message = double_sha256(&tx.signing_payload());
            if verify_schnorr(x_only, &message, signature) {
                Ok(())
            } else {
                Err(SignatureError::VerificationFailed)
            }
        }
        _ => Err(SignatureError::TaprootScriptPathUnsupported),
    }
}

/// Decode a scriptSig that must consist solely of pushes, returning the
/// pushed items in order
fn push_only_items(script: &[u8]) -> Result<Vec<Vec<u8>>, SignatureError> {
    decode_script(script)?
        .into_iter()
        .map(|op| match op {
            ScriptOp::Push(data) => Ok(data),
            ScriptOp::Op(_) => Err(SignatureError::MalformedProof(
                "scriptSig must be push-only",
            )),
        })
        .collect()
}

fn check_key_hash_commitment(
    locking_script: &[u8],
    public_key: &[u8],
) -> Result<(), SignatureError> {
    let committed = ScriptType::committed_payload(locking_script)
        .expect("classified key-hash script commits to a hash");
    if hash160(public_key).as_slice() != committed {
        return Err(SignatureError::PublicKeyHashMismatch);
    }
    Ok(())
}

fn execute_embedded_script(
    script: &[u8],
    initial_stack: Vec<Vec<u8>>,
    sighash: [u8; 32],
) -> Result<(), SignatureError> {
    let ops = decode_script(script)?;
    Interpreter::new(initial_stack, ExecContext { sighash }).execute(&ops)?;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
