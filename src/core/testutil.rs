//! Shared test fixtures: standard locking scripts and fully signed
//! single-input transactions for each supported spending type.

use crate::core::script::{OP_CHECKSIG, OP_DUP, OP_EQUAL, OP_EQUALVERIFY, OP_HASH160};
use crate::core::transaction::{Transaction, TxInput, TxOutput, SEQUENCE_FINAL};
use crate::crypto::hash::{double_sha256, hash160, sha256};
use crate::crypto::keys::KeyPair;

pub fn p2pkh_script(key_hash: &[u8; 20]) -> Vec<u8> {
    let mut script = vec![OP_DUP, OP_HASH160, 0x14];
    script.extend_from_slice(key_hash);
    script.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
    script
}

pub fn p2wpkh_script(key_hash: &[u8; 20]) -> Vec<u8> {
    let mut script = vec![0x00, 0x14];
    script.extend_from_slice(key_hash);
    script
}

pub fn p2sh_script(script_hash: &[u8; 20]) -> Vec<u8> {
    let mut script = vec![OP_HASH160, 0x14];
    script.extend_from_slice(script_hash);
    script.push(OP_EQUAL);
    script
}

pub fn p2wsh_script(script_hash: &[u8; 32]) -> Vec<u8> {
    let mut script = vec![0x00, 0x20];
    script.extend_from_slice(script_hash);
    script
}

pub fn p2tr_script(x_only_key: &[u8; 32]) -> Vec<u8> {
    let mut script = vec![0x51, 0x20];
    script.extend_from_slice(x_only_key);
    script
}

/// An input spending the given prevout with the given proof data
pub fn dummy_input(prevout: TxOutput, unlocking_script: Vec<u8>, witness: Vec<Vec<u8>>) -> TxInput {
    TxInput {
        previous_txid: [0x11; 32],
        previous_index: 0,
        previous_output: prevout,
        unlocking_script,
        witness,
        sequence: SEQUENCE_FINAL,
        is_coinbase: false,
    }
}

/// `<pubkey> OP_CHECKSIG`, the embedded script used by the p2sh/p2wsh
/// fixtures
fn pay_to_pubkey_script(key: &KeyPair) -> Vec<u8> {
    let pubkey = key.public_key_bytes();
    let mut script = vec![pubkey.len() as u8];
    script.extend_from_slice(&pubkey);
    script.push(OP_CHECKSIG);
    script
}

fn arbitrary_destination(out_value: u64) -> TxOutput {
    TxOutput::new(p2wpkh_script(&[0x99; 20]), out_value)
}

/// Build a signed single-input transaction: construct it unsigned, hash
/// the signing payload as `make_proof` requires, then reattach the proof.
fn build_signed(
    prevout: TxOutput,
    out_value: u64,
    make_proof: impl FnOnce(&Transaction) -> (Vec<u8>, Vec<Vec<u8>>),
) -> Transaction {
    let unsigned = Transaction::new(
        1,
        0,
        vec![dummy_input(prevout.clone(), Vec::new(), Vec::new())],
        vec![arbitrary_destination(out_value)],
    );
    let (unlocking_script, witness) = make_proof(&unsigned);
    Transaction::new(
        1,
        0,
        vec![dummy_input(prevout, unlocking_script, witness)],
        vec![arbitrary_destination(out_value)],
    )
}

pub fn signed_p2pkh_tx(key: &KeyPair, in_value: u64, out_value: u64) -> Transaction {
    let prevout = TxOutput::new(p2pkh_script(&hash160(&key.public_key_bytes())), in_value);
    build_signed(prevout, out_value, |unsigned| {
        let message = sha256(&unsigned.signing_payload());
        let signature = key.sign_ecdsa(&message);
        let pubkey = key.public_key_bytes();

        let mut script_sig = vec![signature.len() as u8];
        script_sig.extend_from_slice(&signature);
        script_sig.push(pubkey.len() as u8);
        script_sig.extend_from_slice(&pubkey);
        (script_sig, Vec::new())
    })
}

pub fn signed_p2wpkh_tx(key: &KeyPair, in_value: u64, out_value: u64) -> Transaction {
    let prevout = TxOutput::new(p2wpkh_script(&hash160(&key.public_key_bytes())), in_value);
    build_signed(prevout, out_value, |unsigned| {
        let message = double_sha256(&unsigned.signing_payload());
        let signature = key.sign_ecdsa(&message);
        (Vec::new(), vec![signature, key.public_key_bytes()])
    })
}

pub fn signed_p2sh_tx(key: &KeyPair, in_value: u64, out_value: u64) -> Transaction {
    let redeem = pay_to_pubkey_script(key);
    let prevout = TxOutput::new(p2sh_script(&hash160(&redeem)), in_value);
    build_signed(prevout, out_value, |unsigned| {
        let message = sha256(&unsigned.signing_payload());
        let signature = key.sign_ecdsa(&message);

        let mut script_sig = vec![signature.len() as u8];
        script_sig.extend_from_slice(&signature);
        script_sig.push(redeem.len() as u8);
        script_sig.extend_from_slice(&redeem);
        (script_sig, Vec::new())
    })
}

pub fn signed_p2wsh_tx(key: &KeyPair, in_value: u64, out_value: u64) -> Transaction {
    let witness_script = pay_to_pubkey_script(key);
    let prevout = TxOutput::new(p2wsh_script(&sha256(&witness_script)), in_value);
    build_signed(prevout, out_value, |unsigned| {
        let message = double_sha256(&unsigned.signing_payload());
        let signature = key.sign_ecdsa(&message);
        (Vec::new(), vec![signature, witness_script.clone()])
    })
}

pub fn signed_p2tr_tx(key: &KeyPair, in_value: u64, out_value: u64) -> Transaction {
    let prevout = TxOutput::new(p2tr_script(&key.x_only_public_key_bytes()), in_value);
    build_signed(prevout, out_value, |unsigned| {
        let message = double_sha256(&unsigned.signing_payload());
        let signature = key.sign_schnorr(&message);
        (Vec::new(), vec![signature])
    })
}
