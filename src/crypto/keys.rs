//! ECDSA and Schnorr key handling
//!
//! Key generation, signing, and signature verification over secp256k1.
//! Verification functions are pure: explicit byte inputs, boolean result,
//! no shared context beyond the locally constructed curve state.

use rand::rngs::OsRng;
use secp256k1::schnorr;
use secp256k1::{Keypair, Message, PublicKey, Secp256k1, SecretKey, XOnlyPublicKey};
use thiserror::Error;

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Invalid public key")]
    InvalidPublicKey,
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
}

/// A key pair used for constructing signed transactions (and test
/// fixtures); verification never needs one.
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from a hex-encoded private key
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_key).map_err(|_| KeyError::InvalidPrivateKey)?;
        let secret_key = SecretKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Ok(Self {
            secret_key,
            public_key,
        })
    }

    /// Compressed public key bytes (33 bytes)
    pub fn public_key_bytes(&self) -> Vec<u8> {
        self.public_key.serialize().to_vec()
    }

    /// X-only public key bytes (32 bytes), as committed by taproot outputs
    pub fn x_only_public_key_bytes(&self) -> [u8; 32] {
        self.public_key.x_only_public_key().0.serialize()
    }

    /// Produce a 64-byte compact ECDSA signature over a 32-byte digest
    pub fn sign_ecdsa(&self, message_hash: &[u8; 32]) -> Vec<u8> {
        let secp = Secp256k1::new();
        let message = Message::from_digest_slice(message_hash).expect("digest is 32 bytes");
        secp.sign_ecdsa(&message, &self.secret_key)
            .serialize_compact()
            .to_vec()
    }

    /// Produce a 64-byte Schnorr (BIP340) signature over a 32-byte digest
    pub fn sign_schnorr(&self, message_hash: &[u8; 32]) -> Vec<u8> {
        let secp = Secp256k1::new();
        let keypair = Keypair::from_secret_key(&secp, &self.secret_key);
        let message = Message::from_digest_slice(message_hash).expect("digest is 32 bytes");
        secp.sign_schnorr(&message, &keypair).as_ref().to_vec()
    }
}

/// Strip a trailing sighash byte: signatures arrive as either the bare
/// 64-byte (r||s) form or 65 bytes with a sighash type appended.
pub(crate) fn strip_sighash_byte(signature: &[u8]) -> Option<&[u8]> {
    match signature.len() {
        64 => Some(signature),
        65 => Some(&signature[..64]),
        _ => None,
    }
}

/// Verify a compact ECDSA signature against a public key and a 32-byte
/// digest. Returns false for malformed keys or signatures as well as for
/// honest mismatches.
pub fn verify_ecdsa(public_key: &[u8], message_hash: &[u8; 32], signature: &[u8]) -> bool {
    let Some(sig_bytes) = strip_sighash_byte(signature) else {
        return false;
    };
    let Ok(public_key) = PublicKey::from_slice(public_key) else {
        return false;
    };
    let Ok(signature) = secp256k1::ecdsa::Signature::from_compact(sig_bytes) else {
        return false;
    };
    let Ok(message) = Message::from_digest_slice(message_hash) else {
        return false;
    };

    let secp = Secp256k1::verification_only();
    secp.verify_ecdsa(&message, &signature, &public_key).is_ok()
}

/// Verify a BIP340 Schnorr signature against a 32-byte x-only public key
/// and a 32-byte digest
pub fn verify_schnorr(x_only_key: &[u8], message_hash: &[u8; 32], signature: &[u8]) -> bool {
    let Some(sig_bytes) = strip_sighash_byte(signature) else {
        return false;
    };
    let Ok(x_only) = XOnlyPublicKey::from_slice(x_only_key) else {
        return false;
    };
    let Ok(signature) = schnorr::Signature::from_slice(sig_bytes) else {
        return false;
    };
    let Ok(message) = Message::from_digest_slice(message_hash) else {
        return false;
    };

    let secp = Secp256k1::verification_only();
    secp.verify_schnorr(&signature, &message, &x_only).is_ok()
}
