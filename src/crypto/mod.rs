//! Cryptographic utilities
//!
//! This module provides:
//! - SHA-256 / HASH160 hashing primitives
//! - ECDSA and Schnorr key handling (secp256k1)
//! - Per-input signature verification
//! - Merkle root calculation

pub mod hash;
pub mod keys;
pub mod merkle;
pub mod signature;

pub use hash::{double_sha256, double_sha256_hex, hash160, sha256};
pub use keys::{verify_ecdsa, verify_schnorr, KeyError, KeyPair};
pub use merkle::calculate_merkle_root;
pub use signature::{verify_input, SignatureError};
