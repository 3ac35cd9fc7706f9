//! Cryptographic hashing primitives
//!
//! Provides the SHA-256 based hash functions used for transaction ids,
//! script commitments, merkle roots, and block header hashes. All functions
//! are stateless: explicit bytes in, explicit bytes out.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Computes SHA-256 of the input data
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Computes double SHA-256 (SHA-256 of SHA-256), with no intermediate
/// byte reversal. Used for txids, merkle nodes, and header hashes.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Computes HASH160 (RIPEMD-160 of SHA-256), the commitment used by
/// pay-to-script-hash outputs.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(sha256(data));
    hasher.finalize().into()
}

/// Computes double SHA-256 and returns it as a hex string
pub fn double_sha256_hex(data: &[u8]) -> String {
    hex::encode(double_sha256(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        let hash = sha256(b"hello world");
        assert_eq!(
            hex::encode(hash),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_double_sha256() {
        let hash = double_sha256(b"hello world");
        assert_eq!(hash, sha256(&sha256(b"hello world")));
        assert_eq!(hex::encode(hash), double_sha256_hex(b"hello world"));
    }

    #[test]
    fn test_hash160_length() {
        let hash = hash160(b"public key bytes");
        assert_eq!(hash.len(), 20);
        assert_ne!(hash, [0u8; 20]);
    }
}
