//! Merkle root computation over transaction ids
//!
//! Follows the Bitcoin hashing convention: txids are byte-reversed before
//! hashing, adjacent pairs are combined with double SHA-256 (duplicating
//! the last element of an odd level), and the final hash is reversed back
//! to natural order for the header field.

use crate::core::transaction::TxId;
use crate::crypto::hash::double_sha256;

/// Calculate the merkle root of an ordered txid sequence (natural byte
/// order in, natural byte order out). An empty sequence yields the
/// all-zero root.
pub fn calculate_merkle_root(txids: &[TxId]) -> [u8; 32] {
    if txids.is_empty() {
        return [0u8; 32];
    }

    // Reverse into the little-endian-for-hashing convention
    let mut current_level: Vec<[u8; 32]> = txids.iter().map(|id| reversed(id)).collect();

    // At least one pairing round runs, so a single id hashes against
    // itself rather than passing through unhashed.
    loop {
        let mut next_level = Vec::with_capacity(current_level.len().div_ceil(2));

        for chunk in current_level.chunks(2) {
            let mut data = [0u8; 64];
            data[..32].copy_from_slice(&chunk[0]);
            // Odd level: the last element pairs with itself
            data[32..].copy_from_slice(chunk.get(1).unwrap_or(&chunk[0]));
            next_level.push(double_sha256(&data));
        }

        current_level = next_level;
        if current_level.len() == 1 {
            break;
        }
    }

    reversed(&current_level[0])
}

fn reversed(hash: &[u8; 32]) -> [u8; 32] {
    let mut out = *hash;
    out.reverse();
    out
}
