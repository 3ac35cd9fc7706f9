//! Block header wire format
//!
//! The header is the only block structure this tool serializes: the result
//! artifact carries the header bytes plus the included txids, not a full
//! block body.

use crate::crypto::double_sha256;

// =============================================================================
// Block Constants
// =============================================================================

/// Block header wire size in bytes. `BlockHeader::serialize` returns a
/// fixed-size array of this length, so a mis-sized encoding cannot be
/// constructed.
pub const BLOCK_HEADER_SIZE: usize = 80;

/// Maximum block size in bytes (coinbase plus included transactions,
/// canonical encoding)
pub const MAX_BLOCK_SIZE: usize = 1_000_000;

/// Header version with BIP9-style version bits
pub const BLOCK_VERSION: i32 = 0x2000_0000;

// =============================================================================
// Block Header
// =============================================================================

/// An 80-byte block header. Hashes are held in natural (display) byte
/// order and reversed onto the wire during serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    /// Header version
    pub version: i32,
    /// Hash of the previous block, natural byte order
    pub previous_block_hash: [u8; 32],
    /// Merkle root over the included txids, natural byte order
    pub merkle_root: [u8; 32],
    /// Unix timestamp in seconds
    pub timestamp: u32,
    /// Difficulty target in compact form
    pub bits: u32,
    /// Proof-of-work nonce
    pub nonce: u32,
}

impl BlockHeader {
    /// Create a header template with a zero nonce
    pub fn new(
        previous_block_hash: [u8; 32],
        merkle_root: [u8; 32],
        timestamp: u32,
        bits: u32,
    ) -> Self {
        Self {
            version: BLOCK_VERSION,
            previous_block_hash,
            merkle_root,
            timestamp,
            bits,
            nonce: 0,
        }
    }

    /// Serialize to the 80-byte wire layout: little-endian version,
    /// byte-reversed previous hash, byte-reversed merkle root,
    /// little-endian timestamp, compact bits, and nonce.
    pub fn serialize(&self) -> [u8; BLOCK_HEADER_SIZE] {
        let mut header = [0u8; BLOCK_HEADER_SIZE];

        header[0..4].copy_from_slice(&self.version.to_le_bytes());

        let mut prev = self.previous_block_hash;
        prev.reverse();
        header[4..36].copy_from_slice(&prev);

        let mut root = self.merkle_root;
        root.reverse();
        header[36..68].copy_from_slice(&root);

        header[68..72].copy_from_slice(&self.timestamp.to_le_bytes());
        header[72..76].copy_from_slice(&self.bits.to_le_bytes());
        header[76..80].copy_from_slice(&self.nonce.to_le_bytes());

        header
    }

    /// Double SHA-256 of the serialized header
    pub fn hash(&self) -> [u8; 32] {
        double_sha256(&self.serialize())
    }

    /// Serialized header as a hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.serialize())
    }
}

// =============================================================================
// Tests
// =============================================================================
