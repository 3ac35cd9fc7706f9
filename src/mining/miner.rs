//! Proof-of-work search
//!
//! Iterates the header nonce (and, once the nonce space is exhausted, the
//! timestamp) until the header's double hash satisfies the difficulty
//! target. The merkle root and previous block hash are fixed before the
//! search starts; only nonce and timestamp ever change.

use crate::core::block::BlockHeader;
use crate::core::transaction::TxId;
use crate::crypto::calculate_merkle_root;
use crate::mining::difficulty::{bits_to_target, hash_meets_target};
use log::info;
use std::time::Instant;

// =============================================================================
// Constants
// =============================================================================

/// Fixed difficulty for a run, in compact form; expands to the target
/// `0000ffff00...00`
pub const TARGET_BITS: u32 = 0x1f00ffff;

// =============================================================================
// Outcome Types
// =============================================================================

/// Mining statistics
#[derive(Debug, Clone)]
pub struct MiningStats {
    /// Number of hash attempts
    pub attempts: u64,
    /// Time taken in milliseconds
    pub time_ms: u128,
    /// Hash rate (hashes per second)
    pub hash_rate: f64,
}

/// A header that satisfies the difficulty target
#[derive(Debug, Clone)]
pub struct MinedHeader {
    /// The winning header
    pub header: BlockHeader,
    /// Its 80-byte wire serialization
    pub header_bytes: [u8; 80],
    /// Its double SHA-256 hash
    pub hash: [u8; 32],
    /// Search statistics
    pub stats: MiningStats,
}

/// Result of a bounded search. Running out of attempts is a "not found
/// yet" outcome, not an error; the header template is returned so the
/// search can be resumed.
#[derive(Debug, Clone)]
pub enum MineOutcome {
    Found(MinedHeader),
    Exhausted { header: BlockHeader, attempts: u64 },
}

// =============================================================================
// Miner
// =============================================================================

/// Searches the nonce/timestamp space of a header template
pub struct Miner {
    bits: u32,
    target: [u8; 32],
}

impl Default for Miner {
    fn default() -> Self {
        Self::new()
    }
}

impl Miner {
    /// Create a miner at the fixed run difficulty
    pub fn new() -> Self {
        Self::with_bits(TARGET_BITS)
    }

    /// Create a miner with explicit compact difficulty bits
    pub fn with_bits(bits: u32) -> Self {
        Self {
            bits,
            target: bits_to_target(bits),
        }
    }

    /// The expanded 256-bit target this miner searches against
    pub fn target(&self) -> [u8; 32] {
        self.target
    }

    /// Build the header template for a search: the merkle root is computed
    /// once here and stays fixed for the whole search.
    pub fn build_template(&self, previous_block_hash: [u8; 32], txids: &[TxId]) -> BlockHeader {
        let merkle_root = calculate_merkle_root(txids);
        let timestamp = chrono::Utc::now().timestamp() as u32;
        BlockHeader::new(previous_block_hash, merkle_root, timestamp, self.bits)
    }

    /// Search until a satisfying nonce is found. Unbounded: with a hard
    /// target this spins until it succeeds.
    pub fn mine(&self, header: BlockHeader) -> MinedHeader {
        match self.search(header, None) {
            MineOutcome::Found(found) => found,
            MineOutcome::Exhausted { .. } => unreachable!("unbounded search cannot exhaust"),
        }
    }

    /// Search with an attempt cap, reporting exhaustion as a non-error
    /// outcome
    pub fn mine_bounded(&self, header: BlockHeader, max_attempts: u64) -> MineOutcome {
        self.search(header, Some(max_attempts))
    }

    fn search(&self, mut header: BlockHeader, max_attempts: Option<u64>) -> MineOutcome {
        let start = Instant::now();
        let mut attempts: u64 = 0;

        info!(
            "mining against target {} (bits {:08x})",
            hex::encode(self.target),
            self.bits
        );

        loop {
            let hash = header.hash();
            attempts += 1;

            if hash_meets_target(&hash, &self.target) {
                let elapsed = start.elapsed().as_millis();
                let hash_rate = if elapsed > 0 {
                    (attempts as f64) / (elapsed as f64 / 1000.0)
                } else {
                    attempts as f64
                };
                info!(
                    "found nonce {} after {} attempt(s) in {}ms ({:.2} H/s)",
                    header.nonce, attempts, elapsed, hash_rate
                );
                return MineOutcome::Found(MinedHeader {
                    header_bytes: header.serialize(),
                    hash,
                    header,
                    stats: MiningStats {
                        attempts,
                        time_ms: elapsed,
                        hash_rate,
                    },
                });
            }

            if let Some(max) = max_attempts {
                if attempts >= max {
                    return MineOutcome::Exhausted { header, attempts };
                }
            }

            // Advance the nonce; on wraparound, move the timestamp forward
            // one second and restart the nonce space.
            header.nonce = match header.nonce.checked_add(1) {
                Some(nonce) => nonce,
                None => {
                    header.timestamp += 1;
                    0
                }
            };
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// The easiest valid compact target; roughly every other hash passes
    const EASY_BITS: u32 = 0x207fffff;

    /// A target so low no hash will meet it within a small bound
    const IMPOSSIBLE_BITS: u32 = 0x03000001;

    fn template(miner: &Miner) -> BlockHeader {
        let txids = vec![[0x17u8; 32], [0x2au8; 32]];
        miner.build_template([0u8; 32], &txids)
    }

    #[test]
    fn test_easy_target_terminates_and_satisfies() {
        let miner = Miner::with_bits(EASY_BITS);
        let header = template(&miner);

        let MineOutcome::Found(found) = miner.mine_bounded(header, 100_000) else {
            panic!("easy target must be found within the bound");
        };

        // The winning hash, byte-reversed and read big-endian, is strictly
        // below the target.
        assert!(hash_meets_target(&found.hash, &miner.target()));
        assert_eq!(found.hash, found.header.hash());
        assert_eq!(found.header_bytes, found.header.serialize());
        assert!(found.stats.attempts >= 1);
    }

    #[test]
    fn test_merkle_and_previous_hash_fixed_during_search() {
        let miner = Miner::with_bits(EASY_BITS);
        let header = template(&miner);
        let merkle_root = header.merkle_root;
        let previous = header.previous_block_hash;

        let MineOutcome::Found(found) = miner.mine_bounded(header, 100_000) else {
            panic!("easy target must be found within the bound");
        };
        assert_eq!(found.header.merkle_root, merkle_root);
        assert_eq!(found.header.previous_block_hash, previous);
    }

    #[test]
    fn test_bounded_search_reports_exhaustion() {
        let miner = Miner::with_bits(IMPOSSIBLE_BITS);
        let header = template(&miner);

        match miner.mine_bounded(header, 500) {
            MineOutcome::Exhausted { attempts, .. } => assert_eq!(attempts, 500),
            MineOutcome::Found(_) => panic!("impossible target reported found"),
        }
    }

    #[test]
    fn test_nonce_wrap_advances_timestamp() {
        let miner = Miner::with_bits(IMPOSSIBLE_BITS);
        let mut header = template(&miner);
        let timestamp = header.timestamp;
        header.nonce = u32::MAX - 1;

        match miner.mine_bounded(header, 10) {
            MineOutcome::Exhausted { header, .. } => {
                assert_eq!(header.timestamp, timestamp + 1);
                assert!(header.nonce < 10);
            }
            MineOutcome::Found(_) => panic!("impossible target reported found"),
        }
    }
}
