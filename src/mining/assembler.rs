//! Block assembly
//!
//! Selects validated transactions into a candidate block: synthesizes the
//! coinbase, orders candidates by fee, and packs greedily under the block
//! byte budget. Determinism is favored over optimal packing: ties keep
//! their encounter order and assembly stops at the first transaction that
//! would overflow the budget.

use crate::core::block::MAX_BLOCK_SIZE;
use crate::core::transaction::{Transaction, TxId, TxInput, TxOutput, SEQUENCE_FINAL};
use log::{debug, info};

// =============================================================================
// Constants
// =============================================================================

/// Fixed coinbase reward in satoshis
pub const COINBASE_REWARD: u64 = 50_000_000;

/// Witness program carried by the coinbase input's placeholder prevout
const COINBASE_PREVOUT_SCRIPT: &str = "0014cbbfcc021f4dbd0697f7e02eb1949a70be183375";

/// Script-hash output the coinbase reward is paid to
const COINBASE_REWARD_SCRIPT: &str = "a91420756d2dd9f0cc05fe200794251642ff9e76008587";

// =============================================================================
// Assembled Block
// =============================================================================

/// The ordered result of block assembly
#[derive(Debug, Clone)]
pub struct AssembledBlock {
    /// Included transactions, coinbase first
    pub transactions: Vec<Transaction>,
    /// Cumulative canonical size of all included transactions in bytes
    pub total_size: usize,
    /// Total fees collected from the included pool transactions
    pub total_fees: u64,
}

impl AssembledBlock {
    /// Txids in block order
    pub fn txids(&self) -> Vec<TxId> {
        self.transactions.iter().map(|tx| tx.id).collect()
    }

    /// The synthesized coinbase transaction
    pub fn coinbase(&self) -> &Transaction {
        &self.transactions[0]
    }
}

// =============================================================================
// Block Assembler
// =============================================================================

/// Assembles validated transactions into a block under a byte budget
pub struct BlockAssembler {
    max_block_size: usize,
}

impl Default for BlockAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockAssembler {
    /// Create an assembler with the standard block byte budget
    pub fn new() -> Self {
        Self {
            max_block_size: MAX_BLOCK_SIZE,
        }
    }

    /// Create an assembler with a custom byte budget
    pub fn with_budget(max_block_size: usize) -> Self {
        Self { max_block_size }
    }

    /// Assemble a block from validated candidates.
    ///
    /// Candidates are sorted by fee descending (stable, so equal fees keep
    /// their read order) and appended greedily until one would push the
    /// cumulative size past the budget; assembly stops there rather than
    /// searching for a smaller transaction to squeeze in.
    pub fn assemble(&self, candidates: Vec<Transaction>) -> AssembledBlock {
        let coinbase = synthesize_coinbase();
        let mut total_size = coinbase.size();
        let mut total_fees = 0u64;

        let mut ordered = candidates;
        ordered.sort_by(|a, b| b.fee().unwrap_or(0).cmp(&a.fee().unwrap_or(0)));

        let mut transactions = vec![coinbase];
        for tx in ordered {
            let tx_size = tx.size();
            if total_size + tx_size > self.max_block_size {
                debug!(
                    "stopping assembly: {} + {} bytes would exceed budget of {}",
                    total_size, tx_size, self.max_block_size
                );
                break;
            }
            total_size += tx_size;
            total_fees += tx.fee().unwrap_or(0);
            transactions.push(tx);
        }

        info!(
            "assembled block: {} transaction(s), {} bytes, {} sat in fees",
            transactions.len(),
            total_size,
            total_fees
        );

        AssembledBlock {
            transactions,
            total_size,
            total_fees,
        }
    }
}

/// Synthesize the reward-granting coinbase transaction. It has no real
/// inputs to account fees against; the single flagged input carries a
/// zero-value placeholder prevout.
pub fn synthesize_coinbase() -> Transaction {
    let prevout = TxOutput::new(
        hex::decode(COINBASE_PREVOUT_SCRIPT).expect("coinbase prevout script is valid hex"),
        0,
    );
    let input = TxInput {
        previous_txid: [0u8; 32],
        previous_index: u32::MAX,
        previous_output: prevout,
        unlocking_script: Vec::new(),
        witness: Vec::new(),
        sequence: SEQUENCE_FINAL,
        is_coinbase: true,
    };
    let reward = TxOutput::new(
        hex::decode(COINBASE_REWARD_SCRIPT).expect("coinbase reward script is valid hex"),
        COINBASE_REWARD,
    );

    Transaction::new(1, 0, vec![input], vec![reward])
}

// =============================================================================
// Tests
// =============================================================================
