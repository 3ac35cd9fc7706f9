//! Block-Forge: a batch block builder and miner in Rust
//!
//! This crate assembles a single candidate block from a directory of
//! pending transaction records and finds a proof-of-work nonce for it:
//! - Canonical transaction and block-header serialization
//! - Script classification and a fail-closed script interpreter
//! - ECDSA (secp256k1) and Schnorr signature verification per spending type
//! - Fee-ordered block assembly under a byte budget
//! - Merkle root computation over txids
//! - Nonce/timestamp proof-of-work search against a compact target
//!
//! # Example
//!
//! ```no_run
//! use block_forge::mining::{BlockAssembler, Miner};
//! use block_forge::storage::load_mempool;
//!
//! let batch = load_mempool(std::path::Path::new("mempool")).unwrap();
//! let block = BlockAssembler::new().assemble(batch.transactions);
//!
//! let miner = Miner::new();
//! let template = miner.build_template([0u8; 32], &block.txids());
//! let mined = miner.mine(template);
//! println!("nonce: {}", mined.header.nonce);
//! ```

pub mod cli;
pub mod core;
pub mod crypto;
pub mod mining;
pub mod storage;

// Re-export commonly used types
pub use crate::core::{
    validate_transaction, BlockHeader, ScriptType, Transaction, TxId, TxInput, TxOutput,
    ValidationContext, ValidationFailure, ValidationOutcome, MAX_BLOCK_SIZE, MAX_TX_SIZE,
    MIN_TX_FEE,
};
pub use crate::crypto::{calculate_merkle_root, double_sha256, sha256, KeyPair};
pub use crate::mining::{
    AssembledBlock, BlockAssembler, MineOutcome, MinedHeader, Miner, MiningStats, TARGET_BITS,
};
pub use crate::storage::{load_mempool, write_result, MempoolBatch, StorageError};
