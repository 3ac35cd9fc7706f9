//! Command handlers for the batch pipeline
//!
//! The `run` command drives the whole pipeline: read records, validate,
//! assemble, mine, persist. The `validate` command stops after validation
//! and reports what would have been dropped. A malformed record or a
//! failing transaction never aborts a run.

use crate::core::transaction::{Transaction, TxId};
use crate::core::validation::{validate_transaction, ValidationContext, ValidationOutcome};
use crate::mining::{BlockAssembler, MineOutcome, Miner};
use crate::storage::{load_mempool, write_result};
use log::warn;
use std::collections::HashSet;
use std::path::Path;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Validate a batch in encounter order. Accepted ids form the growing
/// mempool snapshot each later transaction is checked against, so
/// duplicates within the batch are dropped too.
fn validate_batch(transactions: Vec<Transaction>) -> (Vec<Transaction>, usize) {
    let mut accepted_ids: HashSet<TxId> = HashSet::new();
    let committed_ids: HashSet<TxId> = HashSet::new();
    let mut valid = Vec::new();
    let mut rejected = 0usize;

    for tx in transactions {
        let outcome = validate_transaction(
            &tx,
            &ValidationContext {
                mempool_ids: &accepted_ids,
                committed_ids: &committed_ids,
            },
        );
        match outcome {
            ValidationOutcome::Valid => {
                accepted_ids.insert(tx.id);
                valid.push(tx);
            }
            ValidationOutcome::Invalid(reason) => {
                warn!("rejecting transaction {}: {}", tx.id_hex(), reason);
                rejected += 1;
            }
        }
    }

    (valid, rejected)
}

/// Run the full pipeline: mempool directory in, result artifact out.
///
/// `max_attempts` imposes an external bound on the otherwise unbounded
/// proof-of-work search; running out of attempts is reported as a normal
/// outcome, not an error.
pub fn cmd_run(mempool_dir: &Path, output: &Path, max_attempts: Option<u64>) -> CliResult<()> {
    let batch = load_mempool(mempool_dir)?;
    println!(
        "📂 Read {} record(s) from {:?} ({} dropped as malformed)",
        batch.records_read, mempool_dir, batch.records_dropped
    );

    let (valid, rejected) = validate_batch(batch.transactions);
    println!(
        "🔎 {} transaction(s) passed validation, {} rejected",
        valid.len(),
        rejected
    );

    let block = BlockAssembler::new().assemble(valid);
    println!(
        "🧱 Assembled block: {} transaction(s), {} bytes, {} sat in fees",
        block.transactions.len(),
        block.total_size,
        block.total_fees
    );

    let miner = Miner::new();
    let template = miner.build_template([0u8; 32], &block.txids());

    let mined = match max_attempts {
        None => miner.mine(template),
        Some(bound) => match miner.mine_bounded(template, bound) {
            MineOutcome::Found(mined) => mined,
            MineOutcome::Exhausted { attempts, .. } => {
                println!("⏳ No valid nonce within {} attempt(s); nothing written", attempts);
                return Ok(());
            }
        },
    };
    println!(
        "⛏️  Mined header with nonce {} in {} attempt(s) ({:.0} H/s)",
        mined.header.nonce, mined.stats.attempts, mined.stats.hash_rate
    );

    write_result(output, &mined.header, &block.transactions)?;
    println!("✅ Wrote {:?}", output);

    Ok(())
}

/// Validate the mempool directory and report, without assembling or mining
pub fn cmd_validate(mempool_dir: &Path) -> CliResult<()> {
    let batch = load_mempool(mempool_dir)?;
    println!(
        "📂 Read {} record(s) from {:?} ({} dropped as malformed)",
        batch.records_read, mempool_dir, batch.records_dropped
    );

    let (valid, rejected) = validate_batch(batch.transactions);
    println!("🔎 {} valid, {} rejected", valid.len(), rejected);
    for tx in &valid {
        println!(
            "   {}  {} sat fee, {} bytes",
            tx.id_hex(),
            tx.fee().unwrap_or(0),
            tx.size()
        );
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
