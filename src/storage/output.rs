//! Result artifact writer
//!
//! Persists the outcome of a run as a single line-delimited file: the
//! serialized block header, the serialized coinbase transaction, then
//! every included txid in block order (coinbase first).

use crate::core::block::BlockHeader;
use crate::core::transaction::Transaction;
use crate::storage::mempool_dir::StorageError;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write the run result. `transactions` is the assembled block order with
/// the coinbase at index zero.
pub fn write_result(
    path: &Path,
    header: &BlockHeader,
    transactions: &[Transaction],
) -> Result<(), StorageError> {
    let file = fs::File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{}", header.to_hex())?;
    writeln!(writer, "{}", hex::encode(transactions[0].serialize()))?;
    for tx in transactions {
        writeln!(writer, "{}", tx.id_hex())?;
    }

    writer.flush()?;
    Ok(())
}
