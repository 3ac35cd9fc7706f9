//! Mempool directory reader
//!
//! Loads pending transaction records from a directory, one JSON document
//! per file, read once per run as a batch. A record that fails JSON
//! parsing or hex decoding is dropped with a diagnostic; a bad record
//! never aborts the batch.

use crate::core::script::ScriptType;
use crate::core::transaction::{DecodingError, Transaction, TxInput, TxOutput, SEQUENCE_FINAL};
use log::{debug, warn};
use serde::Deserialize;
use std::fs;
use std::io::{self, BufReader};
use std::path::Path;
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Storage errors. These cover the collaborator boundary itself (an
/// unreadable directory, an unwritable artifact); per-record problems are
/// handled inside the batch loader.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

// =============================================================================
// Raw Records
// =============================================================================

/// One transaction record as stored on disk
#[derive(Debug, Clone, Deserialize)]
pub struct TxRecord {
    pub version: i32,
    pub locktime: u32,
    pub vin: Vec<InputRecord>,
    pub vout: Vec<OutputRecord>,
}

/// One input of a raw record
#[derive(Debug, Clone, Deserialize)]
pub struct InputRecord {
    pub txid: String,
    pub vout: u32,
    pub prevout: OutputRecord,
    #[serde(default)]
    pub scriptsig: String,
    #[serde(default)]
    pub witness: Vec<String>,
    #[serde(default = "default_sequence")]
    pub sequence: u32,
    #[serde(default)]
    pub is_coinbase: bool,
}

fn default_sequence() -> u32 {
    SEQUENCE_FINAL
}

/// One output (or embedded prevout) of a raw record
#[derive(Debug, Clone, Deserialize)]
pub struct OutputRecord {
    pub scriptpubkey: String,
    #[serde(default)]
    pub scriptpubkey_type: Option<ScriptType>,
    pub value: u64,
}

impl TxRecord {
    /// Convert the raw record into the transaction model, decoding all hex
    /// fields. Any malformed field fails the whole record.
    pub fn into_transaction(self) -> Result<Transaction, DecodingError> {
        let vin = self
            .vin
            .into_iter()
            .map(InputRecord::into_input)
            .collect::<Result<Vec<_>, _>>()?;
        let vout = self
            .vout
            .into_iter()
            .map(OutputRecord::into_output)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Transaction::new(self.version, self.locktime, vin, vout))
    }
}

impl InputRecord {
    fn into_input(self) -> Result<TxInput, DecodingError> {
        let txid_bytes =
            hex::decode(&self.txid).map_err(|_| DecodingError::InvalidHex("vin.txid"))?;
        let previous_txid: [u8; 32] = txid_bytes
            .try_into()
            .map_err(|bad: Vec<u8>| DecodingError::BadTxidLength(bad.len()))?;

        let unlocking_script =
            hex::decode(&self.scriptsig).map_err(|_| DecodingError::InvalidHex("vin.scriptsig"))?;
        let witness = self
            .witness
            .iter()
            .map(|item| hex::decode(item).map_err(|_| DecodingError::InvalidHex("vin.witness")))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TxInput {
            previous_txid,
            previous_index: self.vout,
            previous_output: self.prevout.into_output()?,
            unlocking_script,
            witness,
            sequence: self.sequence,
            is_coinbase: self.is_coinbase,
        })
    }
}

impl OutputRecord {
    fn into_output(self) -> Result<TxOutput, DecodingError> {
        let script = hex::decode(&self.scriptpubkey)
            .map_err(|_| DecodingError::InvalidHex("scriptpubkey"))?;
        let output = TxOutput::new(script, self.value);

        // The structural classification is authoritative; a disagreeing
        // record tag is only worth a diagnostic.
        if let Some(declared) = self.scriptpubkey_type {
            if declared != output.script_type {
                debug!(
                    "record declares {} but script classifies as {}",
                    declared, output.script_type
                );
            }
        }

        Ok(output)
    }
}

// =============================================================================
// Batch Loading
// =============================================================================

/// The result of reading a mempool directory once
#[derive(Debug)]
pub struct MempoolBatch {
    /// Successfully decoded transactions, in file-name order
    pub transactions: Vec<Transaction>,
    /// Number of record files read
    pub records_read: usize,
    /// Number of records dropped for parse or decode failures
    pub records_dropped: usize,
}

/// Read every record file in the directory. File-name order makes the
/// encounter order (and therefore fee-tie ordering downstream)
/// reproducible across runs.
pub fn load_mempool(dir: &Path) -> Result<MempoolBatch, StorageError> {
    let mut paths: Vec<_> = fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    let mut transactions = Vec::with_capacity(paths.len());
    let mut records_dropped = 0usize;
    let records_read = paths.len();

    for path in &paths {
        match load_record(path) {
            Ok(tx) => transactions.push(tx),
            Err(err) => {
                warn!("dropping record {}: {}", path.display(), err);
                records_dropped += 1;
            }
        }
    }

    Ok(MempoolBatch {
        transactions,
        records_read,
        records_dropped,
    })
}

/// Why a single record was dropped
#[derive(Error, Debug)]
enum RecordError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Decoding(#[from] DecodingError),
}

fn load_record(path: &Path) -> Result<Transaction, RecordError> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    let record: TxRecord = serde_json::from_reader(reader)?;
    Ok(record.into_transaction()?)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        let mut file = fs::File::create(dir.join(name)).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    fn record_json(value: u64) -> String {
        format!(
            r#"{{
                "version": 2,
                "locktime": 0,
                "vin": [{{
                    "txid": "{}",
                    "vout": 1,
                    "prevout": {{
                        "scriptpubkey": "0014cbbfcc021f4dbd0697f7e02eb1949a70be183375",
                        "scriptpubkey_type": "v0_p2wpkh",
                        "value": 100000
                    }},
                    "scriptsig": "",
                    "witness": ["aa", "bb"],
                    "sequence": 4294967295,
                    "is_coinbase": false
                }}],
                "vout": [{{
                    "scriptpubkey": "0014ab68025513c3dbd2f7b92a94e0581f5d50f654e7",
                    "scriptpubkey_type": "v0_p2wpkh",
                    "value": {}
                }}]
            }}"#,
            "11".repeat(32),
            value
        )
    }

    #[test]
    fn test_load_valid_records_in_name_order() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "b.json", &record_json(2_000));
        write_file(dir.path(), "a.json", &record_json(1_000));

        let batch = load_mempool(dir.path()).unwrap();
        assert_eq!(batch.records_read, 2);
        assert_eq!(batch.records_dropped, 0);
        assert_eq!(batch.transactions.len(), 2);
        // a.json first regardless of creation order
        assert_eq!(batch.transactions[0].vout[0].value, 1_000);
        assert_eq!(batch.transactions[1].vout[0].value, 2_000);
    }

    #[test]
    fn test_bad_records_dropped_batch_continues() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "good.json", &record_json(5_000));
        write_file(dir.path(), "broken.json", "{ not json");
        // Valid JSON, malformed hex
        write_file(
            dir.path(),
            "badhex.json",
            &record_json(1).replace("0014cbbf", "zz14cbbf"),
        );

        let batch = load_mempool(dir.path()).unwrap();
        assert_eq!(batch.records_read, 3);
        assert_eq!(batch.records_dropped, 2);
        assert_eq!(batch.transactions.len(), 1);
        assert_eq!(batch.transactions[0].vout[0].value, 5_000);
    }

    #[test]
    fn test_record_decodes_model_fields() {
        let record: TxRecord = serde_json::from_str(&record_json(7_000)).unwrap();
        let tx = record.into_transaction().unwrap();

        assert_eq!(tx.version, 2);
        assert_eq!(tx.vin.len(), 1);
        assert_eq!(tx.vin[0].previous_txid, [0x11; 32]);
        assert_eq!(tx.vin[0].previous_index, 1);
        assert_eq!(tx.vin[0].witness, vec![vec![0xaa], vec![0xbb]]);
        assert_eq!(tx.vin[0].previous_output.value, 100_000);
        assert_eq!(
            tx.vin[0].previous_output.script_type,
            ScriptType::P2wpkh
        );
        assert_eq!(tx.vout[0].value, 7_000);
    }

    #[test]
    fn test_short_txid_rejected() {
        let json = record_json(1_000).replace(&"11".repeat(32), "1122");
        let record: TxRecord = serde_json::from_str(&json).unwrap();
        assert!(matches!(
            record.into_transaction(),
            Err(DecodingError::BadTxidLength(2))
        ));
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(load_mempool(&missing).is_err());
    }
}
