//! External collaborators: the mempool directory reader and the result
//! artifact writer

pub mod mempool_dir;
pub mod output;

pub use mempool_dir::{load_mempool, MempoolBatch, StorageError, TxRecord};
pub use output::write_result;
