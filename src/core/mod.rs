//! Core block-building components
//!
//! This module contains the fundamental building blocks:
//! - Transactions (data model and canonical byte encoding)
//! - Script classification and decoding
//! - Script interpreter (stack machine for embedded scripts)
//! - Transaction validation
//! - Block header wire format

pub mod block;
pub mod interpreter;
pub mod script;
pub mod transaction;
pub mod validation;

#[cfg(test)]
pub mod testutil;

pub use block::{BlockHeader, BLOCK_HEADER_SIZE, BLOCK_VERSION, MAX_BLOCK_SIZE};
pub use interpreter::{ExecContext, Interpreter, StackItem};
pub use script::{decode_script, ScriptError, ScriptOp, ScriptType};
pub use transaction::{
    DecodingError, Transaction, TxId, TxInput, TxOutput, MAX_MONEY, MAX_TX_SIZE, SEQUENCE_FINAL,
};
pub use validation::{
    validate_transaction, ValidationContext, ValidationFailure, ValidationOutcome, MIN_TX_FEE,
};
