//! Script interpreter
//!
//! A minimal stack machine for executing redeem and witness scripts. It
//! supports the opcode subset needed by standard spending paths; anything
//! it does not recognize fails the script rather than being skipped, so an
//! unvalidated construct can never pass by default.

use crate::core::script::{
    ScriptError, ScriptOp, OP_CHECKSIG, OP_DUP, OP_EQUAL, OP_EQUALVERIFY, OP_HASH160, OP_HASH256,
    OP_SHA256, OP_VERIFY,
};
use crate::crypto::{double_sha256, hash160, sha256, verify_ecdsa};

/// Maximum stack depth during execution
const MAX_STACK_SIZE: usize = 1000;

// =============================================================================
// Stack items
// =============================================================================

/// A value on the execution stack: either raw bytes (pushed data, hash
/// outputs) or a boolean produced by a check opcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackItem {
    Bytes(Vec<u8>),
    Bool(bool),
}

impl StackItem {
    /// Script truthiness: booleans as themselves, byte strings are true
    /// iff any byte is non-zero
    pub fn is_truthy(&self) -> bool {
        match self {
            StackItem::Bool(b) => *b,
            StackItem::Bytes(bytes) => bytes.iter().any(|b| *b != 0),
        }
    }

    /// Byte view used by hashing and equality opcodes
    fn to_bytes(&self) -> Vec<u8> {
        match self {
            StackItem::Bytes(bytes) => bytes.clone(),
            StackItem::Bool(true) => vec![1],
            StackItem::Bool(false) => Vec::new(),
        }
    }
}

// =============================================================================
// Execution
// =============================================================================

/// Context a script executes against
#[derive(Debug, Clone)]
pub struct ExecContext {
    /// The message digest signature-check opcodes verify against
    pub sighash: [u8; 32],
}

/// The script interpreter
pub struct Interpreter {
    stack: Vec<StackItem>,
    context: ExecContext,
}

impl Interpreter {
    /// Create an interpreter seeded with the given initial stack items
    /// (witness arguments or scriptSig pushes, bottom first)
    pub fn new(initial_stack: Vec<Vec<u8>>, context: ExecContext) -> Self {
        Self {
            stack: initial_stack.into_iter().map(StackItem::Bytes).collect(),
            context,
        }
    }

    /// Run a decoded script to completion.
    ///
    /// Succeeds iff no opcode fails and the final stack holds exactly one
    /// truthy item.
    pub fn execute(mut self, ops: &[ScriptOp]) -> Result<(), ScriptError> {
        for op in ops {
            self.step(op)?;
        }

        if self.stack.len() != 1 {
            return Err(ScriptError::BadFinalStack(self.stack.len()));
        }
        if !self.stack[0].is_truthy() {
            return Err(ScriptError::VerifyFailed);
        }
        Ok(())
    }

    fn step(&mut self, op: &ScriptOp) -> Result<(), ScriptError> {
        match op {
            ScriptOp::Push(data) => self.push(StackItem::Bytes(data.clone()))?,
            ScriptOp::Op(opcode) => match *opcode {
                OP_DUP => {
                    let top = self.stack.last().ok_or(ScriptError::StackUnderflow)?.clone();
                    self.push(top)?;
                }
                OP_SHA256 => {
                    let data = self.pop()?.to_bytes();
                    self.push(StackItem::Bytes(sha256(&data).to_vec()))?;
                }
                OP_HASH160 => {
                    let data = self.pop()?.to_bytes();
                    self.push(StackItem::Bytes(hash160(&data).to_vec()))?;
                }
                OP_HASH256 => {
                    let data = self.pop()?.to_bytes();
                    self.push(StackItem::Bytes(double_sha256(&data).to_vec()))?;
                }
                OP_EQUAL => {
                    let b = self.pop()?.to_bytes();
                    let a = self.pop()?.to_bytes();
                    self.push(StackItem::Bool(a == b))?;
                }
                OP_EQUALVERIFY => {
                    let b = self.pop()?.to_bytes();
                    let a = self.pop()?.to_bytes();
                    if a != b {
                        return Err(ScriptError::EqualVerifyFailed);
                    }
                }
                OP_VERIFY => {
                    let item = self.pop()?;
                    if !item.is_truthy() {
                        return Err(ScriptError::VerifyFailed);
                    }
                }
                OP_CHECKSIG => {
                    let pubkey = self.pop()?.to_bytes();
                    let signature = self.pop()?.to_bytes();
                    let valid = verify_ecdsa(&pubkey, &self.context.sighash, &signature);
                    self.push(StackItem::Bool(valid))?;
                }
                other => return Err(ScriptError::UnknownOpcode(other)),
            },
        }
        Ok(())
    }

    fn push(&mut self, item: StackItem) -> Result<(), ScriptError> {
        if self.stack.len() >= MAX_STACK_SIZE {
            return Err(ScriptError::StackOverflow);
        }
        self.stack.push(item);
        Ok(())
    }

    fn pop(&mut self) -> Result<StackItem, ScriptError> {
        self.stack.pop().ok_or(ScriptError::StackUnderflow)
    }
}

// =============================================================================
// Tests
// =============================================================================
