//! Script classification and decoding
//!
//! Locking scripts are classified by structural byte-pattern matching into
//! the handful of standard output types this tool can validate. Scripts can
//! also be decoded into an opcode/push sequence for execution and
//! diagnostics.

use serde::Deserialize;
use thiserror::Error;

// =============================================================================
// Opcode constants
// =============================================================================

pub const OP_0: u8 = 0x00;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_1: u8 = 0x51;
pub const OP_16: u8 = 0x60;
pub const OP_VERIFY: u8 = 0x69;
pub const OP_DUP: u8 = 0x76;
pub const OP_EQUAL: u8 = 0x87;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_SHA256: u8 = 0xa8;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_HASH256: u8 = 0xaa;
pub const OP_CHECKSIG: u8 = 0xac;

// =============================================================================
// Script Errors
// =============================================================================

/// Errors raised while decoding or executing a script
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("push of {wanted} bytes runs past end of script at offset {at}")]
    TruncatedPush { at: usize, wanted: usize },
    #[error("unknown opcode 0x{0:02x}")]
    UnknownOpcode(u8),
    #[error("stack underflow")]
    StackUnderflow,
    #[error("stack overflow")]
    StackOverflow,
    #[error("verify failed: top of stack not truthy")]
    VerifyFailed,
    #[error("equality check failed")]
    EqualVerifyFailed,
    #[error("script finished with {0} stack items (expected exactly 1 truthy)")]
    BadFinalStack(usize),
    #[error("signature check failed in script")]
    SignatureCheckFailed,
}

// =============================================================================
// Script Types
// =============================================================================

/// Structural classification of a locking script.
///
/// Deserializes from the type tags used by mempool records (`p2pkh`,
/// `v0_p2wpkh`, `v1_p2tr`, ...); unrecognized tags map to `Unknown`, which
/// the validator rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ScriptType {
    /// Pay to public key hash (legacy)
    #[serde(rename = "p2pkh")]
    P2pkh,
    /// Pay to witness public key hash (segwit v0)
    #[serde(rename = "v0_p2wpkh")]
    P2wpkh,
    /// Pay to taproot (segwit v1)
    #[serde(rename = "v1_p2tr")]
    P2tr,
    /// Pay to script hash (legacy)
    #[serde(rename = "p2sh")]
    P2sh,
    /// Pay to witness script hash (segwit v0)
    #[serde(rename = "v0_p2wsh")]
    P2wsh,
    /// Anything else; always rejected by the validator
    #[serde(other)]
    Unknown,
}

impl ScriptType {
    /// Classify a locking script by its byte pattern.
    ///
    /// Matching is purely structural: total length plus the leading (and
    /// for legacy patterns, trailing) opcode bytes.
    pub fn classify(script: &[u8]) -> Self {
        match script {
            // OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG
            [OP_DUP, OP_HASH160, 0x14, .., OP_EQUALVERIFY, OP_CHECKSIG] if script.len() == 25 => {
                ScriptType::P2pkh
            }
            // OP_HASH160 <20 bytes> OP_EQUAL
            [OP_HASH160, 0x14, .., OP_EQUAL] if script.len() == 23 => ScriptType::P2sh,
            // OP_0 <20-byte program>
            [OP_0, 0x14, ..] if script.len() == 22 => ScriptType::P2wpkh,
            // OP_0 <32-byte program>
            [OP_0, 0x20, ..] if script.len() == 34 => ScriptType::P2wsh,
            // OP_1 <32-byte x-only key>
            [OP_1, 0x20, ..] if script.len() == 34 => ScriptType::P2tr,
            _ => ScriptType::Unknown,
        }
    }

    /// The witness program or hash payload committed by the script, for
    /// the types that commit to one
    pub fn committed_payload(script: &[u8]) -> Option<&[u8]> {
        match Self::classify(script) {
            ScriptType::P2pkh => Some(&script[3..23]),
            ScriptType::P2sh => Some(&script[2..22]),
            ScriptType::P2wpkh => Some(&script[2..22]),
            ScriptType::P2wsh | ScriptType::P2tr => Some(&script[2..34]),
            ScriptType::Unknown => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ScriptType::P2pkh => "p2pkh",
            ScriptType::P2wpkh => "p2wpkh",
            ScriptType::P2tr => "p2tr",
            ScriptType::P2sh => "p2sh",
            ScriptType::P2wsh => "p2wsh",
            ScriptType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ScriptType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}

// =============================================================================
// Script Decoding
// =============================================================================

/// One decoded script operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptOp {
    /// Push a data item onto the stack
    Push(Vec<u8>),
    /// An atomic (non-push) opcode
    Op(u8),
}

/// Decode a script into its ordered operation sequence.
///
/// Opcodes in [0x01, 0x4b] push that many following bytes; `OP_PUSHDATA1`
/// pushes a one-byte-length-prefixed blob; `OP_0` pushes the empty item;
/// opcodes in [0x51, 0x60] push the small number (opcode - 0x50) as a
/// single byte. Everything else decodes as an atomic opcode. A push that
/// runs past the end of the script is a decode error.
pub fn decode_script(script: &[u8]) -> Result<Vec<ScriptOp>, ScriptError> {
    let mut ops = Vec::new();
    let mut i = 0;

    while i < script.len() {
        let opcode = script[i];
        i += 1;

        match opcode {
            OP_0 => ops.push(ScriptOp::Push(Vec::new())),
            1..=0x4b => {
                let len = opcode as usize;
                if i + len > script.len() {
                    return Err(ScriptError::TruncatedPush {
                        at: i - 1,
                        wanted: len,
                    });
                }
                ops.push(ScriptOp::Push(script[i..i + len].to_vec()));
                i += len;
            }
            OP_PUSHDATA1 => {
                if i >= script.len() {
                    return Err(ScriptError::TruncatedPush { at: i - 1, wanted: 1 });
                }
                let len = script[i] as usize;
                i += 1;
                if i + len > script.len() {
                    return Err(ScriptError::TruncatedPush {
                        at: i - 2,
                        wanted: len,
                    });
                }
                ops.push(ScriptOp::Push(script[i..i + len].to_vec()));
                i += len;
            }
            OP_1..=OP_16 => ops.push(ScriptOp::Push(vec![opcode - 0x50])),
            other => ops.push(ScriptOp::Op(other)),
        }
    }

    Ok(ops)
}

// =============================================================================
// Tests
// =============================================================================
