//! Encoding errors

use ilcodec_bytecode::{BytecodeError, EntityHandle, Opcode};
use thiserror::Error;

/// Errors reported by the instruction encoder.
///
/// Every check runs before the first byte of an instruction is written, so an
/// error never leaves a partial instruction in the blob.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Token resolver has no token for this handle
    #[error("Unresolved handle: {0:?}")]
    UnresolvedHandle(EntityHandle),

    /// Instruction would push the stream past the configured size limit
    #[error("Code size limit exceeded: {required} bytes required, limit is {limit}")]
    CodeSizeExceeded {
        /// Configured limit in bytes
        limit: usize,
        /// Offset the instruction would end at
        required: usize,
    },

    /// Opcode passed to a branch emission is not a relaxable branch
    #[error("Not a branch instruction: {0}")]
    NotABranch(Opcode),

    /// Operand rejected by the instruction-set layer
    #[error(transparent)]
    Bytecode(#[from] BytecodeError),
}

/// Result type for encoding operations
pub type EncodeResult<T> = std::result::Result<T, EncodeError>;
