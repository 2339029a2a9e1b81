//! Bytecode errors

use thiserror::Error;

/// Errors that can occur while building instruction-set values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BytecodeError {
    /// Value does not name an opcode
    #[error("Invalid opcode: {0:#06X}")]
    InvalidOpcode(u16),

    /// Mnemonic does not name an opcode
    #[error("Unknown mnemonic: {0}")]
    UnknownMnemonic(String),

    /// Metadata row does not fit in the 24-bit row field of a token
    #[error("Row {row:#X} out of range for table {table:#04X}")]
    RowOutOfRange {
        /// Table tag (high byte of the token)
        table: u8,
        /// Offending row number
        row: u32,
    },

    /// Branch displacement does not fit the short (8-bit) form
    #[error("Branch offset {0} does not fit in a short branch")]
    BranchOutOfRange(i32),

    /// Byte slice ended in the middle of an opcode
    #[error("Unexpected end of bytecode")]
    UnexpectedEnd,
}

/// Result type for bytecode operations
pub type Result<T> = std::result::Result<T, BytecodeError>;
