//! # ilcodec bytecode
//!
//! Instruction-set data model for the ilcodec CIL encoder.
//!
//! ## Design Principles
//!
//! - **Declarative opcodes**: every opcode carries its canonical 16-bit value,
//!   and the one-byte vs. two-byte decision is a property of the table
//! - **Mixed byte order**: two-byte opcodes are big-endian, every operand is
//!   little-endian
//! - **Append-only sinks**: encoders only ever push bytes through [`BlobWrite`]

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod blob;
pub mod error;
pub mod handle;
pub mod opcode;
pub mod operand;

pub use blob::{BlobBuilder, BlobWrite};
pub use error::{BytecodeError, Result};
pub use handle::{EntityHandle, StandaloneSignatureHandle, TableIndex, UserStringHandle};
pub use opcode::{Opcode, OpcodeEncoding};
pub use operand::{BranchOffset, ShortBranchOffset, SlotIndex, Token};

/// Prefix byte of the extended (two-byte) opcode page
pub const EXTENDED_OPCODE_PREFIX: u8 = 0xFE;

/// Largest slot or argument index that still uses a one-byte operand
pub const MAX_SHORT_INDEX: u32 = 0xFE;
