//! # ilcodec encoder
//!
//! Turns a sequence of "emit this instruction" calls into a byte-exact,
//! size-minimized CIL instruction stream.
//!
//! ## Pipeline
//!
//! 1. Bind an [`InstructionEncoder`] to a blob; the blob's current length
//!    becomes the mark every [`offset`](InstructionEncoder::offset) is
//!    measured from
//! 2. Emit instructions in program order; each call picks the shortest legal
//!    form for its operand
//! 3. Resolve branch displacements externally from the reported offsets and
//!    feed them back through the branch-target calls

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod encoder;
pub mod error;
pub mod options;
pub mod resolver;

pub use encoder::InstructionEncoder;
pub use error::{EncodeError, EncodeResult};
pub use options::EncoderOptions;
pub use resolver::{MetadataTokens, TokenResolver};

pub use ilcodec_bytecode as bytecode;
