//! Instruction stream encoder
//!
//! [`InstructionEncoder`] is a write cursor over a [`BlobWrite`]. It holds the
//! blob by exclusive borrow and remembers the blob length at construction
//! (the mark); [`offset`](InstructionEncoder::offset) is always measured from
//! there.
//!
//! Each emission picks the shortest legal encoding for its operand:
//!
//! | Operation            | Dedicated opcode | Short form    | Long form      |
//! |----------------------|------------------|---------------|----------------|
//! | `ldc.i4`             | -1..=8           | i8 range      | 4-byte LE      |
//! | `ldloc`/`stloc`      | 0..=3            | 4..=254       | 4-byte LE      |
//! | `ldarg`              | 0..=3            | 4..=254       | 4-byte LE      |
//! | `ldloca`/`ldarga`/`starg` | none        | 0..=254       | 4-byte LE      |
//!
//! Branch displacements are written as given; choosing between short and
//! long branch forms is the caller's job.

use ilcodec_bytecode::{
    BlobWrite, EntityHandle, Opcode, OpcodeEncoding, ShortBranchOffset, SlotIndex,
    StandaloneSignatureHandle, Token, UserStringHandle,
};

use crate::error::{EncodeError, EncodeResult};
use crate::options::EncoderOptions;
use crate::resolver::{MetadataTokens, TokenResolver};

const LDLOC_FAST: [Opcode; 4] = [Opcode::Ldloc0, Opcode::Ldloc1, Opcode::Ldloc2, Opcode::Ldloc3];
const STLOC_FAST: [Opcode; 4] = [Opcode::Stloc0, Opcode::Stloc1, Opcode::Stloc2, Opcode::Stloc3];
const LDARG_FAST: [Opcode; 4] = [Opcode::Ldarg0, Opcode::Ldarg1, Opcode::Ldarg2, Opcode::Ldarg3];

/// Operand following an opcode
#[derive(Debug, Clone, Copy)]
enum Operand {
    None,
    U8(u8),
    I8(i8),
    I32(i32),
    Token(Token),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl Operand {
    const fn width(self) -> usize {
        match self {
            Self::None => 0,
            Self::U8(_) | Self::I8(_) => 1,
            Self::I32(_) | Self::Token(_) | Self::F32(_) => 4,
            Self::I64(_) | Self::F64(_) => 8,
        }
    }

    fn write_to<B: BlobWrite + ?Sized>(self, blob: &mut B) {
        match self {
            Self::None => {}
            Self::U8(v) => blob.write_u8(v),
            Self::I8(v) => blob.write_i8(v),
            Self::I32(v) => blob.write_i32_le(v),
            Self::Token(t) => blob.write_u32_le(t.raw()),
            Self::I64(v) => blob.write_i64_le(v),
            Self::F32(v) => blob.write_f32_le(v),
            Self::F64(v) => blob.write_f64_le(v),
        }
    }
}

/// Write cursor producing a CIL instruction stream
pub struct InstructionEncoder<'b, B: BlobWrite + ?Sized, R: TokenResolver = MetadataTokens> {
    blob: &'b mut B,
    start: usize,
    resolver: R,
    options: EncoderOptions,
}

impl<'b, B: BlobWrite + ?Sized> InstructionEncoder<'b, B> {
    /// Create an encoder that resolves handles with [`MetadataTokens`]
    pub fn new(blob: &'b mut B) -> Self {
        Self::with_resolver(blob, MetadataTokens)
    }
}

impl<'b, B: BlobWrite + ?Sized, R: TokenResolver> InstructionEncoder<'b, B, R> {
    /// Create an encoder with a custom token resolver
    pub fn with_resolver(blob: &'b mut B, resolver: R) -> Self {
        let start = blob.len();
        tracing::debug!(start, "instruction encoder bound");
        Self {
            blob,
            start,
            resolver,
            options: EncoderOptions::default(),
        }
    }

    /// Replace the encoder options
    pub fn with_options(mut self, options: EncoderOptions) -> Self {
        self.options = options;
        self
    }

    /// Blob length when the encoder was created
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Bytes written since the mark
    #[inline]
    pub fn offset(&self) -> usize {
        self.blob.len() - self.start
    }

    /// Active options
    #[inline]
    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    /// Underlying blob
    #[inline]
    pub fn blob(&self) -> &B {
        &*self.blob
    }

    /// Underlying blob, for operands with no dedicated writer (`switch`
    /// tables, the `unaligned.` alignment byte).
    ///
    /// Bytes appended here count toward [`offset`](Self::offset) but bypass
    /// the `max_code_size` check.
    #[inline]
    pub fn blob_mut(&mut self) -> &mut B {
        &mut *self.blob
    }

    /// Write an opcode: one byte, or two bytes high byte first
    pub fn opcode(&mut self, code: Opcode) -> EncodeResult<()> {
        self.emit(code, Operand::None)
    }

    /// Write a raw token (always 4 bytes, little-endian)
    pub fn token(&mut self, token: impl Into<Token>) -> EncodeResult<()> {
        self.emit_operand(Operand::Token(token.into()))
    }

    /// Resolve a handle and write its token
    pub fn token_handle(&mut self, handle: EntityHandle) -> EncodeResult<()> {
        let token = self.resolver.resolve(handle)?;
        self.emit_operand(Operand::Token(token))
    }

    /// Write a 4-byte branch displacement
    pub fn long_branch_target(&mut self, offset: i32) -> EncodeResult<()> {
        self.emit_operand(Operand::I32(offset))
    }

    /// Write a 1-byte branch displacement
    pub fn short_branch_target(&mut self, offset: i8) -> EncodeResult<()> {
        self.emit_operand(Operand::I8(offset))
    }

    /// Write a branch opcode and its displacement in the form `code` names.
    ///
    /// Unlike the raw target writers this checks that a short branch's
    /// displacement fits in 8 bits.
    pub fn branch(&mut self, code: Opcode, offset: i32) -> EncodeResult<()> {
        if !code.is_branch() {
            return Err(EncodeError::NotABranch(code));
        }
        if code.is_short_branch() {
            let short = ShortBranchOffset::try_from(offset)?;
            self.emit(code, Operand::I8(short.offset()))
        } else {
            self.emit(code, Operand::I32(offset))
        }
    }

    /// `ldstr` with a raw user-string token
    pub fn load_string(&mut self, token: impl Into<Token>) -> EncodeResult<()> {
        self.emit(Opcode::Ldstr, Operand::Token(token.into()))
    }

    /// `ldstr` with a user-string handle
    pub fn load_string_handle(&mut self, handle: UserStringHandle) -> EncodeResult<()> {
        let token = self.resolver.resolve(handle.into())?;
        self.emit(Opcode::Ldstr, Operand::Token(token))
    }

    /// `call` a method definition, reference or instantiation
    pub fn call(&mut self, method: EntityHandle) -> EncodeResult<()> {
        let token = self.resolver.resolve(method)?;
        self.emit(Opcode::Call, Operand::Token(token))
    }

    /// `calli` through a stand-alone signature
    pub fn call_indirect(&mut self, signature: StandaloneSignatureHandle) -> EncodeResult<()> {
        let token = self.resolver.resolve(signature.into())?;
        self.emit(Opcode::Calli, Operand::Token(token))
    }

    /// Load a 32-bit integer constant in its most compact form
    pub fn load_constant_i4(&mut self, value: i32) -> EncodeResult<()> {
        let code = match value {
            -1 => Opcode::LdcI4M1,
            0 => Opcode::LdcI4_0,
            1 => Opcode::LdcI4_1,
            2 => Opcode::LdcI4_2,
            3 => Opcode::LdcI4_3,
            4 => Opcode::LdcI4_4,
            5 => Opcode::LdcI4_5,
            6 => Opcode::LdcI4_6,
            7 => Opcode::LdcI4_7,
            8 => Opcode::LdcI4_8,
            _ => {
                return match i8::try_from(value) {
                    Ok(short) => self.emit(Opcode::LdcI4S, Operand::I8(short)),
                    Err(_) => self.emit(Opcode::LdcI4, Operand::I32(value)),
                };
            }
        };
        self.emit(code, Operand::None)
    }

    /// Load a 64-bit integer constant (no compact form)
    pub fn load_constant_i8(&mut self, value: i64) -> EncodeResult<()> {
        self.emit(Opcode::LdcI8, Operand::I64(value))
    }

    /// Load a 32-bit float constant, bit pattern preserved
    pub fn load_constant_r4(&mut self, value: f32) -> EncodeResult<()> {
        self.emit(Opcode::LdcR4, Operand::F32(value))
    }

    /// Load a 64-bit float constant, bit pattern preserved
    pub fn load_constant_r8(&mut self, value: f64) -> EncodeResult<()> {
        self.emit(Opcode::LdcR8, Operand::F64(value))
    }

    /// `ldloc` in its most compact form
    pub fn load_local(&mut self, slot: u32) -> EncodeResult<()> {
        self.indexed(slot, Some(&LDLOC_FAST), Opcode::LdlocS, Opcode::Ldloc)
    }

    /// `stloc` in its most compact form
    pub fn store_local(&mut self, slot: u32) -> EncodeResult<()> {
        self.indexed(slot, Some(&STLOC_FAST), Opcode::StlocS, Opcode::Stloc)
    }

    /// `ldloca`; the instruction set has no dedicated per-slot forms
    pub fn load_local_address(&mut self, slot: u32) -> EncodeResult<()> {
        self.indexed(slot, None, Opcode::LdlocaS, Opcode::Ldloca)
    }

    /// `ldarg` in its most compact form
    pub fn load_argument(&mut self, argument: u32) -> EncodeResult<()> {
        self.indexed(argument, Some(&LDARG_FAST), Opcode::LdargS, Opcode::Ldarg)
    }

    /// `ldarga`; no dedicated per-argument forms
    pub fn load_argument_address(&mut self, argument: u32) -> EncodeResult<()> {
        self.indexed(argument, None, Opcode::LdargaS, Opcode::Ldarga)
    }

    /// `starg`; no dedicated per-argument forms
    pub fn store_argument(&mut self, argument: u32) -> EncodeResult<()> {
        self.indexed(argument, None, Opcode::StargS, Opcode::Starg)
    }

    fn indexed(
        &mut self,
        index: u32,
        fast: Option<&[Opcode; 4]>,
        short: Opcode,
        long: Opcode,
    ) -> EncodeResult<()> {
        if let Some(&code) = fast.and_then(|fast| fast.get(index as usize)) {
            return self.emit(code, Operand::None);
        }
        let index = SlotIndex::new(index);
        if index.fits_short() {
            self.emit(short, Operand::U8(index.index() as u8))
        } else {
            // Long form is a signed field even though indices are unsigned.
            self.emit(long, Operand::I32(index.long_form()))
        }
    }

    fn emit(&mut self, code: Opcode, operand: Operand) -> EncodeResult<()> {
        let width = code.size() + operand.width();
        self.reserve(width)?;

        if self.options.trace_instructions {
            tracing::trace!(
                mnemonic = code.mnemonic(),
                offset = self.offset(),
                width,
                "emit"
            );
        }

        match code.encoding() {
            OpcodeEncoding::OneByte(byte) => self.blob.write_u8(byte),
            // Two-byte opcodes go out prefix first, unlike every operand.
            OpcodeEncoding::TwoByte { prefix, selector } => {
                self.blob.write_bytes(&[prefix, selector])
            }
        }
        operand.write_to(&mut *self.blob);
        Ok(())
    }

    fn emit_operand(&mut self, operand: Operand) -> EncodeResult<()> {
        self.reserve(operand.width())?;
        operand.write_to(&mut *self.blob);
        Ok(())
    }

    fn reserve(&self, width: usize) -> EncodeResult<()> {
        let Some(limit) = self.options.max_code_size else {
            return Ok(());
        };
        let required = self.offset() + width;
        if required > limit {
            tracing::debug!(limit, required, "code size limit exceeded");
            return Err(EncodeError::CodeSizeExceeded { limit, required });
        }
        Ok(())
    }
}

impl<B: BlobWrite + ?Sized, R: TokenResolver> std::fmt::Debug for InstructionEncoder<'_, B, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstructionEncoder")
            .field("start", &self.start)
            .field("offset", &self.offset())
            .field("options", &self.options)
            .finish()
    }
}
