//! CIL opcode table (ECMA-335 Partition III)
//!
//! Every opcode carries its canonical 16-bit value. Opcodes on the base page
//! fit in one byte; opcodes on the extended page are `0xFE` followed by a
//! selector byte. The encoding is derived from the value by
//! [`Opcode::encoding`] and never guessed at emission time.

use std::fmt;
use std::sync::OnceLock;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::EXTENDED_OPCODE_PREFIX;
use crate::error::{BytecodeError, Result};

macro_rules! opcodes {
    ($($variant:ident = $value:literal => $mnemonic:literal,)*) => {
        /// CIL opcodes
        ///
        /// The discriminant is the canonical value from the instruction-set
        /// tables, so `Opcode::Ceq as u16 == 0xFE01`.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[repr(u16)]
        pub enum Opcode {
            $(
                #[doc = concat!("`", $mnemonic, "`")]
                $variant = $value,
            )*
        }

        impl Opcode {
            /// Every opcode, in table order
            pub const ALL: &'static [Opcode] = &[$(Opcode::$variant,)*];

            /// Look up an opcode by its canonical value
            pub const fn from_value(value: u16) -> Option<Self> {
                match value {
                    $($value => Some(Opcode::$variant),)*
                    _ => None,
                }
            }

            /// Dotted assembler mnemonic, e.g. `ldc.i4.s`
            pub const fn mnemonic(self) -> &'static str {
                match self {
                    $(Opcode::$variant => $mnemonic,)*
                }
            }
        }
    };
}

opcodes! {
    // ==================== Base page ====================
    Nop = 0x00 => "nop",
    Break = 0x01 => "break",
    Ldarg0 = 0x02 => "ldarg.0",
    Ldarg1 = 0x03 => "ldarg.1",
    Ldarg2 = 0x04 => "ldarg.2",
    Ldarg3 = 0x05 => "ldarg.3",
    Ldloc0 = 0x06 => "ldloc.0",
    Ldloc1 = 0x07 => "ldloc.1",
    Ldloc2 = 0x08 => "ldloc.2",
    Ldloc3 = 0x09 => "ldloc.3",
    Stloc0 = 0x0A => "stloc.0",
    Stloc1 = 0x0B => "stloc.1",
    Stloc2 = 0x0C => "stloc.2",
    Stloc3 = 0x0D => "stloc.3",
    LdargS = 0x0E => "ldarg.s",
    LdargaS = 0x0F => "ldarga.s",
    StargS = 0x10 => "starg.s",
    LdlocS = 0x11 => "ldloc.s",
    LdlocaS = 0x12 => "ldloca.s",
    StlocS = 0x13 => "stloc.s",
    Ldnull = 0x14 => "ldnull",
    LdcI4M1 = 0x15 => "ldc.i4.m1",
    LdcI4_0 = 0x16 => "ldc.i4.0",
    LdcI4_1 = 0x17 => "ldc.i4.1",
    LdcI4_2 = 0x18 => "ldc.i4.2",
    LdcI4_3 = 0x19 => "ldc.i4.3",
    LdcI4_4 = 0x1A => "ldc.i4.4",
    LdcI4_5 = 0x1B => "ldc.i4.5",
    LdcI4_6 = 0x1C => "ldc.i4.6",
    LdcI4_7 = 0x1D => "ldc.i4.7",
    LdcI4_8 = 0x1E => "ldc.i4.8",
    LdcI4S = 0x1F => "ldc.i4.s",
    LdcI4 = 0x20 => "ldc.i4",
    LdcI8 = 0x21 => "ldc.i8",
    LdcR4 = 0x22 => "ldc.r4",
    LdcR8 = 0x23 => "ldc.r8",
    Dup = 0x25 => "dup",
    Pop = 0x26 => "pop",
    Jmp = 0x27 => "jmp",
    Call = 0x28 => "call",
    Calli = 0x29 => "calli",
    Ret = 0x2A => "ret",
    BrS = 0x2B => "br.s",
    BrfalseS = 0x2C => "brfalse.s",
    BrtrueS = 0x2D => "brtrue.s",
    BeqS = 0x2E => "beq.s",
    BgeS = 0x2F => "bge.s",
    BgtS = 0x30 => "bgt.s",
    BleS = 0x31 => "ble.s",
    BltS = 0x32 => "blt.s",
    BneUnS = 0x33 => "bne.un.s",
    BgeUnS = 0x34 => "bge.un.s",
    BgtUnS = 0x35 => "bgt.un.s",
    BleUnS = 0x36 => "ble.un.s",
    BltUnS = 0x37 => "blt.un.s",
    Br = 0x38 => "br",
    Brfalse = 0x39 => "brfalse",
    Brtrue = 0x3A => "brtrue",
    Beq = 0x3B => "beq",
    Bge = 0x3C => "bge",
    Bgt = 0x3D => "bgt",
    Ble = 0x3E => "ble",
    Blt = 0x3F => "blt",
    BneUn = 0x40 => "bne.un",
    BgeUn = 0x41 => "bge.un",
    BgtUn = 0x42 => "bgt.un",
    BleUn = 0x43 => "ble.un",
    BltUn = 0x44 => "blt.un",
    Switch = 0x45 => "switch",
    LdindI1 = 0x46 => "ldind.i1",
    LdindU1 = 0x47 => "ldind.u1",
    LdindI2 = 0x48 => "ldind.i2",
    LdindU2 = 0x49 => "ldind.u2",
    LdindI4 = 0x4A => "ldind.i4",
    LdindU4 = 0x4B => "ldind.u4",
    LdindI8 = 0x4C => "ldind.i8",
    LdindI = 0x4D => "ldind.i",
    LdindR4 = 0x4E => "ldind.r4",
    LdindR8 = 0x4F => "ldind.r8",
    LdindRef = 0x50 => "ldind.ref",
    StindRef = 0x51 => "stind.ref",
    StindI1 = 0x52 => "stind.i1",
    StindI2 = 0x53 => "stind.i2",
    StindI4 = 0x54 => "stind.i4",
    StindI8 = 0x55 => "stind.i8",
    StindR4 = 0x56 => "stind.r4",
    StindR8 = 0x57 => "stind.r8",
    Add = 0x58 => "add",
    Sub = 0x59 => "sub",
    Mul = 0x5A => "mul",
    Div = 0x5B => "div",
    DivUn = 0x5C => "div.un",
    Rem = 0x5D => "rem",
    RemUn = 0x5E => "rem.un",
    And = 0x5F => "and",
    Or = 0x60 => "or",
    Xor = 0x61 => "xor",
    Shl = 0x62 => "shl",
    Shr = 0x63 => "shr",
    ShrUn = 0x64 => "shr.un",
    Neg = 0x65 => "neg",
    Not = 0x66 => "not",
    ConvI1 = 0x67 => "conv.i1",
    ConvI2 = 0x68 => "conv.i2",
    ConvI4 = 0x69 => "conv.i4",
    ConvI8 = 0x6A => "conv.i8",
    ConvR4 = 0x6B => "conv.r4",
    ConvR8 = 0x6C => "conv.r8",
    ConvU4 = 0x6D => "conv.u4",
    ConvU8 = 0x6E => "conv.u8",
    Callvirt = 0x6F => "callvirt",
    Cpobj = 0x70 => "cpobj",
    Ldobj = 0x71 => "ldobj",
    Ldstr = 0x72 => "ldstr",
    Newobj = 0x73 => "newobj",
    Castclass = 0x74 => "castclass",
    Isinst = 0x75 => "isinst",
    ConvRUn = 0x76 => "conv.r.un",
    Unbox = 0x79 => "unbox",
    Throw = 0x7A => "throw",
    Ldfld = 0x7B => "ldfld",
    Ldflda = 0x7C => "ldflda",
    Stfld = 0x7D => "stfld",
    Ldsfld = 0x7E => "ldsfld",
    Ldsflda = 0x7F => "ldsflda",
    Stsfld = 0x80 => "stsfld",
    Stobj = 0x81 => "stobj",
    ConvOvfI1Un = 0x82 => "conv.ovf.i1.un",
    ConvOvfI2Un = 0x83 => "conv.ovf.i2.un",
    ConvOvfI4Un = 0x84 => "conv.ovf.i4.un",
    ConvOvfI8Un = 0x85 => "conv.ovf.i8.un",
    ConvOvfU1Un = 0x86 => "conv.ovf.u1.un",
    ConvOvfU2Un = 0x87 => "conv.ovf.u2.un",
    ConvOvfU4Un = 0x88 => "conv.ovf.u4.un",
    ConvOvfU8Un = 0x89 => "conv.ovf.u8.un",
    ConvOvfIUn = 0x8A => "conv.ovf.i.un",
    ConvOvfUUn = 0x8B => "conv.ovf.u.un",
    Box = 0x8C => "box",
    Newarr = 0x8D => "newarr",
    Ldlen = 0x8E => "ldlen",
    Ldelema = 0x8F => "ldelema",
    LdelemI1 = 0x90 => "ldelem.i1",
    LdelemU1 = 0x91 => "ldelem.u1",
    LdelemI2 = 0x92 => "ldelem.i2",
    LdelemU2 = 0x93 => "ldelem.u2",
    LdelemI4 = 0x94 => "ldelem.i4",
    LdelemU4 = 0x95 => "ldelem.u4",
    LdelemI8 = 0x96 => "ldelem.i8",
    LdelemI = 0x97 => "ldelem.i",
    LdelemR4 = 0x98 => "ldelem.r4",
    LdelemR8 = 0x99 => "ldelem.r8",
    LdelemRef = 0x9A => "ldelem.ref",
    StelemI = 0x9B => "stelem.i",
    StelemI1 = 0x9C => "stelem.i1",
    StelemI2 = 0x9D => "stelem.i2",
    StelemI4 = 0x9E => "stelem.i4",
    StelemI8 = 0x9F => "stelem.i8",
    StelemR4 = 0xA0 => "stelem.r4",
    StelemR8 = 0xA1 => "stelem.r8",
    StelemRef = 0xA2 => "stelem.ref",
    Ldelem = 0xA3 => "ldelem",
    Stelem = 0xA4 => "stelem",
    UnboxAny = 0xA5 => "unbox.any",
    ConvOvfI1 = 0xB3 => "conv.ovf.i1",
    ConvOvfU1 = 0xB4 => "conv.ovf.u1",
    ConvOvfI2 = 0xB5 => "conv.ovf.i2",
    ConvOvfU2 = 0xB6 => "conv.ovf.u2",
    ConvOvfI4 = 0xB7 => "conv.ovf.i4",
    ConvOvfU4 = 0xB8 => "conv.ovf.u4",
    ConvOvfI8 = 0xB9 => "conv.ovf.i8",
    ConvOvfU8 = 0xBA => "conv.ovf.u8",
    Refanyval = 0xC2 => "refanyval",
    Ckfinite = 0xC3 => "ckfinite",
    Mkrefany = 0xC6 => "mkrefany",
    Ldtoken = 0xD0 => "ldtoken",
    ConvU2 = 0xD1 => "conv.u2",
    ConvU1 = 0xD2 => "conv.u1",
    ConvI = 0xD3 => "conv.i",
    ConvOvfI = 0xD4 => "conv.ovf.i",
    ConvOvfU = 0xD5 => "conv.ovf.u",
    AddOvf = 0xD6 => "add.ovf",
    AddOvfUn = 0xD7 => "add.ovf.un",
    MulOvf = 0xD8 => "mul.ovf",
    MulOvfUn = 0xD9 => "mul.ovf.un",
    SubOvf = 0xDA => "sub.ovf",
    SubOvfUn = 0xDB => "sub.ovf.un",
    Endfinally = 0xDC => "endfinally",
    Leave = 0xDD => "leave",
    LeaveS = 0xDE => "leave.s",
    StindI = 0xDF => "stind.i",
    ConvU = 0xE0 => "conv.u",

    // ==================== Extended page (0xFE prefix) ====================
    Arglist = 0xFE00 => "arglist",
    Ceq = 0xFE01 => "ceq",
    Cgt = 0xFE02 => "cgt",
    CgtUn = 0xFE03 => "cgt.un",
    Clt = 0xFE04 => "clt",
    CltUn = 0xFE05 => "clt.un",
    Ldftn = 0xFE06 => "ldftn",
    Ldvirtftn = 0xFE07 => "ldvirtftn",
    Ldarg = 0xFE09 => "ldarg",
    Ldarga = 0xFE0A => "ldarga",
    Starg = 0xFE0B => "starg",
    Ldloc = 0xFE0C => "ldloc",
    Ldloca = 0xFE0D => "ldloca",
    Stloc = 0xFE0E => "stloc",
    Localloc = 0xFE0F => "localloc",
    Endfilter = 0xFE11 => "endfilter",
    Unaligned = 0xFE12 => "unaligned.",
    Volatile = 0xFE13 => "volatile.",
    Tail = 0xFE14 => "tail.",
    Initobj = 0xFE15 => "initobj",
    Constrained = 0xFE16 => "constrained.",
    Cpblk = 0xFE17 => "cpblk",
    Initblk = 0xFE18 => "initblk",
    No = 0xFE19 => "no.",
    Rethrow = 0xFE1A => "rethrow",
    Sizeof = 0xFE1C => "sizeof",
    Refanytype = 0xFE1D => "refanytype",
    Readonly = 0xFE1E => "readonly.",
}

/// Short/long pairs of every relaxable branch instruction
const BRANCH_FORMS: [(Opcode, Opcode); 14] = [
    (Opcode::BrS, Opcode::Br),
    (Opcode::BrfalseS, Opcode::Brfalse),
    (Opcode::BrtrueS, Opcode::Brtrue),
    (Opcode::BeqS, Opcode::Beq),
    (Opcode::BgeS, Opcode::Bge),
    (Opcode::BgtS, Opcode::Bgt),
    (Opcode::BleS, Opcode::Ble),
    (Opcode::BltS, Opcode::Blt),
    (Opcode::BneUnS, Opcode::BneUn),
    (Opcode::BgeUnS, Opcode::BgeUn),
    (Opcode::BgtUnS, Opcode::BgtUn),
    (Opcode::BleUnS, Opcode::BleUn),
    (Opcode::BltUnS, Opcode::BltUn),
    (Opcode::LeaveS, Opcode::Leave),
];

/// On-the-wire shape of an opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpcodeEncoding {
    /// Base-page opcode, written as a single byte
    OneByte(u8),
    /// Extended-page opcode, written prefix first
    TwoByte {
        /// Escape byte (always `0xFE` for ECMA-335)
        prefix: u8,
        /// Selector within the extended page
        selector: u8,
    },
}

impl OpcodeEncoding {
    /// Number of bytes this encoding occupies
    #[inline]
    pub const fn len(self) -> usize {
        match self {
            Self::OneByte(_) => 1,
            Self::TwoByte { .. } => 2,
        }
    }

    /// Whether the encoding occupies no bytes (never true)
    #[inline]
    pub const fn is_empty(self) -> bool {
        false
    }

    /// Bytes in stream order. Two-byte opcodes are big-endian.
    pub fn to_bytes(self) -> Vec<u8> {
        match self {
            Self::OneByte(byte) => vec![byte],
            Self::TwoByte { prefix, selector } => vec![prefix, selector],
        }
    }
}

impl Opcode {
    /// Canonical 16-bit value
    #[inline]
    pub const fn value(self) -> u16 {
        self as u16
    }

    /// One byte if the canonical value fits in 8 bits, two otherwise
    pub const fn encoding(self) -> OpcodeEncoding {
        let value = self.value();
        if value <= u8::MAX as u16 {
            OpcodeEncoding::OneByte(value as u8)
        } else {
            let [prefix, selector] = value.to_be_bytes();
            OpcodeEncoding::TwoByte { prefix, selector }
        }
    }

    /// Size of the opcode itself in bytes (operands excluded)
    #[inline]
    pub const fn size(self) -> usize {
        self.encoding().len()
    }

    /// Read the opcode at the start of `bytes`, returning it with its width
    pub fn from_bytes(bytes: &[u8]) -> Result<(Self, usize)> {
        let (value, width) = match bytes {
            [] => return Err(BytecodeError::UnexpectedEnd),
            [EXTENDED_OPCODE_PREFIX] => return Err(BytecodeError::UnexpectedEnd),
            [EXTENDED_OPCODE_PREFIX, selector, ..] => {
                (u16::from_be_bytes([EXTENDED_OPCODE_PREFIX, *selector]), 2)
            }
            [byte, ..] => (u16::from(*byte), 1),
        };
        Self::from_value(value)
            .map(|op| (op, width))
            .ok_or(BytecodeError::InvalidOpcode(value))
    }

    /// Look up an opcode by its mnemonic
    pub fn from_mnemonic(mnemonic: &str) -> Result<Self> {
        static BY_MNEMONIC: OnceLock<FxHashMap<&'static str, Opcode>> = OnceLock::new();

        BY_MNEMONIC
            .get_or_init(|| Self::ALL.iter().map(|op| (op.mnemonic(), *op)).collect())
            .get(mnemonic)
            .copied()
            .ok_or_else(|| BytecodeError::UnknownMnemonic(mnemonic.to_owned()))
    }

    /// Whether this is the 1-byte-displacement form of a branch
    pub fn is_short_branch(self) -> bool {
        BRANCH_FORMS.iter().any(|&(short, _)| short == self)
    }

    /// Whether this is the 4-byte-displacement form of a branch
    pub fn is_long_branch(self) -> bool {
        BRANCH_FORMS.iter().any(|&(_, long)| long == self)
    }

    /// Whether this is a relaxable branch in either form
    pub fn is_branch(self) -> bool {
        self.is_short_branch() || self.is_long_branch()
    }

    /// Short form of a branch (identity for short branches)
    pub fn short_branch_form(self) -> Option<Self> {
        BRANCH_FORMS
            .iter()
            .find(|&&(short, long)| short == self || long == self)
            .map(|&(short, _)| short)
    }

    /// Long form of a branch (identity for long branches)
    pub fn long_branch_form(self) -> Option<Self> {
        BRANCH_FORMS
            .iter()
            .find(|&&(short, long)| short == self || long == self)
            .map(|&(_, long)| long)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl TryFrom<u16> for Opcode {
    type Error = BytecodeError;

    fn try_from(value: u16) -> Result<Self> {
        Self::from_value(value).ok_or(BytecodeError::InvalidOpcode(value))
    }
}
