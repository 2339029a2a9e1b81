//! Instruction operands

use serde::{Deserialize, Serialize};

use crate::MAX_SHORT_INDEX;
use crate::error::BytecodeError;

/// Metadata token: table tag in the high byte, row in the low 24 bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Token(pub u32);

impl Token {
    /// Create a token from its raw value
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw 32-bit value
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Table tag (high byte)
    #[inline]
    pub const fn table(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Row number or heap offset (low 24 bits)
    #[inline]
    pub const fn row(self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Row zero never names an entity
    #[inline]
    pub const fn is_nil(self) -> bool {
        self.row() == 0
    }
}

impl From<u32> for Token {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<i32> for Token {
    fn from(raw: i32) -> Self {
        Self(raw as u32)
    }
}

/// Long (4-byte) branch displacement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct BranchOffset(pub i32);

impl BranchOffset {
    /// Create a new branch offset
    #[inline]
    pub const fn new(offset: i32) -> Self {
        Self(offset)
    }

    /// Get offset value
    #[inline]
    pub const fn offset(self) -> i32 {
        self.0
    }

    /// Whether the displacement also fits the short form
    #[inline]
    pub const fn fits_short(self) -> bool {
        self.0 >= i8::MIN as i32 && self.0 <= i8::MAX as i32
    }
}

impl From<i32> for BranchOffset {
    fn from(offset: i32) -> Self {
        Self(offset)
    }
}

/// Short (1-byte) branch displacement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ShortBranchOffset(pub i8);

impl ShortBranchOffset {
    /// Create a new short branch offset
    #[inline]
    pub const fn new(offset: i8) -> Self {
        Self(offset)
    }

    /// Get offset value
    #[inline]
    pub const fn offset(self) -> i8 {
        self.0
    }
}

impl From<i8> for ShortBranchOffset {
    fn from(offset: i8) -> Self {
        Self(offset)
    }
}

impl TryFrom<i32> for ShortBranchOffset {
    type Error = BytecodeError;

    fn try_from(offset: i32) -> Result<Self, Self::Error> {
        i8::try_from(offset)
            .map(Self)
            .map_err(|_| BytecodeError::BranchOutOfRange(offset))
    }
}

impl From<ShortBranchOffset> for BranchOffset {
    fn from(short: ShortBranchOffset) -> Self {
        Self(i32::from(short.0))
    }
}

/// Index of a local variable slot or a method argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct SlotIndex(pub u32);

impl SlotIndex {
    /// Create a new slot index
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get index value
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Whether the index has a one-byte operand form.
    ///
    /// `0xFF` itself is excluded: the short form tops out at `0xFE`.
    #[inline]
    pub const fn fits_short(self) -> bool {
        self.0 <= MAX_SHORT_INDEX
    }

    /// Bit pattern of the 4-byte long-form operand (a signed field)
    #[inline]
    pub const fn long_form(self) -> i32 {
        self.0 as i32
    }
}

impl From<u32> for SlotIndex {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

impl From<u16> for SlotIndex {
    fn from(index: u16) -> Self {
        Self(u32::from(index))
    }
}

impl From<u8> for SlotIndex {
    fn from(index: u8) -> Self {
        Self(u32::from(index))
    }
}
