//! Metadata handles referenced by instruction tokens

use serde::{Deserialize, Serialize};

use crate::error::{BytecodeError, Result};
use crate::operand::Token;

/// Largest row number a token can carry
pub const MAX_ROW: u32 = 0x00FF_FFFF;

/// Metadata tables (and the user-string heap) that instruction tokens point into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TableIndex {
    /// Type reference
    TypeRef = 0x01,
    /// Type definition
    TypeDef = 0x02,
    /// Field definition
    Field = 0x04,
    /// Method definition
    MethodDef = 0x06,
    /// Member reference
    MemberRef = 0x0A,
    /// Stand-alone signature (`calli`, locals)
    StandAloneSig = 0x11,
    /// Type specification
    TypeSpec = 0x1B,
    /// Generic method instantiation
    MethodSpec = 0x2B,
    /// `#US` heap offset (`ldstr`)
    UserString = 0x70,
}

impl TableIndex {
    /// Tag stored in the high byte of a token
    #[inline]
    pub const fn tag(self) -> u8 {
        self as u8
    }
}

/// Reference to a row of a metadata table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityHandle {
    table: TableIndex,
    row: u32,
}

impl EntityHandle {
    /// Create a handle, rejecting rows that do not fit in 24 bits
    pub fn new(table: TableIndex, row: u32) -> Result<Self> {
        if row > MAX_ROW {
            return Err(BytecodeError::RowOutOfRange {
                table: table.tag(),
                row,
            });
        }
        Ok(Self { table, row })
    }

    /// Table this handle points into
    #[inline]
    pub const fn table(self) -> TableIndex {
        self.table
    }

    /// Row number (1-based; 0 is nil)
    #[inline]
    pub const fn row(self) -> u32 {
        self.row
    }

    /// Whether this is the nil handle of its table
    #[inline]
    pub const fn is_nil(self) -> bool {
        self.row == 0
    }

    /// Token for this handle under the ECMA-335 layout
    #[inline]
    pub const fn to_token(self) -> Token {
        Token::new(((self.table.tag() as u32) << 24) | self.row)
    }
}

/// Handle to a stand-alone signature, the only operand `calli` accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct StandaloneSignatureHandle(EntityHandle);

impl StandaloneSignatureHandle {
    /// Create a signature handle for `row`
    pub fn new(row: u32) -> Result<Self> {
        EntityHandle::new(TableIndex::StandAloneSig, row).map(Self)
    }

    /// Row number
    #[inline]
    pub const fn row(self) -> u32 {
        self.0.row()
    }
}

impl From<StandaloneSignatureHandle> for EntityHandle {
    fn from(handle: StandaloneSignatureHandle) -> Self {
        handle.0
    }
}

/// Offset of a literal in the user-string heap, the operand of `ldstr`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct UserStringHandle(EntityHandle);

impl UserStringHandle {
    /// Create a handle for heap offset `offset`
    pub fn new(offset: u32) -> Result<Self> {
        EntityHandle::new(TableIndex::UserString, offset).map(Self)
    }

    /// Heap offset
    #[inline]
    pub const fn offset(self) -> u32 {
        self.0.row()
    }
}

impl From<UserStringHandle> for EntityHandle {
    fn from(handle: UserStringHandle) -> Self {
        handle.0
    }
}
