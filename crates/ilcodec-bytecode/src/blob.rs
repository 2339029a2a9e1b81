//! Append-only byte sinks
//!
//! [`BlobWrite`] is the whole surface an instruction encoder needs from its
//! buffer: sequential appends and the current length. Nothing here seeks,
//! truncates or reads back.

use std::ops::Deref;

/// Append-only byte buffer
///
/// Operands are little-endian. The one big-endian write, [`write_u16_be`],
/// exists for two-byte opcodes.
///
/// [`write_u16_be`]: BlobWrite::write_u16_be
pub trait BlobWrite {
    /// Bytes written so far
    fn len(&self) -> usize;

    /// Append raw bytes
    fn write_bytes(&mut self, bytes: &[u8]);

    /// Whether nothing has been written
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append one byte
    #[inline]
    fn write_u8(&mut self, value: u8) {
        self.write_bytes(&[value]);
    }

    /// Append one signed byte (two's complement)
    #[inline]
    fn write_i8(&mut self, value: i8) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Append a `u16`, high byte first
    #[inline]
    fn write_u16_be(&mut self, value: u16) {
        self.write_bytes(&value.to_be_bytes());
    }

    /// Append an `i32`, little-endian
    #[inline]
    fn write_i32_le(&mut self, value: i32) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Append a `u32`, little-endian
    #[inline]
    fn write_u32_le(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Append an `i64`, little-endian
    #[inline]
    fn write_i64_le(&mut self, value: i64) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Append the IEEE-754 bits of an `f32`, little-endian
    #[inline]
    fn write_f32_le(&mut self, value: f32) {
        self.write_bytes(&value.to_bits().to_le_bytes());
    }

    /// Append the IEEE-754 bits of an `f64`, little-endian
    #[inline]
    fn write_f64_le(&mut self, value: f64) {
        self.write_bytes(&value.to_bits().to_le_bytes());
    }
}

impl BlobWrite for Vec<u8> {
    #[inline]
    fn len(&self) -> usize {
        Vec::len(self)
    }

    #[inline]
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }

    #[inline]
    fn write_u8(&mut self, value: u8) {
        self.push(value);
    }
}

/// Owned, growable blob
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobBuilder {
    bytes: Vec<u8>,
}

impl BlobBuilder {
    /// Create an empty blob
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty blob with room for `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Written bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Take the written bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl BlobWrite for BlobBuilder {
    #[inline]
    fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    #[inline]
    fn write_u8(&mut self, value: u8) {
        self.bytes.push(value);
    }
}

impl Deref for BlobBuilder {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<Vec<u8>> for BlobBuilder {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}
