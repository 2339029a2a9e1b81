//! Token resolution
//!
//! Instructions that reference metadata carry a raw 32-bit token. Turning a
//! handle into that token belongs to whoever owns the metadata tables, so the
//! encoder takes the lookup as a capability.

use ilcodec_bytecode::{EntityHandle, Token};

use crate::error::EncodeResult;

/// Maps metadata handles to instruction tokens
pub trait TokenResolver {
    /// Resolve `handle` to the token written into the instruction stream
    fn resolve(&self, handle: EntityHandle) -> EncodeResult<Token>;
}

/// Resolver for handles whose row numbers are final: `table << 24 | row`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetadataTokens;

impl TokenResolver for MetadataTokens {
    #[inline]
    fn resolve(&self, handle: EntityHandle) -> EncodeResult<Token> {
        Ok(handle.to_token())
    }
}

impl<F> TokenResolver for F
where
    F: Fn(EntityHandle) -> EncodeResult<Token>,
{
    #[inline]
    fn resolve(&self, handle: EntityHandle) -> EncodeResult<Token> {
        self(handle)
    }
}
