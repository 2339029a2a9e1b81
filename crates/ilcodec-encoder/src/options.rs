//! Encoder configuration

use serde::{Deserialize, Serialize};

/// Size of the largest method body a tiny (one-byte) method header can describe
pub const TINY_METHOD_BODY_LIMIT: usize = 63;

/// Instruction encoder configuration
///
/// Defaults impose no limit and log nothing, which reproduces the plain
/// encoding rules exactly
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderOptions {
    /// Upper bound on bytes written after the mark
    /// Default: None (unbounded)
    pub max_code_size: Option<usize>,

    /// Log every emitted instruction at `TRACE` level
    /// Default: false
    pub trace_instructions: bool,
}

impl EncoderOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a body that must fit a tiny method header
    pub fn tiny_method_body() -> Self {
        Self {
            max_code_size: Some(TINY_METHOD_BODY_LIMIT),
            ..Default::default()
        }
    }

    /// Set the code size limit
    pub fn max_code_size(mut self, limit: usize) -> Self {
        self.max_code_size = Some(limit);
        self
    }

    /// Enable or disable per-instruction tracing
    pub fn trace_instructions(mut self, enabled: bool) -> Self {
        self.trace_instructions = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = EncoderOptions::new();
        assert_eq!(options.max_code_size, None);
        assert!(!options.trace_instructions);
    }

    #[test]
    fn test_builder() {
        let options = EncoderOptions::tiny_method_body().trace_instructions(true);
        assert_eq!(options.max_code_size, Some(63));
        assert!(options.trace_instructions);
        assert_eq!(
            EncoderOptions::new().max_code_size(10).max_code_size,
            Some(10)
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let options: EncoderOptions =
            serde_json::from_str(r#"{ "trace_instructions": true }"#).unwrap();
        assert_eq!(options, EncoderOptions::new().trace_instructions(true));
    }
}
