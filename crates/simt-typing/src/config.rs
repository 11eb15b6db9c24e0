//! Engine configuration.

use serde::Deserialize;
use simt_types::{IntWidth, Type};

/// Target properties that change how intrinsics are typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawEngineConfig")]
pub struct EngineConfig {
    /// Width of `intp`, the index type of 1-D atomic operations.
    pub pointer_width: IntWidth,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pointer_width: IntWidth::I64,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unsupported pointer width {bits}; expected 32 or 64")]
    UnsupportedPointerWidth { bits: u32 },
    #[error("invalid engine config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEngineConfig {
    #[serde(default = "default_pointer_bits")]
    pointer_width: u32,
}

fn default_pointer_bits() -> u32 {
    64
}

impl TryFrom<RawEngineConfig> for EngineConfig {
    type Error = ConfigError;

    fn try_from(raw: RawEngineConfig) -> Result<Self, Self::Error> {
        Self::with_pointer_bits(raw.pointer_width)
    }
}

impl EngineConfig {
    pub fn with_pointer_bits(bits: u32) -> Result<Self, ConfigError> {
        match IntWidth::from_bits(bits) {
            Some(pointer_width @ (IntWidth::I32 | IntWidth::I64)) => Ok(Self { pointer_width }),
            _ => Err(ConfigError::UnsupportedPointerWidth { bits }),
        }
    }

    /// Parse a JSON config such as `{"pointer_width": 32}`.
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }

    /// The platform-sized signed integer.
    pub fn intp(&self) -> Type {
        Type::intp(self.pointer_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_64_bit() {
        let config = EngineConfig::default();
        assert_eq!(config.pointer_width, IntWidth::I64);
        assert_eq!(config.intp(), Type::INT64);
    }

    #[test]
    fn parses_pointer_width() {
        let config = EngineConfig::from_json_str(r#"{"pointer_width": 32}"#).unwrap();
        assert_eq!(config.intp(), Type::INT32);
        assert_eq!(EngineConfig::from_json_str("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn rejects_unsupported_width() {
        let err = EngineConfig::from_json_str(r#"{"pointer_width": 16}"#).unwrap_err();
        assert!(
            err.to_string().contains("unsupported pointer width 16"),
            "unexpected error: {err}"
        );
        for bits in [8, 16, 128] {
            assert!(matches!(
                EngineConfig::with_pointer_bits(bits),
                Err(ConfigError::UnsupportedPointerWidth { bits: b }) if b == bits
            ));
        }
        assert_eq!(
            EngineConfig::with_pointer_bits(32).unwrap().pointer_width,
            IntWidth::I32
        );
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(EngineConfig::from_json_str(r#"{"warp_size": 32}"#).is_err());
    }
}
