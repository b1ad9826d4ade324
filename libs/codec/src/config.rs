//! Configuration for codec resource limits
//!
//! Provides configurable bounds for recursive hydration and metadata
//! documents, allowing runtime adjustment without recompilation.

use once_cell::sync::Lazy;
use std::env;

/// Resource limits applied while decoding
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Maximum recursion depth for nested hydration
    pub max_depth: usize,
    /// Maximum byte length of a metadata document
    pub max_metadata_len: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            // Generous headroom; real payloads nest 3-6 levels
            max_depth: 64,
            max_metadata_len: 8192,
        }
    }
}

impl CodecConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            max_depth: env::var("TYTX_MAX_DEPTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(64),
            max_metadata_len: env::var("TYTX_MAX_METADATA_LEN")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8192),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.max_depth == 0 {
            return Err("max_depth must be greater than 0".to_string());
        }
        if self.max_depth > 1024 {
            return Err("max_depth cannot exceed 1024".to_string());
        }
        if self.max_metadata_len == 0 {
            return Err("max_metadata_len must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Process-wide configuration, initialized from the environment once
pub static CODEC_CONFIG: Lazy<CodecConfig> = Lazy::new(|| {
    let config = CodecConfig::from_env();
    if let Err(e) = config.validate() {
        tracing::warn!("invalid TYTX codec configuration ({e}), using defaults");
        return CodecConfig::default();
    }
    config
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(CodecConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_depth_rejected() {
        let config = CodecConfig {
            max_depth: 0,
            ..CodecConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
