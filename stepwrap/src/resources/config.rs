//! Resource resolver configuration.

use serde::{Deserialize, Serialize};

/// Limits applied to resource reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Maximum size of a single resource file in bytes.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
}

fn default_max_bytes() -> u64 {
    10 * 1024 * 1024 // 10MB
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
        }
    }
}

impl ResourceConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the size limit.
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config: ResourceConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ResourceConfig::default());
        assert_eq!(config.max_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_builder() {
        assert_eq!(ResourceConfig::new().with_max_bytes(16).max_bytes, 16);
    }
}
