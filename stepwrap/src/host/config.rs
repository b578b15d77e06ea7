//! Runner configuration.

use crate::resources::ResourceConfig;
use crate::script::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};

/// Configuration for a [`StepRunner`](super::StepRunner).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Maximum depth of steps invoked from within steps.
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: u32,
    /// Limits applied to resource reads.
    #[serde(default)]
    pub resources: ResourceConfig,
    /// Whether to log each step's output value at debug level.
    #[serde(default)]
    pub log_step_output: bool,
}

fn default_max_nesting_depth() -> u32 {
    DEFAULT_MAX_DEPTH
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: default_max_nesting_depth(),
            resources: ResourceConfig::default(),
            log_step_output: false,
        }
    }
}

impl RunnerConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum nesting depth.
    #[must_use]
    pub fn with_max_nesting_depth(mut self, depth: u32) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Sets the resource limits.
    #[must_use]
    pub fn with_resources(mut self, resources: ResourceConfig) -> Self {
        self.resources = resources;
        self
    }

    /// Enables debug logging of step outputs.
    #[must_use]
    pub fn with_log_step_output(mut self, enabled: bool) -> Self {
        self.log_step_output = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: RunnerConfig =
            serde_json::from_value(serde_json::json!({"resources": {"max_bytes": 64}})).unwrap();

        assert_eq!(config.max_nesting_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.resources.max_bytes, 64);
        assert!(!config.log_step_output);
    }
}
