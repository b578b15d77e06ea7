//! The ambient state a step script can observe.

use super::{HookContext, LibraryConfig, StageContext, StepContext};
use crate::reserved::DEFAULT_RESERVATIONS;
use serde::{Deserialize, Serialize};

/// Binding name of the library configuration.
pub const CONFIG_BINDING: &str = DEFAULT_RESERVATIONS[0].0;
/// Binding name of the hook context.
pub const HOOK_CONTEXT_BINDING: &str = DEFAULT_RESERVATIONS[1].0;
/// Binding name of the stage context.
pub const STAGE_CONTEXT_BINDING: &str = DEFAULT_RESERVATIONS[2].0;
/// Binding name of the step context.
pub const STEP_CONTEXT_BINDING: &str = DEFAULT_RESERVATIONS[3].0;

/// The four context values visible to a step script.
///
/// Every field starts out empty and is replaced by the host before the
/// script runs. Getters always return a value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContextBundle {
    #[serde(default)]
    config: LibraryConfig,
    #[serde(default)]
    hook_context: HookContext,
    #[serde(default)]
    stage_context: StageContext,
    #[serde(default)]
    step_context: StepContext,
}

impl ExecutionContextBundle {
    /// Creates an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the library configuration.
    #[must_use]
    pub fn with_config(mut self, config: LibraryConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the hook context.
    #[must_use]
    pub fn with_hook_context(mut self, hook_context: HookContext) -> Self {
        self.hook_context = hook_context;
        self
    }

    /// Sets the stage context.
    #[must_use]
    pub fn with_stage_context(mut self, stage_context: StageContext) -> Self {
        self.stage_context = stage_context;
        self
    }

    /// Sets the step context.
    #[must_use]
    pub fn with_step_context(mut self, step_context: StepContext) -> Self {
        self.step_context = step_context;
        self
    }

    /// Replaces the library configuration.
    pub fn set_config(&mut self, config: LibraryConfig) {
        self.config = config;
    }

    /// Returns the library configuration.
    #[must_use]
    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    /// Replaces the hook context.
    pub fn set_hook_context(&mut self, hook_context: HookContext) {
        self.hook_context = hook_context;
    }

    /// Returns the hook context.
    #[must_use]
    pub fn hook_context(&self) -> &HookContext {
        &self.hook_context
    }

    /// Replaces the stage context.
    pub fn set_stage_context(&mut self, stage_context: StageContext) {
        self.stage_context = stage_context;
    }

    /// Returns the stage context.
    #[must_use]
    pub fn stage_context(&self) -> &StageContext {
        &self.stage_context
    }

    /// Replaces the step context.
    pub fn set_step_context(&mut self, step_context: StepContext) {
        self.step_context = step_context;
    }

    /// Returns the step context.
    #[must_use]
    pub fn step_context(&self) -> &StepContext {
        &self.step_context
    }

    /// Renders the bundle as `(binding name, value)` pairs.
    #[must_use]
    pub fn to_bindings(&self) -> Vec<(&'static str, serde_json::Value)> {
        vec![
            (CONFIG_BINDING, self.config.to_value()),
            (HOOK_CONTEXT_BINDING, to_json(&self.hook_context)),
            (STAGE_CONTEXT_BINDING, to_json(&self.stage_context)),
            (STEP_CONTEXT_BINDING, to_json(&self.step_context)),
        ]
    }
}

// The context types are plain structs of strings, bools and JSON values, so
// serialization cannot fail.
fn to_json<T: Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or_else(|_| serde_json::json!({}))
}
