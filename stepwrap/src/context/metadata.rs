//! Hook, stage and step metadata visible to a step script.
//!
//! The host builds these values; this crate only carries them. Every field
//! has a neutral default so a script can always read them.

use serde::{Deserialize, Serialize};

/// Describes the lifecycle hook that triggered a step, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookContext {
    /// Library of the step whose execution fired the hook.
    #[serde(default)]
    pub library: Option<String>,
    /// Name of the step whose execution fired the hook.
    #[serde(default)]
    pub step: Option<String>,
    /// Whether the triggering step threw.
    #[serde(default)]
    pub exception_thrown: bool,
}

impl HookContext {
    /// Creates an empty hook context (step was not triggered by a hook).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the triggering library.
    #[must_use]
    pub fn with_library(mut self, library: impl Into<String>) -> Self {
        self.library = Some(library.into());
        self
    }

    /// Sets the triggering step.
    #[must_use]
    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.step = Some(step.into());
        self
    }

    /// Records whether the triggering step threw.
    #[must_use]
    pub fn with_exception_thrown(mut self, thrown: bool) -> Self {
        self.exception_thrown = thrown;
        self
    }

    /// Returns true if the step was triggered by a hook.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.step.is_some()
    }
}

/// Describes the pipeline stage enclosing a step, if any.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageContext {
    /// Stage name.
    #[serde(default)]
    pub name: Option<String>,
    /// Arguments passed to the stage, in declaration order.
    #[serde(default)]
    pub args: serde_json::Map<String, serde_json::Value>,
}

impl StageContext {
    /// Creates an empty stage context (step runs outside a stage).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stage context for a named stage.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            args: serde_json::Map::new(),
        }
    }

    /// Adds a stage argument.
    #[must_use]
    pub fn with_arg(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.args.insert(key.into(), value);
        self
    }

    /// Gets a stage argument.
    #[must_use]
    pub fn arg(&self, key: &str) -> Option<&serde_json::Value> {
        self.args.get(key)
    }
}

/// Describes the step's own identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepContext {
    /// Library contributing the step.
    #[serde(default)]
    pub library: Option<String>,
    /// Name the step was invoked by.
    #[serde(default)]
    pub name: Option<String>,
    /// Whether `name` is an alias of the step's declared name.
    #[serde(default)]
    pub is_alias: bool,
}

impl StepContext {
    /// Creates an empty step context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a step context for a library step.
    #[must_use]
    pub fn for_step(library: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            library: Some(library.into()),
            name: Some(name.into()),
            is_alias: false,
        }
    }

    /// Marks the step as invoked through an alias.
    #[must_use]
    pub fn aliased(mut self) -> Self {
        self.is_alias = true;
        self
    }

    /// Returns a `library.step` label for logs, or `"<anonymous>"`.
    #[must_use]
    pub fn label(&self) -> String {
        match (&self.library, &self.name) {
            (Some(library), Some(name)) => format!("{library}.{name}"),
            (None, Some(name)) => name.clone(),
            _ => "<anonymous>".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hook_context_camel_case() {
        let hook = HookContext::new()
            .with_library("git")
            .with_step("checkout")
            .with_exception_thrown(true);

        let json = serde_json::to_value(&hook).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"library": "git", "step": "checkout", "exceptionThrown": true})
        );
        assert!(hook.is_triggered());
    }

    #[test]
    fn test_stage_context_args_ordered() {
        let stage = StageContext::named("ci")
            .with_arg("z", serde_json::json!(1))
            .with_arg("a", serde_json::json!(2));

        let keys: Vec<_> = stage.args.keys().cloned().collect();
        assert_eq!(keys, vec!["z".to_string(), "a".to_string()]);
        assert_eq!(stage.arg("a"), Some(&serde_json::json!(2)));
    }

    #[test]
    fn test_step_context_label() {
        assert_eq!(StepContext::for_step("maven", "build").label(), "maven.build");
        assert_eq!(StepContext::new().label(), "<anonymous>");
    }

    #[test]
    fn test_defaults_deserialize_from_empty_object() {
        let step: StepContext = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(step, StepContext::default());

        let hook: HookContext = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(!hook.exception_thrown);
    }
}
