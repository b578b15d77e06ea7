//! Named bindings injected into a step script's namespace.

use crate::errors::ReservedVariableError;
use crate::reserved::{ReservedNameRegistry, DEFAULT_RESERVATIONS};
use crate::resources::ResourceResolver;

/// Binding name of the resource accessor.
pub const RESOURCE_BINDING: &str = DEFAULT_RESERVATIONS[4].0;

/// A value bound to a name in the script namespace.
#[derive(Debug, Clone)]
pub enum Binding {
    /// A plain JSON value.
    Value(serde_json::Value),
    /// The resource accessor.
    Resource(ResourceResolver),
}

impl Binding {
    /// Returns the JSON value, if this is a value binding.
    #[must_use]
    pub fn as_value(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Resource(_) => None,
        }
    }

    /// Returns the resolver, if this is the resource binding.
    #[must_use]
    pub fn as_resource(&self) -> Option<&ResourceResolver> {
        match self {
            Self::Resource(resolver) => Some(resolver),
            Self::Value(_) => None,
        }
    }
}

/// An ordered name -> binding namespace.
///
/// Platform bindings are added by the carrier. Script-declared names go
/// through [`declare`](Self::declare) or [`declare_all`](Self::declare_all),
/// which refuse reserved names and never replace a platform binding, even
/// when the registry does not list it.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    entries: Vec<(String, Binding)>,
    platform: Vec<String>,
}

impl Bindings {
    /// Creates an empty namespace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn bind_platform(&mut self, name: &str, binding: Binding) {
        if !self.is_platform(name) {
            self.platform.push(name.to_string());
        }
        self.upsert(name.to_string(), binding);
    }

    fn is_platform(&self, name: &str) -> bool {
        self.platform.iter().any(|bound| bound == name)
    }

    fn check_declared(
        &self,
        registry: &ReservedNameRegistry,
        name: &str,
    ) -> Result<(), ReservedVariableError> {
        registry.check_bindings([name])?;
        if self.is_platform(name) {
            tracing::warn!(name = %name, "Step script declares a platform binding");
            return Err(ReservedVariableError::new(
                name,
                format!("Variable name {name} is already bound for this step"),
            ));
        }
        Ok(())
    }

    /// Binds a script-declared name.
    ///
    /// # Errors
    ///
    /// Returns `ReservedVariableError` if `name` is reserved in `registry`.
    pub fn declare(
        &mut self,
        registry: &ReservedNameRegistry,
        name: impl Into<String>,
        value: serde_json::Value,
    ) -> Result<(), ReservedVariableError> {
        let name = name.into();
        self.check_declared(registry, &name)?;
        self.upsert(name, Binding::Value(value));
        Ok(())
    }

    /// Binds every script-declared name, or none of them.
    ///
    /// # Errors
    ///
    /// Returns `ReservedVariableError` for the first reserved name; the
    /// namespace is left unchanged.
    pub fn declare_all<I>(
        &mut self,
        registry: &ReservedNameRegistry,
        declared: I,
    ) -> Result<(), ReservedVariableError>
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        let declared: Vec<_> = declared.into_iter().collect();
        for (name, _) in &declared {
            self.check_declared(registry, name)?;
        }

        for (name, value) in declared {
            self.upsert(name, Binding::Value(value));
        }
        Ok(())
    }

    fn upsert(&mut self, name: String, binding: Binding) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = binding,
            None => self.entries.push((name, binding)),
        }
    }

    /// Gets a binding.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, binding)| binding)
    }

    /// Gets a value binding.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&serde_json::Value> {
        self.get(name).and_then(Binding::as_value)
    }

    /// Gets the resource accessor.
    #[must_use]
    pub fn resource(&self) -> Option<&ResourceResolver> {
        self.get(RESOURCE_BINDING).and_then(Binding::as_resource)
    }

    /// Returns the bound names in binding order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Returns true if `name` is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the value bindings as a JSON object, skipping the resource
    /// accessor.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .entries
            .iter()
            .filter_map(|(name, binding)| binding.as_value().map(|v| (name.clone(), v.clone())))
            .collect();
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_declare_free_name() {
        let registry = ReservedNameRegistry::with_defaults();
        let mut bindings = Bindings::new();

        bindings.declare(&registry, "retries", serde_json::json!(3)).unwrap();
        assert_eq!(bindings.value("retries"), Some(&serde_json::json!(3)));
    }

    #[test]
    fn test_declare_reserved_name() {
        let registry = ReservedNameRegistry::with_defaults();
        let mut bindings = Bindings::new();

        let err = bindings
            .declare(&registry, "stageContext", serde_json::json!({}))
            .unwrap_err();
        assert!(err.reason.contains("stage context"));
        assert!(bindings.is_empty());
    }

    #[test]
    fn test_declare_all_is_atomic() {
        let registry = ReservedNameRegistry::with_defaults();
        let mut bindings = Bindings::new();

        let result = bindings.declare_all(
            &registry,
            vec![
                ("a".to_string(), serde_json::json!(1)),
                ("resource".to_string(), serde_json::json!("shadow")),
            ],
        );

        assert!(result.is_err());
        assert!(bindings.is_empty());
    }

    #[test]
    fn test_platform_bindings_survive_empty_registry() {
        let registry = ReservedNameRegistry::new();
        let mut bindings = Bindings::new();
        bindings.bind_platform(RESOURCE_BINDING, Binding::Resource(ResourceResolver::new("/srv")));
        bindings.bind_platform("config", Binding::Value(serde_json::json!({"a": 1})));

        let err = bindings
            .declare(&registry, "resource", serde_json::json!("shadow"))
            .unwrap_err();
        assert_eq!(err.name, "resource");
        assert!(err.reason.contains("already bound"));
        assert!(bindings.resource().is_some());

        let result = bindings.declare_all(
            &registry,
            vec![
                ("helper".to_string(), serde_json::json!(1)),
                ("config".to_string(), serde_json::json!({})),
            ],
        );
        assert!(result.is_err());
        assert!(!bindings.contains("helper"));
        assert_eq!(bindings.value("config"), Some(&serde_json::json!({"a": 1})));
    }

    #[test]
    fn test_upsert_keeps_position() {
        let registry = ReservedNameRegistry::new();
        let mut bindings = Bindings::new();
        bindings.declare(&registry, "x", serde_json::json!(1)).unwrap();
        bindings.declare(&registry, "y", serde_json::json!(2)).unwrap();
        bindings.declare(&registry, "x", serde_json::json!(3)).unwrap();

        let names: Vec<_> = bindings.names().collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(bindings.to_json(), serde_json::json!({"x": 3, "y": 2}));
    }
}
