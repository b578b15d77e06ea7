//! Library configuration handed to a step.

use serde::{Deserialize, Serialize};

/// The configuration a library declares for one of its steps.
///
/// Keys keep the order in which they were inserted, so a step sees its
/// configuration in the order the pipeline author wrote it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LibraryConfig {
    entries: serde_json::Map<String, serde_json::Value>,
}

impl LibraryConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration from a JSON object.
    ///
    /// Returns `None` if `value` is not an object.
    #[must_use]
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Object(entries) => Some(Self { entries }),
            _ => None,
        }
    }

    /// Adds an entry.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts an entry, returning the previous value for the key.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Option<serde_json::Value> {
        self.entries.insert(key.into(), value)
    }

    /// Gets a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.entries.get(key)
    }

    /// Gets a string value.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(serde_json::Value::as_str)
    }

    /// Checks if a key exists.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.entries.iter()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the configuration is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the configuration as a JSON object.
    #[must_use]
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::Value::Object(self.entries.clone())
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for LibraryConfig {
    fn from(entries: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { entries }
    }
}

impl FromIterator<(String, serde_json::Value)> for LibraryConfig {
    fn from_iter<T: IntoIterator<Item = (String, serde_json::Value)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insertion_order_preserved() {
        let config = LibraryConfig::new()
            .with("zeta", serde_json::json!(1))
            .with("alpha", serde_json::json!(2))
            .with("mid", serde_json::json!(3));

        let keys: Vec<_> = config.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_from_value() {
        let config =
            LibraryConfig::from_value(serde_json::json!({"image": "maven:3", "retries": 2}))
                .unwrap();

        assert_eq!(config.get_str("image"), Some("maven:3"));
        assert_eq!(config.get("retries"), Some(&serde_json::json!(2)));
        assert!(LibraryConfig::from_value(serde_json::json!([1, 2])).is_none());
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let config = LibraryConfig::new().with("b", serde_json::json!(true));
        let json = serde_json::to_string(&config).unwrap();

        assert_eq!(json, r#"{"b":true}"#);
    }

    #[test]
    fn test_insert_replaces() {
        let mut config = LibraryConfig::new();
        assert!(config.insert("k", serde_json::json!(1)).is_none());
        assert_eq!(config.insert("k", serde_json::json!(2)), Some(serde_json::json!(1)));
        assert_eq!(config.len(), 1);
    }
}
