//! Process-wide registry of reserved variable names.

use crate::errors::{DuplicateReservationError, RegistryError, ReservedVariableError};
use parking_lot::RwLock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

/// Names bound by the carrier, with what each one gives the step access to.
pub const DEFAULT_RESERVATIONS: [(&str, &str); 5] = [
    ("config", "their library configuration"),
    ("hookContext", "their hook context"),
    ("stageContext", "their stage context"),
    ("stepContext", "their step context"),
    ("resource", "library resources"),
];

#[allow(clippy::expect_used)]
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

/// A single reserved name and why it is reserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedName {
    /// The reserved identifier.
    pub name: String,
    /// Human-readable explanation shown when a script collides with it.
    pub reason: String,
}

impl ReservedName {
    /// Creates a new reserved name entry.
    #[must_use]
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Registry of names that step scripts may not bind.
///
/// Registration is append-only: an entry is never replaced or removed, so
/// concurrent readers only ever observe a growing set. Duplicate
/// registrations are rejected.
#[derive(Debug, Default)]
pub struct ReservedNameRegistry {
    entries: RwLock<HashMap<String, String>>,
}

impl ReservedNameRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the names bound by the step carrier.
    #[must_use]
    pub fn with_defaults() -> Self {
        let entries = DEFAULT_RESERVATIONS
            .iter()
            .map(|(name, access)| {
                (
                    (*name).to_string(),
                    format!("Variable name {name} is reserved for steps to access {access}"),
                )
            })
            .collect();

        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Reserves a name.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidName` if `name` is not an identifier and
    /// `RegistryError::Duplicate` if it is already reserved.
    pub fn register(
        &self,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if !IDENTIFIER.is_match(&name) {
            return Err(RegistryError::InvalidName { name });
        }

        let mut entries = self.entries.write();
        if let Some(existing) = entries.get(&name) {
            return Err(DuplicateReservationError::new(name, existing.clone()).into());
        }

        tracing::debug!(name = %name, "Reserved variable name registered");
        entries.insert(name, reason.into());
        Ok(())
    }

    /// Returns true if `name` is reserved.
    #[must_use]
    pub fn is_reserved(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    /// Returns the reason registered for `name`, if it is reserved.
    #[must_use]
    pub fn reason_for(&self, name: &str) -> Option<String> {
        self.entries.read().get(name).cloned()
    }

    /// Checks the top-level names a script is about to declare.
    ///
    /// # Errors
    ///
    /// Returns a `ReservedVariableError` for the first declared name that is
    /// reserved.
    pub fn check_bindings<I, S>(&self, names: I) -> Result<(), ReservedVariableError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = self.entries.read();
        for name in names {
            let name = name.as_ref();
            if let Some(reason) = entries.get(name) {
                tracing::warn!(name = %name, "Step script declares a reserved variable");
                return Err(ReservedVariableError::new(name, reason.clone()));
            }
        }
        Ok(())
    }

    /// Returns all entries, sorted by name.
    #[must_use]
    pub fn list(&self) -> Vec<ReservedName> {
        let mut result: Vec<_> = self
            .entries
            .read()
            .iter()
            .map(|(name, reason)| ReservedName::new(name, reason))
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        result
    }

    /// Returns the number of reserved names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is reserved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// Global reserved name registry, built with the default reservations.
pub static RESERVED_NAMES: LazyLock<Arc<ReservedNameRegistry>> =
    LazyLock::new(|| Arc::new(ReservedNameRegistry::with_defaults()));
