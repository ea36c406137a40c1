//! Validation error accumulation.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Field-keyed validation errors.
///
/// Collects every offending field before failing, so a client error can
/// enumerate all problems in one response rather than the first one hit.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field.
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Whether any error was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether a specific field has errors.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Fold another accumulator's messages into this one.
    pub fn merge(&mut self, other: Self) {
        for (field, mut messages) in other.0 {
            self.0.entry(field).or_default().append(&mut messages);
        }
    }

    /// Convert into `Err(self)` if any error was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field has a message.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// A single validation error for one field.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}
