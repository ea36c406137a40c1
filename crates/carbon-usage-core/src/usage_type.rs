//! Usage type entities.
//!
//! A usage type maps a named resource ("electricity", "heating", ...) and a
//! measurement unit to a carbon-equivalent conversion factor. Names are not
//! unique: the same resource may be tracked in several units.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationErrors;
use crate::ids::UsageTypeId;

/// Maximum length of a usage type name.
pub const NAME_MAX_LEN: usize = 255;

/// Maximum length of a measurement unit.
pub const UNIT_MAX_LEN: usize = 15;

/// A stored usage type row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageType {
    /// Identifier (seed rows 100-104, auto-assigned from 105).
    pub id: UsageTypeId,

    /// Resource name, e.g. "electricity".
    pub name: String,

    /// Measurement unit, e.g. "kwh".
    pub unit: String,

    /// Carbon-equivalent conversion factor.
    pub factor: f64,

    /// When the row was created. Never changes.
    pub created_at: DateTime<Utc>,

    /// When the row was last mutated.
    pub updated_at: DateTime<Utc>,
}

/// Writable fields of a usage type, validated.
///
/// Used for both create and full update.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUsageType {
    /// Resource name.
    pub name: String,
    /// Measurement unit.
    pub unit: String,
    /// Conversion factor.
    pub factor: f64,
}

impl NewUsageType {
    /// Validate field constraints.
    ///
    /// # Errors
    ///
    /// Returns per-field messages for empty or over-long strings.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.name.is_empty() {
            errors.push("name", "must not be empty");
        }
        if self.name.len() > NAME_MAX_LEN {
            errors.push(
                "name",
                format!("must be at most {NAME_MAX_LEN} characters"),
            );
        }
        if self.unit.is_empty() {
            errors.push("unit", "must not be empty");
        }
        if self.unit.len() > UNIT_MAX_LEN {
            errors.push(
                "unit",
                format!("must be at most {UNIT_MAX_LEN} characters"),
            );
        }
        errors.into_result()
    }
}

/// A partial update to a usage type.
///
/// Each field is applied only when present; absent fields keep their
/// previous value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageTypePatch {
    /// New name, if supplied.
    pub name: Option<String>,
    /// New unit, if supplied.
    pub unit: Option<String>,
    /// New factor, if supplied.
    pub factor: Option<f64>,
}

impl UsageTypePatch {
    /// Validate the supplied fields.
    ///
    /// # Errors
    ///
    /// Returns per-field messages for empty or over-long strings.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            if name.is_empty() {
                errors.push("name", "must not be empty");
            }
            if name.len() > NAME_MAX_LEN {
                errors.push(
                    "name",
                    format!("must be at most {NAME_MAX_LEN} characters"),
                );
            }
        }
        if let Some(unit) = &self.unit {
            if unit.is_empty() {
                errors.push("unit", "must not be empty");
            }
            if unit.len() > UNIT_MAX_LEN {
                errors.push(
                    "unit",
                    format!("must be at most {UNIT_MAX_LEN} characters"),
                );
            }
        }
        errors.into_result()
    }
}
