//! Query-parameter filtering and ordering.
//!
//! Each collection recognizes a fixed set of filter keys. All present
//! filters combine with logical AND; unrecognized keys are ignored for
//! compatibility with existing clients. A recognized key whose value fails
//! to parse is a validation error, never a silent skip.
//!
//! Ordering is requested with `ordering=<field>`; a leading `-` reverses
//! the direction. An unrecognized ordering field is ignored and the
//! store-default order (id ascending) applies. Ties are always broken by
//! id ascending, so a given dataset yields a deterministic order.

use chrono::{DateTime, Utc};

use crate::error::ValidationErrors;
use crate::ids::{UsageTypeId, UserId};
use crate::time::parse_datetime;

/// A resolved ordering: field plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordering<F> {
    /// The field to sort by.
    pub field: F,
    /// Sort descending instead of ascending.
    pub descending: bool,
}

/// Orderable fields of the usage collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageOrderField {
    /// Sort by owning user id.
    User,
    /// Sort by usage type id.
    UsageType,
    /// Sort by occurrence time.
    UsageAt,
    /// Sort by amount.
    Amount,
    /// Sort by row id.
    Id,
}

impl UsageOrderField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "user" => Some(Self::User),
            "usage_type" => Some(Self::UsageType),
            "usage_at" => Some(Self::UsageAt),
            "amount" => Some(Self::Amount),
            "id" => Some(Self::Id),
            _ => None,
        }
    }
}

/// Orderable fields of the usage type collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageTypeOrderField {
    /// Sort by row id.
    Id,
    /// Sort by name.
    Name,
    /// Sort by unit.
    Unit,
    /// Sort by factor.
    Factor,
}

impl UsageTypeOrderField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "unit" => Some(Self::Unit),
            "factor" => Some(Self::Factor),
            _ => None,
        }
    }
}

/// Filter and ordering constraints for the usage collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageFilter {
    /// Owning user equals this id.
    pub user: Option<UserId>,
    /// Usage type equals this id.
    pub usage_type: Option<UsageTypeId>,
    /// Amount is at least this value.
    pub min_amount: Option<f64>,
    /// Amount is at most this value.
    pub max_amount: Option<f64>,
    /// Occurrence time is at or after this instant.
    pub min_usage_at: Option<DateTime<Utc>>,
    /// Occurrence time is at or before this instant.
    pub max_usage_at: Option<DateTime<Utc>>,
    /// Requested ordering, if any.
    pub ordering: Option<Ordering<UsageOrderField>>,
}

impl UsageFilter {
    /// Parse filter constraints from decoded query pairs.
    ///
    /// A repeated key keeps its last value. Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns per-field messages for values that fail to parse.
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, ValidationErrors> {
        let mut filter = Self::default();
        let mut errors = ValidationErrors::new();

        for (key, value) in pairs {
            match key.as_str() {
                "user" => match value.parse() {
                    Ok(id) => filter.user = Some(id),
                    Err(_) => errors.push("user", "a valid integer is required"),
                },
                "usage_type" => match value.parse() {
                    Ok(id) => filter.usage_type = Some(id),
                    Err(_) => errors.push("usage_type", "a valid integer is required"),
                },
                "min_amount" => match parse_number(value) {
                    Some(n) => filter.min_amount = Some(n),
                    None => errors.push("min_amount", "a valid number is required"),
                },
                "max_amount" => match parse_number(value) {
                    Some(n) => filter.max_amount = Some(n),
                    None => errors.push("max_amount", "a valid number is required"),
                },
                "min_usage_at" => match parse_datetime(value) {
                    Some(dt) => filter.min_usage_at = Some(dt),
                    None => errors.push("min_usage_at", "a valid datetime is required"),
                },
                "max_usage_at" => match parse_datetime(value) {
                    Some(dt) => filter.max_usage_at = Some(dt),
                    None => errors.push("max_usage_at", "a valid datetime is required"),
                },
                "ordering" => filter.ordering = parse_ordering(value, UsageOrderField::parse),
                _ => {}
            }
        }

        errors.into_result()?;
        Ok(filter)
    }
}

/// Filter and ordering constraints for the usage type collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageTypeFilter {
    /// Name equals this string.
    pub name: Option<String>,
    /// Unit equals this string.
    pub unit: Option<String>,
    /// Factor is at least this value.
    pub min_factor: Option<f64>,
    /// Factor is at most this value.
    pub max_factor: Option<f64>,
    /// Requested ordering, if any.
    pub ordering: Option<Ordering<UsageTypeOrderField>>,
}

impl UsageTypeFilter {
    /// Parse filter constraints from decoded query pairs.
    ///
    /// A repeated key keeps its last value. Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns per-field messages for values that fail to parse.
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, ValidationErrors> {
        let mut filter = Self::default();
        let mut errors = ValidationErrors::new();

        for (key, value) in pairs {
            match key.as_str() {
                "name" => filter.name = Some(value.clone()),
                "unit" => filter.unit = Some(value.clone()),
                "min_factor" => match parse_number(value) {
                    Some(n) => filter.min_factor = Some(n),
                    None => errors.push("min_factor", "a valid number is required"),
                },
                "max_factor" => match parse_number(value) {
                    Some(n) => filter.max_factor = Some(n),
                    None => errors.push("max_factor", "a valid number is required"),
                },
                "ordering" => filter.ordering = parse_ordering(value, UsageTypeOrderField::parse),
                _ => {}
            }
        }

        errors.into_result()?;
        Ok(filter)
    }
}

fn parse_ordering<F>(value: &str, parse_field: impl Fn(&str) -> Option<F>) -> Option<Ordering<F>> {
    let (name, descending) = match value.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (value, false),
    };
    parse_field(name).map(|field| Ordering { field, descending })
}

fn parse_number(value: &str) -> Option<f64> {
    let n: f64 = value.trim().parse().ok()?;
    n.is_finite().then_some(n)
}
