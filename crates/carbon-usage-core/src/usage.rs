//! Usage event entities.
//!
//! A usage is one recorded consumption event: an amount of some resource,
//! by a user, at a point in time, classified by a usage type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{UsageId, UsageTypeId, UserId};

/// A stored usage row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    /// Identifier, assigned by the store.
    pub id: UsageId,

    /// The user the consumption belongs to.
    pub user: UserId,

    /// The usage type classifying the consumption.
    pub usage_type: UsageTypeId,

    /// When the consumption occurred (client-supplied).
    pub usage_at: DateTime<Utc>,

    /// Consumed quantity, in the usage type's unit.
    pub amount: f64,

    /// When the row was created. Never changes.
    pub created_at: DateTime<Utc>,

    /// When the row was last mutated.
    pub updated_at: DateTime<Utc>,
}

/// Writable fields of a usage, validated.
///
/// Used for both create and full update. Referential integrity of `user`
/// and `usage_type` is enforced by the store at write time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUsage {
    /// Owning user.
    pub user: UserId,
    /// Referenced usage type.
    pub usage_type: UsageTypeId,
    /// When the consumption occurred.
    pub usage_at: DateTime<Utc>,
    /// Consumed quantity.
    pub amount: f64,
}

/// A partial update to a usage.
///
/// Each field is applied only when present; absent fields keep their
/// previous value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsagePatch {
    /// New owner, if supplied.
    pub user: Option<UserId>,
    /// New usage type, if supplied.
    pub usage_type: Option<UsageTypeId>,
    /// New occurrence time, if supplied.
    pub usage_at: Option<DateTime<Utc>>,
    /// New amount, if supplied.
    pub amount: Option<f64>,
}
