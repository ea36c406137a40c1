//! SQLite storage layer for the carbon-usage service.
//!
//! This crate provides durable keyed storage for usage types and usage
//! events, with referential integrity enforced by the database:
//!
//! - `users`: owners of usage rows, upserted when a bearer token is first
//!   seen; deleting a user cascades to its usages
//! - `usage_types`: unit-conversion definitions, seeded with five fixed
//!   rows (ids 100-104); deleting one cascades to referencing usages
//! - `usages`: recorded consumption events
//!
//! Filtering and ordering constraints from `carbon-usage-core` are
//! translated into SQL, so predicates apply before pagination.
//!
//! # Example
//!
//! ```no_run
//! use carbon_usage_core::{NewUsageType, UsageTypeFilter};
//! use carbon_usage_store::{SqlStore, Store};
//!
//! # async fn demo() -> Result<(), carbon_usage_store::StoreError> {
//! let store = SqlStore::open("sqlite:carbon_usage.db").await?;
//! store.migrate().await?;
//!
//! let created = store
//!     .create_usage_type(&NewUsageType {
//!         name: "electricity".into(),
//!         unit: "mwh".into(),
//!         factor: 1500.0,
//!     })
//!     .await?;
//!
//! let all = store
//!     .list_usage_types(&UsageTypeFilter::default(), 50, 0)
//!     .await?;
//! # let _ = (created, all);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod sql;

pub use error::{Result, StoreError};
pub use sql::SqlStore;

use async_trait::async_trait;

use carbon_usage_core::{
    NewUsage, NewUsageType, Usage, UsageFilter, UsageId, UsagePatch, UsageType, UsageTypeFilter,
    UsageTypeId, UsageTypePatch, UserId,
};

/// The storage trait defining all database operations.
///
/// Abstracts the storage layer so handlers depend on operations, not on a
/// concrete backend.
#[async_trait]
pub trait Store: Send + Sync {
    // =========================================================================
    // User Operations
    // =========================================================================

    /// Create the user row if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn ensure_user(&self, id: UserId) -> Result<()>;

    /// Delete a user. Cascades to the user's usage rows.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user doesn't exist.
    async fn delete_user(&self, id: UserId) -> Result<()>;

    // =========================================================================
    // Usage Type Operations
    // =========================================================================

    /// Insert a usage type, assigning its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn create_usage_type(&self, fields: &NewUsageType) -> Result<UsageType>;

    /// Get a usage type by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_usage_type(&self, id: UsageTypeId) -> Result<Option<UsageType>>;

    /// List usage types matching a filter, in the resolved order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_usage_types(
        &self,
        filter: &UsageTypeFilter,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<UsageType>>;

    /// Count usage types matching a filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn count_usage_types(&self, filter: &UsageTypeFilter) -> Result<i64>;

    /// Replace every writable field of a usage type. Refreshes `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the row doesn't exist.
    async fn update_usage_type(&self, id: UsageTypeId, fields: &NewUsageType)
        -> Result<UsageType>;

    /// Apply present fields of a patch to a usage type. Refreshes
    /// `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the row doesn't exist.
    async fn patch_usage_type(&self, id: UsageTypeId, patch: &UsageTypePatch)
        -> Result<UsageType>;

    /// Delete a usage type. Cascades to referencing usage rows.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the row doesn't exist.
    async fn delete_usage_type(&self, id: UsageTypeId) -> Result<()>;

    // =========================================================================
    // Usage Operations
    // =========================================================================

    /// Insert a usage event, assigning its id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ForeignKey` if `user` or `usage_type` does not
    /// reference an existing row.
    async fn create_usage(&self, fields: &NewUsage) -> Result<Usage>;

    /// Get a usage event by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_usage(&self, id: UsageId) -> Result<Option<Usage>>;

    /// List usage events matching a filter, in the resolved order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_usages(
        &self,
        filter: &UsageFilter,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Usage>>;

    /// Count usage events matching a filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn count_usages(&self, filter: &UsageFilter) -> Result<i64>;

    /// Replace every writable field of a usage event. Refreshes
    /// `updated_at`.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the row doesn't exist.
    /// - `StoreError::ForeignKey` if a reference is dangling.
    async fn update_usage(&self, id: UsageId, fields: &NewUsage) -> Result<Usage>;

    /// Apply present fields of a patch to a usage event. Refreshes
    /// `updated_at`.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the row doesn't exist.
    /// - `StoreError::ForeignKey` if a reference is dangling.
    async fn patch_usage(&self, id: UsageId, patch: &UsagePatch) -> Result<Usage>;

    /// Delete a usage event.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the row doesn't exist.
    async fn delete_usage(&self, id: UsageId) -> Result<()>;
}
