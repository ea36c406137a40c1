//! Core types for the carbon-usage service.
//!
//! This crate provides the foundational types shared by the store and the
//! HTTP service:
//!
//! - **Identifiers**: `UserId`, `UsageId`, `UsageTypeId`
//! - **Entities**: `Usage`, `UsageType` and their create/patch inputs
//! - **Filtering**: `UsageFilter`, `UsageTypeFilter`, ordering fields
//! - **Validation**: `ValidationErrors` (field-keyed error accumulator)
//! - **Time**: lenient datetime parsing and the canonical render formats

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod filter;
pub mod ids;
pub mod time;
pub mod usage;
pub mod usage_type;

pub use error::ValidationErrors;
pub use filter::{
    Ordering, UsageFilter, UsageOrderField, UsageTypeFilter, UsageTypeOrderField,
};
pub use ids::{IdError, UsageId, UsageTypeId, UserId};
pub use usage::{NewUsage, Usage, UsagePatch};
pub use usage_type::{NewUsageType, UsageType, UsageTypePatch, NAME_MAX_LEN, UNIT_MAX_LEN};
