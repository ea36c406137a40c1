//! Identifier types for carbon-usage entities.
//!
//! All entities use integer primary keys assigned by the store (the seed
//! rows carry explicit ids). The `int_id_type!` macro reduces boilerplate
//! for the newtype wrappers, ensuring consistent serialization, parsing and
//! display behavior.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Macro to define an integer identifier type with standard trait
/// implementations.
///
/// The generated newtype wraps an `i64` and serializes as a plain JSON
/// number, matching the wire contract of the API.
macro_rules! int_id_type {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create an identifier from a raw integer.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Return the underlying integer.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let id = s.parse::<i64>().map_err(|_| IdError::InvalidInteger)?;
                Ok(Self(id))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

int_id_type!(UserId, "A user identifier.\n\nUser ids come from the `sub` claim of bearer tokens.");
int_id_type!(UsageId, "A usage event identifier, assigned by the store.");
int_id_type!(
    UsageTypeId,
    "A usage type identifier.\n\nSeed rows use ids 100-104; user-created rows continue from 105."
);

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input is not a valid integer.
    #[error("invalid integer identifier")]
    InvalidInteger,
}
