//! Error types for carbon-usage storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The entity kind ("usage", "usage type", "user").
        entity: &'static str,
        /// The id that was not found.
        id: i64,
    },

    /// A referenced row does not exist (foreign key violation).
    #[error("foreign key violation: user or usage_type references a missing row")]
    ForeignKey,

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Stored value could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Migration failed.
    #[error("migration error: {0}")]
    Migration(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.kind() == sqlx::error::ErrorKind::ForeignKeyViolation {
                return Self::ForeignKey;
            }
        }
        Self::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Migration(err.to_string())
    }
}
