//! SQLite-backed store implementation.
//!
//! Filters are translated into `WHERE` clauses and ordering into `ORDER BY`
//! clauses, so constraints always apply before `LIMIT`/`OFFSET`. Each
//! mutation is a single statement (or a single transaction for patches),
//! with foreign-key enforcement and cascade deletes left to the database.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};

use carbon_usage_core::{
    time, NewUsage, NewUsageType, Ordering, Usage, UsageFilter, UsageId, UsageOrderField,
    UsagePatch, UsageType, UsageTypeFilter, UsageTypeId, UsageTypePatch, UserId,
};

use crate::error::{Result, StoreError};
use crate::Store;

const USAGE_COLUMNS: &str = "id, user_id, usage_type_id, usage_at, amount, created_at, updated_at";
const USAGE_TYPE_COLUMNS: &str = "id, name, unit, factor, created_at, updated_at";

/// SQLite store over a connection pool.
#[derive(Clone)]
pub struct SqlStore {
    pool: SqlitePool,
}

impl SqlStore {
    /// Open (and create if missing) the database at the given URL, e.g.
    /// `sqlite:carbon_usage.db`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the database cannot be
    /// opened.
    pub async fn open(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Open an in-memory database (used by tests).
    ///
    /// The pool is pinned to a single connection that never expires, since
    /// an in-memory database lives and dies with its connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Run pending schema migrations, including the usage type seed.
    ///
    /// Idempotent: applied versions are tracked in sqlx's migrations table.
    ///
    /// # Errors
    ///
    /// Returns an error if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }
}

#[async_trait]
impl Store for SqlStore {
    async fn ensure_user(&self, id: UserId) -> Result<()> {
        sqlx::query("INSERT INTO users (id, created_at) VALUES (?, ?) ON CONFLICT (id) DO NOTHING")
            .bind(id.as_i64())
            .bind(time::format_store(Utc::now()))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_user(&self, id: UserId) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "user",
                id: id.as_i64(),
            });
        }
        Ok(())
    }

    async fn create_usage_type(&self, fields: &NewUsageType) -> Result<UsageType> {
        let now = time::format_store(Utc::now());
        let row = sqlx::query(
            "INSERT INTO usage_types (name, unit, factor, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?) \
             RETURNING id, name, unit, factor, created_at, updated_at",
        )
        .bind(&fields.name)
        .bind(&fields.unit)
        .bind(fields.factor)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;

        usage_type_from_row(&row)
    }

    async fn get_usage_type(&self, id: UsageTypeId) -> Result<Option<UsageType>> {
        let row = sqlx::query(&format!(
            "SELECT {USAGE_TYPE_COLUMNS} FROM usage_types WHERE id = ?"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(usage_type_from_row).transpose()
    }

    async fn list_usage_types(
        &self,
        filter: &UsageTypeFilter,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<UsageType>> {
        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {USAGE_TYPE_COLUMNS} FROM usage_types WHERE 1 = 1"
        ));
        push_usage_type_filter(&mut query, filter);
        query.push(usage_type_order_by(filter.ordering));
        query
            .push(" LIMIT ")
            .push_bind(i64::from(limit))
            .push(" OFFSET ")
            .push_bind(i64::from(offset));

        let rows = query.build().fetch_all(&self.pool).await?;
        rows.iter().map(usage_type_from_row).collect()
    }

    async fn count_usage_types(&self, filter: &UsageTypeFilter) -> Result<i64> {
        let mut query =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM usage_types WHERE 1 = 1");
        push_usage_type_filter(&mut query, filter);

        let row = query.build().fetch_one(&self.pool).await?;
        Ok(row.try_get(0)?)
    }

    async fn update_usage_type(
        &self,
        id: UsageTypeId,
        fields: &NewUsageType,
    ) -> Result<UsageType> {
        let row = sqlx::query(
            "UPDATE usage_types SET name = ?, unit = ?, factor = ?, updated_at = ? \
             WHERE id = ? \
             RETURNING id, name, unit, factor, created_at, updated_at",
        )
        .bind(&fields.name)
        .bind(&fields.unit)
        .bind(fields.factor)
        .bind(time::format_store(Utc::now()))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => usage_type_from_row(&row),
            None => Err(StoreError::NotFound {
                entity: "usage type",
                id: id.as_i64(),
            }),
        }
    }

    async fn patch_usage_type(
        &self,
        id: UsageTypeId,
        patch: &UsageTypePatch,
    ) -> Result<UsageType> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {USAGE_TYPE_COLUMNS} FROM usage_types WHERE id = ?"
        ))
        .bind(id.as_i64())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(StoreError::NotFound {
                entity: "usage type",
                id: id.as_i64(),
            });
        };
        let current = usage_type_from_row(&row)?;

        let name = patch.name.clone().unwrap_or(current.name);
        let unit = patch.unit.clone().unwrap_or(current.unit);
        let factor = patch.factor.unwrap_or(current.factor);

        let row = sqlx::query(
            "UPDATE usage_types SET name = ?, unit = ?, factor = ?, updated_at = ? \
             WHERE id = ? \
             RETURNING id, name, unit, factor, created_at, updated_at",
        )
        .bind(&name)
        .bind(&unit)
        .bind(factor)
        .bind(time::format_store(Utc::now()))
        .bind(id.as_i64())
        .fetch_one(&mut *tx)
        .await?;

        let updated = usage_type_from_row(&row)?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_usage_type(&self, id: UsageTypeId) -> Result<()> {
        let result = sqlx::query("DELETE FROM usage_types WHERE id = ?")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "usage type",
                id: id.as_i64(),
            });
        }
        Ok(())
    }

    async fn create_usage(&self, fields: &NewUsage) -> Result<Usage> {
        let now = time::format_store(Utc::now());
        let row = sqlx::query(
            "INSERT INTO usages (user_id, usage_type_id, usage_at, amount, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             RETURNING id, user_id, usage_type_id, usage_at, amount, created_at, updated_at",
        )
        .bind(fields.user.as_i64())
        .bind(fields.usage_type.as_i64())
        .bind(time::format_store(fields.usage_at))
        .bind(fields.amount)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;

        usage_from_row(&row)
    }

    async fn get_usage(&self, id: UsageId) -> Result<Option<Usage>> {
        let row = sqlx::query(&format!("SELECT {USAGE_COLUMNS} FROM usages WHERE id = ?"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(usage_from_row).transpose()
    }

    async fn list_usages(
        &self,
        filter: &UsageFilter,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Usage>> {
        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {USAGE_COLUMNS} FROM usages WHERE 1 = 1"
        ));
        push_usage_filter(&mut query, filter);
        query.push(usage_order_by(filter.ordering));
        query
            .push(" LIMIT ")
            .push_bind(i64::from(limit))
            .push(" OFFSET ")
            .push_bind(i64::from(offset));

        let rows = query.build().fetch_all(&self.pool).await?;
        rows.iter().map(usage_from_row).collect()
    }

    async fn count_usages(&self, filter: &UsageFilter) -> Result<i64> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM usages WHERE 1 = 1");
        push_usage_filter(&mut query, filter);

        let row = query.build().fetch_one(&self.pool).await?;
        Ok(row.try_get(0)?)
    }

    async fn update_usage(&self, id: UsageId, fields: &NewUsage) -> Result<Usage> {
        let row = sqlx::query(
            "UPDATE usages SET user_id = ?, usage_type_id = ?, usage_at = ?, amount = ?, updated_at = ? \
             WHERE id = ? \
             RETURNING id, user_id, usage_type_id, usage_at, amount, created_at, updated_at",
        )
        .bind(fields.user.as_i64())
        .bind(fields.usage_type.as_i64())
        .bind(time::format_store(fields.usage_at))
        .bind(fields.amount)
        .bind(time::format_store(Utc::now()))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => usage_from_row(&row),
            None => Err(StoreError::NotFound {
                entity: "usage",
                id: id.as_i64(),
            }),
        }
    }

    async fn patch_usage(&self, id: UsageId, patch: &UsagePatch) -> Result<Usage> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!("SELECT {USAGE_COLUMNS} FROM usages WHERE id = ?"))
            .bind(id.as_i64())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            return Err(StoreError::NotFound {
                entity: "usage",
                id: id.as_i64(),
            });
        };
        let current = usage_from_row(&row)?;

        let user = patch.user.unwrap_or(current.user);
        let usage_type = patch.usage_type.unwrap_or(current.usage_type);
        let usage_at = patch.usage_at.unwrap_or(current.usage_at);
        let amount = patch.amount.unwrap_or(current.amount);

        let row = sqlx::query(
            "UPDATE usages SET user_id = ?, usage_type_id = ?, usage_at = ?, amount = ?, updated_at = ? \
             WHERE id = ? \
             RETURNING id, user_id, usage_type_id, usage_at, amount, created_at, updated_at",
        )
        .bind(user.as_i64())
        .bind(usage_type.as_i64())
        .bind(time::format_store(usage_at))
        .bind(amount)
        .bind(time::format_store(Utc::now()))
        .bind(id.as_i64())
        .fetch_one(&mut *tx)
        .await?;

        let updated = usage_from_row(&row)?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_usage(&self, id: UsageId) -> Result<()> {
        let result = sqlx::query("DELETE FROM usages WHERE id = ?")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "usage",
                id: id.as_i64(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Filter / ordering translation
// ============================================================================

fn push_usage_filter(query: &mut QueryBuilder<'_, Sqlite>, filter: &UsageFilter) {
    if let Some(user) = filter.user {
        query.push(" AND user_id = ").push_bind(user.as_i64());
    }
    if let Some(usage_type) = filter.usage_type {
        query
            .push(" AND usage_type_id = ")
            .push_bind(usage_type.as_i64());
    }
    if let Some(min) = filter.min_amount {
        query.push(" AND amount >= ").push_bind(min);
    }
    if let Some(max) = filter.max_amount {
        query.push(" AND amount <= ").push_bind(max);
    }
    if let Some(min) = filter.min_usage_at {
        query
            .push(" AND usage_at >= ")
            .push_bind(time::format_store(min));
    }
    if let Some(max) = filter.max_usage_at {
        query
            .push(" AND usage_at <= ")
            .push_bind(time::format_store(max));
    }
}

fn push_usage_type_filter(query: &mut QueryBuilder<'_, Sqlite>, filter: &UsageTypeFilter) {
    if let Some(name) = &filter.name {
        query.push(" AND name = ").push_bind(name.clone());
    }
    if let Some(unit) = &filter.unit {
        query.push(" AND unit = ").push_bind(unit.clone());
    }
    if let Some(min) = filter.min_factor {
        query.push(" AND factor >= ").push_bind(min);
    }
    if let Some(max) = filter.max_factor {
        query.push(" AND factor <= ").push_bind(max);
    }
}

fn usage_order_by(ordering: Option<Ordering<UsageOrderField>>) -> String {
    let Some(ordering) = ordering else {
        return " ORDER BY id ASC".to_string();
    };
    let direction = if ordering.descending { "DESC" } else { "ASC" };
    let column = match ordering.field {
        UsageOrderField::User => "user_id",
        UsageOrderField::UsageType => "usage_type_id",
        UsageOrderField::UsageAt => "usage_at",
        UsageOrderField::Amount => "amount",
        UsageOrderField::Id => return format!(" ORDER BY id {direction}"),
    };
    // Stable order: ties broken by id ascending.
    format!(" ORDER BY {column} {direction}, id ASC")
}

fn usage_type_order_by(
    ordering: Option<Ordering<carbon_usage_core::UsageTypeOrderField>>,
) -> String {
    use carbon_usage_core::UsageTypeOrderField as Field;

    let Some(ordering) = ordering else {
        return " ORDER BY id ASC".to_string();
    };
    let direction = if ordering.descending { "DESC" } else { "ASC" };
    let column = match ordering.field {
        Field::Name => "name",
        Field::Unit => "unit",
        Field::Factor => "factor",
        Field::Id => return format!(" ORDER BY id {direction}"),
    };
    format!(" ORDER BY {column} {direction}, id ASC")
}

// ============================================================================
// Row decoding
// ============================================================================

fn usage_type_from_row(row: &SqliteRow) -> Result<UsageType> {
    Ok(UsageType {
        id: UsageTypeId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        unit: row.try_get("unit")?,
        factor: row.try_get("factor")?,
        created_at: decode_timestamp(row, "created_at")?,
        updated_at: decode_timestamp(row, "updated_at")?,
    })
}

fn usage_from_row(row: &SqliteRow) -> Result<Usage> {
    Ok(Usage {
        id: UsageId::new(row.try_get("id")?),
        user: UserId::new(row.try_get("user_id")?),
        usage_type: UsageTypeId::new(row.try_get("usage_type_id")?),
        usage_at: decode_timestamp(row, "usage_at")?,
        amount: row.try_get("amount")?,
        created_at: decode_timestamp(row, "created_at")?,
        updated_at: decode_timestamp(row, "updated_at")?,
    })
}

fn decode_timestamp(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>> {
    let text: String = row.try_get(column)?;
    time::parse_store(&text)
        .ok_or_else(|| StoreError::Serialization(format!("bad timestamp in {column}: {text}")))
}
