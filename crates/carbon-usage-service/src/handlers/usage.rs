//! Usage event handlers.

use std::sync::Arc;

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use carbon_usage_core::{
    time, NewUsage, Usage, UsageFilter, UsageId, UsagePatch, UsageTypeId, UserId, ValidationErrors,
};
use carbon_usage_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::pagination::{self, Page};
use crate::state::AppState;

/// Serialized usage event.
#[derive(Debug, Serialize)]
pub struct UsageResponse {
    /// Identifier.
    pub id: UsageId,
    /// Owning user.
    pub user: UserId,
    /// Referenced usage type.
    pub usage_type: UsageTypeId,
    /// When the consumption occurred, millisecond precision.
    pub usage_at: String,
    /// Consumed quantity.
    pub amount: f64,
}

impl From<&Usage> for UsageResponse {
    fn from(usage: &Usage) -> Self {
        Self {
            id: usage.id,
            user: usage.user,
            usage_type: usage.usage_type,
            usage_at: time::format_api(usage.usage_at),
            amount: usage.amount,
        }
    }
}

/// Writable usage fields as supplied by the client.
#[derive(Debug)]
pub struct UsageDraft {
    user: Option<UserId>,
    usage_type: Option<UsageTypeId>,
    usage_at: Option<String>,
    amount: Option<f64>,
}

impl UsageDraft {
    /// Decode the body, recording a field error per wrongly-typed value.
    fn from_body(body: serde_json::Value) -> Result<(Self, ValidationErrors), ApiError> {
        let mut map = super::object(body)?;
        let mut errors = ValidationErrors::new();
        let draft = Self {
            user: super::field(&mut map, "user", "a valid integer is required", &mut errors),
            usage_type: super::field(
                &mut map,
                "usage_type",
                "a valid integer is required",
                &mut errors,
            ),
            usage_at: super::field(&mut map, "usage_at", "datetime has wrong format", &mut errors),
            amount: super::field(&mut map, "amount", "a valid number is required", &mut errors),
        };
        Ok((draft, errors))
    }

    /// Require every writable field (create and full update).
    fn into_new(self, mut errors: ValidationErrors) -> Result<NewUsage, ValidationErrors> {
        if self.user.is_none() && !errors.contains("user") {
            errors.push("user", "this field is required");
        }
        if self.usage_type.is_none() && !errors.contains("usage_type") {
            errors.push("usage_type", "this field is required");
        }
        let usage_at = match self.usage_at.as_deref() {
            None => {
                if !errors.contains("usage_at") {
                    errors.push("usage_at", "this field is required");
                }
                None
            }
            Some(raw) => {
                let parsed = time::parse_datetime(raw);
                if parsed.is_none() {
                    errors.push("usage_at", "datetime has wrong format");
                }
                parsed
            }
        };
        if self.amount.is_none() && !errors.contains("amount") {
            errors.push("amount", "this field is required");
        }

        // The tuple is fully populated exactly when no error was recorded.
        if let (Some(user), Some(usage_type), Some(usage_at), Some(amount)) =
            (self.user, self.usage_type, usage_at, self.amount)
        {
            Ok(NewUsage {
                user,
                usage_type,
                usage_at,
                amount,
            })
        } else {
            Err(errors)
        }
    }

    /// Keep only the supplied fields (partial update).
    fn into_patch(self, mut errors: ValidationErrors) -> Result<UsagePatch, ValidationErrors> {
        let usage_at = match self.usage_at.as_deref() {
            None => None,
            Some(raw) => {
                let parsed = time::parse_datetime(raw);
                if parsed.is_none() {
                    errors.push("usage_at", "datetime has wrong format");
                }
                parsed
            }
        };
        errors.into_result()?;

        Ok(UsagePatch {
            user: self.user,
            usage_type: self.usage_type,
            usage_at,
            amount: self.amount,
        })
    }
}

/// List usage events, filtered and ordered per query parameters.
pub async fn list(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    OriginalUri(uri): OriginalUri,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Page<UsageResponse>>, ApiError> {
    let filter = UsageFilter::from_pairs(&pairs)?;
    let page = pagination::page_number(&pairs)?;
    let page_size = state.config.page_size;

    let count = state.store.count_usages(&filter).await?;
    let offset = (page - 1).saturating_mul(page_size);
    let results = state.store.list_usages(&filter, page_size, offset).await?;

    if page > 1 && results.is_empty() {
        return Err(ApiError::NotFound("invalid page".into()));
    }

    let results = results.iter().map(UsageResponse::from).collect();
    Ok(Json(pagination::envelope(&uri, page, page_size, count, results)))
}

/// Retrieve a single usage event.
pub async fn retrieve(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(id): Path<UsageId>,
) -> Result<Json<UsageResponse>, ApiError> {
    let usage = state
        .store
        .get_usage(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("usage not found: {id}")))?;

    Ok(Json(UsageResponse::from(&usage)))
}

/// Record a usage event.
pub async fn create(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<UsageResponse>), ApiError> {
    let (draft, errors) = UsageDraft::from_body(body)?;
    let fields = draft.into_new(errors)?;

    let created = state.store.create_usage(&fields).await?;

    tracing::info!(
        user_id = %auth.user_id,
        usage_id = %created.id,
        usage_type_id = %created.usage_type,
        amount = created.amount,
        "Usage recorded"
    );

    Ok((StatusCode::CREATED, Json(UsageResponse::from(&created))))
}

/// Replace every writable field of a usage event.
pub async fn update(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(id): Path<UsageId>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<UsageResponse>, ApiError> {
    let (draft, errors) = UsageDraft::from_body(body)?;
    let fields = draft.into_new(errors)?;

    let updated = state.store.update_usage(id, &fields).await?;
    Ok(Json(UsageResponse::from(&updated)))
}

/// Apply the supplied fields to a usage event; absent fields keep their
/// previous value.
pub async fn partial_update(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(id): Path<UsageId>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<UsageResponse>, ApiError> {
    let (draft, errors) = UsageDraft::from_body(body)?;
    let patch = draft.into_patch(errors)?;

    let updated = state.store.patch_usage(id, &patch).await?;
    Ok(Json(UsageResponse::from(&updated)))
}

/// Delete a usage event.
pub async fn destroy(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<UsageId>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_usage(id).await?;

    tracing::info!(user_id = %auth.user_id, usage_id = %id, "Usage deleted");

    Ok(StatusCode::NO_CONTENT)
}
