//! Usage type handlers.

use std::sync::Arc;

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use carbon_usage_core::{
    NewUsageType, UsageType, UsageTypeFilter, UsageTypeId, UsageTypePatch, ValidationErrors,
};
use carbon_usage_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::pagination::{self, Page};
use crate::state::AppState;

/// Serialized usage type.
#[derive(Debug, Serialize)]
pub struct UsageTypeResponse {
    /// Identifier.
    pub id: UsageTypeId,
    /// Resource name.
    pub name: String,
    /// Measurement unit.
    pub unit: String,
    /// Conversion factor.
    pub factor: f64,
}

impl From<&UsageType> for UsageTypeResponse {
    fn from(usage_type: &UsageType) -> Self {
        Self {
            id: usage_type.id,
            name: usage_type.name.clone(),
            unit: usage_type.unit.clone(),
            factor: usage_type.factor,
        }
    }
}

/// Writable usage type fields as supplied by the client.
#[derive(Debug)]
pub struct UsageTypeDraft {
    name: Option<String>,
    unit: Option<String>,
    factor: Option<f64>,
}

impl UsageTypeDraft {
    /// Decode the body, recording a field error per wrongly-typed value.
    fn from_body(body: serde_json::Value) -> Result<(Self, ValidationErrors), ApiError> {
        let mut map = super::object(body)?;
        let mut errors = ValidationErrors::new();
        let draft = Self {
            name: super::field(&mut map, "name", "a valid string is required", &mut errors),
            unit: super::field(&mut map, "unit", "a valid string is required", &mut errors),
            factor: super::field(&mut map, "factor", "a valid number is required", &mut errors),
        };
        Ok((draft, errors))
    }

    /// Require every writable field (create and full update).
    fn into_new(self, mut errors: ValidationErrors) -> Result<NewUsageType, ValidationErrors> {
        if self.name.is_none() && !errors.contains("name") {
            errors.push("name", "this field is required");
        }
        if self.unit.is_none() && !errors.contains("unit") {
            errors.push("unit", "this field is required");
        }
        if self.factor.is_none() && !errors.contains("factor") {
            errors.push("factor", "this field is required");
        }
        errors.into_result()?;

        let fields = NewUsageType {
            name: self.name.unwrap_or_default(),
            unit: self.unit.unwrap_or_default(),
            factor: self.factor.unwrap_or_default(),
        };
        fields.validate()?;
        Ok(fields)
    }

    /// Keep only the supplied fields (partial update).
    fn into_patch(self, mut errors: ValidationErrors) -> Result<UsageTypePatch, ValidationErrors> {
        let patch = UsageTypePatch {
            name: self.name,
            unit: self.unit,
            factor: self.factor,
        };
        if let Err(more) = patch.validate() {
            errors.merge(more);
        }
        errors.into_result()?;
        Ok(patch)
    }
}

/// List usage types, filtered and ordered per query parameters.
pub async fn list(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    OriginalUri(uri): OriginalUri,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Page<UsageTypeResponse>>, ApiError> {
    let filter = UsageTypeFilter::from_pairs(&pairs)?;
    let page = pagination::page_number(&pairs)?;
    let page_size = state.config.page_size;

    let count = state.store.count_usage_types(&filter).await?;
    let offset = (page - 1).saturating_mul(page_size);
    let results = state.store.list_usage_types(&filter, page_size, offset).await?;

    if page > 1 && results.is_empty() {
        return Err(ApiError::NotFound("invalid page".into()));
    }

    let results = results.iter().map(UsageTypeResponse::from).collect();
    Ok(Json(pagination::envelope(&uri, page, page_size, count, results)))
}

/// Retrieve a single usage type.
pub async fn retrieve(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(id): Path<UsageTypeId>,
) -> Result<Json<UsageTypeResponse>, ApiError> {
    let usage_type = state
        .store
        .get_usage_type(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("usage type not found: {id}")))?;

    Ok(Json(UsageTypeResponse::from(&usage_type)))
}

/// Create a usage type.
pub async fn create(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<UsageTypeResponse>), ApiError> {
    let (draft, errors) = UsageTypeDraft::from_body(body)?;
    let fields = draft.into_new(errors)?;

    let created = state.store.create_usage_type(&fields).await?;

    tracing::info!(
        user_id = %auth.user_id,
        usage_type_id = %created.id,
        name = %created.name,
        "Usage type created"
    );

    Ok((StatusCode::CREATED, Json(UsageTypeResponse::from(&created))))
}

/// Replace every writable field of a usage type.
pub async fn update(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(id): Path<UsageTypeId>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<UsageTypeResponse>, ApiError> {
    let (draft, errors) = UsageTypeDraft::from_body(body)?;
    let fields = draft.into_new(errors)?;

    let updated = state.store.update_usage_type(id, &fields).await?;
    Ok(Json(UsageTypeResponse::from(&updated)))
}

/// Apply the supplied fields to a usage type; absent fields keep their
/// previous value.
pub async fn partial_update(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(id): Path<UsageTypeId>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<UsageTypeResponse>, ApiError> {
    let (draft, errors) = UsageTypeDraft::from_body(body)?;
    let patch = draft.into_patch(errors)?;

    let updated = state.store.patch_usage_type(id, &patch).await?;
    Ok(Json(UsageTypeResponse::from(&updated)))
}

/// Delete a usage type. Cascades to referencing usage rows.
pub async fn destroy(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<UsageTypeId>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_usage_type(id).await?;

    tracing::info!(user_id = %auth.user_id, usage_type_id = %id, "Usage type deleted");

    Ok(StatusCode::NO_CONTENT)
}
