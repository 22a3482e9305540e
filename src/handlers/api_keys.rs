//! API key management endpoints.
//!
//! Routes (all under the session middleware):
//! - `GET  /api-keys/` — list with search/sort/pagination/export
//! - `GET/POST /api-keys/add/` — creation form payload / create
//! - `GET/POST /api-keys/{id}/edit/` — edit form payload / edit
//! - `POST /api-keys/{id}/delete/` — soft delete
//! - `POST /api-keys/{id}/toggle/` — flip the active flag
//! - `POST /api-keys/bulk/` — bulk activate/deactivate/delete

use axum::{
    Extension, Form, Json,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::error::AppError;
use crate::export::{ExportFormat, export_response};
use crate::handlers::{BulkForm, is_partial_refresh, refreshed_list};
use crate::middleware::session::SessionContext;
use crate::models::{ApiKey, ApiKeyForm};
use crate::registry::{ListParams, Page};
use crate::routes::AppState;

/// List API keys for the caller's tenant.
///
/// `export=csv`/`export=excel` bypasses pagination and streams the whole
/// filtered set. The `HX-Target: datatable-body` header returns only the
/// row array for in-place table refreshes; otherwise the full page
/// envelope is returned.
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if let Some(format) = params.export.as_deref().and_then(ExportFormat::parse) {
        let rows = state.api_keys.export_rows(session.hub_id, &params).await?;
        return Ok(export_response(&rows, format));
    }

    let page = state.api_keys.list(session.hub_id, &params).await?;

    if is_partial_refresh(&headers) {
        return Ok(Json(page.items).into_response());
    }
    Ok(Json(page).into_response())
}

/// Blank form payload for the creation panel.
pub async fn add_form() -> Json<ApiKeyForm> {
    Json(ApiKeyForm::default())
}

/// Create an API key; responds with the refreshed first-page list.
pub async fn add(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Form(form): Form<ApiKeyForm>,
) -> Result<Json<Page<ApiKey>>, AppError> {
    let draft = form.into_draft()?;
    state.api_keys.create(session.hub_id, draft).await?;
    refreshed_list(&state.api_keys, session.hub_id).await
}

/// Current record for the edit panel. 404 unless the id resolves to a
/// live record owned by the caller's tenant.
pub async fn edit_form(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiKey>, AppError> {
    Ok(Json(state.api_keys.get(session.hub_id, id).await?))
}

/// Overwrite every editable field of an API key.
pub async fn edit(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<Uuid>,
    Form(form): Form<ApiKeyForm>,
) -> Result<Json<Page<ApiKey>>, AppError> {
    let draft = form.into_draft()?;
    state.api_keys.edit(session.hub_id, id, draft).await?;
    refreshed_list(&state.api_keys, session.hub_id).await
}

/// Soft-delete an API key.
pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Page<ApiKey>>, AppError> {
    state.api_keys.soft_delete(session.hub_id, id).await?;
    refreshed_list(&state.api_keys, session.hub_id).await
}

/// Flip the active flag of an API key.
pub async fn toggle(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Page<ApiKey>>, AppError> {
    state.api_keys.toggle_active(session.hub_id, id).await?;
    refreshed_list(&state.api_keys, session.hub_id).await
}

/// Apply a bulk action to a set of API keys. Best-effort: unknown ids,
/// foreign ids, and unrecognized actions are silently ignored.
pub async fn bulk(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Form(form): Form<BulkForm>,
) -> Result<Json<Page<ApiKey>>, AppError> {
    let ids = form.parsed_ids();
    state.api_keys.bulk(session.hub_id, &ids, &form.action).await?;
    refreshed_list(&state.api_keys, session.hub_id).await
}
