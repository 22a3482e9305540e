//! Webhook management endpoints.
//!
//! Mirrors the API key endpoints one-for-one; see
//! [`crate::handlers::api_keys`] for the shared conventions.

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
use crate::models::{Webhook, WebhookForm};
use crate::registry::{ListParams, Page};
use crate::routes::AppState;

/// List webhooks for the caller's tenant.
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if let Some(format) = params.export.as_deref().and_then(ExportFormat::parse) {
        let rows = state.webhooks.export_rows(session.hub_id, &params).await?;
        return Ok(export_response(&rows, format));
    }

    let page = state.webhooks.list(session.hub_id, &params).await?;

    if is_partial_refresh(&headers) {
        return Ok(Json(page.items).into_response());
    }
    Ok(Json(page).into_response())
}

/// Blank form payload for the creation panel.
pub async fn add_form() -> Json<WebhookForm> {
    Json(WebhookForm::default())
}

/// Create a webhook; responds with the refreshed first-page list.
///
/// The URL must be a valid http(s) URL; a blank secret gets a generated
/// one so the external delivery signer always has key material.
pub async fn add(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Form(form): Form<WebhookForm>,
) -> Result<Json<Page<Webhook>>, AppError> {
    let draft = form.into_draft()?;
    state.webhooks.create(session.hub_id, draft).await?;
    refreshed_list(&state.webhooks, session.hub_id).await
}

/// Current record for the edit panel.
pub async fn edit_form(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Webhook>, AppError> {
    Ok(Json(state.webhooks.get(session.hub_id, id).await?))
}

/// Overwrite every editable field of a webhook.
pub async fn edit(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<Uuid>,
    Form(form): Form<WebhookForm>,
) -> Result<Json<Page<Webhook>>, AppError> {
    let draft = form.into_draft()?;
    state.webhooks.edit(session.hub_id, id, draft).await?;
    refreshed_list(&state.webhooks, session.hub_id).await
}

/// Soft-delete a webhook.
pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Page<Webhook>>, AppError> {
    state.webhooks.soft_delete(session.hub_id, id).await?;
    refreshed_list(&state.webhooks, session.hub_id).await
}

/// Flip the active flag of a webhook.
pub async fn toggle(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Page<Webhook>>, AppError> {
    state.webhooks.toggle_active(session.hub_id, id).await?;
    refreshed_list(&state.webhooks, session.hub_id).await
}

/// Apply a bulk action to a set of webhooks.
pub async fn bulk(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Form(form): Form<BulkForm>,
) -> Result<Json<Page<Webhook>>, AppError> {
    let ids = form.parsed_ids();
    state.webhooks.bulk(session.hub_id, &ids, &form.action).await?;
    refreshed_list(&state.webhooks, session.hub_id).await
}
