//! Dashboard and settings pages.

use axum::{Extension, Json, extract::State};
use serde_json::{Value, json};

use crate::error::AppError;
use crate::middleware::session::SessionContext;
use crate::routes::AppState;

/// Module dashboard: live-record counts per resource kind.
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<Value>, AppError> {
    let total_api_keys = state.api_keys.count(session.hub_id).await?;
    let total_webhooks = state.webhooks.count(session.hub_id).await?;

    Ok(Json(json!({
        "total_api_keys": total_api_keys,
        "total_webhooks": total_webhooks,
    })))
}

/// Settings page placeholder. The page exists in the navigation but has
/// no behavior yet.
pub async fn settings() -> Json<Value> {
    Json(json!({}))
}
