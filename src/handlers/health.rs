//! Health check endpoint.

use axum::Json;
use serde_json::{Value, json};

/// Liveness probe. Public — the only route outside the session
/// middleware.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "api_connect_admin",
    }))
}
