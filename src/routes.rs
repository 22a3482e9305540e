//! Application state and router assembly.
//!
//! The router is built from an [`AppState`] holding the two registry
//! instantiations and the session store behind trait objects, so the
//! same routing code serves the Postgres-backed binary and the
//! memory-backed test suites.

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::db::DbPool;
use crate::handlers;
use crate::middleware;
use crate::models::{ApiKey, Webhook};
use crate::registry::TenantRegistry;
use crate::store::SessionStore;
use crate::store::postgres::{PgApiKeyStore, PgSessionStore, PgWebhookStore};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub api_keys: TenantRegistry<ApiKey>,
    pub webhooks: TenantRegistry<Webhook>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    /// Production state: both registries and the session lookup backed
    /// by PostgreSQL.
    pub fn postgres(pool: DbPool) -> Self {
        Self {
            api_keys: TenantRegistry::new(Arc::new(PgApiKeyStore::new(pool.clone()))),
            webhooks: TenantRegistry::new(Arc::new(PgWebhookStore::new(pool.clone()))),
            sessions: Arc::new(PgSessionStore::new(pool)),
        }
    }
}

/// Build the full application router.
///
/// Everything except `/health` sits behind the session middleware;
/// unauthenticated requests are redirected to `/login`.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/", get(handlers::dashboard::dashboard))
        // API keys
        .route("/api-keys/", get(handlers::api_keys::list))
        .route(
            "/api-keys/add/",
            get(handlers::api_keys::add_form).post(handlers::api_keys::add),
        )
        .route(
            "/api-keys/{id}/edit/",
            get(handlers::api_keys::edit_form).post(handlers::api_keys::edit),
        )
        .route("/api-keys/{id}/delete/", post(handlers::api_keys::delete))
        .route("/api-keys/{id}/toggle/", post(handlers::api_keys::toggle))
        .route("/api-keys/bulk/", post(handlers::api_keys::bulk))
        // Webhooks
        .route("/webhooks/", get(handlers::webhooks::list))
        .route(
            "/webhooks/add/",
            get(handlers::webhooks::add_form).post(handlers::webhooks::add),
        )
        .route(
            "/webhooks/{id}/edit/",
            get(handlers::webhooks::edit_form).post(handlers::webhooks::edit),
        )
        .route("/webhooks/{id}/delete/", post(handlers::webhooks::delete))
        .route("/webhooks/{id}/toggle/", post(handlers::webhooks::toggle))
        .route("/webhooks/bulk/", post(handlers::webhooks::bulk))
        // Settings
        .route("/settings/", get(handlers::dashboard::settings))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::session::require_session,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
