//! Tenant-scoped admin service for API keys and outbound webhooks.
//!
//! The service manages two soft-deletable, tenant-scoped resource
//! collections through one generic engine, [`registry::TenantRegistry`]:
//! searchable/sortable/paginated listing with CSV/Excel export, create,
//! full-overwrite edit, soft delete, active-flag toggling, and set-based
//! bulk actions.
//!
//! # Architecture
//!
//! - **Web framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (runtime queries), behind the
//!   store traits in [`store`] so the registry is testable in memory
//! - **Authentication**: session cookie resolved to a tenant (`hub_id`);
//!   unauthenticated requests redirect to the login page
//! - **Format**: JSON responses; HTML-form-shaped request bodies

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod registry;
pub mod routes;
pub mod store;
