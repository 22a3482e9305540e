//! Storage collaborator traits.
//!
//! The registry talks to storage exclusively through [`ResourceStore`],
//! and the session middleware through [`SessionStore`]. The Postgres
//! implementations live in [`postgres`]; [`memory`] provides in-memory
//! versions that drive the test suites without a database.
//!
//! The tenant + not-deleted predicate is part of the trait contract:
//! every default read applies it, and only [`ResourceStore::get_any`]
//! can see soft-deleted records.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::registry::{ListQuery, Resource};

/// State transition applied by a bulk update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkChange {
    SetActive(bool),
    SoftDelete,
}

/// Storage backend for one record kind.
///
/// Implementations must scope every operation to the given `hub_id` and,
/// except for `get_any`, exclude soft-deleted records.
#[async_trait]
pub trait ResourceStore<T: Resource>: Send + Sync {
    /// Persist a freshly created record.
    async fn insert(&self, record: &T) -> Result<(), AppError>;

    /// Fetch a live record by id and tenant.
    async fn get(&self, hub_id: Uuid, id: Uuid) -> Result<Option<T>, AppError>;

    /// Fetch a record by id and tenant, including soft-deleted ones.
    async fn get_any(&self, hub_id: Uuid, id: Uuid) -> Result<Option<T>, AppError>;

    /// Write back every field of a previously fetched record.
    async fn update(&self, record: &T) -> Result<(), AppError>;

    /// Live records matching the query's search filter, in the query's
    /// sort order, windowed by `offset`/`limit`. `limit = None` returns
    /// the whole matched set (export path).
    async fn select(
        &self,
        hub_id: Uuid,
        query: &ListQuery,
        offset: u64,
        limit: Option<u64>,
    ) -> Result<Vec<T>, AppError>;

    /// Number of live records matching the query's search filter.
    async fn count_matching(&self, hub_id: Uuid, query: &ListQuery) -> Result<u64, AppError>;

    /// Number of live records for the tenant.
    async fn count_live(&self, hub_id: Uuid) -> Result<u64, AppError>;

    /// Apply one change to every live record of the tenant whose id is in
    /// `ids`, as a single set-based statement. Returns the affected count.
    async fn bulk_update(
        &self,
        hub_id: Uuid,
        ids: &[Uuid],
        change: BulkChange,
    ) -> Result<u64, AppError>;
}

/// Session lookup collaborator.
///
/// Resolves a hashed session token to the tenant it belongs to. Token
/// hashing happens in the middleware; stores only ever see hashes.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn resolve(&self, token_hash: &str) -> Result<Option<Uuid>, AppError>;
}
