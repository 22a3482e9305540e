//! Tenant-scoped resource registry.
//!
//! The registry is the one reusable engine in this service: a generic
//! manager for soft-deletable, tenant-scoped records. It is instantiated
//! twice — once for API keys, once for webhooks — and owns the semantics
//! shared by both kinds: searchable/sortable/paginated listing, create,
//! full-overwrite edit, soft delete, active-flag toggling, and set-based
//! bulk actions.
//!
//! # Tenant isolation
//!
//! Every operation takes the tenant (`hub_id`) as an explicit parameter,
//! supplied by the session middleware — never from client input. The
//! storage traits bake the `hub_id` + not-deleted predicate into every
//! default read, so cross-tenant access cannot happen by omission.
//!
//! # Soft deletion
//!
//! Deletion only ever sets `is_deleted` + `deleted_at`; no hard-delete
//! path exists. Deleted records vanish from every default read but stay
//! reachable through [`TenantRegistry::get_with_deleted`] for audit
//! tooling. Deleting an already-deleted id fails with `NotFound`, because
//! the lookup predicate excludes deleted records.

pub mod filter;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::store::{BulkChange, ResourceStore};

pub use filter::{BulkAction, ListParams, ListQuery, Page};

/// Value a record exposes for ordering by one of its sortable fields.
///
/// Only values of the same variant are ever compared, since a sort always
/// targets a single field of a single kind.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortValue {
    Bool(bool),
    Int(i64),
    Text(String),
    Time(Option<DateTime<Utc>>),
}

/// Contract a record kind must fulfill to be managed by the registry.
///
/// A kind carries an identity, a tenant, soft-delete state, an active
/// flag, and a declared allow-list of sortable fields. Construction and
/// mutation go through a `Draft` — the kind's editable-field set — so
/// that create and edit share one validation path and edit is always a
/// full overwrite, never a sparse patch.
pub trait Resource: Clone + Send + Sync + Unpin + 'static {
    /// Editable fields for this kind, shared by create and edit.
    type Draft: Clone + Send + Sync;

    /// Kind label used in log lines (e.g. `"api_key"`).
    const KIND: &'static str;

    /// Build a new record for a tenant. Assigns the id and timestamps;
    /// validates the draft.
    fn from_draft(hub_id: Uuid, draft: Self::Draft) -> Result<Self, AppError>;

    /// Overwrite every editable field from the draft and refresh
    /// `updated_at`. Validates the draft.
    fn apply_draft(&mut self, draft: Self::Draft) -> Result<(), AppError>;

    fn id(&self) -> Uuid;
    fn hub_id(&self) -> Uuid;
    fn is_active(&self) -> bool;
    fn is_deleted(&self) -> bool;

    /// Set the active flag and refresh `updated_at`.
    fn set_active(&mut self, active: bool);

    /// Mark the record deleted: `is_deleted = true`, `deleted_at = now()`,
    /// `updated_at` refreshed.
    fn mark_deleted(&mut self);

    /// Allow-list of sort keys for this kind. Must contain `"name"`,
    /// the universal fallback.
    fn sort_fields() -> &'static [&'static str];

    /// Value of one allow-listed sort field, for in-memory ordering.
    fn sort_value(&self, field: &str) -> SortValue;

    /// Text fields matched by the case-insensitive substring search.
    fn search_haystack(&self) -> Vec<&str>;
}

/// Generic registry over one record kind, backed by a pluggable store.
///
/// Cloning is cheap; the store is shared behind an [`Arc`].
pub struct TenantRegistry<T: Resource> {
    store: Arc<dyn ResourceStore<T>>,
}

impl<T: Resource> Clone for TenantRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<T: Resource> TenantRegistry<T> {
    pub fn new(store: Arc<dyn ResourceStore<T>>) -> Self {
        Self { store }
    }

    /// Produce one page of records matching the given filter.
    ///
    /// Read-only. Unknown sort keys, page sizes outside the allow-list,
    /// and out-of-range page numbers all normalize to safe defaults; see
    /// [`filter`] for the exact rules. The returned [`Page`] echoes the
    /// filter state back for control re-rendering.
    pub async fn list(&self, hub_id: Uuid, params: &ListParams) -> Result<Page<T>, AppError> {
        let query = ListQuery::from_params(params, T::sort_fields());

        let total = self.store.count_matching(hub_id, &query).await?;
        let page = query.clamp_page(total);
        let offset = (page - 1) * query.per_page;

        let items = self
            .store
            .select(hub_id, &query, offset, Some(query.per_page))
            .await?;

        Ok(Page {
            items,
            total,
            page,
            per_page: query.per_page,
            total_pages: query.total_pages(total),
            search_query: query.search,
            sort_field: params.sort.clone().unwrap_or_else(|| "name".to_string()),
            sort_dir: params.dir.clone().unwrap_or_else(|| "asc".to_string()),
            view: params.view.clone().unwrap_or_else(|| "table".to_string()),
        })
    }

    /// Full filtered and sorted row set, unpaginated. Backs the export
    /// branch of the list endpoints.
    pub async fn export_rows(&self, hub_id: Uuid, params: &ListParams) -> Result<Vec<T>, AppError> {
        let query = ListQuery::from_params(params, T::sort_fields());
        self.store.select(hub_id, &query, 0, None).await
    }

    /// Create a record for a tenant.
    ///
    /// The server assigns id and timestamps; the tenant id comes from the
    /// session context, never from the request body.
    pub async fn create(&self, hub_id: Uuid, draft: T::Draft) -> Result<T, AppError> {
        let record = T::from_draft(hub_id, draft)?;
        self.store.insert(&record).await?;
        tracing::debug!(kind = T::KIND, id = %record.id(), "record created");
        Ok(record)
    }

    /// Fetch a live record owned by the tenant.
    pub async fn get(&self, hub_id: Uuid, id: Uuid) -> Result<T, AppError> {
        self.store.get(hub_id, id).await?.ok_or(AppError::NotFound)
    }

    /// Fetch a record owned by the tenant, including soft-deleted ones.
    ///
    /// Audit/admin path only; everything else goes through [`Self::get`].
    pub async fn get_with_deleted(&self, hub_id: Uuid, id: Uuid) -> Result<T, AppError> {
        self.store
            .get_any(hub_id, id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Overwrite every editable field of a live record.
    ///
    /// The live-record + tenant lookup is the only authorization boundary
    /// in the system; a miss is always `NotFound`.
    pub async fn edit(&self, hub_id: Uuid, id: Uuid, draft: T::Draft) -> Result<T, AppError> {
        let mut record = self.get(hub_id, id).await?;
        record.apply_draft(draft)?;
        self.store.update(&record).await?;
        Ok(record)
    }

    /// Soft-delete a live record.
    ///
    /// One-way and not idempotent: a second call on the same id fails
    /// with `NotFound` because the lookup excludes deleted records.
    pub async fn soft_delete(&self, hub_id: Uuid, id: Uuid) -> Result<T, AppError> {
        let mut record = self.get(hub_id, id).await?;
        record.mark_deleted();
        self.store.update(&record).await?;
        tracing::debug!(kind = T::KIND, id = %id, "record soft-deleted");
        Ok(record)
    }

    /// Flip the active flag of a live record. No other field changes.
    pub async fn toggle_active(&self, hub_id: Uuid, id: Uuid) -> Result<T, AppError> {
        let mut record = self.get(hub_id, id).await?;
        let flipped = !record.is_active();
        record.set_active(flipped);
        self.store.update(&record).await?;
        Ok(record)
    }

    /// Apply one action to a set of records in a single storage statement.
    ///
    /// Best-effort: ids that don't exist, are deleted, or belong to
    /// another tenant are silently skipped. An unrecognized action is a
    /// no-op, not an error. Returns the number of records affected.
    pub async fn bulk(&self, hub_id: Uuid, ids: &[Uuid], action: &str) -> Result<u64, AppError> {
        let change = match BulkAction::parse(action) {
            Some(BulkAction::Activate) => BulkChange::SetActive(true),
            Some(BulkAction::Deactivate) => BulkChange::SetActive(false),
            Some(BulkAction::Delete) => BulkChange::SoftDelete,
            None => return Ok(0),
        };

        if ids.is_empty() {
            return Ok(0);
        }

        let affected = self.store.bulk_update(hub_id, ids, change).await?;
        tracing::debug!(kind = T::KIND, action, affected, "bulk action applied");
        Ok(affected)
    }

    /// Number of live records owned by the tenant.
    pub async fn count(&self, hub_id: Uuid) -> Result<u64, AppError> {
        self.store.count_live(hub_id).await
    }
}
