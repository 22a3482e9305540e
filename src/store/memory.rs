//! In-memory store implementations.
//!
//! Reference backends used by the test suites and for running the service
//! without a database. They implement the same predicate contract as the
//! Postgres stores: tenant scoping and soft-delete exclusion on every
//! default read, case-insensitive substring search, allow-listed sorting,
//! and set-based bulk updates.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::registry::{ListQuery, Resource};
use crate::store::{BulkChange, ResourceStore, SessionStore};

/// In-memory [`ResourceStore`] over a vector of records.
#[derive(Default)]
pub struct MemoryStore<T> {
    records: RwLock<Vec<T>>,
}

impl<T: Resource> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    fn matches(record: &T, hub_id: Uuid, query: &ListQuery) -> bool {
        if record.hub_id() != hub_id || record.is_deleted() {
            return false;
        }
        if query.search.is_empty() {
            return true;
        }
        let needle = query.search.to_lowercase();
        record
            .search_haystack()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    fn sorted_matches(&self, hub_id: Uuid, query: &ListQuery) -> Vec<T> {
        let records = self.records.read().expect("store lock poisoned");
        let mut matched: Vec<T> = records
            .iter()
            .filter(|r| Self::matches(r, hub_id, query))
            .cloned()
            .collect();
        // Stable sort keeps insertion order among ties.
        matched.sort_by_key(|r| r.sort_value(query.sort_field));
        if query.descending {
            matched.reverse();
        }
        matched
    }
}

#[async_trait]
impl<T: Resource> ResourceStore<T> for MemoryStore<T> {
    async fn insert(&self, record: &T) -> Result<(), AppError> {
        let mut records = self.records.write().expect("store lock poisoned");
        records.push(record.clone());
        Ok(())
    }

    async fn get(&self, hub_id: Uuid, id: Uuid) -> Result<Option<T>, AppError> {
        let records = self.records.read().expect("store lock poisoned");
        Ok(records
            .iter()
            .find(|r| r.id() == id && r.hub_id() == hub_id && !r.is_deleted())
            .cloned())
    }

    async fn get_any(&self, hub_id: Uuid, id: Uuid) -> Result<Option<T>, AppError> {
        let records = self.records.read().expect("store lock poisoned");
        Ok(records
            .iter()
            .find(|r| r.id() == id && r.hub_id() == hub_id)
            .cloned())
    }

    async fn update(&self, record: &T) -> Result<(), AppError> {
        let mut records = self.records.write().expect("store lock poisoned");
        if let Some(slot) = records
            .iter_mut()
            .find(|r| r.id() == record.id() && r.hub_id() == record.hub_id())
        {
            *slot = record.clone();
        }
        Ok(())
    }

    async fn select(
        &self,
        hub_id: Uuid,
        query: &ListQuery,
        offset: u64,
        limit: Option<u64>,
    ) -> Result<Vec<T>, AppError> {
        let matched = self.sorted_matches(hub_id, query);
        let iter = matched.into_iter().skip(offset as usize);
        Ok(match limit {
            Some(limit) => iter.take(limit as usize).collect(),
            None => iter.collect(),
        })
    }

    async fn count_matching(&self, hub_id: Uuid, query: &ListQuery) -> Result<u64, AppError> {
        let records = self.records.read().expect("store lock poisoned");
        Ok(records
            .iter()
            .filter(|r| Self::matches(r, hub_id, query))
            .count() as u64)
    }

    async fn count_live(&self, hub_id: Uuid) -> Result<u64, AppError> {
        let records = self.records.read().expect("store lock poisoned");
        Ok(records
            .iter()
            .filter(|r| r.hub_id() == hub_id && !r.is_deleted())
            .count() as u64)
    }

    async fn bulk_update(
        &self,
        hub_id: Uuid,
        ids: &[Uuid],
        change: BulkChange,
    ) -> Result<u64, AppError> {
        let mut records = self.records.write().expect("store lock poisoned");
        let mut affected = 0;
        for record in records
            .iter_mut()
            .filter(|r| r.hub_id() == hub_id && !r.is_deleted() && ids.contains(&r.id()))
        {
            match change {
                BulkChange::SetActive(active) => record.set_active(active),
                BulkChange::SoftDelete => record.mark_deleted(),
            }
            affected += 1;
        }
        Ok(affected)
    }
}

/// In-memory [`SessionStore`] mapping hashed tokens to tenant ids.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Uuid>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session for a tenant. Takes the already-hashed token,
    /// matching what [`SessionStore::resolve`] receives.
    pub fn insert(&self, token_hash: String, hub_id: Uuid) {
        let mut sessions = self.sessions.write().expect("session lock poisoned");
        sessions.insert(token_hash, hub_id);
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn resolve(&self, token_hash: &str) -> Result<Option<Uuid>, AppError> {
        let sessions = self.sessions.read().expect("session lock poisoned");
        Ok(sessions.get(token_hash).copied())
    }
}
