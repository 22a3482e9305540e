//! PostgreSQL store implementations.
//!
//! Runtime sqlx queries, one store per record kind. The tenant +
//! not-deleted predicate is written into every default read. Search uses
//! `ILIKE` with an escaped pattern; the ORDER BY column is interpolated
//! only from the kind's static sort allow-list, never from raw client
//! input.

use async_trait::async_trait;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::{ApiKey, Webhook};
use crate::registry::ListQuery;
use crate::store::{BulkChange, ResourceStore, SessionStore};

/// Escape LIKE metacharacters and wrap the search text in wildcards.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// ORDER BY clause for an allow-listed sort field, with the id as a
/// deterministic tiebreaker.
fn order_clause(query: &ListQuery) -> String {
    let dir = if query.descending { "DESC" } else { "ASC" };
    format!(" ORDER BY {} {}, id ASC", query.sort_field, dir)
}

/// Window clause; `limit = None` means the whole matched set.
fn window_args(offset: u64, limit: Option<u64>) -> (Option<i64>, i64) {
    (limit.map(|l| l as i64), offset as i64)
}

// ====================================================================
// API keys
// ====================================================================

/// Postgres-backed store for [`ApiKey`] records (`api_keys` table).
#[derive(Clone)]
pub struct PgApiKeyStore {
    pool: DbPool,
}

impl PgApiKeyStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const API_KEY_SEARCH: &str = "($2 = '' OR name ILIKE $3 OR key_prefix ILIKE $3 OR key_hash ILIKE $3)";

#[async_trait]
impl ResourceStore<ApiKey> for PgApiKeyStore {
    async fn insert(&self, record: &ApiKey) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO api_keys (
                id, hub_id, name, key_prefix, key_hash, is_active,
                expires_at, last_used_at, is_deleted, deleted_at,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(record.id)
        .bind(record.hub_id)
        .bind(&record.name)
        .bind(&record.key_prefix)
        .bind(&record.key_hash)
        .bind(record.is_active)
        .bind(record.expires_at)
        .bind(record.last_used_at)
        .bind(record.is_deleted)
        .bind(record.deleted_at)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, hub_id: Uuid, id: Uuid) -> Result<Option<ApiKey>, AppError> {
        let record = sqlx::query_as::<_, ApiKey>(
            "SELECT * FROM api_keys WHERE id = $1 AND hub_id = $2 AND is_deleted = FALSE",
        )
        .bind(id)
        .bind(hub_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn get_any(&self, hub_id: Uuid, id: Uuid) -> Result<Option<ApiKey>, AppError> {
        let record =
            sqlx::query_as::<_, ApiKey>("SELECT * FROM api_keys WHERE id = $1 AND hub_id = $2")
                .bind(id)
                .bind(hub_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(record)
    }

    async fn update(&self, record: &ApiKey) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE api_keys
            SET name = $3, key_prefix = $4, key_hash = $5, is_active = $6,
                expires_at = $7, last_used_at = $8, is_deleted = $9,
                deleted_at = $10, updated_at = $11
            WHERE id = $1 AND hub_id = $2
            "#,
        )
        .bind(record.id)
        .bind(record.hub_id)
        .bind(&record.name)
        .bind(&record.key_prefix)
        .bind(&record.key_hash)
        .bind(record.is_active)
        .bind(record.expires_at)
        .bind(record.last_used_at)
        .bind(record.is_deleted)
        .bind(record.deleted_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn select(
        &self,
        hub_id: Uuid,
        query: &ListQuery,
        offset: u64,
        limit: Option<u64>,
    ) -> Result<Vec<ApiKey>, AppError> {
        let sql = format!(
            "SELECT * FROM api_keys WHERE hub_id = $1 AND is_deleted = FALSE AND {API_KEY_SEARCH}{} LIMIT $4 OFFSET $5",
            order_clause(query)
        );
        let (limit, offset) = window_args(offset, limit);

        let records = sqlx::query_as::<_, ApiKey>(&sql)
            .bind(hub_id)
            .bind(&query.search)
            .bind(like_pattern(&query.search))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    async fn count_matching(&self, hub_id: Uuid, query: &ListQuery) -> Result<u64, AppError> {
        let sql = format!(
            "SELECT COUNT(*) FROM api_keys WHERE hub_id = $1 AND is_deleted = FALSE AND {API_KEY_SEARCH}"
        );

        let count: i64 = sqlx::query_scalar(&sql)
            .bind(hub_id)
            .bind(&query.search)
            .bind(like_pattern(&query.search))
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }

    async fn count_live(&self, hub_id: Uuid) -> Result<u64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM api_keys WHERE hub_id = $1 AND is_deleted = FALSE",
        )
        .bind(hub_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u64)
    }

    async fn bulk_update(
        &self,
        hub_id: Uuid,
        ids: &[Uuid],
        change: BulkChange,
    ) -> Result<u64, AppError> {
        let sql = match change {
            BulkChange::SetActive(_) => {
                "UPDATE api_keys SET is_active = $3, updated_at = now()
                 WHERE hub_id = $1 AND is_deleted = FALSE AND id = ANY($2)"
            }
            BulkChange::SoftDelete => {
                "UPDATE api_keys SET is_deleted = TRUE, deleted_at = now(), updated_at = now()
                 WHERE hub_id = $1 AND is_deleted = FALSE AND id = ANY($2)"
            }
        };

        let mut query = sqlx::query(sql).bind(hub_id).bind(ids.to_vec());
        if let BulkChange::SetActive(active) = change {
            query = query.bind(active);
        }

        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

// ====================================================================
// Webhooks
// ====================================================================

/// Postgres-backed store for [`Webhook`] records (`webhooks` table).
#[derive(Clone)]
pub struct PgWebhookStore {
    pool: DbPool,
}

impl PgWebhookStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const WEBHOOK_SEARCH: &str = "($2 = '' OR name ILIKE $3 OR secret ILIKE $3)";

#[async_trait]
impl ResourceStore<Webhook> for PgWebhookStore {
    async fn insert(&self, record: &Webhook) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO webhooks (
                id, hub_id, name, url, events, is_active, secret,
                last_triggered_at, failure_count, is_deleted, deleted_at,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(record.id)
        .bind(record.hub_id)
        .bind(&record.name)
        .bind(&record.url)
        .bind(&record.events)
        .bind(record.is_active)
        .bind(&record.secret)
        .bind(record.last_triggered_at)
        .bind(record.failure_count)
        .bind(record.is_deleted)
        .bind(record.deleted_at)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, hub_id: Uuid, id: Uuid) -> Result<Option<Webhook>, AppError> {
        let record = sqlx::query_as::<_, Webhook>(
            "SELECT * FROM webhooks WHERE id = $1 AND hub_id = $2 AND is_deleted = FALSE",
        )
        .bind(id)
        .bind(hub_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn get_any(&self, hub_id: Uuid, id: Uuid) -> Result<Option<Webhook>, AppError> {
        let record =
            sqlx::query_as::<_, Webhook>("SELECT * FROM webhooks WHERE id = $1 AND hub_id = $2")
                .bind(id)
                .bind(hub_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(record)
    }

    async fn update(&self, record: &Webhook) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE webhooks
            SET name = $3, url = $4, events = $5, is_active = $6, secret = $7,
                last_triggered_at = $8, failure_count = $9, is_deleted = $10,
                deleted_at = $11, updated_at = $12
            WHERE id = $1 AND hub_id = $2
            "#,
        )
        .bind(record.id)
        .bind(record.hub_id)
        .bind(&record.name)
        .bind(&record.url)
        .bind(&record.events)
        .bind(record.is_active)
        .bind(&record.secret)
        .bind(record.last_triggered_at)
        .bind(record.failure_count)
        .bind(record.is_deleted)
        .bind(record.deleted_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn select(
        &self,
        hub_id: Uuid,
        query: &ListQuery,
        offset: u64,
        limit: Option<u64>,
    ) -> Result<Vec<Webhook>, AppError> {
        let sql = format!(
            "SELECT * FROM webhooks WHERE hub_id = $1 AND is_deleted = FALSE AND {WEBHOOK_SEARCH}{} LIMIT $4 OFFSET $5",
            order_clause(query)
        );
        let (limit, offset) = window_args(offset, limit);

        let records = sqlx::query_as::<_, Webhook>(&sql)
            .bind(hub_id)
            .bind(&query.search)
            .bind(like_pattern(&query.search))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    async fn count_matching(&self, hub_id: Uuid, query: &ListQuery) -> Result<u64, AppError> {
        let sql = format!(
            "SELECT COUNT(*) FROM webhooks WHERE hub_id = $1 AND is_deleted = FALSE AND {WEBHOOK_SEARCH}"
        );

        let count: i64 = sqlx::query_scalar(&sql)
            .bind(hub_id)
            .bind(&query.search)
            .bind(like_pattern(&query.search))
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }

    async fn count_live(&self, hub_id: Uuid) -> Result<u64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM webhooks WHERE hub_id = $1 AND is_deleted = FALSE",
        )
        .bind(hub_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u64)
    }

    async fn bulk_update(
        &self,
        hub_id: Uuid,
        ids: &[Uuid],
        change: BulkChange,
    ) -> Result<u64, AppError> {
        let sql = match change {
            BulkChange::SetActive(_) => {
                "UPDATE webhooks SET is_active = $3, updated_at = now()
                 WHERE hub_id = $1 AND is_deleted = FALSE AND id = ANY($2)"
            }
            BulkChange::SoftDelete => {
                "UPDATE webhooks SET is_deleted = TRUE, deleted_at = now(), updated_at = now()
                 WHERE hub_id = $1 AND is_deleted = FALSE AND id = ANY($2)"
            }
        };

        let mut query = sqlx::query(sql).bind(hub_id).bind(ids.to_vec());
        if let BulkChange::SetActive(active) = change {
            query = query.bind(active);
        }

        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

// ====================================================================
// Sessions
// ====================================================================

/// Postgres-backed session lookup (`sessions` table).
///
/// Sessions are written by the authentication service; this store only
/// ever resolves them, and only while unexpired.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: DbPool,
}

impl PgSessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn resolve(&self, token_hash: &str) -> Result<Option<Uuid>, AppError> {
        let hub_id: Option<Uuid> = sqlx::query_scalar(
            "SELECT hub_id FROM sessions WHERE token_hash = $1 AND expires_at > now()",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(hub_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ListParams, ListQuery};

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
        assert_eq!(like_pattern("hook"), "%hook%");
    }

    #[test]
    fn order_clause_uses_allow_listed_field() {
        let mut params = ListParams::default();
        params.sort = Some("created_at".to_string());
        params.dir = Some("desc".to_string());
        let query = ListQuery::from_params(&params, &["name", "created_at"]);
        assert_eq!(order_clause(&query), " ORDER BY created_at DESC, id ASC");
    }

    #[test]
    fn unknown_sort_field_never_reaches_sql() {
        let mut params = ListParams::default();
        params.sort = Some("; DROP TABLE api_keys".to_string());
        let query = ListQuery::from_params(&params, &["name", "created_at"]);
        assert_eq!(order_clause(&query), " ORDER BY name ASC, id ASC");
    }
}
