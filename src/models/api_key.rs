//! API key records.
//!
//! An API key here is an administrative record: a name plus opaque
//! credential material (`key_prefix` + `key_hash`). The record never
//! holds a verifiable secret in plaintext, and nothing in this service
//! performs key verification — `last_used_at` is advisory metadata
//! written by whatever authenticates with the key, not by us.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{checkbox, parse_optional_timestamp};
use crate::registry::{Resource, SortValue};

/// Sort keys accepted by the API key list; anything else falls back
/// to `name`.
const SORT_FIELDS: &[&str] = &[
    "name",
    "is_active",
    "key_prefix",
    "key_hash",
    "expires_at",
    "last_used_at",
    "created_at",
];

/// API key record.
///
/// Maps to the `api_keys` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApiKey {
    pub id: Uuid,
    pub hub_id: Uuid,
    pub name: String,
    pub key_prefix: String,
    pub key_hash: String,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable fields of an API key, shared by create and edit.
///
/// `is_active: None` means "use the model default" (active).
#[derive(Debug, Clone, Default)]
pub struct ApiKeyDraft {
    pub name: String,
    pub key_prefix: String,
    pub key_hash: String,
    pub is_active: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Form payload for the add/edit endpoints.
///
/// Field shapes follow the HTML form: `is_active` is a checkbox
/// (absent = unchecked), timestamps arrive as strings and may be blank.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiKeyForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub key_prefix: String,
    #[serde(default)]
    pub key_hash: String,
    pub is_active: Option<String>,
    pub expires_at: Option<String>,
    pub last_used_at: Option<String>,
}

impl ApiKeyForm {
    pub fn into_draft(self) -> Result<ApiKeyDraft, AppError> {
        Ok(ApiKeyDraft {
            name: self.name.trim().to_string(),
            key_prefix: self.key_prefix.trim().to_string(),
            key_hash: self.key_hash.trim().to_string(),
            is_active: Some(checkbox(self.is_active.as_deref())),
            expires_at: parse_optional_timestamp(self.expires_at.as_deref(), "expires_at")?,
            last_used_at: parse_optional_timestamp(self.last_used_at.as_deref(), "last_used_at")?,
        })
    }
}

impl Resource for ApiKey {
    type Draft = ApiKeyDraft;

    const KIND: &'static str = "api_key";

    fn from_draft(hub_id: Uuid, draft: ApiKeyDraft) -> Result<Self, AppError> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            hub_id,
            name: draft.name,
            key_prefix: draft.key_prefix,
            key_hash: draft.key_hash,
            is_active: draft.is_active.unwrap_or(true),
            expires_at: draft.expires_at,
            last_used_at: draft.last_used_at,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply_draft(&mut self, draft: ApiKeyDraft) -> Result<(), AppError> {
        self.name = draft.name;
        self.key_prefix = draft.key_prefix;
        self.key_hash = draft.key_hash;
        self.is_active = draft.is_active.unwrap_or(true);
        self.expires_at = draft.expires_at;
        self.last_used_at = draft.last_used_at;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn hub_id(&self) -> Uuid {
        self.hub_id
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn set_active(&mut self, active: bool) {
        self.is_active = active;
        self.updated_at = Utc::now();
    }

    fn mark_deleted(&mut self) {
        let now = Utc::now();
        self.is_deleted = true;
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    fn sort_fields() -> &'static [&'static str] {
        SORT_FIELDS
    }

    fn sort_value(&self, field: &str) -> SortValue {
        match field {
            "is_active" => SortValue::Bool(self.is_active),
            "key_prefix" => SortValue::Text(self.key_prefix.clone()),
            "key_hash" => SortValue::Text(self.key_hash.clone()),
            "expires_at" => SortValue::Time(self.expires_at),
            "last_used_at" => SortValue::Time(self.last_used_at),
            "created_at" => SortValue::Time(Some(self.created_at)),
            _ => SortValue::Text(self.name.clone()),
        }
    }

    fn search_haystack(&self) -> Vec<&str> {
        vec![&self.name, &self.key_prefix, &self.key_hash]
    }
}
