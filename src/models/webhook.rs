//! Outbound webhook records.
//!
//! A webhook here is a subscription record only: a target URL, an event
//! filter, and a signing secret consumed by an external delivery engine.
//! This service performs no dispatch, signing, or retries —
//! `last_triggered_at` and `failure_count` are metadata owned by that
//! external subsystem and are merely stored here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{checkbox, parse_optional_timestamp};
use crate::registry::{Resource, SortValue};

/// Sort keys accepted by the webhook list; anything else falls back
/// to `name`.
const SORT_FIELDS: &[&str] = &[
    "name",
    "is_active",
    "failure_count",
    "url",
    "secret",
    "created_at",
];

/// Webhook record.
///
/// Maps to the `webhooks` table. `events` is stored as a text array.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Webhook {
    pub id: Uuid,
    pub hub_id: Uuid,
    pub name: String,
    pub url: String,
    pub events: Vec<String>,
    pub is_active: bool,
    pub secret: String,
    pub last_triggered_at: Option<DateTime<Utc>>,
    pub failure_count: i32,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable fields of a webhook, shared by create and edit.
#[derive(Debug, Clone, Default)]
pub struct WebhookDraft {
    pub name: String,
    pub url: String,
    pub events: Vec<String>,
    pub is_active: Option<bool>,
    pub secret: String,
    pub last_triggered_at: Option<DateTime<Utc>>,
    pub failure_count: i32,
}

/// Form payload for the add/edit endpoints.
///
/// `events` arrives as a comma-separated string, matching the form's
/// text input.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WebhookForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub events: String,
    pub is_active: Option<String>,
    #[serde(default)]
    pub secret: String,
    pub last_triggered_at: Option<String>,
    pub failure_count: Option<String>,
}

impl WebhookForm {
    pub fn into_draft(self) -> Result<WebhookDraft, AppError> {
        let failure_count = match self.failure_count.as_deref().map(str::trim) {
            None | Some("") => 0,
            Some(raw) => raw.parse::<i32>().map_err(|_| {
                AppError::Validation("failure_count must be an integer".to_string())
            })?,
        };

        Ok(WebhookDraft {
            name: self.name.trim().to_string(),
            url: self.url.trim().to_string(),
            events: self
                .events
                .split(',')
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string)
                .collect(),
            is_active: Some(checkbox(self.is_active.as_deref())),
            secret: self.secret.trim().to_string(),
            last_triggered_at: parse_optional_timestamp(
                self.last_triggered_at.as_deref(),
                "last_triggered_at",
            )?,
            failure_count,
        })
    }
}

/// Validate that the target is a syntactically valid http(s) URL.
fn validate_url(url: &str) -> Result<(), AppError> {
    let parsed = url::Url::parse(url)
        .map_err(|_| AppError::Validation("url must be a valid URL".to_string()))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(AppError::Validation(
            "url must use HTTP or HTTPS".to_string(),
        )),
    }
}

fn validate_draft(draft: &WebhookDraft) -> Result<(), AppError> {
    validate_url(&draft.url)?;
    if draft.failure_count < 0 {
        return Err(AppError::Validation(
            "failure_count must not be negative".to_string(),
        ));
    }
    Ok(())
}

/// Generate a random signing secret (64 hex characters).
fn generate_secret() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

impl Resource for Webhook {
    type Draft = WebhookDraft;

    const KIND: &'static str = "webhook";

    fn from_draft(hub_id: Uuid, draft: WebhookDraft) -> Result<Self, AppError> {
        validate_draft(&draft)?;

        // A blank secret at creation gets a generated one; the external
        // delivery signer needs something to sign with.
        let secret = if draft.secret.is_empty() {
            generate_secret()
        } else {
            draft.secret
        };

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            hub_id,
            name: draft.name,
            url: draft.url,
            events: draft.events,
            is_active: draft.is_active.unwrap_or(true),
            secret,
            last_triggered_at: draft.last_triggered_at,
            failure_count: draft.failure_count,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply_draft(&mut self, draft: WebhookDraft) -> Result<(), AppError> {
        validate_draft(&draft)?;
        self.name = draft.name;
        self.url = draft.url;
        self.events = draft.events;
        self.is_active = draft.is_active.unwrap_or(true);
        self.secret = draft.secret;
        self.last_triggered_at = draft.last_triggered_at;
        self.failure_count = draft.failure_count;
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
            "failure_count" => SortValue::Int(self.failure_count as i64),
            "url" => SortValue::Text(self.url.clone()),
            "secret" => SortValue::Text(self.secret.clone()),
            "created_at" => SortValue::Time(Some(self.created_at)),
            _ => SortValue::Text(self.name.clone()),
        }
    }

    fn search_haystack(&self) -> Vec<&str> {
        vec![&self.name, &self.secret]
    }
}
