//! Record kinds managed by the registry.
//!
//! Both kinds share the same metadata shape: a server-assigned id, an
//! immutable tenant (`hub_id`), created/updated timestamps, and the
//! soft-delete pair (`is_deleted` + `deleted_at`). The kind-specific
//! fields and form parsing live in the per-kind modules.

pub mod api_key;
pub mod webhook;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::AppError;

pub use api_key::{ApiKey, ApiKeyDraft, ApiKeyForm};
pub use webhook::{Webhook, WebhookDraft, WebhookForm};

/// Parse an optional form timestamp.
///
/// Blank or absent values become `None` rather than an error. Accepts
/// RFC 3339 as well as the `YYYY-MM-DDTHH:MM` shape produced by HTML
/// `datetime-local` inputs.
pub(crate) fn parse_optional_timestamp(
    raw: Option<&str>,
    field: &str,
) -> Result<Option<DateTime<Utc>>, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Ok(Some(naive.and_utc()));
    }

    Err(AppError::Validation(format!(
        "{field} must be an RFC 3339 timestamp"
    )))
}

/// Interpret an HTML checkbox value.
///
/// An absent field means the box was unchecked and maps to `false`;
/// registry-level callers that want the model default pass `None`
/// directly in the draft instead.
pub(crate) fn checkbox(raw: Option<&str>) -> bool {
    matches!(raw.map(str::trim), Some("on") | Some("true") | Some("1"))
}
