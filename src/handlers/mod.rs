//! HTTP handlers for the admin surface.
//!
//! One module per resource kind plus the dashboard/settings pages and
//! the public health probe. The kind modules are deliberately parallel:
//! each wires the same eight routes onto its `TenantRegistry`
//! instantiation.

pub mod api_keys;
pub mod dashboard;
pub mod health;
pub mod webhooks;

use axum::{Json, http::HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::registry::{ListParams, Page, Resource, TenantRegistry};

/// Form payload of the bulk endpoints: a comma-separated id list and an
/// action name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkForm {
    #[serde(default)]
    pub ids: String,
    #[serde(default)]
    pub action: String,
}

impl BulkForm {
    /// Parse the id list, silently dropping anything that is not a UUID.
    /// Bulk actions are best-effort end to end.
    pub fn parsed_ids(&self) -> Vec<Uuid> {
        self.ids
            .split(',')
            .filter_map(|id| Uuid::parse_str(id.trim()).ok())
            .collect()
    }
}

/// True when the request asks for the list fragment only, via the
/// inline-update protocol's target header.
pub(crate) fn is_partial_refresh(headers: &HeaderMap) -> bool {
    headers
        .get("hx-target")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|target| target == "datatable-body")
}

/// Default first-page list, returned after every mutation so the client
/// can re-render its table in a known state.
pub(crate) async fn refreshed_list<T>(
    registry: &TenantRegistry<T>,
    hub_id: Uuid,
) -> Result<Json<Page<T>>, AppError>
where
    T: Resource + Serialize,
{
    Ok(Json(registry.list(hub_id, &ListParams::default()).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bulk_ids_skip_malformed_entries() {
        let form = BulkForm {
            ids: format!("{}, not-a-uuid ,{}", Uuid::nil(), Uuid::nil()),
            action: "activate".to_string(),
        };
        assert_eq!(form.parsed_ids().len(), 2);
    }

    #[test]
    fn empty_bulk_ids_parse_to_nothing() {
        let form = BulkForm::default();
        assert!(form.parsed_ids().is_empty());
    }

    #[test]
    fn partial_refresh_requires_the_datatable_target() {
        let mut headers = HeaderMap::new();
        assert!(!is_partial_refresh(&headers));

        headers.insert("hx-target", HeaderValue::from_static("sidebar"));
        assert!(!is_partial_refresh(&headers));

        headers.insert("hx-target", HeaderValue::from_static("datatable-body"));
        assert!(is_partial_refresh(&headers));
    }
}
