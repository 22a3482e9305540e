//! List filter parameters and their normalization.
//!
//! Everything a list request can carry — search text, sort key and
//! direction, page number, page size, view mode, export format — arrives
//! as untrusted query-string input. This module normalizes it against
//! fixed allow-lists. Unknown values never fail a request: unknown sort
//! keys fall back to `name`, unknown page sizes to the default, and
//! non-numeric page numbers to page 1.

use serde::{Deserialize, Serialize};

/// Allowed page sizes for list views.
pub const PER_PAGE_CHOICES: [u64; 4] = [10, 25, 50, 100];

/// Page size used when the requested one is not in [`PER_PAGE_CHOICES`].
pub const DEFAULT_PER_PAGE: u64 = 10;

/// Sort key every resource kind must support; used as the fallback when
/// an unknown sort key is requested.
pub const DEFAULT_SORT_FIELD: &str = "name";

/// Raw list parameters as they arrive on the query string.
///
/// `page` and `per_page` are kept as strings so that a malformed value
/// degrades to a default instead of failing extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub q: String,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub view: Option<String>,
    pub export: Option<String>,
}

/// Normalized list query, safe to hand to a storage backend.
///
/// `sort_field` is always a member of the resource kind's allow-list, so
/// backends may interpolate it into an ORDER BY clause directly.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub search: String,
    pub sort_field: &'static str,
    pub descending: bool,
    pub per_page: u64,
    /// 1-indexed requested page, before clamping against the total count.
    pub requested_page: u64,
}

impl ListQuery {
    /// Normalize raw parameters against a sort-field allow-list.
    pub fn from_params(params: &ListParams, sort_fields: &'static [&'static str]) -> Self {
        let requested = params.sort.as_deref().unwrap_or(DEFAULT_SORT_FIELD);
        let sort_field = sort_fields
            .iter()
            .copied()
            .find(|f| *f == requested)
            .unwrap_or(DEFAULT_SORT_FIELD);

        let per_page = params
            .per_page
            .as_deref()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|n| PER_PAGE_CHOICES.contains(n))
            .unwrap_or(DEFAULT_PER_PAGE);

        // A non-numeric page degrades to 1; a numeric but out-of-range
        // value is clamped later, once the total count is known.
        let requested_page = params
            .page
            .as_deref()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(1);

        Self {
            search: params.q.trim().to_string(),
            sort_field,
            descending: params.dir.as_deref() == Some("desc"),
            per_page,
            requested_page,
        }
    }

    /// Clamp the requested page against the matched-record total.
    ///
    /// Pages are 1-indexed; anything below 1 or past the end resolves to
    /// the last valid page. An empty result set still has one (empty) page.
    pub fn clamp_page(&self, total: u64) -> u64 {
        let total_pages = self.total_pages(total);
        if self.requested_page < 1 || self.requested_page > total_pages {
            total_pages
        } else {
            self.requested_page
        }
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.per_page).max(1)
    }
}

/// One page of list results, with the filter state echoed back so the
/// caller can re-render its controls.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
    pub search_query: String,
    pub sort_field: String,
    pub sort_dir: String,
    pub view: String,
}

/// Recognized bulk actions.
///
/// [`BulkAction::parse`] returns `None` for anything else; the registry
/// treats an unrecognized action as a no-op rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Activate,
    Deactivate,
    Delete,
}

impl BulkAction {
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "activate" => Some(Self::Activate),
            "deactivate" => Some(Self::Deactivate),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}
