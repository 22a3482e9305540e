//! List export.
//!
//! When a list request carries `export=csv` or `export=excel`, the whole
//! filtered and sorted row set is serialized instead of rendering a page.
//! Both formats share one CSV serialization; the Excel variant only
//! changes the declared MIME type and filename, which is what legacy
//! spreadsheet consumers key off.

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::models::{ApiKey, Webhook};

/// Record kinds that can be exported as a spreadsheet.
pub trait Exportable {
    /// Base filename, without extension.
    const BASENAME: &'static str;

    /// Column header labels.
    fn headers() -> &'static [&'static str];

    /// One row of cell values, aligned with [`Self::headers`].
    fn row(&self) -> Vec<String>;
}

/// Recognized export formats. Anything else renders the list normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Excel,
}

impl ExportFormat {
    pub fn parse(format: &str) -> Option<Self> {
        match format {
            "csv" => Some(Self::Csv),
            "excel" => Some(Self::Excel),
            _ => None,
        }
    }

    fn mime(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Excel => "application/vnd.ms-excel",
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "xls",
        }
    }
}

/// Serialize records into a downloadable byte stream.
pub fn export_response<T: Exportable>(records: &[T], format: ExportFormat) -> Response {
    let mut writer = csv::Writer::from_writer(Vec::new());

    // Writes into an in-memory buffer; string records cannot fail here.
    writer
        .write_record(T::headers())
        .expect("in-memory CSV write");
    for record in records {
        writer.write_record(record.row()).expect("in-memory CSV write");
    }
    let body = writer.into_inner().expect("in-memory CSV flush");

    let disposition = format!(
        "attachment; filename=\"{}.{}\"",
        T::BASENAME,
        format.extension()
    );

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.mime().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

fn timestamp_cell(value: Option<chrono::DateTime<chrono::Utc>>) -> String {
    value.map(|t| t.to_rfc3339()).unwrap_or_default()
}

impl Exportable for ApiKey {
    const BASENAME: &'static str = "api_keys";

    fn headers() -> &'static [&'static str] {
        &[
            "Name",
            "Is Active",
            "Key Prefix",
            "Key Hash",
            "Expires At",
            "Last Used At",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.is_active.to_string(),
            self.key_prefix.clone(),
            self.key_hash.clone(),
            timestamp_cell(self.expires_at),
            timestamp_cell(self.last_used_at),
        ]
    }
}

impl Exportable for Webhook {
    const BASENAME: &'static str = "webhooks";

    fn headers() -> &'static [&'static str] {
        &[
            "Name",
            "Is Active",
            "Failure Count",
            "Url",
            "Events",
            "Secret",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.is_active.to_string(),
            self.failure_count.to_string(),
            self.url.clone(),
            self.events.join(","),
            self.secret.clone(),
        ]
    }
}
