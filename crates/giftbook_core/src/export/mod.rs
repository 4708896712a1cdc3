//! Downloadable ledger documents.
//!
//! # Responsibility
//! - Render the full record set into a Word-compatible HTML document.
//! - Produce a pretty-printed JSON snapshot of the ledger.
//!
//! # Invariants
//! - Records appear in ascending index order.
//! - File names embed the export date as `YYYY-MM-DD`.

mod word;

use crate::store::record_store::RecordStore;
use chrono::NaiveDateTime;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use word::{escape_html, render_word_document, DOCUMENT_TITLE};

/// Export flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// HTML served as `application/msword`.
    Word,
    /// Raw ledger snapshot.
    Json,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Json => "json",
        }
    }
}

/// Parses an export format name (`word` or `json`).
pub fn parse_export_format(value: &str) -> Option<ExportFormat> {
    match value.trim().to_ascii_lowercase().as_str() {
        "word" | "doc" => Some(ExportFormat::Word),
        "json" => Some(ExportFormat::Json),
        _ => None,
    }
}

/// Rendered export ready to be written or downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub file_name: String,
    pub mime_type: &'static str,
    pub content: String,
}

/// Export rendering failure.
#[derive(Debug)]
pub enum ExportError {
    Encode(serde_json::Error),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode export: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
        }
    }
}

/// Renders `store` as `format`, stamped with `now`.
pub fn export_ledger(
    store: &RecordStore,
    format: ExportFormat,
    now: NaiveDateTime,
) -> Result<ExportDocument, ExportError> {
    let date = now.format("%Y-%m-%d");
    match format {
        ExportFormat::Word => Ok(ExportDocument {
            file_name: format!("电子礼薄书_{date}.doc"),
            mime_type: "application/msword",
            content: render_word_document(store, now),
        }),
        ExportFormat::Json => Ok(ExportDocument {
            file_name: format!("礼薄_{date}.json"),
            mime_type: "application/json",
            content: serde_json::to_string_pretty(store.ledger()).map_err(ExportError::Encode)?,
        }),
    }
}
