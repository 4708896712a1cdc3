//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose ledger commands to Dart via FRB as flat response envelopes.
//! - Translate UI confirmation results into core `Confirmer` answers.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every call opens the database at `db_path`, runs one command to
//!   completion and drops the connection before returning.
//! - Amounts cross the boundary as `x.xx` strings.

use chrono::{Local, NaiveDateTime};
use giftbook_core::db::open_db;
use giftbook_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, parse_export_format,
    ping as ping_inner, record_numeral, Confirmer, LedgerService, PrintView, Record, RecordIndex,
    ServiceError, SqliteKeyValueStore,
};
use log::warn;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Renders raw amount text as the numeral column would show it, for live
/// preview while the user types. Blank, zero and malformed input give "".
#[flutter_rust_bridge::frb(sync)]
pub fn format_amount_numeral(raw: String) -> String {
    record_numeral(raw.as_str())
}

/// One record row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRecordItem {
    pub index: u32,
    pub name: String,
    pub amount: String,
    pub amount_numeral: String,
    pub gift: String,
    pub address: String,
}

/// One page with its subtotal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerPageItem {
    pub page_number: u32,
    pub records: Vec<LedgerRecordItem>,
    pub page_total: String,
    pub page_total_numeral: String,
}

/// Full ledger state for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSnapshotResponse {
    pub ok: bool,
    pub message: String,
    pub event_title: String,
    pub event_location: String,
    pub create_date: String,
    pub archive_number: String,
    pub pages: Vec<LedgerPageItem>,
    pub grand_total: String,
    pub grand_total_numeral: String,
}

impl LedgerSnapshotResponse {
    fn from_view(view: PrintView) -> Self {
        let grand = view.grand_total;
        Self {
            ok: true,
            message: format!("{} page(s).", view.pages.len()),
            event_title: view.meta.event_title,
            event_location: view.meta.event_location,
            create_date: view.meta.create_date,
            archive_number: view.meta.archive_number,
            pages: view
                .pages
                .into_iter()
                .map(|page| LedgerPageItem {
                    page_number: page.page_number,
                    records: page
                        .rows
                        .into_iter()
                        .map(|(index, record)| to_record_item(index, record))
                        .collect(),
                    page_total: page.page_total.amount.to_string(),
                    page_total_numeral: page.page_total.numeral,
                })
                .collect(),
            grand_total: grand.amount.to_string(),
            grand_total_numeral: grand.numeral,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            event_title: String::new(),
            event_location: String::new(),
            create_date: String::new(),
            archive_number: String::new(),
            pages: Vec::new(),
            grand_total: String::new(),
            grand_total_numeral: String::new(),
        }
    }
}

/// Generic action response envelope for ledger commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerActionResponse {
    /// Whether the command changed state.
    pub ok: bool,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
    /// Edited record after numeral recomputation, for edit commands.
    pub record: Option<LedgerRecordItem>,
    /// Subtotal of the affected page, for edit commands.
    pub page_total: Option<String>,
    pub grand_total: Option<String>,
    pub page_count: u32,
}

impl LedgerActionResponse {
    fn success(message: impl Into<String>, page_count: u32) -> Self {
        Self {
            ok: true,
            message: message.into(),
            record: None,
            page_total: None,
            grand_total: None,
            page_count,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            record: None,
            page_total: None,
            grand_total: None,
            page_count: 0,
        }
    }
}

/// Rendered export document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerExportResponse {
    pub ok: bool,
    pub message: String,
    pub file_name: String,
    pub mime_type: String,
    pub content: String,
}

/// Loads the ledger (creating the first page on an empty store) and returns
/// every page with totals.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_snapshot(db_path: String) -> LedgerSnapshotResponse {
    match with_ledger_service(&db_path, |service| service.prepare_print()) {
        Ok(view) => LedgerSnapshotResponse::from_view(view),
        Err(err) => LedgerSnapshotResponse::failure(format!("ledger_snapshot failed: {err}")),
    }
}

/// Writes one field (`name|amount|gift|address`) of record `index`.
///
/// # FFI contract
/// - The returned record carries the recomputed numeral.
/// - Unknown fields and indices beyond the last page fail without changes.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_apply_edit(
    db_path: String,
    index: u32,
    field: String,
    value: String,
) -> LedgerActionResponse {
    let result = with_ledger_service(&db_path, |service| {
        let outcome = service.apply_edit_raw(index, field.as_str(), value)?;
        Ok((outcome, service.store().page_count()))
    });
    match result {
        Ok((outcome, page_count)) => LedgerActionResponse {
            ok: true,
            message: format!("Record {} saved.", outcome.index),
            record: Some(to_record_item(outcome.index, outcome.record)),
            page_total: Some(outcome.page_total.to_string()),
            grand_total: Some(outcome.grand_total.to_string()),
            page_count,
        },
        Err(err) => LedgerActionResponse::failure(format!("ledger_apply_edit failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn ledger_set_event_title(db_path: String, title: String) -> LedgerActionResponse {
    run_action(&db_path, "ledger_set_event_title", |service| {
        service.set_event_title(title, now())?;
        Ok("Event title saved.".to_string())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn ledger_set_event_location(db_path: String, location: String) -> LedgerActionResponse {
    run_action(&db_path, "ledger_set_event_location", |service| {
        service.set_event_location(location, now())?;
        Ok("Event location saved.".to_string())
    })
}

/// Periodic metadata save. Dart drives the 30 s timer.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_autosave(db_path: String) -> LedgerActionResponse {
    run_action(&db_path, "ledger_autosave", |service| {
        service.autosave_meta(now())?;
        Ok("Saved.".to_string())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn ledger_add_page(db_path: String) -> LedgerActionResponse {
    run_action(&db_path, "ledger_add_page", |service| {
        let page = service.add_page()?;
        Ok(format!("Page {page} added."))
    })
}

/// Deletes `page`. `confirmed` is the answer of the Dart-side dialog.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_delete_page(db_path: String, page: u32, confirmed: bool) -> LedgerActionResponse {
    run_action(&db_path, "ledger_delete_page", |service| {
        let outcome = service.delete_page(page, &|_: &str| confirmed)?;
        Ok(format!(
            "Page {} deleted ({} records).",
            outcome.deleted_page, outcome.removed_records
        ))
    })
}

/// Resets to one blank page when `confirmed`.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_reset(db_path: String, confirmed: bool) -> LedgerActionResponse {
    confirmed_action(&db_path, "ledger_reset", confirmed, |service, confirmer| {
        service.reset(confirmer, now())
    })
}

/// Erases all stored data when `confirmed`.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_clear(db_path: String, confirmed: bool) -> LedgerActionResponse {
    confirmed_action(&db_path, "ledger_clear", confirmed, |service, confirmer| {
        service.clear_all(confirmer, now())
    })
}

/// Renders a `word` or `json` export for the Dart side to save.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_export(db_path: String, format: String) -> LedgerExportResponse {
    let Some(format) = parse_export_format(format.as_str()) else {
        return LedgerExportResponse {
            ok: false,
            message: format!("ledger_export failed: unsupported format `{format}`"),
            file_name: String::new(),
            mime_type: String::new(),
            content: String::new(),
        };
    };
    match with_ledger_service(&db_path, |service| service.export(format, now())) {
        Ok(document) => LedgerExportResponse {
            ok: true,
            message: "Exported.".to_string(),
            file_name: document.file_name,
            mime_type: document.mime_type.to_string(),
            content: document.content,
        },
        Err(err) => LedgerExportResponse {
            ok: false,
            message: format!("ledger_export failed: {err}"),
            file_name: String::new(),
            mime_type: String::new(),
            content: String::new(),
        },
    }
}

type FfiService<'conn> = LedgerService<SqliteKeyValueStore<'conn>>;

fn with_ledger_service<T>(
    db_path: &str,
    f: impl FnOnce(&mut FfiService<'_>) -> Result<T, ServiceError>,
) -> Result<T, String> {
    let db_path = db_path.trim();
    if db_path.is_empty() {
        return Err("db_path cannot be empty".to_string());
    }
    let conn = open_db(db_path).map_err(|err| format!("ledger DB open failed: {err}"))?;
    let kv = SqliteKeyValueStore::try_new(&conn)
        .map_err(|err| format!("ledger store init failed: {err}"))?;
    let mut service = LedgerService::open(kv, now()).map_err(|err| err.to_string())?;
    f(&mut service).map_err(|err| {
        warn!("event=ffi_call module=ffi status=error error={err}");
        err.to_string()
    })
}

fn run_action(
    db_path: &str,
    name: &str,
    f: impl FnOnce(&mut FfiService<'_>) -> Result<String, ServiceError>,
) -> LedgerActionResponse {
    let result = with_ledger_service(db_path, |service| {
        let message = f(service)?;
        Ok((message, service.store().page_count()))
    });
    match result {
        Ok((message, page_count)) => LedgerActionResponse::success(message, page_count),
        Err(err) => LedgerActionResponse::failure(format!("{name} failed: {err}")),
    }
}

fn confirmed_action(
    db_path: &str,
    name: &str,
    confirmed: bool,
    f: impl FnOnce(&mut FfiService<'_>, &dyn Confirmer) -> Result<bool, ServiceError>,
) -> LedgerActionResponse {
    let result = with_ledger_service(db_path, |service| {
        let applied = f(service, &|_: &str| confirmed)?;
        Ok((applied, service.store().page_count()))
    });
    match result {
        Ok((true, page_count)) => LedgerActionResponse::success("Done.", page_count),
        Ok((false, _)) => LedgerActionResponse::failure(format!("{name} cancelled")),
        Err(err) => LedgerActionResponse::failure(format!("{name} failed: {err}")),
    }
}

fn to_record_item(index: RecordIndex, record: Record) -> LedgerRecordItem {
    LedgerRecordItem {
        index,
        name: record.name,
        amount: record.amount,
        amount_numeral: record.amount_numeral,
        gift: record.gift,
        address: record.address,
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
