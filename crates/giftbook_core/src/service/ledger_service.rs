//! Ledger use-case service.
//!
//! # Responsibility
//! - Own the live `RecordStore` and its snapshot persistence.
//! - Run every command through mutation, numeral, totals and save before
//!   returning to the host.
//! - Gate destructive commands behind a `Confirmer`.
//!
//! # Invariants
//! - A ledger opened or reset through this service always has at least one
//!   page, and every index inside its pages is occupied.
//! - Every successful mutation is persisted before the call returns.
//! - Rejected or declined commands leave both memory and storage unchanged.

use crate::aggregate::{grand_total, page_total, summarize, TotalLine, TotalsSummary};
use crate::confirm::{Confirmer, CLEAR_ALL_PROMPT, RESET_PROMPT};
use crate::export::{export_ledger, ExportDocument, ExportError, ExportFormat};
use crate::model::amount::Amount;
use crate::model::ledger::{page_of, Ledger, LedgerMeta};
use crate::model::record::{parse_record_field, Record, RecordField, RecordFieldError, RecordIndex};
use crate::persistence::archive::{ArchivePersistence, LoadSource};
use crate::persistence::kv_store::{KeyValueStore, PersistenceError};
use crate::store::page_manager::{self, DeleteOutcome, PageError};
use crate::store::record_store::{RecordStore, StoreError};
use chrono::NaiveDateTime;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Interval at which hosts should call `autosave_meta`.
pub const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for ledger use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Record index outside existing pages.
    Store(StoreError),
    /// Page command rejected.
    Page(PageError),
    /// Unknown or read-only column name.
    Field(RecordFieldError),
    /// Storage failure.
    Persistence(PersistenceError),
    /// Export rendering failure.
    Export(ExportError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Page(err) => write!(f, "{err}"),
            Self::Field(err) => write!(f, "{err}"),
            Self::Persistence(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Page(err) => Some(err),
            Self::Field(err) => Some(err),
            Self::Persistence(err) => Some(err),
            Self::Export(err) => Some(err),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<PageError> for ServiceError {
    fn from(value: PageError) -> Self {
        Self::Page(value)
    }
}

impl From<RecordFieldError> for ServiceError {
    fn from(value: RecordFieldError) -> Self {
        Self::Field(value)
    }
}

impl From<PersistenceError> for ServiceError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

impl From<ExportError> for ServiceError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

/// Settled state after one field edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    pub index: RecordIndex,
    /// Record after the edit, numeral already recomputed.
    pub record: Record,
    /// 1-based page owning `index`.
    pub page: u32,
    pub page_total: Amount,
    pub grand_total: Amount,
}

/// One printable page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub page_number: u32,
    /// Occupied slots of the page in index order.
    pub rows: Vec<(RecordIndex, Record)>,
    pub page_total: TotalLine,
}

/// Everything a host needs to lay out a printout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintView {
    pub meta: LedgerMeta,
    pub pages: Vec<PageView>,
    pub grand_total: TotalLine,
}

/// Explicit application state for one gift book.
pub struct LedgerService<S: KeyValueStore> {
    store: RecordStore,
    persistence: ArchivePersistence<S>,
    load_source: LoadSource,
}

impl<S: KeyValueStore> LedgerService<S> {
    /// Loads the stored ledger and brings it to a consistent state.
    ///
    /// # Contract
    /// - Holes inside existing pages are filled with blank records.
    /// - Stored numerals are recomputed from the amount column.
    /// - An empty ledger gets fresh metadata dated `now` and one blank page.
    /// - The settled ledger is saved back before returning.
    pub fn open(kv: S, now: NaiveDateTime) -> ServiceResult<Self> {
        let persistence = ArchivePersistence::new(kv);
        let loaded = persistence.load()?;
        let mut store = RecordStore::new(loaded.ledger);

        let filled = store.fill_missing();
        let refreshed = store.refresh_numerals();
        if store.page_count() == 0 {
            if store.meta().create_date.is_empty() {
                *store.meta_mut() = LedgerMeta::new(now.date());
            }
            page_manager::add_page(&mut store)?;
        }

        let service = Self {
            store,
            persistence,
            load_source: loaded.source,
        };
        service.save()?;
        info!(
            "event=ledger_open module=service status=ok source={:?} pages={} filled={} refreshed={}",
            service.load_source,
            service.store.page_count(),
            filled,
            refreshed
        );
        Ok(service)
    }

    /// Writes one field and persists the ledger.
    ///
    /// # Errors
    /// - `Store` when `index` is beyond the last page.
    /// - `Persistence` when the snapshot could not be written. The in-memory
    ///   edit is kept in that case.
    pub fn apply_edit(
        &mut self,
        index: RecordIndex,
        field: RecordField,
        value: impl Into<String>,
    ) -> ServiceResult<EditOutcome> {
        let record = self.store.set(index, field, value)?.clone();
        let page = page_of(index);
        let outcome = EditOutcome {
            index,
            record,
            page,
            page_total: page_total(&self.store, page),
            grand_total: grand_total(&self.store),
        };
        self.save()?;
        Ok(outcome)
    }

    /// Same as `apply_edit` with the column given by wire name.
    pub fn apply_edit_raw(
        &mut self,
        index: RecordIndex,
        field: &str,
        value: impl Into<String>,
    ) -> ServiceResult<EditOutcome> {
        let field = parse_record_field(field)?;
        self.apply_edit(index, field, value)
    }

    pub fn set_event_title(
        &mut self,
        title: impl Into<String>,
        now: NaiveDateTime,
    ) -> ServiceResult<()> {
        self.store.meta_mut().event_title = title.into();
        self.autosave_meta(now)
    }

    pub fn set_event_location(
        &mut self,
        location: impl Into<String>,
        now: NaiveDateTime,
    ) -> ServiceResult<()> {
        self.store.meta_mut().event_location = location.into();
        self.autosave_meta(now)
    }

    /// Re-stamps date and archive number, then saves. Hosts call this every
    /// `AUTOSAVE_INTERVAL`.
    pub fn autosave_meta(&mut self, now: NaiveDateTime) -> ServiceResult<()> {
        let page_count = self.store.page_count();
        self.store.meta_mut().stamp(now.date(), page_count);
        self.save()
    }

    /// Appends a blank page and returns its number.
    ///
    /// # Errors
    /// - `Page(PageLimit)` when the ledger is full.
    pub fn add_page(&mut self) -> ServiceResult<u32> {
        let page = page_manager::add_page(&mut self.store)?;
        self.save()?;
        Ok(page)
    }

    /// Deletes `page` after confirmation.
    ///
    /// # Errors
    /// - `Page(LastPage)`, `Page(PageNotFound)` or `Page(Cancelled)` with
    ///   no state change.
    pub fn delete_page(
        &mut self,
        page: u32,
        confirmer: &dyn Confirmer,
    ) -> ServiceResult<DeleteOutcome> {
        let outcome = page_manager::delete_page(&mut self.store, page, confirmer)
            .inspect_err(|err| {
                warn!("event=page_delete module=service status=rejected page={page} error={err}")
            })?;
        self.save()?;
        Ok(outcome)
    }

    /// Erases every stored layout and starts over with one blank page.
    /// Returns `false` when the confirmer declined.
    pub fn clear_all(
        &mut self,
        confirmer: &dyn Confirmer,
        now: NaiveDateTime,
    ) -> ServiceResult<bool> {
        if !confirmer.confirm(CLEAR_ALL_PROMPT) {
            info!("event=ledger_clear module=service status=cancelled");
            return Ok(false);
        }
        self.persistence.clear()?;
        self.restart(now)?;
        info!("event=ledger_clear module=service status=ok");
        Ok(true)
    }

    /// Replaces the ledger with fresh metadata and one blank page.
    /// Returns `false` when the confirmer declined.
    pub fn reset(&mut self, confirmer: &dyn Confirmer, now: NaiveDateTime) -> ServiceResult<bool> {
        if !confirmer.confirm(RESET_PROMPT) {
            info!("event=ledger_reset module=service status=cancelled");
            return Ok(false);
        }
        self.restart(now)?;
        info!("event=ledger_reset module=service status=ok");
        Ok(true)
    }

    fn restart(&mut self, now: NaiveDateTime) -> ServiceResult<()> {
        self.store.replace(Ledger::new(now.date()));
        page_manager::add_page(&mut self.store)?;
        self.save()
    }

    /// Writes the full snapshot.
    pub fn save(&self) -> ServiceResult<()> {
        self.persistence
            .save(self.store.ledger())
            .inspect_err(|err| {
                warn!("event=ledger_save module=service status=error error={err}")
            })?;
        Ok(())
    }

    /// Renders a downloadable document.
    pub fn export(
        &self,
        format: ExportFormat,
        now: NaiveDateTime,
    ) -> ServiceResult<ExportDocument> {
        let document = export_ledger(&self.store, format, now)?;
        info!(
            "event=ledger_export module=service status=ok format={} file={} bytes={}",
            format.as_str(),
            document.file_name,
            document.content.len()
        );
        Ok(document)
    }

    /// Flushes state and returns the page views to print.
    pub fn prepare_print(&self) -> ServiceResult<PrintView> {
        self.save()?;
        let totals = summarize(&self.store);
        let pages = totals
            .pages
            .into_iter()
            .zip(1..)
            .map(|(page_total, page_number)| PageView {
                page_number,
                rows: self
                    .store
                    .page_records(page_number)
                    .map(|(index, record)| (index, record.clone()))
                    .collect(),
                page_total,
            })
            .collect();
        Ok(PrintView {
            meta: self.store.meta().clone(),
            pages,
            grand_total: totals.grand,
        })
    }

    pub fn totals(&self) -> TotalsSummary {
        summarize(&self.store)
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Where the ledger came from when the service was opened.
    pub fn load_source(&self) -> LoadSource {
        self.load_source
    }

    pub fn into_store(self) -> RecordStore {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::{LedgerService, ServiceError};
    use crate::confirm::AssumeYes;
    use crate::db::open_db_in_memory;
    use crate::model::amount::Amount;
    use crate::model::record::RecordField;
    use crate::persistence::archive::LoadSource;
    use crate::persistence::kv_store::SqliteKeyValueStore;
    use crate::store::page_manager::PageError;
    use chrono::{NaiveDate, NaiveDateTime};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 8)
            .and_then(|date| date.and_hms_opt(10, 0, 0))
            .expect("valid datetime")
    }

    #[test]
    fn open_on_empty_store_creates_first_page() {
        let conn = open_db_in_memory().unwrap();
        let service =
            LedgerService::open(SqliteKeyValueStore::try_new(&conn).unwrap(), now()).unwrap();
        assert_eq!(service.load_source(), LoadSource::Empty);
        assert_eq!(service.store().page_count(), 1);
        assert_eq!(service.store().all_indices(), (0..8).collect::<Vec<_>>());
        assert_eq!(service.store().meta().create_date, "2025/3/8");
    }

    #[test]
    fn edit_reports_settled_totals() {
        let conn = open_db_in_memory().unwrap();
        let mut service =
            LedgerService::open(SqliteKeyValueStore::try_new(&conn).unwrap(), now()).unwrap();

        service.apply_edit(0, RecordField::Amount, "20").unwrap();
        let outcome = service.apply_edit(3, RecordField::Amount, "50.5").unwrap();
        assert_eq!(outcome.page, 1);
        assert_eq!(outcome.record.amount_numeral, "伍拾元伍角");
        assert_eq!(outcome.page_total, Amount::from_cents(7050));
        assert_eq!(outcome.grand_total, Amount::from_cents(7050));
    }

    #[test]
    fn numeral_column_is_not_editable() {
        let conn = open_db_in_memory().unwrap();
        let mut service =
            LedgerService::open(SqliteKeyValueStore::try_new(&conn).unwrap(), now()).unwrap();
        let err = service.apply_edit_raw(0, "amountCapital", "x").unwrap_err();
        assert!(matches!(err, ServiceError::Field(_)));
    }

    #[test]
    fn deleting_only_page_is_rejected() {
        let conn = open_db_in_memory().unwrap();
        let mut service =
            LedgerService::open(SqliteKeyValueStore::try_new(&conn).unwrap(), now()).unwrap();
        let err = service.delete_page(1, &AssumeYes).unwrap_err();
        assert!(matches!(err, ServiceError::Page(PageError::LastPage)));
        assert_eq!(service.store().page_count(), 1);
    }

    #[test]
    fn autosave_stamps_archive_number() {
        let conn = open_db_in_memory().unwrap();
        let mut service =
            LedgerService::open(SqliteKeyValueStore::try_new(&conn).unwrap(), now()).unwrap();
        service.add_page().unwrap();
        service.autosave_meta(now()).unwrap();
        assert_eq!(service.store().meta().archive_number, "LB-2025-002");
    }

    #[test]
    fn print_view_lists_every_page() {
        let conn = open_db_in_memory().unwrap();
        let mut service =
            LedgerService::open(SqliteKeyValueStore::try_new(&conn).unwrap(), now()).unwrap();
        service.add_page().unwrap();
        service.apply_edit(9, RecordField::Amount, "100").unwrap();

        let view = service.prepare_print().unwrap();
        assert_eq!(view.pages.len(), 2);
        assert_eq!(view.pages[1].page_number, 2);
        assert_eq!(view.pages[1].rows.len(), 8);
        assert_eq!(view.pages[0].page_total.amount, Amount::ZERO);
        assert_eq!(view.pages[1].page_total.numeral, "壹佰元整");
        assert_eq!(view.grand_total.amount, Amount::from_cents(10000));
    }
}
