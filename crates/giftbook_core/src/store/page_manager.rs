//! Page lifecycle over the record store.
//!
//! # Responsibility
//! - Append blank 8-record pages.
//! - Delete a page after confirmation and renumber the survivors.
//!
//! # Invariants
//! - The last remaining page is never deleted.
//! - Renumbering maps surviving indices, sorted ascending, onto `0, 1, 2, ...`
//!   so page membership is always `index / 8`.

use crate::confirm::{delete_page_prompt, Confirmer};
use crate::model::ledger::{page_range, MAX_PAGES};
use crate::model::record::{Record, RecordIndex};
use crate::store::record_store::RecordStore;
use log::info;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Page operation errors. Every variant leaves the store unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// Only one page exists.
    LastPage,
    /// Requested page does not exist.
    PageNotFound { page: u32, page_count: u32 },
    /// The user declined the confirmation prompt.
    Cancelled,
    /// The ledger already holds `MAX_PAGES` pages.
    PageLimit { max_pages: u32 },
}

impl Display for PageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LastPage => write!(f, "cannot delete last page"),
            Self::PageNotFound { page, page_count } => {
                write!(f, "page {page} does not exist (page count {page_count})")
            }
            Self::Cancelled => write!(f, "page deletion cancelled"),
            Self::PageLimit { max_pages } => write!(f, "ledger is full ({max_pages} pages)"),
        }
    }
}

impl Error for PageError {}

/// Result of a successful page deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub deleted_page: u32,
    pub removed_records: usize,
    pub page_count: u32,
}

/// Appends a blank page after the current last page. Returns its number.
///
/// # Errors
/// - `PageLimit` when `MAX_PAGES` pages already exist.
pub fn add_page(store: &mut RecordStore) -> Result<u32, PageError> {
    let page_count = store.page_count();
    if page_count >= MAX_PAGES {
        return Err(PageError::PageLimit {
            max_pages: MAX_PAGES,
        });
    }
    let page = page_count + 1;
    let records = store.records_mut();
    for index in page_range(page) {
        records.insert(index, Record::default());
    }
    info!(
        "event=page_add module=store status=ok page={} records={}",
        page,
        store.record_count()
    );
    Ok(page)
}

/// Deletes `page` after the confirmer approves, then renumbers survivors.
///
/// # Errors
/// - `LastPage` when at most one page exists.
/// - `PageNotFound` when `page` is outside `1..=page_count`.
/// - `Cancelled` when the confirmer declines.
pub fn delete_page(
    store: &mut RecordStore,
    page: u32,
    confirmer: &dyn Confirmer,
) -> Result<DeleteOutcome, PageError> {
    let page_count = store.page_count();
    if page_count <= 1 {
        return Err(PageError::LastPage);
    }
    if page == 0 || page > page_count {
        return Err(PageError::PageNotFound { page, page_count });
    }
    if !confirmer.confirm(&delete_page_prompt(page)) {
        return Err(PageError::Cancelled);
    }

    let records = store.records_mut();
    let doomed = page_range(page);
    let before = records.len();
    records.retain(|index, _| !doomed.contains(index));
    let removed_records = before - records.len();

    let survivors = std::mem::take(records);
    *records = reindex_dense(survivors);

    let outcome = DeleteOutcome {
        deleted_page: page,
        removed_records,
        page_count: store.page_count(),
    };
    info!(
        "event=page_delete module=store status=ok page={} removed={} page_count={}",
        outcome.deleted_page, outcome.removed_records, outcome.page_count
    );
    Ok(outcome)
}

/// Page numbers available for deletion, empty when only one page exists.
pub fn deletable_pages(store: &RecordStore) -> Vec<u32> {
    let page_count = store.page_count();
    if page_count <= 1 {
        return Vec::new();
    }
    (1..=page_count).collect()
}

/// Maps sorted indices onto `0..len` preserving order.
pub fn reindex_dense(records: BTreeMap<RecordIndex, Record>) -> BTreeMap<RecordIndex, Record> {
    records
        .into_values()
        .zip(0..)
        .map(|(record, index)| (index, record))
        .collect()
}
