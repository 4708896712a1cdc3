//! Archive (ledger) model and page geometry.
//!
//! # Responsibility
//! - Hold every record of one event plus its metadata.
//! - Map record indices to 1-based page numbers.
//!
//! # Invariants
//! - Pages are numbered `1..=page_count` with no gaps.
//! - Page count derives from the highest occupied index, so sparse maps
//!   still resolve to a stable page layout.

use crate::model::record::{Record, RecordIndex};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Fixed number of records per page.
pub const RECORDS_PER_PAGE: u32 = 8;
/// Most pages one ledger may hold. Stored ledgers beyond it are rejected.
pub const MAX_PAGES: u32 = 10_000;
/// Highest record index a ledger may hold.
pub const MAX_RECORD_INDEX: RecordIndex = MAX_PAGES * RECORDS_PER_PAGE - 1;

/// Event metadata stored alongside the records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LedgerMeta {
    pub event_title: String,
    pub event_location: String,
    /// Local date formatted as `YYYY/M/D`.
    pub create_date: String,
    /// `LB-<year>-<page count>` reference stamped on save.
    pub archive_number: String,
}

impl LedgerMeta {
    /// Creates blank metadata dated `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            create_date: format_create_date(today),
            ..Self::default()
        }
    }

    /// Re-stamps the date and archive number.
    pub fn stamp(&mut self, today: NaiveDate, page_count: u32) {
        self.create_date = format_create_date(today);
        self.archive_number = format!("LB-{}-{:03}", today.year(), page_count);
    }
}

fn format_create_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.year(), date.month(), date.day())
}

/// Full persisted state for one event's gift book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ledger {
    pub records: BTreeMap<RecordIndex, Record>,
    pub meta: LedgerMeta,
}

impl Ledger {
    /// Creates an empty ledger with metadata dated `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            records: BTreeMap::new(),
            meta: LedgerMeta::new(today),
        }
    }

    /// Number of pages implied by the highest occupied index.
    pub fn page_count(&self) -> u32 {
        self.records
            .keys()
            .next_back()
            .map_or(0, |max_index| page_of(*max_index))
    }
}

/// Returns the 1-based page that owns `index`.
pub fn page_of(index: RecordIndex) -> u32 {
    index / RECORDS_PER_PAGE + 1
}

/// Returns the indices covered by 1-based `page`. Page 0 and pages past
/// `page_of(u32::MAX)` map to an empty range; the last page ends exactly at
/// `u32::MAX`.
pub fn page_range(page: u32) -> RangeInclusive<RecordIndex> {
    match page.checked_sub(1).and_then(|page| page.checked_mul(RECORDS_PER_PAGE)) {
        Some(start) => start..=start + (RECORDS_PER_PAGE - 1),
        None => RangeInclusive::new(1, 0),
    }
}

/// Returns whether any index lies beyond `MAX_RECORD_INDEX`.
pub fn exceeds_page_limit(ledger: &Ledger) -> bool {
    ledger
        .records
        .keys()
        .next_back()
        .is_some_and(|max_index| *max_index > MAX_RECORD_INDEX)
}
