//! Record store over the live ledger.
//!
//! # Responsibility
//! - Provide `get`/`set`/`all_indices` over the index → record map.
//! - Keep the derived numeral column consistent on every amount write.
//!
//! # Invariants
//! - `set` builds the new record fully before swapping it in; a rejected
//!   write leaves the previous record untouched.
//! - Writes are accepted only inside existing pages.

use crate::model::ledger::{page_range, Ledger, LedgerMeta, RECORDS_PER_PAGE};
use crate::model::record::{Record, RecordField, RecordIndex};
use log::debug;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Record store errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Index lies beyond the last existing page.
    IndexOutOfRange { index: RecordIndex, page_count: u32 },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfRange { index, page_count } => write!(
                f,
                "record index {index} is outside the {page_count} existing page(s)"
            ),
        }
    }
}

impl Error for StoreError {}

/// Exclusive owner of the in-memory ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStore {
    ledger: Ledger,
}

impl RecordStore {
    /// Wraps an existing ledger. Numerals are not refreshed here; call
    /// `refresh_numerals` after loading untrusted data.
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    pub fn get(&self, index: RecordIndex) -> Option<&Record> {
        self.ledger.records.get(&index)
    }

    /// Writes one field and returns the settled record.
    ///
    /// Amount writes recompute the numeral column before returning. Writing
    /// a missing slot inside an existing page creates the record.
    ///
    /// # Errors
    /// - `IndexOutOfRange` when `index` is beyond the last page.
    pub fn set(
        &mut self,
        index: RecordIndex,
        field: RecordField,
        value: impl Into<String>,
    ) -> StoreResult<&Record> {
        let page_count = self.page_count();
        if u64::from(index) >= u64::from(page_count) * u64::from(RECORDS_PER_PAGE) {
            return Err(StoreError::IndexOutOfRange { index, page_count });
        }

        let next = self
            .ledger
            .records
            .get(&index)
            .cloned()
            .unwrap_or_default()
            .with_field(field, value);

        match self.ledger.records.entry(index) {
            Entry::Occupied(mut slot) => {
                slot.insert(next);
                Ok(&*slot.into_mut())
            }
            Entry::Vacant(slot) => Ok(&*slot.insert(next)),
        }
    }

    /// Occupied indices in ascending order.
    pub fn all_indices(&self) -> Vec<RecordIndex> {
        self.ledger.records.keys().copied().collect()
    }

    pub fn page_count(&self) -> u32 {
        self.ledger.page_count()
    }

    pub fn record_count(&self) -> usize {
        self.ledger.records.len()
    }

    /// Occupied records of 1-based `page`, in index order.
    pub fn page_records(&self, page: u32) -> impl Iterator<Item = (RecordIndex, &Record)> {
        let range = page_range(page);
        (!range.is_empty())
            .then(|| self.ledger.records.range(range))
            .into_iter()
            .flatten()
            .map(|(index, record)| (*index, record))
    }

    /// All occupied records in index order.
    pub fn records(&self) -> impl Iterator<Item = (RecordIndex, &Record)> {
        self.ledger
            .records
            .iter()
            .map(|(index, record)| (*index, record))
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn meta(&self) -> &LedgerMeta {
        &self.ledger.meta
    }

    pub fn meta_mut(&mut self) -> &mut LedgerMeta {
        &mut self.ledger.meta
    }

    pub fn into_ledger(self) -> Ledger {
        self.ledger
    }

    /// Replaces the whole ledger (reset/clear flows).
    pub fn replace(&mut self, ledger: Ledger) {
        self.ledger = ledger;
    }

    /// Recomputes every numeral column. Returns how many records changed.
    pub fn refresh_numerals(&mut self) -> usize {
        let changed = self
            .ledger
            .records
            .values_mut()
            .map(Record::refresh_numeral)
            .filter(|changed| *changed)
            .count();
        if changed > 0 {
            debug!("event=numerals_refreshed module=store status=ok changed={changed}");
        }
        changed
    }

    /// Inserts blank records into holes inside existing pages. Returns how
    /// many were inserted.
    ///
    /// Allocates a full page for every page up to the highest index; callers
    /// bound the index first (see `exceeds_page_limit`).
    pub fn fill_missing(&mut self) -> usize {
        let mut inserted = 0;
        for page in 1..=self.page_count() {
            for index in page_range(page) {
                if let Entry::Vacant(slot) = self.ledger.records.entry(index) {
                    slot.insert(Record::default());
                    inserted += 1;
                }
            }
        }
        inserted
    }

    pub(crate) fn records_mut(&mut self) -> &mut BTreeMap<RecordIndex, Record> {
        &mut self.ledger.records
    }
}

#[cfg(test)]
mod tests {
    use super::{RecordStore, StoreError};
    use crate::model::ledger::Ledger;
    use crate::model::record::{Record, RecordField};

    fn one_page_store() -> RecordStore {
        let mut ledger = Ledger::default();
        for index in 0..8 {
            ledger.records.insert(index, Record::default());
        }
        RecordStore::new(ledger)
    }

    #[test]
    fn set_amount_settles_numeral_before_returning() {
        let mut store = one_page_store();
        let record = store
            .set(3, RecordField::Amount, "50.5")
            .expect("index 3 is on page 1");
        assert_eq!(record.amount_numeral, "伍拾元伍角");
        assert_eq!(store.get(3).unwrap().amount, "50.5");
    }

    #[test]
    fn set_beyond_last_page_is_rejected_without_change() {
        let mut store = one_page_store();
        let before = store.clone();
        let err = store.set(8, RecordField::Name, "x").unwrap_err();
        assert_eq!(
            err,
            StoreError::IndexOutOfRange {
                index: 8,
                page_count: 1
            }
        );
        assert_eq!(store, before);
    }

    #[test]
    fn set_on_sparse_slot_creates_record() {
        let mut ledger = Ledger::default();
        ledger.records.insert(7, Record::default());
        let mut store = RecordStore::new(ledger);

        store.set(2, RecordField::Gift, "茶叶").unwrap();
        assert_eq!(store.all_indices(), vec![2, 7]);
        assert_eq!(store.get(2).unwrap().gift, "茶叶");
    }

    #[test]
    fn fill_missing_closes_holes_inside_pages() {
        let mut ledger = Ledger::default();
        ledger.records.insert(1, Record::default());
        ledger.records.insert(9, Record::default());
        let mut store = RecordStore::new(ledger);

        assert_eq!(store.fill_missing(), 14);
        assert_eq!(store.all_indices(), (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn highest_index_is_writable_and_paged() {
        let mut ledger = Ledger::default();
        ledger.records.insert(u32::MAX, Record::default());
        let mut store = RecordStore::new(ledger);

        store.set(u32::MAX, RecordField::Amount, "5").unwrap();
        let page = store.page_count();
        let indices: Vec<u32> = store.page_records(page).map(|(index, _)| index).collect();
        assert_eq!(indices, vec![u32::MAX]);
        assert_eq!(store.page_records(0).count(), 0);
    }

    #[test]
    fn page_records_only_yields_the_page_range() {
        let mut store = one_page_store();
        store.records_mut().insert(8, Record::default());
        let indices: Vec<u32> = store.page_records(2).map(|(index, _)| index).collect();
        assert_eq!(indices, vec![8]);
    }
}
