//! Ledger snapshot persistence over a key-value store.
//!
//! # Responsibility
//! - Save the whole ledger as one JSON blob under `giftArchive`.
//! - Load it back, falling back to the older page-array layout
//!   (`giftBookData`) when no archive exists.
//!
//! # Invariants
//! - Missing or corrupt blobs load as an empty ledger; only store I/O
//!   failures are reported as errors.
//! - Blobs with indices beyond `MAX_RECORD_INDEX` (or more than `MAX_PAGES`
//!   legacy pages) count as corrupt.
//! - Loaded numerals are not trusted here; the service refreshes them.

use crate::model::ledger::{exceeds_page_limit, Ledger, MAX_PAGES, RECORDS_PER_PAGE};
use crate::model::record::Record;
use crate::persistence::kv_store::{KeyValueStore, PersistenceError, PersistenceResult};
use log::{info, warn};
use serde::Deserialize;

/// Key holding the serialized ledger.
pub const ARCHIVE_KEY: &str = "giftArchive";
/// Key of the older page-array layout.
pub const LEGACY_BOOK_KEY: &str = "giftBookData";

/// Where a loaded ledger came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Archive,
    Legacy,
    /// Nothing stored yet.
    Empty,
    /// A blob existed but could not be parsed.
    Corrupt,
}

/// Ledger plus its load provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedLedger {
    pub ledger: Ledger,
    pub source: LoadSource,
}

#[derive(Debug, Deserialize)]
struct LegacyPage {
    #[serde(default)]
    rows: Vec<Record>,
}

/// Snapshot adapter between a `Ledger` and a key-value store.
pub struct ArchivePersistence<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> ArchivePersistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Loads the stored ledger.
    ///
    /// # Errors
    /// - Store read failures. Parse failures are not errors.
    pub fn load(&self) -> PersistenceResult<LoadedLedger> {
        if let Some(blob) = self.store.get(ARCHIVE_KEY)? {
            return Ok(match serde_json::from_str::<Ledger>(&blob) {
                Ok(ledger) if exceeds_page_limit(&ledger) => oversized(ARCHIVE_KEY),
                Ok(ledger) => {
                    info!(
                        "event=archive_load module=persistence status=ok source=archive records={}",
                        ledger.records.len()
                    );
                    LoadedLedger {
                        ledger,
                        source: LoadSource::Archive,
                    }
                }
                Err(err) => corrupt(ARCHIVE_KEY, &err),
            });
        }

        if let Some(blob) = self.store.get(LEGACY_BOOK_KEY)? {
            return Ok(match serde_json::from_str::<Vec<LegacyPage>>(&blob) {
                Ok(pages) if pages.len() > MAX_PAGES as usize => oversized(LEGACY_BOOK_KEY),
                Ok(pages) => {
                    let ledger = ledger_from_legacy(pages);
                    info!(
                        "event=archive_load module=persistence status=ok source=legacy records={}",
                        ledger.records.len()
                    );
                    LoadedLedger {
                        ledger,
                        source: LoadSource::Legacy,
                    }
                }
                Err(err) => corrupt(LEGACY_BOOK_KEY, &err),
            });
        }

        Ok(LoadedLedger {
            ledger: Ledger::default(),
            source: LoadSource::Empty,
        })
    }

    /// Overwrites the stored snapshot with `ledger`.
    pub fn save(&self, ledger: &Ledger) -> PersistenceResult<()> {
        let blob = serde_json::to_string(ledger).map_err(PersistenceError::Encode)?;
        self.store.put(ARCHIVE_KEY, &blob)
    }

    /// Removes every stored snapshot, including the legacy layout.
    pub fn clear(&self) -> PersistenceResult<()> {
        self.store.remove(ARCHIVE_KEY)?;
        self.store.remove(LEGACY_BOOK_KEY)?;
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

fn corrupt(key: &str, err: &serde_json::Error) -> LoadedLedger {
    warn!("event=archive_load module=persistence status=corrupt key={key} error={err}");
    LoadedLedger {
        ledger: Ledger::default(),
        source: LoadSource::Corrupt,
    }
}

fn oversized(key: &str) -> LoadedLedger {
    warn!(
        "event=archive_load module=persistence status=corrupt key={key} reason=page_limit max_pages={MAX_PAGES}"
    );
    LoadedLedger {
        ledger: Ledger::default(),
        source: LoadSource::Corrupt,
    }
}

/// Lays legacy pages out in array order, at most 8 rows per page.
fn ledger_from_legacy(pages: Vec<LegacyPage>) -> Ledger {
    let mut ledger = Ledger::default();
    for (page_offset, page) in (0u32..).zip(pages) {
        let start = page_offset * RECORDS_PER_PAGE;
        for (row_offset, row) in (0u32..RECORDS_PER_PAGE).zip(page.rows) {
            ledger.records.insert(start + row_offset, row);
        }
    }
    ledger
}

#[cfg(test)]
mod tests {
    use super::{ArchivePersistence, LoadSource, ARCHIVE_KEY, LEGACY_BOOK_KEY};
    use crate::db::open_db_in_memory;
    use crate::model::ledger::{Ledger, MAX_RECORD_INDEX};
    use crate::model::record::{Record, RecordField};
    use crate::persistence::kv_store::{KeyValueStore, SqliteKeyValueStore};

    #[test]
    fn missing_key_loads_empty_ledger() {
        let conn = open_db_in_memory().unwrap();
        let persistence = ArchivePersistence::new(SqliteKeyValueStore::try_new(&conn).unwrap());
        let loaded = persistence.load().unwrap();
        assert_eq!(loaded.source, LoadSource::Empty);
        assert!(loaded.ledger.records.is_empty());
    }

    #[test]
    fn save_then_load_restores_ledger() {
        let conn = open_db_in_memory().unwrap();
        let persistence = ArchivePersistence::new(SqliteKeyValueStore::try_new(&conn).unwrap());

        let mut ledger = Ledger::default();
        ledger.meta.event_location = "老家".to_string();
        ledger
            .records
            .insert(0, Record::default().with_field(RecordField::Amount, "66"));
        persistence.save(&ledger).unwrap();

        let loaded = persistence.load().unwrap();
        assert_eq!(loaded.source, LoadSource::Archive);
        assert_eq!(loaded.ledger, ledger);
    }

    #[test]
    fn corrupt_blob_loads_empty_ledger() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteKeyValueStore::try_new(&conn).unwrap();
        store.put(ARCHIVE_KEY, "{not json").unwrap();

        let loaded = ArchivePersistence::new(store).load().unwrap();
        assert_eq!(loaded.source, LoadSource::Corrupt);
        assert_eq!(loaded.ledger, Ledger::default());
    }

    #[test]
    fn legacy_page_array_is_imported_in_order() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteKeyValueStore::try_new(&conn).unwrap();
        store
            .put(
                LEGACY_BOOK_KEY,
                r#"[
                    {"pageNumber":1,"rows":[{"name":"甲","amount":"10","gift":"","address":""}]},
                    {"pageNumber":2,"rows":[{"name":"乙","amount":"","gift":"酒","address":"城东"}]}
                ]"#,
            )
            .unwrap();

        let loaded = ArchivePersistence::new(store).load().unwrap();
        assert_eq!(loaded.source, LoadSource::Legacy);
        assert_eq!(loaded.ledger.records.get(&0).unwrap().name, "甲");
        assert_eq!(loaded.ledger.records.get(&8).unwrap().gift, "酒");
        assert_eq!(loaded.ledger.page_count(), 2);
    }

    #[test]
    fn index_beyond_page_limit_loads_as_corrupt() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteKeyValueStore::try_new(&conn).unwrap();
        store
            .put(
                ARCHIVE_KEY,
                r#"{"records":{"0":{"name":"甲"},"3000000":{"amount":"5"}}}"#,
            )
            .unwrap();

        let loaded = ArchivePersistence::new(store).load().unwrap();
        assert_eq!(loaded.source, LoadSource::Corrupt);
        assert!(loaded.ledger.records.is_empty());
    }

    #[test]
    fn index_at_page_limit_still_loads() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteKeyValueStore::try_new(&conn).unwrap();
        store
            .put(
                ARCHIVE_KEY,
                &format!(r#"{{"records":{{"{MAX_RECORD_INDEX}":{{"amount":"5"}}}}}}"#),
            )
            .unwrap();

        let loaded = ArchivePersistence::new(store).load().unwrap();
        assert_eq!(loaded.source, LoadSource::Archive);
        assert_eq!(loaded.ledger.page_count(), 10_000);
    }

    #[test]
    fn clear_removes_both_layouts() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteKeyValueStore::try_new(&conn).unwrap();
        store.put(LEGACY_BOOK_KEY, "[]").unwrap();
        let persistence = ArchivePersistence::new(store);
        persistence.save(&Ledger::default()).unwrap();

        persistence.clear().unwrap();
        assert_eq!(persistence.load().unwrap().source, LoadSource::Empty);
    }
}
