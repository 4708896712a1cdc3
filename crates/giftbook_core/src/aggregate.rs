//! Page subtotal and grand total computation.
//!
//! # Responsibility
//! - Sum coerced amounts per page and across the whole ledger.
//! - Pair totals with their financial numerals for display.
//!
//! # Invariants
//! - Totals are recomputed from scratch on every call.
//! - Missing records and malformed amounts contribute zero.
//! - `grand_total` equals the sum of `page_total` over all pages.

use crate::model::amount::Amount;
use crate::numeral::format_amount;
use crate::store::record_store::RecordStore;

/// Sum of amounts whose index lies on 1-based `page`.
pub fn page_total(store: &RecordStore, page: u32) -> Amount {
    store
        .page_records(page)
        .map(|(_, record)| record.coerced_amount())
        .sum()
}

/// Sum of every occupied record's amount.
pub fn grand_total(store: &RecordStore) -> Amount {
    store
        .records()
        .map(|(_, record)| record.coerced_amount())
        .sum()
}

/// One total with its numeral rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalLine {
    pub amount: Amount,
    pub numeral: String,
}

impl TotalLine {
    fn new(amount: Amount) -> Self {
        Self {
            amount,
            numeral: format_amount(amount),
        }
    }
}

/// Page subtotals plus the grand total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalsSummary {
    /// Index 0 is page 1.
    pub pages: Vec<TotalLine>,
    pub grand: TotalLine,
}

/// Computes every page subtotal and the grand total.
pub fn summarize(store: &RecordStore) -> TotalsSummary {
    let pages = (1..=store.page_count())
        .map(|page| TotalLine::new(page_total(store, page)))
        .collect();
    TotalsSummary {
        pages,
        grand: TotalLine::new(grand_total(store)),
    }
}

#[cfg(test)]
mod tests {
    use super::{grand_total, page_total, summarize};
    use crate::model::amount::Amount;
    use crate::model::ledger::{page_of, Ledger};
    use crate::model::record::{Record, RecordField};
    use crate::store::page_manager::add_page;
    use crate::store::record_store::RecordStore;

    fn amount_record(raw: &str) -> Record {
        Record::default().with_field(RecordField::Amount, raw)
    }

    #[test]
    fn two_page_totals_split_by_page() {
        let mut store = RecordStore::new(Ledger::default());
        add_page(&mut store).unwrap();
        add_page(&mut store).unwrap();
        store.set(0, RecordField::Amount, "10.00").unwrap();
        store.set(9, RecordField::Amount, "5.00").unwrap();

        assert_eq!(page_total(&store, 1), Amount::from_cents(1_000));
        assert_eq!(page_total(&store, 2), Amount::from_cents(500));
        assert_eq!(grand_total(&store), Amount::from_cents(1_500));
    }

    #[test]
    fn sparse_and_malformed_records_count_as_zero() {
        let mut ledger = Ledger::default();
        ledger.records.insert(2, amount_record("7.25"));
        ledger.records.insert(5, amount_record("not money"));
        ledger.records.insert(20, amount_record("-4"));
        ledger.records.insert(21, amount_record("0.75"));
        let store = RecordStore::new(ledger);

        assert_eq!(page_total(&store, 1), Amount::from_cents(725));
        assert_eq!(page_total(&store, 2), Amount::ZERO);
        assert_eq!(page_total(&store, 3), Amount::from_cents(75));
        assert_eq!(page_total(&store, 9), Amount::ZERO);
        assert_eq!(grand_total(&store), Amount::from_cents(800));
    }

    #[test]
    fn grand_total_equals_sum_of_page_totals() {
        let mut ledger = Ledger::default();
        for (index, raw) in [(0, "1.10"), (7, "2"), (8, "3.33"), (15, "x"), (30, "100")] {
            ledger.records.insert(index, amount_record(raw));
        }
        let store = RecordStore::new(ledger);
        let summary = summarize(&store);

        let page_sum: Amount = summary.pages.iter().map(|line| line.amount).sum();
        assert_eq!(summary.pages.len(), 4);
        assert_eq!(page_sum, summary.grand.amount);
        assert_eq!(summary.grand.amount, grand_total(&store));
    }

    #[test]
    fn highest_index_counts_toward_its_page_total() {
        let mut ledger = Ledger::default();
        ledger.records.insert(0, amount_record("1"));
        ledger.records.insert(u32::MAX, amount_record("2.50"));
        let store = RecordStore::new(ledger);

        assert_eq!(page_total(&store, page_of(u32::MAX)), Amount::from_cents(250));
        assert_eq!(
            page_total(&store, 1) + page_total(&store, page_of(u32::MAX)),
            grand_total(&store)
        );
    }

    #[test]
    fn summary_renders_numerals_including_zero() {
        let mut store = RecordStore::new(Ledger::default());
        add_page(&mut store).unwrap();
        let summary = summarize(&store);
        assert_eq!(summary.pages[0].numeral, "零元整");
        assert_eq!(summary.grand.numeral, "零元整");
    }
}
