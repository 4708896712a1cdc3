//! Ledger domain model.
//!
//! # Responsibility
//! - Define the record, amount and archive shapes shared by every layer.
//! - Own the page geometry (8 records per page).
//!
//! # Invariants
//! - `Record::amount_numeral` always mirrors the coerced `amount`.
//! - Page `p` covers indices `(p-1)*8 ..= p*8-1`.

pub mod amount;
pub mod ledger;
pub mod record;
