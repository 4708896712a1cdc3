//! In-memory record ownership and page lifecycle.
//!
//! # Responsibility
//! - Own the single live `Ledger` and expose field-level mutation.
//! - Create and delete 8-record pages while keeping indices dense.
//!
//! # Invariants
//! - After `RecordStore::set` returns, no stale numeral is observable.
//! - After any page operation, occupied indices are `0..8k` for some `k`
//!   (given a dense starting state).

pub mod page_manager;
pub mod record_store;
