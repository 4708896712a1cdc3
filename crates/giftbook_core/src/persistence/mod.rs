//! Durable persistence for the gift book.
//!
//! # Responsibility
//! - Define the key-value store contract and its SQLite implementation.
//! - Serialize the whole ledger to one JSON blob and read it back.
//!
//! # Invariants
//! - Saves are full-snapshot overwrites, never partial patches.
//! - An unparseable blob loads as an empty ledger instead of failing.

pub mod archive;
pub mod kv_store;
