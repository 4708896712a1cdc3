//! Numeral rendering for amounts and dates.
//!
//! # Responsibility
//! - Convert amounts into traditional financial numerals (大写金额).
//! - Render years as plain digit numerals for document subtitles.
//!
//! # Invariants
//! - Every function here is pure: same input, same output.
//! - Conversion failures never escape as panics or errors to callers of
//!   `format_amount`; they degrade to an empty string.

pub mod financial;
pub mod plain;

pub use financial::{format_amount, format_raw_amount, try_format_amount, NumeralError};
pub use plain::format_year_digits;
