//! Fixed-point monetary amount.
//!
//! # Responsibility
//! - Represent non-negative CNY amounts as whole cents.
//! - Parse raw user input leniently, coercing malformed values to zero.
//!
//! # Invariants
//! - The stored cent count is never negative.
//! - Parsing rounds half-up to exactly 2 fractional digits.
//! - Arithmetic saturates instead of wrapping.

use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::iter::Sum;
use std::ops::Add;

const CENTS_PER_UNIT: i64 = 100;

/// Non-negative amount stored in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

/// Reason a raw amount text was rejected by strict parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountParseError {
    /// Input is empty or whitespace only.
    Empty,
    /// Input is not a decimal number.
    NotNumeric(String),
    /// Input parses to a negative value.
    Negative(String),
    /// Input does not fit in the cent range.
    Overflow(String),
}

impl Display for AmountParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "amount is empty"),
            Self::NotNumeric(raw) => write!(f, "amount is not numeric: `{raw}`"),
            Self::Negative(raw) => write!(f, "amount must not be negative: `{raw}`"),
            Self::Overflow(raw) => write!(f, "amount is out of range: `{raw}`"),
        }
    }
}

impl Error for AmountParseError {}

impl Amount {
    /// Zero amount.
    pub const ZERO: Amount = Amount(0);

    /// Builds an amount from a cent count, clamping negatives to zero.
    pub fn from_cents(cents: i64) -> Self {
        Self(cents.max(0))
    }

    /// Returns the amount in cents.
    pub fn cents(self) -> i64 {
        self.0
    }

    /// Returns the whole-unit (元) part.
    pub fn whole_units(self) -> i64 {
        self.0 / CENTS_PER_UNIT
    }

    /// Returns the two fractional digits as `(jiao, fen)`.
    pub fn fraction_digits(self) -> (u8, u8) {
        let cents = (self.0 % CENTS_PER_UNIT) as u8;
        (cents / 10, cents % 10)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Strictly parses raw amount text.
    ///
    /// Accepts plain decimals (`50`, `50.5`, `.5`, `+3.456`) and, as a
    /// fallback, anything `f64` accepts (`1e3`). Rounds half-up to cents.
    ///
    /// # Errors
    /// - `Empty` for blank input.
    /// - `NotNumeric` for text that is not a finite number.
    /// - `Negative` for values below zero.
    /// - `Overflow` when the cent count does not fit in `i64`.
    pub fn parse(raw: &str) -> Result<Self, AmountParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AmountParseError::Empty);
        }

        match parse_plain_decimal(trimmed) {
            Some(Ok(cents)) => Ok(Self(cents)),
            Some(Err(())) => Err(AmountParseError::Overflow(trimmed.to_string())),
            None => parse_float_fallback(trimmed),
        }
    }

    /// Parses raw amount text, coercing any malformed input to zero.
    pub fn parse_lenient(raw: &str) -> Self {
        match Self::parse(raw) {
            Ok(amount) => amount,
            Err(AmountParseError::Empty) => Self::ZERO,
            Err(err) => {
                debug!("event=amount_coerced module=model status=ok reason={err}");
                Self::ZERO
            }
        }
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{:02}",
            self.0 / CENTS_PER_UNIT,
            self.0 % CENTS_PER_UNIT
        )
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

/// Parses `[+]digits[.digits]`. Returns `None` when the text is not of that
/// shape and `Some(Err(()))` on overflow.
fn parse_plain_decimal(text: &str) -> Option<Result<i64, ()>> {
    let body = text.strip_prefix('+').unwrap_or(text);
    let (int_text, frac_text) = match body.split_once('.') {
        Some((int_text, frac_text)) => (int_text, frac_text),
        None => (body, ""),
    };

    if int_text.is_empty() && frac_text.is_empty() {
        return None;
    }
    if !int_text.bytes().all(|b| b.is_ascii_digit())
        || !frac_text.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let mut cents: i64 = 0;
    for digit in int_text.bytes() {
        cents = match cents
            .checked_mul(10)
            .and_then(|value| value.checked_add(i64::from(digit - b'0')))
        {
            Some(value) => value,
            None => return Some(Err(())),
        };
    }

    let frac = frac_text.as_bytes();
    let jiao = frac.first().map_or(0, |digit| i64::from(digit - b'0'));
    let fen = frac.get(1).map_or(0, |digit| i64::from(digit - b'0'));
    let round_up = frac.get(2).is_some_and(|digit| *digit >= b'5');

    let total = cents
        .checked_mul(CENTS_PER_UNIT)
        .and_then(|value| value.checked_add(jiao * 10 + fen))
        .and_then(|value| value.checked_add(i64::from(round_up)));
    Some(total.ok_or(()))
}

fn parse_float_fallback(text: &str) -> Result<Amount, AmountParseError> {
    let value: f64 = text
        .parse()
        .map_err(|_| AmountParseError::NotNumeric(text.to_string()))?;
    if !value.is_finite() {
        return Err(AmountParseError::NotNumeric(text.to_string()));
    }
    if value < 0.0 {
        return Err(AmountParseError::Negative(text.to_string()));
    }

    let scaled = (value * CENTS_PER_UNIT as f64).round();
    if scaled >= i64::MAX as f64 {
        return Err(AmountParseError::Overflow(text.to_string()));
    }
    Ok(Amount(scaled as i64))
}
