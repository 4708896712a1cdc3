//! Financial numeral formatter (大写金额).
//!
//! # Rules
//! - Zero amount renders as `零元整`.
//! - The integer part is split into 4-digit chunks scaled by 万/亿/兆.
//! - Inside a chunk, zero digits collapse into one `零` placeholder and
//!   trailing placeholders are dropped; an empty chunk drops its scale word.
//! - `元` always follows the integer part; a `00` fraction appends `整`.
//! - Fraction digits emit `角`/`分` only when nonzero and never insert `零`.
//!
//! Amounts whose integer part exceeds 16 digits cannot be expressed with the
//! available scale words and fail conversion.

use crate::model::amount::Amount;
use log::error;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

const DIGIT_WORDS: [&str; 10] = ["零", "壹", "贰", "叁", "肆", "伍", "陆", "柒", "捌", "玖"];
const POSITION_UNITS: [&str; 4] = ["", "拾", "佰", "仟"];
const SCALE_WORDS: [&str; 4] = ["", "万", "亿", "兆"];
const FRACTION_UNITS: [&str; 2] = ["角", "分"];

const ZERO_WORD: &str = "零";
const WHOLE_UNIT_WORD: &str = "元";
const EXACT_WORD: &str = "整";
const CHUNK_WIDTH: usize = 4;
const MAX_INTEGER_DIGITS: usize = CHUNK_WIDTH * SCALE_WORDS.len();

static TRAILING_ZEROS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("零+$").expect("valid trailing zero regex"));
static ZERO_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new("零{2,}").expect("valid zero run regex"));
static LEADING_ZEROS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("^零+").expect("valid leading zero regex"));

/// Conversion failure for amounts outside the representable range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumeralError {
    /// Integer part has more digits than the scale words can cover.
    IntegerPartTooWide { digits: usize, max_digits: usize },
}

impl Display for NumeralError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IntegerPartTooWide { digits, max_digits } => write!(
                f,
                "integer part has {digits} digits; at most {max_digits} are supported"
            ),
        }
    }
}

impl Error for NumeralError {}

/// Formats an amount as a financial numeral.
///
/// Returns an empty string (and logs) when conversion fails.
pub fn format_amount(amount: Amount) -> String {
    match try_format_amount(amount) {
        Ok(text) => text,
        Err(err) => {
            error!(
                "event=numeral_convert module=numeral status=error cents={} error={}",
                amount.cents(),
                err
            );
            String::new()
        }
    }
}

/// Parses raw amount text leniently and formats it.
pub fn format_raw_amount(raw: &str) -> String {
    format_amount(Amount::parse_lenient(raw))
}

/// Formats an amount as a financial numeral, reporting conversion failures.
///
/// # Errors
/// - `IntegerPartTooWide` when the integer part exceeds 16 digits.
pub fn try_format_amount(amount: Amount) -> Result<String, NumeralError> {
    if amount.is_zero() {
        return Ok(format!("{ZERO_WORD}{WHOLE_UNIT_WORD}{EXACT_WORD}"));
    }

    let mut result = integer_words(amount.whole_units())?;
    result.push_str(WHOLE_UNIT_WORD);

    let (jiao, fen) = amount.fraction_digits();
    if jiao == 0 && fen == 0 {
        result.push_str(EXACT_WORD);
        return Ok(result);
    }

    for (digit, unit) in [jiao, fen].into_iter().zip(FRACTION_UNITS) {
        if digit != 0 {
            result.push_str(DIGIT_WORDS[usize::from(digit)]);
            result.push_str(unit);
        }
    }
    Ok(result)
}

fn integer_words(whole_units: i64) -> Result<String, NumeralError> {
    if whole_units == 0 {
        return Ok(ZERO_WORD.to_string());
    }

    let digits = whole_units.to_string();
    if digits.len() > MAX_INTEGER_DIGITS {
        return Err(NumeralError::IntegerPartTooWide {
            digits: digits.len(),
            max_digits: MAX_INTEGER_DIGITS,
        });
    }

    let chunks = split_chunks(&digits);
    let mut joined = String::new();
    for (position, chunk) in chunks.iter().enumerate() {
        let words = chunk_words(chunk);
        if words.is_empty() {
            continue;
        }
        joined.push_str(&words);
        joined.push_str(SCALE_WORDS[chunks.len() - 1 - position]);
    }

    let joined = TRAILING_ZEROS_RE.replace(&joined, "");
    let joined = ZERO_RUN_RE.replace_all(&joined, ZERO_WORD);
    Ok(LEADING_ZEROS_RE.replace(&joined, "").into_owned())
}

/// Splits a digit string into 4-digit chunks, most significant first. The
/// leading chunk may be shorter.
fn split_chunks(digits: &str) -> Vec<&str> {
    let head = digits.len() % CHUNK_WIDTH;
    let mut chunks = Vec::with_capacity(digits.len() / CHUNK_WIDTH + 1);
    if head > 0 {
        chunks.push(&digits[..head]);
    }
    let mut start = head;
    while start < digits.len() {
        chunks.push(&digits[start..start + CHUNK_WIDTH]);
        start += CHUNK_WIDTH;
    }
    chunks
}

fn chunk_words(chunk: &str) -> String {
    let width = chunk.len();
    let mut words = String::new();
    for (offset, byte) in chunk.bytes().enumerate() {
        let digit = usize::from(byte - b'0');
        if digit == 0 {
            if !words.ends_with(ZERO_WORD) {
                words.push_str(ZERO_WORD);
            }
        } else {
            words.push_str(DIGIT_WORDS[digit]);
            words.push_str(POSITION_UNITS[width - offset - 1]);
        }
    }
    TRAILING_ZEROS_RE.replace(&words, "").into_owned()
}
