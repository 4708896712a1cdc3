//! Gift record model.
//!
//! # Responsibility
//! - Define the editable record fields and their wire names.
//! - Keep the derived numeral column in sync with the amount column.
//!
//! # Invariants
//! - `amount_numeral` is `format_amount(amount)` when the coerced amount is
//!   above zero, and empty otherwise.
//! - The numeral column is never writable through `RecordField`.

use crate::model::amount::Amount;
use crate::numeral::format_amount;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Position of a record inside the ledger, dense from 0.
pub type RecordIndex = u32;

/// One guest entry. The index is the key of the owning map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    /// Guest name.
    pub name: String,
    /// Amount text as entered. May be malformed; readers coerce to zero.
    #[serde(deserialize_with = "deserialize_amount_text")]
    pub amount: String,
    /// Non-monetary gift description.
    pub gift: String,
    /// Guest address.
    pub address: String,
    /// Derived financial numeral of `amount`.
    #[serde(rename = "amountCapital")]
    pub amount_numeral: String,
}

impl Record {
    /// Amount after lenient coercion.
    pub fn coerced_amount(&self) -> Amount {
        Amount::parse_lenient(&self.amount)
    }

    /// Returns whether every field is blank.
    pub fn is_blank(&self) -> bool {
        self.name.is_empty()
            && self.amount.trim().is_empty()
            && self.gift.is_empty()
            && self.address.is_empty()
    }

    /// Returns a copy with `field` replaced by `value` and the numeral
    /// column recomputed when the amount changes.
    pub fn with_field(&self, field: RecordField, value: impl Into<String>) -> Record {
        let mut next = self.clone();
        let value = value.into();
        match field {
            RecordField::Name => next.name = value,
            RecordField::Gift => next.gift = value,
            RecordField::Address => next.address = value,
            RecordField::Amount => {
                next.amount = value;
                next.amount_numeral = numeral_for(next.coerced_amount());
            }
        }
        next
    }

    /// Recomputes the numeral column. Returns `true` when it changed.
    pub fn refresh_numeral(&mut self) -> bool {
        let expected = numeral_for(self.coerced_amount());
        if self.amount_numeral == expected {
            return false;
        }
        self.amount_numeral = expected;
        true
    }
}

/// Numeral column value for raw amount text: empty when the text coerces to
/// zero, the financial numeral otherwise.
pub fn record_numeral(raw: &str) -> String {
    numeral_for(Amount::parse_lenient(raw))
}

fn numeral_for(amount: Amount) -> String {
    if amount.is_zero() {
        String::new()
    } else {
        format_amount(amount)
    }
}

fn deserialize_amount_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text,
        Some(Value::Number(number)) => number.to_string(),
        Some(other) => other.to_string(),
    })
}

/// Editable record column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Name,
    Amount,
    Gift,
    Address,
}

/// Wire name of the name column.
pub const RECORD_FIELD_NAME: &str = "name";
/// Wire name of the amount column.
pub const RECORD_FIELD_AMOUNT: &str = "amount";
/// Wire name of the gift column.
pub const RECORD_FIELD_GIFT: &str = "gift";
/// Wire name of the address column.
pub const RECORD_FIELD_ADDRESS: &str = "address";
/// Wire name of the derived numeral column.
pub const RECORD_FIELD_AMOUNT_NUMERAL: &str = "amountCapital";

impl RecordField {
    /// Stable wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => RECORD_FIELD_NAME,
            Self::Amount => RECORD_FIELD_AMOUNT,
            Self::Gift => RECORD_FIELD_GIFT,
            Self::Address => RECORD_FIELD_ADDRESS,
        }
    }
}

impl Display for RecordField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a record column from its wire name.
pub fn parse_record_field(value: &str) -> Result<RecordField, RecordFieldError> {
    match value.trim() {
        RECORD_FIELD_NAME => Ok(RecordField::Name),
        RECORD_FIELD_AMOUNT => Ok(RecordField::Amount),
        RECORD_FIELD_GIFT => Ok(RecordField::Gift),
        RECORD_FIELD_ADDRESS => Ok(RecordField::Address),
        RECORD_FIELD_AMOUNT_NUMERAL => Err(RecordFieldError::ReadOnly(
            RECORD_FIELD_AMOUNT_NUMERAL.to_string(),
        )),
        other => Err(RecordFieldError::Unsupported(other.to_string())),
    }
}

/// Record column parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordFieldError {
    /// Column is derived and cannot be edited.
    ReadOnly(String),
    /// Column name is unknown.
    Unsupported(String),
}

impl Display for RecordFieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadOnly(value) => write!(f, "record field is derived and read-only: {value}"),
            Self::Unsupported(value) => write!(f, "record field is unsupported: {value}"),
        }
    }
}

impl Error for RecordFieldError {}

#[cfg(test)]
mod tests {
    use super::{parse_record_field, record_numeral, Record, RecordField, RecordFieldError};

    #[test]
    fn amount_edit_recomputes_numeral() {
        let record = Record::default().with_field(RecordField::Amount, "50.5");
        assert_eq!(record.amount, "50.5");
        assert_eq!(record.amount_numeral, "伍拾元伍角");
    }

    #[test]
    fn malformed_or_zero_amount_clears_numeral() {
        let record = Record::default().with_field(RecordField::Amount, "100");
        let cleared = record.with_field(RecordField::Amount, "oops");
        assert_eq!(cleared.amount_numeral, "");
        let zero = record.with_field(RecordField::Amount, "0");
        assert_eq!(zero.amount_numeral, "");
    }

    #[test]
    fn column_numeral_matches_stored_record() {
        for raw in ["", "   ", "0", "0.00", "abc", "-3", "1001", "12.5"] {
            let record = Record::default().with_field(RecordField::Amount, raw);
            assert_eq!(record_numeral(raw), record.amount_numeral, "raw `{raw}`");
        }
        assert_eq!(record_numeral("abc"), "");
        assert_eq!(record_numeral("12.5"), "壹拾贰元伍角");
    }

    #[test]
    fn text_edit_keeps_numeral() {
        let record = Record::default()
            .with_field(RecordField::Amount, "8")
            .with_field(RecordField::Name, "张三");
        assert_eq!(record.name, "张三");
        assert_eq!(record.amount_numeral, "捌元整");
    }

    #[test]
    fn refresh_numeral_repairs_stale_value() {
        let mut record = Record {
            amount: "2".to_string(),
            amount_numeral: "stale".to_string(),
            ..Record::default()
        };
        assert!(record.refresh_numeral());
        assert_eq!(record.amount_numeral, "贰元整");
        assert!(!record.refresh_numeral());
    }

    #[test]
    fn parses_field_wire_names() {
        assert_eq!(parse_record_field("amount"), Ok(RecordField::Amount));
        assert_eq!(parse_record_field(" gift "), Ok(RecordField::Gift));
        assert_eq!(
            parse_record_field("amountCapital"),
            Err(RecordFieldError::ReadOnly("amountCapital".to_string()))
        );
        assert_eq!(
            parse_record_field("phone"),
            Err(RecordFieldError::Unsupported("phone".to_string()))
        );
    }

    #[test]
    fn deserializes_numeric_and_missing_amounts() {
        let record: Record =
            serde_json::from_str(r#"{"name":"李四","amount":200}"#).expect("record json");
        assert_eq!(record.amount, "200");
        assert_eq!(record.gift, "");

        let record: Record = serde_json::from_str(r#"{"amount":null}"#).expect("record json");
        assert_eq!(record.amount, "");
    }

    #[test]
    fn serializes_numeral_with_legacy_wire_name() {
        let record = Record::default().with_field(RecordField::Amount, "1");
        let json = serde_json::to_value(&record).expect("record json");
        assert_eq!(json["amountCapital"], "壹元整");
        assert_eq!(json["amount"], "1");
    }
}
