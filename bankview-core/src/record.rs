//! Transaction records as exported by the bank: an ordered set of named cells.
//!
//! The export has no fixed schema. Operations address columns by name and
//! tolerate missing or extra ones, so a record is kept as ordered
//! `(column, value)` pairs with typed helpers for the columns the analytics use.

use chrono::NaiveDateTime;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::error::{Error, Result};
use crate::time::parse_operation_date;

/// Column headers of the bank statement export.
pub mod columns {
    pub const OPERATION_DATE: &str = "Дата операции";
    pub const PAYMENT_DATE: &str = "Дата платежа";
    pub const CARD_NUMBER: &str = "Номер карты";
    pub const STATUS: &str = "Статус";
    pub const OPERATION_AMOUNT: &str = "Сумма операции";
    pub const OPERATION_CURRENCY: &str = "Валюта операции";
    pub const PAYMENT_AMOUNT: &str = "Сумма платежа";
    pub const PAYMENT_CURRENCY: &str = "Валюта платежа";
    pub const CASHBACK: &str = "Кэшбэк";
    pub const CATEGORY: &str = "Категория";
    pub const MCC: &str = "MCC";
    pub const DESCRIPTION: &str = "Описание";
    pub const BONUSES: &str = "Бонусы (включая кэшбэк)";
    pub const INVEST_ROUNDING: &str = "Округление на инвесткопилку";
    pub const ROUNDED_AMOUNT: &str = "Сумма операции с округлением";

    /// Columns holding numbers in the export.
    pub const NUMERIC: &[&str] = &[
        OPERATION_AMOUNT,
        PAYMENT_AMOUNT,
        CASHBACK,
        MCC,
        BONUSES,
        INVEST_ROUNDING,
        ROUNDED_AMOUNT,
    ];

    pub fn is_numeric(column: &str) -> bool {
        NUMERIC.contains(&column)
    }
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    #[default]
    Empty,
}

impl FieldValue {
    /// Numeric view of the cell; only `Int` and `Float` qualify.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Int(i) => write!(f, "{i}"),
            FieldValue::Float(x) => write!(f, "{x}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

/// One bank transaction. Column order is preserved from the source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transaction {
    fields: Vec<(String, FieldValue)>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for fixtures.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(column, value);
        self
    }

    /// Set a column, replacing the value in place if it already exists.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<FieldValue>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(FieldValue::as_text)
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(FieldValue::as_f64)
    }

    /// Parse `Дата операции`. Missing or non-text values are malformed dates.
    pub fn operation_date(&self) -> Result<NaiveDateTime> {
        match self.get(columns::OPERATION_DATE) {
            Some(FieldValue::Text(s)) => parse_operation_date(s),
            other => Err(Error::MalformedDate {
                value: other.map(ToString::to_string).unwrap_or_default(),
                expected: "DD.MM.YYYY HH:MM:SS",
            }),
        }
    }

    pub fn payment_amount(&self) -> Option<f64> {
        self.number(columns::PAYMENT_AMOUNT)
    }

    pub fn operation_amount(&self) -> Option<f64> {
        self.number(columns::OPERATION_AMOUNT)
    }

    pub fn cashback(&self) -> Option<f64> {
        self.number(columns::CASHBACK)
    }

    pub fn bonuses(&self) -> Option<f64> {
        self.number(columns::BONUSES)
    }

    pub fn category(&self) -> Option<&str> {
        self.text(columns::CATEGORY)
    }

    pub fn description(&self) -> Option<&str> {
        self.text(columns::DESCRIPTION)
    }

    pub fn card_number(&self) -> Option<&str> {
        self.text(columns::CARD_NUMBER)
    }
}

impl<K, V> FromIterator<(K, V)> for Transaction
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut txn = Transaction::new();
        for (column, value) in iter {
            txn.insert(column, value);
        }
        txn
    }
}

impl Serialize for Transaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl TryFrom<serde_json::Value> for Transaction {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        use serde_json::Value;

        let Value::Object(map) = value else {
            return Err(Error::InvalidShape(format!(
                "expected a record object, got {}",
                json_kind(&value)
            )));
        };

        let mut txn = Transaction::new();
        for (column, cell) in map {
            let value = match cell {
                Value::Null => FieldValue::Empty,
                Value::Bool(b) => FieldValue::Bool(b),
                Value::String(s) => FieldValue::Text(s),
                Value::Number(n) => match n.as_i64() {
                    Some(i) => FieldValue::Int(i),
                    None => FieldValue::Float(n.as_f64().unwrap_or(f64::NAN)),
                },
                other => {
                    return Err(Error::InvalidShape(format!(
                        "column '{column}' holds {}, expected a scalar",
                        json_kind(&other)
                    )));
                }
            };
            txn.insert(column, value);
        }
        Ok(txn)
    }
}

/// Convert a JSON document into records. Anything but a list of objects
/// with scalar values is rejected.
pub fn transactions_from_json(value: serde_json::Value) -> Result<Vec<Transaction>> {
    match value {
        serde_json::Value::Array(items) => items.into_iter().map(Transaction::try_from).collect(),
        other => Err(Error::InvalidShape(format!(
            "expected a list of records, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut txn = Transaction::new()
            .with(columns::CATEGORY, "Еда")
            .with(columns::DESCRIPTION, "Кафе");
        txn.insert(columns::CATEGORY, "Транспорт");

        assert_eq!(txn.len(), 2);
        assert_eq!(txn.columns().collect::<Vec<_>>(), vec![columns::CATEGORY, columns::DESCRIPTION]);
        assert_eq!(txn.category(), Some("Транспорт"));
    }

    #[test]
    fn test_numeric_accessors_accept_int_and_float() {
        let txn = Transaction::new()
            .with(columns::PAYMENT_AMOUNT, -100)
            .with(columns::OPERATION_AMOUNT, -100.5)
            .with(columns::CASHBACK, "5");

        assert_eq!(txn.payment_amount(), Some(-100.0));
        assert_eq!(txn.operation_amount(), Some(-100.5));
        // text is never treated as a number
        assert_eq!(txn.cashback(), None);
        assert_eq!(txn.bonuses(), None);
    }

    #[test]
    fn test_operation_date() {
        let txn = Transaction::new().with(columns::OPERATION_DATE, "01.08.2025 12:00:00");
        let dt = txn.operation_date().unwrap();
        assert_eq!(dt.to_string(), "2025-08-01 12:00:00");

        let missing = Transaction::new();
        assert!(matches!(missing.operation_date(), Err(Error::MalformedDate { .. })));

        let numeric = Transaction::new().with(columns::OPERATION_DATE, 20250801);
        assert!(numeric.operation_date().is_err());
    }

    #[test]
    fn test_serializes_in_column_order() {
        let txn = Transaction::new()
            .with("b", 1)
            .with("a", "x")
            .with("c", FieldValue::Empty);
        let s = serde_json::to_string(&txn).unwrap();
        assert_eq!(s, r#"{"b":1,"a":"x","c":null}"#);
    }

    #[test]
    fn test_from_json() {
        let data = json!([
            {"Описание": "Оплата кафе", "Сумма платежа": -160.89, "MCC": 5812, "Флаг": true, "Кэшбэк": null},
        ]);
        let txns = transactions_from_json(data).unwrap();
        assert_eq!(txns.len(), 1);
        let txn = &txns[0];
        assert_eq!(txn.description(), Some("Оплата кафе"));
        assert_eq!(txn.get("Сумма платежа"), Some(&FieldValue::Float(-160.89)));
        assert_eq!(txn.get("MCC"), Some(&FieldValue::Int(5812)));
        assert_eq!(txn.get("Флаг"), Some(&FieldValue::Bool(true)));
        assert!(txn.get("Кэшбэк").unwrap().is_empty());
    }

    #[test]
    fn test_from_json_rejects_bad_shapes() {
        assert!(matches!(
            transactions_from_json(json!("not_a_list")),
            Err(Error::InvalidShape(_))
        ));
        assert!(matches!(
            transactions_from_json(json!([1, 2, 3])),
            Err(Error::InvalidShape(_))
        ));
        assert!(matches!(
            transactions_from_json(json!([{"Описание": ["nested"]}])),
            Err(Error::InvalidShape(_))
        ));
    }
}
