//! Regex search over a chosen set of record columns.
//!
//! Text cells are matched as-is; integer and boolean cells are matched on
//! their string form. Float cells never match, whatever their digits are.

use bankview_core::{FieldValue, Result, Transaction, columns};
use regex::Regex;
use std::borrow::Cow;
use tracing::debug;

/// Columns searched when the caller does not narrow the scope.
pub const DEFAULT_SCOPE: &[&str] = &[columns::DESCRIPTION, columns::CATEGORY];

/// A capitalised first name followed by an initial: "Иван П."
pub const P2P_PATTERN: &str = r"[А-Я]{1}[а-я]+\s[А-Я]{1}\.";

/// A Russian mobile number: "+7 912 345-67-89" (the middle group may be 2 or 3 digits).
pub const PHONE_PATTERN: &str = r"\+7\s\d{3}\s\d{2,3}-\d{2}-\d{2}";

/// Records where `pattern` is found in at least one column named in `scope`.
/// Order is preserved and a record appears at most once.
pub fn search_transactions(
    records: &[Transaction],
    pattern: &str,
    scope: &[&str],
) -> Result<Vec<Transaction>> {
    debug!(pattern, rows = records.len(), "searching transactions");
    let re = Regex::new(pattern)?;
    let found = search_with(records, &re, scope);
    debug!(found = found.len(), "search done");
    Ok(found)
}

fn search_with(records: &[Transaction], re: &Regex, scope: &[&str]) -> Vec<Transaction> {
    records
        .iter()
        .filter(|txn| {
            txn.fields()
                .filter(|(column, _)| scope.contains(column))
                .filter_map(|(_, value)| searchable(value))
                .any(|text| re.is_match(&text))
        })
        .cloned()
        .collect()
}

/// Transfers to private persons, recognised by a name in the description.
pub fn search_transactions_p2p(records: &[Transaction]) -> Result<Vec<Transaction>> {
    search_transactions(records, P2P_PATTERN, &[columns::DESCRIPTION])
}

/// Transactions whose description carries a mobile number.
pub fn search_transactions_by_phone(records: &[Transaction]) -> Result<Vec<Transaction>> {
    search_transactions(records, PHONE_PATTERN, &[columns::DESCRIPTION])
}

fn searchable(value: &FieldValue) -> Option<Cow<'_, str>> {
    match value {
        FieldValue::Text(s) => Some(Cow::Borrowed(s)),
        FieldValue::Int(i) => Some(Cow::Owned(i.to_string())),
        FieldValue::Bool(b) => Some(Cow::Owned(b.to_string())),
        FieldValue::Float(_) | FieldValue::Empty => None,
    }
}
